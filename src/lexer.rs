use std::fmt;

use crate::token::{Keyword, Literal, QuoteStyle, Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Unterminated single, double, or triple-quoted string.
    UnterminatedString,
    /// `/*` without a closing `*/`.
    UnterminatedBlockComment,
    /// Backslash followed by something other than a known escape.
    InvalidEscape(String),
    /// Number prefix with no digits, such as `0x`.
    MalformedNumber(String),
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::UnterminatedBlockComment => {
                write!(f, "unterminated block comment")
            }
            Self::InvalidEscape(seq) => {
                write!(f, "invalid escape sequence: {seq}")
            }
            Self::MalformedNumber(text) => {
                write!(f, "malformed number: {text}")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a whole microScript source string, comments skipped.
///
/// # Errors
///
/// Returns `LexError` on illegal characters, unterminated strings
/// or comments, and malformed escapes or numbers.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    col: usize,
}

/// Pull-based lexer over one source buffer.
///
/// Each call to [`Lexer::next_token`] skips trivia and produces the
/// next token, or `None` at end of input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    keep_comments: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let start = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            source,
            input: bytes,
            pos: start,
            line: 1,
            col: 1,
            keep_comments: false,
            failed: false,
        }
    }

    /// Emit comment tokens instead of skipping them.
    #[must_use]
    pub const fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Empty span at the current cursor position.
    #[must_use]
    pub const fn position(&self) -> Span {
        Span {
            start: self.pos,
            end: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    /// Produce the next token, or `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns `LexError` when the upcoming bytes do not form a
    /// token. The lexer does not recover afterwards.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else {
                return Ok(None);
            };
            let start = self.mark();

            match (ch, self.peek_at(1)) {
                (b'/', Some(b'/')) => {
                    self.skip_line_comment();
                    if self.keep_comments {
                        return Ok(Some(self.finish(TokenKind::Comment, start, None)));
                    }
                }
                (b'/', Some(b'*')) => {
                    self.skip_block_comment(start)?;
                    if self.keep_comments {
                        return Ok(Some(self.finish(TokenKind::Comment, start, None)));
                    }
                }
                _ => return self.read_token(ch, start).map(Some),
            }
        }
    }

    const fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    const fn span_from(&self, start: Mark) -> Span {
        Span {
            start: start.pos,
            end: self.pos,
            line: start.line,
            column: start.col,
        }
    }

    fn finish(&self, kind: TokenKind, start: Mark, value: Option<Literal>) -> Token {
        Token {
            kind,
            text: self.source[start.pos..self.pos].to_string(),
            value,
            span: self.span_from(start),
        }
    }

    const fn error(&self, kind: LexErrorKind, start: Mark) -> LexError {
        LexError {
            kind,
            span: self.span_from(start),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(&b) = self.input.get(self.pos) {
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes do not start a new column
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance_by(ch.len_utf8());
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self, start: Mark) -> Result<(), LexError> {
        self.advance_by(2);
        match self.source[self.pos..].find("*/") {
            Some(len) => {
                self.advance_by(len + 2);
                Ok(())
            }
            None => {
                self.advance_by(self.input.len() - self.pos);
                Err(self.error(LexErrorKind::UnterminatedBlockComment, start))
            }
        }
    }

    fn read_token(&mut self, ch: u8, start: Mark) -> Result<Token, LexError> {
        match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => Ok(self.read_word(start)),
            b'0'..=b'9' => self.read_number(start),
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.read_number(start)
            }
            b'"' if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') => {
                self.read_triple_quoted(start)
            }
            b'"' => self.read_quoted(start, b'"', QuoteStyle::Double),
            b'\'' => self.read_quoted(start, b'\'', QuoteStyle::Single),
            _ => self.read_symbol(ch, start),
        }
    }

    fn read_word(&mut self, start: Mark) -> Token {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.advance();
        }

        let word = &self.source[start.pos..self.pos];
        match word {
            "true" => self.finish(TokenKind::Boolean, start, Some(Literal::Boolean(true))),
            "false" => self.finish(TokenKind::Boolean, start, Some(Literal::Boolean(false))),
            _ => {
                let kind = Keyword::from_word(word).map_or(TokenKind::Identifier, TokenKind::Keyword);
                self.finish(kind, start, None)
            }
        }
    }

    fn read_number(&mut self, start: Mark) -> Result<Token, LexError> {
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.advance_by(2);
            let mut value = 0.0_f64;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(|b| char::from(b).to_digit(16)) {
                value = value.mul_add(16.0, f64::from(d));
                digits += 1;
                self.advance();
            }
            if digits == 0 {
                let text = self.source[start.pos..self.pos].to_string();
                return Err(self.error(LexErrorKind::MalformedNumber(text), start));
            }
            return Ok(self.finish(TokenKind::Number, start, Some(Literal::Number(value))));
        }

        self.skip_digits();
        if self.peek() == Some(b'.') {
            self.advance();
            self.skip_digits();
        }

        // The exponent only belongs to the number when it is complete.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digit_at = if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                2
            } else {
                1
            };
            if self.peek_at(digit_at).is_some_and(|b| b.is_ascii_digit()) {
                self.advance_by(digit_at);
                self.skip_digits();
            }
        }

        let text = &self.source[start.pos..self.pos];
        match text.parse::<f64>() {
            Ok(value) => Ok(self.finish(TokenKind::Number, start, Some(Literal::Number(value)))),
            Err(_) => Err(self.error(LexErrorKind::MalformedNumber(text.to_string()), start)),
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_quoted(&mut self, start: Mark, quote: u8, style: QuoteStyle) -> Result<Token, LexError> {
        self.advance(); // skip opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(LexErrorKind::UnterminatedString, start));
                }
                Some(b'\\') => {
                    value.push(self.read_escape()?);
                }
                Some(b) if b == quote => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if let Some(c) = self.peek_char() {
                        value.push(c);
                        self.advance_by(c.len_utf8());
                    }
                }
            }
        }

        Ok(self.finish(TokenKind::String(style), start, Some(Literal::Str(value))))
    }

    fn read_escape(&mut self) -> Result<char, LexError> {
        let start = self.mark();
        self.advance(); // skip backslash

        let simple = match self.peek() {
            None => return Err(self.error(LexErrorKind::UnterminatedString, start)),
            Some(b'\\') => Some('\\'),
            Some(b'\'') => Some('\''),
            Some(b'"') => Some('"'),
            Some(b'n') => Some('\n'),
            Some(b'r') => Some('\r'),
            Some(b't') => Some('\t'),
            Some(b'0') => Some('\0'),
            Some(_) => None,
        };
        if let Some(c) = simple {
            self.advance();
            return Ok(c);
        }

        let width = match self.peek() {
            Some(b'x') => 2,
            Some(b'u') => 4,
            _ => {
                if let Some(c) = self.peek_char() {
                    self.advance_by(c.len_utf8());
                }
                let seq = self.source[start.pos..self.pos].to_string();
                return Err(self.error(LexErrorKind::InvalidEscape(seq), start));
            }
        };
        self.advance();

        let mut code = 0_u32;
        for _ in 0..width {
            let Some(d) = self.peek().and_then(|b| char::from(b).to_digit(16)) else {
                let seq = self.source[start.pos..self.pos].to_string();
                return Err(self.error(LexErrorKind::InvalidEscape(seq), start));
            };
            code = code * 16 + d;
            self.advance();
        }

        let low = if (0xD800..0xDC00).contains(&code) {
            self.low_surrogate()
        } else {
            None
        };
        if let Some(low) = low {
            self.advance_by(6);
            code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        }
        // Unpaired surrogates decode to U+FFFD.
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Code unit of a `\uDC00`..`\uDFFF` escape at the cursor.
    fn low_surrogate(&self) -> Option<u32> {
        let digits = self
            .source
            .get(self.pos..self.pos + 6)?
            .strip_prefix("\\u")?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .filter(|c| (0xDC00..0xE000).contains(c))
    }

    fn read_triple_quoted(&mut self, start: Mark) -> Result<Token, LexError> {
        self.advance_by(3);
        let Some(len) = self.source[self.pos..].find("\"\"\"") else {
            self.advance_by(self.input.len() - self.pos);
            return Err(self.error(LexErrorKind::UnterminatedString, start));
        };
        let value = self.source[self.pos..self.pos + len].to_string();
        self.advance_by(len + 3);
        Ok(self.finish(
            TokenKind::String(QuoteStyle::Triple),
            start,
            Some(Literal::Str(value)),
        ))
    }

    fn read_symbol(&mut self, ch: u8, start: Mark) -> Result<Token, LexError> {
        let next = self.peek_at(1);
        let (kind, len) = match (ch, next) {
            (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
            (b'=', _) => (TokenKind::Assign, 1),
            (b'!', Some(b'=')) => (TokenKind::NotEq, 2),
            (b'<', Some(b'<')) => (TokenKind::Shl, 2),
            (b'<', Some(b'=')) => (TokenKind::LtEq, 2),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', Some(b'>')) => (TokenKind::Shr, 2),
            (b'>', Some(b'=')) => (TokenKind::GtEq, 2),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'+', Some(b'=')) => (TokenKind::PlusAssign, 2),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', Some(b'=')) => (TokenKind::MinusAssign, 2),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', Some(b'=')) => (TokenKind::StarAssign, 2),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', Some(b'=')) => (TokenKind::SlashAssign, 2),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', Some(b'=')) => (TokenKind::PercentAssign, 2),
            (b'%', _) => (TokenKind::Percent, 1),
            (b'&', Some(b'=')) => (TokenKind::AmpAssign, 2),
            (b'&', _) => (TokenKind::Amp, 1),
            (b'|', Some(b'=')) => (TokenKind::PipeAssign, 2),
            (b'|', _) => (TokenKind::Pipe, 1),
            (b'^', _) => (TokenKind::Caret, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'[', _) => (TokenKind::LBracket, 1),
            (b']', _) => (TokenKind::RBracket, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            _ => {
                let c = self.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER);
                self.advance_by(c.len_utf8());
                return Err(self.error(LexErrorKind::UnexpectedCharacter(c), start));
            }
        };
        self.advance_by(len);
        Ok(self.finish(kind, start, None))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_token().transpose();
        if matches!(next, Some(Err(_))) {
            self.failed = true;
        }
        next
    }
}
