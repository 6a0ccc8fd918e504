use microscript_syntax::{
    Keyword, LexErrorKind, Lexer, Literal, QuoteStyle, Token, TokenCategory, TokenKind, tokenize,
};

fn categories(input: &str) -> Vec<TokenCategory> {
    tokenize(input)
        .expect("tokenize failed")
        .iter()
        .map(|t| t.kind.category())
        .collect()
}

#[test]
fn realistic_statement() {
    let tokens = tokenize("local speed = player.speed * 1.5 // per frame").expect("tokenize failed");
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(
        texts,
        ["local", "speed", "=", "player", ".", "speed", "*", "1.5"]
    );
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Local));
    assert!(tokens[0].is_keyword(Keyword::Local));
    assert_eq!(tokens[7].value, Some(Literal::Number(1.5)));
}

#[test]
fn token_categories() {
    assert_eq!(
        categories("if x >= 10 then [\"a\"] end true"),
        vec![
            TokenCategory::Keyword,
            TokenCategory::Identifier,
            TokenCategory::Operator,
            TokenCategory::Number,
            TokenCategory::Keyword,
            TokenCategory::Punctuation,
            TokenCategory::String,
            TokenCategory::Punctuation,
            TokenCategory::Keyword,
            TokenCategory::Boolean,
        ]
    );
}

#[test]
fn word_operators_are_keywords() {
    let kinds: Vec<_> = tokenize("not a and b or c")
        .expect("tokenize failed")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds[0], TokenKind::Keyword(Keyword::Not));
    assert_eq!(kinds[2], TokenKind::Keyword(Keyword::And));
    assert_eq!(kinds[4], TokenKind::Keyword(Keyword::Or));
}

#[test]
fn quote_styles() {
    let tokens = tokenize(r#""d" 's' """t""""#).expect("tokenize failed");
    assert_eq!(tokens[0].kind, TokenKind::String(QuoteStyle::Double));
    assert_eq!(tokens[1].kind, TokenKind::String(QuoteStyle::Single));
    assert_eq!(tokens[2].kind, TokenKind::String(QuoteStyle::Triple));
    assert_eq!(tokens[2].text, r#""""t""""#);
}

#[test]
fn escape_sequences() {
    let tokens = tokenize(r#""\\ \' \" \n \r \t \0 \x7e é""#).expect("tokenize failed");
    assert_eq!(
        tokens[0].value,
        Some(Literal::Str("\\ ' \" \n \r \t \0 ~ \u{e9}".to_string()))
    );
}

#[test]
fn surrogate_escapes_decode() {
    let tokens = tokenize(r#""\uD83D\uDE00" "\uD800" x"#).expect("tokenize failed");
    assert_eq!(tokens[0].value, Some(Literal::Str("\u{1F600}".to_string())));
    assert_eq!(tokens[1].value, Some(Literal::Str("\u{FFFD}".to_string())));
    assert_eq!(tokens[2].span.column, 25);

    let program = microscript_syntax::parse(r#"x = "\uD800""#).expect("parse failed");
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn triple_quoted_spans_lines_without_escapes() {
    let tokens = tokenize("x = \"\"\"line one\n  \\n two\"\"\"\ny").expect("tokenize failed");
    assert_eq!(
        tokens[2].value,
        Some(Literal::Str("line one\n  \\n two".to_string()))
    );
    assert_eq!(tokens[3].span.line, 3);
}

#[test]
fn triple_quoted_ends_at_first_closing_quotes() {
    let tokens = tokenize(r#""""a"""b"#).expect("tokenize failed");
    assert_eq!(tokens[0].value, Some(Literal::Str("a".to_string())));
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn comment_hides_triple_quote() {
    assert!(tokenize("// \"\"\" not a string").expect("tokenize failed").is_empty());
    assert!(tokenize("/* \"\"\" */").expect("tokenize failed").is_empty());
}

#[test]
fn block_comments_do_not_nest() {
    let kinds: Vec<_> = tokenize("/* a /* b */ c */")
        .expect("tokenize failed")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        [TokenKind::Identifier, TokenKind::Star, TokenKind::Slash]
    );
}

#[test]
fn comment_tokens_for_tools() {
    let tokens: Vec<Token> = Lexer::new("x // trailing\n")
        .with_comments(true)
        .collect::<Result<_, _>>()
        .expect("tokenize failed");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind.category(), TokenCategory::Comment);
    assert_eq!(tokens[1].text, "// trailing");
}

#[test]
fn pull_based_lexing() {
    let mut lexer = Lexer::new("a b");
    assert_eq!(
        lexer.next_token().expect("lex").map(|t| t.text),
        Some("a".to_string())
    );
    assert_eq!(
        lexer.next_token().expect("lex").map(|t| t.text),
        Some("b".to_string())
    );
    assert!(lexer.next_token().expect("lex").is_none());
    assert!(lexer.next_token().expect("lex").is_none());
}

#[test]
fn error_positions() {
    let err = tokenize("x = 1\ny = 'open").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!((err.span.line, err.span.column), (2, 5));
    assert_eq!(
        err.to_string(),
        "unterminated string literal at line 2, column 5"
    );
}

#[test]
fn malformed_hex_number() {
    let err = tokenize("x = 0xg").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::MalformedNumber("0x".to_string()));
}
