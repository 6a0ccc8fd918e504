//! CLI tool to validate, format, and inspect microScript source files.

use std::fs;
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use microscript_syntax::tree::SyntaxNode;
use microscript_syntax::{Lexer, ParseOptions, Program, TokenKind, format, parse_with_options};

#[derive(ClapParser, Debug)]
#[command(name = "microscript", about = "Validate, format, and inspect microScript files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Maximum nesting depth accepted by the parser.
    #[arg(long, global = true, default_value_t = ParseOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Increase log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check if file(s) parse.
    Validate {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
    /// Format file(s) and print to stdout.
    Fmt {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
    /// Check if file(s) are formatted.
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
    /// Print the syntax tree as JSON.
    Tree {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Print an S-expression instead of JSON.
        #[arg(long)]
        sexp: bool,
    },
    /// Print the token stream.
    Tokens {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Include comments.
        #[arg(long)]
        comments: bool,
    },
}

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let logger = Box::new(StderrLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ParseOptions::new().max_depth(cli.max_depth);
    let files = match &cli.command {
        Command::Validate { files }
        | Command::Fmt { files }
        | Command::Check { files }
        | Command::Tree { files, .. }
        | Command::Tokens { files, .. } => files,
    };

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };
        log::debug!("{path}: read {} bytes", content.len());

        let ok = run(&cli.command, path, &content, &options);
        had_error |= !ok;
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Run `command` on one file. Returns `false` on failure.
fn run(command: &Command, path: &str, content: &str, options: &ParseOptions) -> bool {
    match command {
        Command::Validate { .. } => with_program(path, content, options, |program| {
            eprintln!(
                "{path}: valid ({} statement(s))",
                program.statements.len()
            );
            true
        }),
        Command::Fmt { .. } => with_program(path, content, options, |program| {
            print!("{}", format(program));
            true
        }),
        Command::Check { .. } => with_program(path, content, options, |program| {
            if format(program) == content {
                eprintln!("{path}: formatted");
                true
            } else {
                eprintln!("{path}: not formatted");
                false
            }
        }),
        Command::Tree { sexp, .. } => with_program(path, content, options, |program| {
            let tree = SyntaxNode::from(program);
            if *sexp {
                println!("{}", tree.to_sexp());
                return true;
            }
            match serde_json::to_string_pretty(&tree) {
                Ok(json) => {
                    println!("{json}");
                    true
                }
                Err(e) => {
                    eprintln!("{path}: {e}");
                    false
                }
            }
        }),
        Command::Tokens { comments, .. } => print_tokens(path, content, *comments),
    }
}

fn with_program(
    path: &str,
    content: &str,
    options: &ParseOptions,
    f: impl FnOnce(&Program) -> bool,
) -> bool {
    match parse_with_options(content, options) {
        Ok(program) => f(&program),
        Err(e) => {
            eprintln!("{path}: {e}");
            false
        }
    }
}

fn print_tokens(path: &str, content: &str, comments: bool) -> bool {
    for token in Lexer::new(content).with_comments(comments) {
        match token {
            Ok(token) => {
                let kind = match token.kind {
                    TokenKind::Keyword(_) => "keyword",
                    other => other.describe(),
                };
                println!(
                    "{}:{}\t{kind}\t{}",
                    token.span.line, token.span.column, token.text
                );
            }
            Err(e) => {
                eprintln!("{path}: {e}");
                return false;
            }
        }
    }
    log::debug!("{path}: end of input");
    true
}
