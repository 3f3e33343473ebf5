//! # Lox Expression Front End
//!
//! Scanner, parser and printers for the expression subset of Lox:
//! literals, unary and binary operators, and parenthesized grouping.
//!
//! ## Architecture
//!
//! - `lexer`: token catalog and maximal-munch scanner
//! - `parser`: recursive-descent parser, arena-backed AST, visitors
//! - `error`: error types, exit codes and diagnostics
//! - `logging`: injected structured logger
//! - `config`: runtime configuration from environment and flags

pub mod config;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod parser;

// Re-export commonly used types
pub use config::Config;
pub use error::{Diagnostic, LoxError, LoxResult, SourceLocation};
pub use lexer::{Lexer, Literal, ScanOutput, Token, TokenKind};
pub use logging::{Level, Logger, MemoryLogger, NullLogger, StderrLogger};
pub use parser::{Ast, AstPrinter, Expr, ExprId, ExprVisitor, Parser, Unparser};

/// Version of the front end
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan source text into tokens
///
/// Never fails outright: lexical errors are collected in the output and the
/// stream still ends in `Eof`.
pub fn tokenize(source: &str, filename: Option<&str>, logger: &dyn Logger) -> ScanOutput {
    Lexer::new(source, filename, logger).scan()
}

/// Scan and parse source text into an expression tree
///
/// # Returns
///
/// The tree, or the first lexical error if scanning failed, or the parse
/// error that aborted parsing.
pub fn parse(source: &str, filename: Option<&str>, logger: &dyn Logger) -> LoxResult<Ast> {
    let output = tokenize(source, filename, logger);
    if let Some(error) = output.diagnostics.into_iter().next() {
        return Err(error);
    }

    Parser::new(output.tokens, logger).parse()
}
