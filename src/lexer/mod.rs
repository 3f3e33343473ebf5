//! Lexical analysis module
//!
//! This module handles tokenization of Lox source code.

pub mod token;
pub mod scanner;

pub use token::{Literal, Span, Token, TokenKind};
pub use scanner::{Lexer, ScanOutput};
