//! Parser module
//!
//! This module handles parsing tokens into an Abstract Syntax Tree (AST).

pub mod ast;
pub mod parser;
pub mod printer;

pub use ast::{Ast, Expr, ExprArena, ExprId, ExprVisitor};
pub use parser::{Parser, MAX_DEPTH, MAX_HEIGHT};
pub use printer::{AstPrinter, Unparser};
