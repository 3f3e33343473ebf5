//! Parser implementation
//!
//! Recursive descent over the expression grammar, one function per
//! precedence level, lowest first:
//!
//! ```text
//! expression := equality
//! equality   := comparison ( ( "!=" | "==" ) comparison )*
//! comparison := term ( ( ">" | ">=" | "<" | "<=" ) term )*
//! term       := factor ( ( "-" | "+" ) factor )*
//! factor     := unary ( ( "/" | "*" ) unary )*
//! unary      := ( "!" | "-" ) unary | primary
//! primary    := NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")"
//! ```
//!
//! Binary levels loop, folding each new operand onto the left, which makes
//! them left-associative. `unary` recurses into itself and nests to the
//! right. The first error aborts the parse.
//!
//! Nesting is bounded. Parentheses and prefix operators may stack at most
//! `MAX_DEPTH` deep, and no tree may be taller than `MAX_HEIGHT`, so that
//! neither the parser nor the visitors that walk its output run out of
//! stack.

use crate::error::{LoxError, LoxResult, SourceLocation};
use crate::lexer::{Literal, Span, Token, TokenKind};
use crate::logging::{emit, Level, Logger};
use super::ast::{Ast, Expr, ExprArena, ExprId};

const TARGET: &str = "parser";

/// Deepest run of nested groupings and prefix operators
pub const MAX_DEPTH: usize = 128;

/// Tallest tree the parser will build; long binary chains count too
pub const MAX_HEIGHT: usize = 512;

/// Parser for a Lox expression
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    finished: bool,
    depth: usize,
    arena: ExprArena,
    // Height of each arena node, indexed like the arena
    heights: Vec<usize>,
    logger: &'a dyn Logger,
}

impl<'a> Parser<'a> {
    /// Create a new parser from tokens
    ///
    /// A stream that does not end in `Eof` gets one appended.
    pub fn new(mut tokens: Vec<Token>, logger: &'a dyn Logger) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (span, location) = match tokens.last() {
                Some(last) => (
                    Span::new(last.span.end(), 0),
                    last.location.clone(),
                ),
                None => (Span::default(), SourceLocation::at(1, 1)),
            };
            tokens.push(Token::new(
                TokenKind::Eof,
                String::new(),
                span,
                location,
                Literal::None,
            ));
        }

        Self {
            tokens,
            current: 0,
            finished: false,
            depth: 0,
            arena: ExprArena::new(),
            heights: Vec::new(),
            logger,
        }
    }

    /// Parse the tokens into a single expression tree
    pub fn parse(mut self) -> LoxResult<Ast> {
        let root = self.expression()?;

        if !self.is_at_end() {
            return Err(self.error_at_current("Expected end of expression"));
        }

        emit(self.logger, Level::Debug, TARGET, "parse finished", |r| {
            r.field("nodes", self.arena.len())
        });

        Ok(Ast::new(self.arena, root))
    }

    // ===== Expressions =====

    fn expression(&mut self) -> LoxResult<ExprId> {
        self.enter("expression");
        self.equality()
    }

    fn equality(&mut self) -> LoxResult<ExprId> {
        self.enter("equality");
        let mut expr = self.comparison()?;

        while self.match_kinds(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = self.push(Expr::Binary {
                left: expr,
                operator,
                right,
            })?;
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> LoxResult<ExprId> {
        self.enter("comparison");
        let mut expr = self.term()?;

        while self.match_kinds(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = self.push(Expr::Binary {
                left: expr,
                operator,
                right,
            })?;
        }

        Ok(expr)
    }

    fn term(&mut self) -> LoxResult<ExprId> {
        self.enter("term");
        let mut expr = self.factor()?;

        while self.match_kinds(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = self.push(Expr::Binary {
                left: expr,
                operator,
                right,
            })?;
        }

        Ok(expr)
    }

    fn factor(&mut self) -> LoxResult<ExprId> {
        self.enter("factor");
        let mut expr = self.unary()?;

        while self.match_kinds(&[TokenKind::Slash, TokenKind::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = self.push(Expr::Binary {
                left: expr,
                operator,
                right,
            })?;
        }

        Ok(expr)
    }

    fn unary(&mut self) -> LoxResult<ExprId> {
        self.enter("unary");
        if self.match_kinds(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            self.descend()?;
            let right = self.unary()?;
            self.depth -= 1;
            return self.push(Expr::Unary { operator, right });
        }

        self.primary()
    }

    fn primary(&mut self) -> LoxResult<ExprId> {
        self.enter("primary");
        if self.match_kinds(&[
            TokenKind::False,
            TokenKind::True,
            TokenKind::Nil,
            TokenKind::String,
            TokenKind::Number,
        ]) {
            let literal = self.previous().clone();
            return self.push(Expr::Literal(literal));
        }

        if self.match_kinds(&[TokenKind::LeftParen]) {
            self.descend()?;
            let inner = self.expression()?;
            self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
            self.depth -= 1;
            return self.push(Expr::Grouping(inner));
        }

        Err(self.error_at_current("Expected expression"))
    }

    // ===== Helper Methods =====

    fn push(&mut self, expr: Expr) -> LoxResult<ExprId> {
        let height = 1 + match &expr {
            Expr::Literal(_) => 0,
            Expr::Unary { right, .. } => self.heights[right.index()],
            Expr::Binary { left, right, .. } => {
                self.heights[left.index()].max(self.heights[right.index()])
            }
            Expr::Grouping(inner) => self.heights[inner.index()],
        };
        if height > MAX_HEIGHT {
            let location = match &expr {
                Expr::Unary { operator, .. } | Expr::Binary { operator, .. } => {
                    operator.location.clone()
                }
                Expr::Literal(token) => token.location.clone(),
                Expr::Grouping(_) => self.previous().location.clone(),
            };
            return Err(self.too_deep(location, MAX_HEIGHT));
        }

        let kind = expr.kind_name();
        let id = self.arena.alloc(expr);
        self.heights.push(height);
        emit(self.logger, Level::Debug, TARGET, "built node", |r| {
            r.field("kind", kind).field("id", id.index())
        });
        Ok(id)
    }

    /// Step into a grouping or prefix operator whose opening token was just
    /// consumed
    fn descend(&mut self) -> LoxResult<()> {
        if self.depth >= MAX_DEPTH {
            let location = self.previous().location.clone();
            return Err(self.too_deep(location, MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn enter(&self, production: &'static str) {
        emit(self.logger, Level::Trace, TARGET, "enter", |r| {
            r.field("production", production)
                .field("token", self.peek().kind)
        });
    }

    /// Consume the current token if its kind is one of `kinds`
    fn match_kinds(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().kind == kind
        }
    }

    fn advance(&mut self) -> &Token {
        debug_assert!(!self.finished, "tried advancing a finished parser");
        if self.is_at_end() {
            self.finished = true;
            return self.peek();
        }
        self.current += 1;
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> LoxResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn too_deep(&self, location: SourceLocation, limit: usize) -> LoxError {
        let error = LoxError::parse_error(
            format!("Expression nested too deeply, limit is {}", limit),
            location,
        );
        emit(self.logger, Level::Error, TARGET, "parse failed", |r| {
            r.field("error", &error)
        });
        error
    }

    fn error_at_current(&self, message: &str) -> LoxError {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.lexeme),
        };
        let error = LoxError::parse_error(
            format!("{}, found {}", message, found),
            token.location.clone(),
        );
        emit(self.logger, Level::Error, TARGET, "parse failed", |r| {
            r.field("error", &error)
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::logging::{MemoryLogger, NullLogger};
    use crate::parser::AstPrinter;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        let output = Lexer::new(source, Some("expr.lox"), &NullLogger).scan();
        assert!(!output.had_error(), "{:?}", output.diagnostics);
        output.tokens
    }

    fn parse(source: &str) -> LoxResult<Ast> {
        Parser::new(tokens(source), &NullLogger).parse()
    }

    fn print(source: &str) -> String {
        AstPrinter::print(&parse(source).unwrap())
    }

    #[test]
    fn test_single_literal() {
        let ast = parse("42").unwrap();
        assert_eq!(ast.arena().len(), 1);
        assert!(matches!(ast.get(ast.root()), Expr::Literal(t) if t.literal == Literal::Number(42.0)));
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(print("1 + 2 * 3"), "( + 1.000000 ( * 2.000000 3.000000 ) )");
        assert_eq!(print("1 * 2 + 3"), "( + ( * 1.000000 2.000000 ) 3.000000 )");
    }

    #[test]
    fn test_binary_levels_are_left_associative() {
        assert_eq!(print("1 - 2 - 3"), "( - ( - 1.000000 2.000000 ) 3.000000 )");
        assert_eq!(print("8 / 4 / 2"), "( / ( / 8.000000 4.000000 ) 2.000000 )");
        assert_eq!(
            print("1 == 2 != 3"),
            "( != ( == 1.000000 2.000000 ) 3.000000 )"
        );
        assert_eq!(print("1 < 2 <= 3"), "( <= ( < 1.000000 2.000000 ) 3.000000 )");
    }

    #[test]
    fn test_precedence_ladder() {
        assert_eq!(
            print("1 + 2 > 3 == true"),
            "( == ( > ( + 1.000000 2.000000 ) 3.000000 ) true )"
        );
    }

    #[test]
    fn test_unary_is_right_associative() {
        assert_eq!(print("!!true"), "( ! ( ! true ) )");
        assert_eq!(print("--1"), "( - ( - 1.000000 ) )");
        assert_eq!(print("-1 * 2"), "( * ( - 1.000000 ) 2.000000 )");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        assert_eq!(
            print("(1 + 2) * 3"),
            "( * ( group ( + 1.000000 2.000000 ) ) 3.000000 )"
        );
    }

    #[test]
    fn test_missing_right_paren_is_fatal() {
        let err = parse("(1 + 2").unwrap_err();
        assert_eq!(
            err,
            LoxError::parse_error(
                "Expected ')' after expression, found end of input",
                SourceLocation::new(1, 7, Some("expr.lox".to_string()))
            )
        );
    }

    #[test]
    fn test_no_primary_cites_token() {
        let err = parse("1 + )").unwrap_err();
        assert_eq!(err.message(), "Expected expression, found ')'");
        assert_eq!(err.location().map(|l| l.column), Some(5));

        let err = parse("").unwrap_err();
        assert_eq!(err.message(), "Expected expression, found end of input");
    }

    #[test]
    fn test_identifier_is_not_a_primary() {
        let err = parse("foo").unwrap_err();
        assert_eq!(err.message(), "Expected expression, found 'foo'");
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        let err = parse("1 2").unwrap_err();
        assert_eq!(err.message(), "Expected end of expression, found '2'");
        assert!(parse("(1) )").is_err());
    }

    #[test]
    fn test_stream_without_eof_is_terminated() {
        let mut stream = tokens("1 + 2");
        stream.pop();
        let ast = Parser::new(stream, &NullLogger).parse().unwrap();
        assert_eq!(AstPrinter::print(&ast), "( + 1.000000 2.000000 )");

        assert!(Parser::new(Vec::new(), &NullLogger).parse().is_err());
    }

    #[test]
    fn test_children_precede_parents_in_arena() {
        let ast = parse("(1 + -2) * 3 == 4").unwrap();
        assert_eq!(ast.root().index(), ast.arena().len() - 1);

        let mut stack = vec![ast.root()];
        let mut reachable = 0;
        while let Some(id) = stack.pop() {
            reachable += 1;
            let children = match ast.get(id) {
                Expr::Literal(_) => vec![],
                Expr::Unary { right, .. } => vec![*right],
                Expr::Binary { left, right, .. } => vec![*left, *right],
                Expr::Grouping(inner) => vec![*inner],
            };
            for child in children {
                assert!(child < id);
                stack.push(child);
            }
        }
        assert_eq!(reachable, ast.arena().len());
    }

    fn nested_parens(depth: usize) -> String {
        format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_limit_is_parse_error() {
        let err = parse(&nested_parens(MAX_DEPTH + 44)).unwrap_err();
        assert!(matches!(err, LoxError::ParseError { .. }));
        assert_eq!(
            err.message(),
            format!("Expression nested too deeply, limit is {}", MAX_DEPTH)
        );
        // Cites the first parenthesis past the limit
        assert_eq!(err.location().map(|l| l.column), Some(MAX_DEPTH + 1));

        let err = parse(&format!("{}1", "-".repeat(MAX_DEPTH + 44))).unwrap_err();
        assert!(matches!(err, LoxError::ParseError { .. }));
        assert_eq!(err.location().map(|l| l.column), Some(MAX_DEPTH + 1));

        assert!(parse(&format!("{}1", "-(".repeat(MAX_DEPTH))).is_err());
    }

    #[test]
    fn test_nesting_up_to_the_limit_parses() {
        let ast = parse(&nested_parens(MAX_DEPTH)).unwrap();
        assert_eq!(ast.arena().len(), MAX_DEPTH + 1);

        let ast = parse(&format!("{}true", "!".repeat(MAX_DEPTH))).unwrap();
        assert_eq!(ast.arena().len(), MAX_DEPTH + 1);

        // Depth is released when a grouping closes
        let siblings = vec![nested_parens(MAX_DEPTH / 2); 4].join(" + ");
        assert!(parse(&siblings).is_ok());
    }

    #[test]
    fn test_tall_binary_chain_is_parse_error() {
        let chain = |terms: usize| format!("1{}", " + 1".repeat(terms - 1));
        assert!(parse(&chain(MAX_HEIGHT)).is_ok());

        let err = parse(&chain(MAX_HEIGHT + 1)).unwrap_err();
        assert_eq!(
            err.message(),
            format!("Expression nested too deeply, limit is {}", MAX_HEIGHT)
        );
        assert_eq!(err.exit_code(), crate::error::EXIT_PARSE);
    }

    #[test]
    fn test_logs_productions_and_nodes() {
        let logger = MemoryLogger::new();
        Parser::new(tokens("1 + 2"), &logger).parse().unwrap();
        let records = logger.records_for(TARGET);
        assert!(records
            .iter()
            .any(|r| r.message == "enter" && r.fields.contains(&("production", "primary".to_string()))));
        assert_eq!(
            records.iter().filter(|r| r.message == "built node").count(),
            3
        );
    }

    #[test]
    fn test_logs_parse_failure() {
        let logger = MemoryLogger::new();
        assert!(Parser::new(tokens("(1"), &logger).parse().is_err());
        assert!(logger
            .records_for(TARGET)
            .iter()
            .any(|r| r.level == Level::Error));
    }
}
