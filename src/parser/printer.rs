//! Tree printers built on `ExprVisitor`

use super::ast::{Ast, ExprId, ExprVisitor};
use crate::lexer::{Literal, Token};

/// Prefix printer that parenthesizes every operator node
///
/// `1 + 2 * 3` prints as `( + 1.000000 ( * 2.000000 3.000000 ) )`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(ast: &Ast) -> String {
        ast.walk(&mut AstPrinter)
    }
}

impl ExprVisitor for AstPrinter {
    type Output = String;

    fn visit_literal(&mut self, _ast: &Ast, token: &Token) -> String {
        match (&token.literal, token.kind) {
            (Literal::Number(n), _) => format!("{:.6}", n),
            (Literal::String(s), _) => format!("\"{}\"", s),
            (Literal::Identifier(name), _) => format!("[{}]", name),
            (Literal::Bool(b), _) => b.to_string(),
            (_, kind) => kind.symbol().to_string(),
        }
    }

    fn visit_unary(&mut self, ast: &Ast, operator: &Token, right: ExprId) -> String {
        format!("( {} {} )", operator.kind.symbol(), ast.accept(right, self))
    }

    fn visit_binary(&mut self, ast: &Ast, left: ExprId, operator: &Token, right: ExprId) -> String {
        let left = ast.accept(left, self);
        let right = ast.accept(right, self);
        format!("( {} {} {} )", operator.kind.symbol(), left, right)
    }

    fn visit_grouping(&mut self, ast: &Ast, inner: ExprId) -> String {
        format!("( group {} )", ast.accept(inner, self))
    }
}

/// Renders a tree back to infix source
///
/// Only groupings get parentheses, so re-parsing the output of a parsed tree
/// rebuilds the same shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unparser;

impl Unparser {
    pub fn unparse(ast: &Ast) -> String {
        ast.walk(&mut Unparser)
    }
}

impl ExprVisitor for Unparser {
    type Output = String;

    fn visit_literal(&mut self, _ast: &Ast, token: &Token) -> String {
        match &token.literal {
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => format!("\"{}\"", s),
            Literal::Identifier(name) => name.clone(),
            Literal::Bool(b) => b.to_string(),
            Literal::Keyword | Literal::None => token
                .kind
                .keyword_spelling()
                .unwrap_or_else(|| token.kind.symbol())
                .to_string(),
        }
    }

    fn visit_unary(&mut self, ast: &Ast, operator: &Token, right: ExprId) -> String {
        format!("{}{}", operator.kind.symbol(), ast.accept(right, self))
    }

    fn visit_binary(&mut self, ast: &Ast, left: ExprId, operator: &Token, right: ExprId) -> String {
        let left = ast.accept(left, self);
        let right = ast.accept(right, self);
        format!("{} {} {}", left, operator.kind.symbol(), right)
    }

    fn visit_grouping(&mut self, ast: &Ast, inner: ExprId) -> String {
        format!("({})", ast.accept(inner, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::logging::NullLogger;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Ast {
        let output = Lexer::new(source, None, &NullLogger).scan();
        assert!(!output.had_error(), "{:?}", output.diagnostics);
        Parser::new(output.tokens, &NullLogger).parse().unwrap()
    }

    #[test]
    fn test_precedence_print() {
        assert_eq!(
            AstPrinter::print(&parse("1 + 2 * 3")),
            "( + 1.000000 ( * 2.000000 3.000000 ) )"
        );
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(AstPrinter::print(&parse("\"hi there\"")), "\"hi there\"");
        assert_eq!(AstPrinter::print(&parse("true")), "true");
        assert_eq!(AstPrinter::print(&parse("false")), "false");
        assert_eq!(AstPrinter::print(&parse("nil")), "NIL");
        assert_eq!(AstPrinter::print(&parse("0.5")), "0.500000");
    }

    #[test]
    fn test_unary_and_grouping() {
        assert_eq!(
            AstPrinter::print(&parse("!(1 == -2)")),
            "( ! ( group ( == 1.000000 ( - 2.000000 ) ) ) )"
        );
    }

    #[test]
    fn test_unparse_keeps_source_shape() {
        assert_eq!(Unparser::unparse(&parse("1+2*3")), "1 + 2 * 3");
        assert_eq!(Unparser::unparse(&parse("-(1.50 - 2) >= !nil")), "-(1.5 - 2) >= !nil");
        assert_eq!(Unparser::unparse(&parse("--1")), "--1");
    }

    #[test]
    fn test_reparse_is_isomorphic() {
        let sources = [
            "1 + 2 * 3",
            "(1 + 2) * 3",
            "1 - 2 - 3",
            "1 - (2 - 3)",
            "!!true == false",
            "-(-1) / 4 < 2 != nil",
            "\"a\" == \"b\" == (1 >= 0.25)",
            "((((7))))",
        ];
        for source in sources {
            let first = parse(source);
            let second = parse(&Unparser::unparse(&first));
            assert_eq!(AstPrinter::print(&first), AstPrinter::print(&second));
            assert_eq!(first.arena().len(), second.arena().len());
        }
    }

    #[test]
    fn test_deepest_accepted_tree_prints() {
        let depth = crate::parser::MAX_DEPTH;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let ast = parse(&source);

        let printed = AstPrinter::print(&ast);
        assert_eq!(printed.matches("( group").count(), depth);
        assert_eq!(Unparser::unparse(&ast), source);
    }
}
