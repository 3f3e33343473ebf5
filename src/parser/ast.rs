//! Abstract Syntax Tree definitions
//!
//! Nodes live in an `ExprArena` owned by the `Ast`; children are referred to
//! by `ExprId` index. A node can only point at nodes allocated before it, so
//! the structure is always a tree and dropping the `Ast` frees every node at
//! once.

use crate::lexer::Token;

/// Index of a node in its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number, string, `true`, `false` or `nil`
    Literal(Token),

    /// Prefix operation: `-x`, `!x`
    Unary { operator: Token, right: ExprId },

    /// Infix operation
    Binary {
        left: ExprId,
        operator: Token,
        right: ExprId,
    },

    /// Parenthesized expression
    Grouping(ExprId),
}

impl Expr {
    /// Node kind name for logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Unary { .. } => "unary",
            Expr::Binary { .. } => "binary",
            Expr::Grouping(_) => "grouping",
        }
    }

    fn children(&self) -> impl Iterator<Item = ExprId> {
        let (a, b) = match self {
            Expr::Literal(_) => (None, None),
            Expr::Unary { right, .. } => (Some(*right), None),
            Expr::Binary { left, right, .. } => (Some(*left), Some(*right)),
            Expr::Grouping(inner) => (Some(*inner), None),
        };
        a.into_iter().chain(b)
    }
}

/// Append-only storage for the nodes of one parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node whose children are already in the arena
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        debug_assert!(
            expr.children().all(|child| child.0 < self.nodes.len()),
            "node refers to a child that was not built yet"
        );
        self.nodes.push(expr);
        ExprId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Root of a parsed expression together with the arena that owns it
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    arena: ExprArena,
    root: ExprId,
}

impl Ast {
    pub fn new(arena: ExprArena, root: ExprId) -> Self {
        debug_assert!(root.0 < arena.len());
        Self { arena, root }
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        self.arena.get(id)
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    /// Dispatch `id` to the matching visitor method
    pub fn accept<V: ExprVisitor + ?Sized>(&self, id: ExprId, visitor: &mut V) -> V::Output {
        match self.get(id) {
            Expr::Literal(token) => visitor.visit_literal(self, token),
            Expr::Unary { operator, right } => visitor.visit_unary(self, operator, *right),
            Expr::Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary(self, *left, operator, *right),
            Expr::Grouping(inner) => visitor.visit_grouping(self, *inner),
        }
    }

    /// Visit the whole tree from the root
    pub fn walk<V: ExprVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        self.accept(self.root, visitor)
    }
}

/// One operation per node kind; implementors recurse through `Ast::accept`
pub trait ExprVisitor {
    type Output;

    fn visit_literal(&mut self, ast: &Ast, token: &Token) -> Self::Output;

    fn visit_unary(&mut self, ast: &Ast, operator: &Token, right: ExprId) -> Self::Output;

    fn visit_binary(
        &mut self,
        ast: &Ast,
        left: ExprId,
        operator: &Token,
        right: ExprId,
    ) -> Self::Output;

    fn visit_grouping(&mut self, ast: &Ast, inner: ExprId) -> Self::Output;
}
