//! Token definitions for the Lox language
//!
//! `TokenKind` doubles as the token catalog: every kind knows its display
//! name, its source symbol, and (for keywords) its spelling.

use crate::error::SourceLocation;
use std::fmt;

/// Byte range of a lexeme in the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// A token in the Lox language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
    pub location: SourceLocation,
    pub literal: Literal,
}

impl Token {
    /// Create a new token
    pub fn new(
        kind: TokenKind,
        lexeme: String,
        span: Span,
        location: SourceLocation,
        literal: Literal,
    ) -> Self {
        Self {
            kind,
            lexeme,
            span,
            location,
            literal,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

/// Renders the `tokenize` line: the kind name, then the payload if any
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        match &self.literal {
            Literal::None | Literal::Keyword => Ok(()),
            Literal::Identifier(name) => write!(f, " {}", name),
            Literal::String(s) => write!(f, " \"{}\"", s),
            Literal::Number(n) => write!(f, " {:.6}", n),
            Literal::Bool(b) => write!(f, " {}", b),
        }
    }
}

/// Literal payload attached to a token
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Identifier(String),
    Keyword,
    String(String),
    Number(f64),
    Bool(bool),
}

/// Token kinds in the Lox language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    /// `//` to end of line; the scanner drops it
    Comment,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    /// Stands in for a lexeme that raised a diagnostic; never emitted
    Error,
    Eof,
}

const KEYWORDS: [(&str, TokenKind); 16] = [
    ("and", TokenKind::And),
    ("class", TokenKind::Class),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("fun", TokenKind::Fun),
    ("if", TokenKind::If),
    ("nil", TokenKind::Nil),
    ("or", TokenKind::Or),
    ("print", TokenKind::Print),
    ("return", TokenKind::Return),
    ("super", TokenKind::Super),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
];

impl TokenKind {
    /// Look up a whole word in the keyword table
    ///
    /// Matching is on the exact spelling, so `classify` is not `class`.
    pub fn keyword(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == word)
            .map(|(_, kind)| *kind)
    }

    /// Source spelling of a keyword kind
    pub fn keyword_spelling(&self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(spelling, _)| *spelling)
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword_spelling().is_some()
    }

    /// Upper-case display name used by `tokenize`
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftParen => "LEFT_PAREN",
            Self::RightParen => "RIGHT_PAREN",
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::Comma => "COMMA",
            Self::Comment => "COMMENT",
            Self::Dot => "DOT",
            Self::Minus => "MINUS",
            Self::Plus => "PLUS",
            Self::Semicolon => "SEMICOLON",
            Self::Slash => "SLASH",
            Self::Star => "STAR",
            Self::Bang => "BANG",
            Self::BangEqual => "BANG_EQUAL",
            Self::Equal => "EQUAL",
            Self::EqualEqual => "EQUAL_EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::Less => "LESS",
            Self::LessEqual => "LESS_EQUAL",
            Self::Identifier => "IDENTIFIER",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::And => "AND",
            Self::Class => "CLASS",
            Self::Else => "ELSE",
            Self::False => "FALSE",
            Self::For => "FOR",
            Self::Fun => "FUN",
            Self::If => "IF",
            Self::Nil => "NIL",
            Self::Or => "OR",
            Self::Print => "PRINT",
            Self::Return => "RETURN",
            Self::Super => "SUPER",
            Self::This => "THIS",
            Self::True => "TRUE",
            Self::Var => "VAR",
            Self::While => "WHILE",
            Self::Error => "ERROR",
            Self::Eof => "EOF",
        }
    }

    /// Source symbol for operators and punctuation
    ///
    /// Literal kinds have a quoted placeholder, keywords their upper-case name.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Comment => "// ... \\n",
            Self::Dot => ".",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Semicolon => ";",
            Self::Slash => "/",
            Self::Star => "*",
            Self::Bang => "!",
            Self::BangEqual => "!=",
            Self::Equal => "=",
            Self::EqualEqual => "==",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Identifier => "'IDENTIFIER'",
            Self::String => "'STRING'",
            Self::Number => "NUMBER",
            Self::Error => "ERROR",
            Self::Eof => "",
            keyword => keyword.name(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
