//! Lexer/Scanner implementation for the Lox language
//!
//! Converts source text into tokens using maximal munch. Bad characters do not
//! stop the scan: each one is recorded as a diagnostic and scanning resumes
//! with the next character.
//!
//! Comments and bad lexemes still become `Comment` and `Error` tokens, but
//! `add_token` drops them, so neither kind ever reaches the output stream.

use crate::error::{LoxError, SourceLocation};
use crate::logging::{emit, Level, Logger};
use super::token::{Literal, Span, Token, TokenKind};

const TARGET: &str = "lexer";

/// Tokens produced by a scan plus every diagnostic raised on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput {
    /// Emitted tokens; always ends with exactly one `Eof`
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LoxError>,
}

impl ScanOutput {
    /// Aggregate error flag for the whole stream
    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Lexer for Lox source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    tokens: Vec<Token>,
    diagnostics: Vec<LoxError>,
    // Position of the first char of the lexeme being scanned
    start_offset: usize,
    start_line: usize,
    start_column: usize,
    // Char index and byte offset of the next char
    current: usize,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
    filename: Option<String>,
    logger: &'a dyn Logger,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(source: &'a str, filename: Option<&str>, logger: &'a dyn Logger) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            start_offset: 0,
            start_line: 1,
            start_column: 1,
            current: 0,
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
            filename: filename.map(|s| s.to_string()),
            logger,
        }
    }

    /// Scan the whole source
    pub fn scan(mut self) -> ScanOutput {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            self.start_offset = self.offset;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token();
        }

        self.finished = true;
        self.start_offset = self.offset;
        self.start_line = self.line;
        self.start_column = self.column;
        self.add_token(TokenKind::Eof, Literal::None);

        emit(self.logger, Level::Debug, TARGET, "scan finished", |r| {
            r.field("tokens", self.tokens.len())
                .field("errors", self.diagnostics.len())
        });

        ScanOutput {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenKind::LeftParen, Literal::None),
            ')' => self.add_token(TokenKind::RightParen, Literal::None),
            '{' => self.add_token(TokenKind::LeftBrace, Literal::None),
            '}' => self.add_token(TokenKind::RightBrace, Literal::None),
            ',' => self.add_token(TokenKind::Comma, Literal::None),
            '.' => self.add_token(TokenKind::Dot, Literal::None),
            '-' => self.add_token(TokenKind::Minus, Literal::None),
            '+' => self.add_token(TokenKind::Plus, Literal::None),
            ';' => self.add_token(TokenKind::Semicolon, Literal::None),
            '*' => self.add_token(TokenKind::Star, Literal::None),

            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                    self.add_token(TokenKind::Comment, Literal::None)
                } else {
                    self.add_token(TokenKind::Slash, Literal::None)
                }
            }

            '!' => self.one_or_two(TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.one_or_two(TokenKind::EqualEqual, TokenKind::Equal),
            '>' => self.one_or_two(TokenKind::GreaterEqual, TokenKind::Greater),
            '<' => self.one_or_two(TokenKind::LessEqual, TokenKind::Less),

            '"' => self.scan_string(),

            c if c.is_ascii_digit() => self.scan_number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

            _ => {
                let location = self.start_location();
                self.report(LoxError::lexer_error(
                    format!("Unexpected character: {}", c),
                    location,
                ));
            }
        }
    }

    /// `two` when the next char is `=`, otherwise `one`
    fn one_or_two(&mut self, two: TokenKind, one: TokenKind) {
        if self.match_char('=') {
            self.add_token(two, Literal::None)
        } else {
            self.add_token(one, Literal::None)
        }
    }

    fn scan_string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            let location = self.start_location();
            self.report(LoxError::unterminated_string(location));
            return;
        }

        // Closing quote
        self.advance();

        let value = self.source[self.start_offset + 1..self.offset - 1].to_string();
        self.add_token(TokenKind::String, Literal::String(value))
    }

    fn scan_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A dot only belongs to the number when a digit follows it
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let source = self.source;
        let lexeme = &source[self.start_offset..self.offset];
        match lexeme.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.add_token(TokenKind::Number, Literal::Number(value))
            }
            _ => {
                let err = LoxError::number_format(lexeme, self.start_location());
                self.report(err);
            }
        }
    }

    fn scan_identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let source = self.source;
        let text = &source[self.start_offset..self.offset];
        let (kind, literal) = match TokenKind::keyword(text) {
            Some(TokenKind::True) => (TokenKind::True, Literal::Bool(true)),
            Some(TokenKind::False) => (TokenKind::False, Literal::Bool(false)),
            Some(keyword) => (keyword, Literal::Keyword),
            None => (TokenKind::Identifier, Literal::Identifier(text.to_string())),
        };

        self.add_token(kind, literal)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c') {
            self.advance();
        }
    }

    fn add_token(&mut self, kind: TokenKind, literal: Literal) {
        let lexeme = self.source[self.start_offset..self.offset].to_string();
        let span = Span::new(self.start_offset, self.offset - self.start_offset);
        let token = Token::new(kind, lexeme, span, self.start_location(), literal);

        if matches!(kind, TokenKind::Comment | TokenKind::Error) {
            emit(self.logger, Level::Trace, TARGET, "dropped token", |r| {
                r.field("kind", kind)
                    .field("line", token.location.line)
                    .field("column", token.location.column)
            });
            return;
        }

        emit(self.logger, Level::Trace, TARGET, "token", |r| {
            r.field("kind", kind)
                .field("line", token.location.line)
                .field("column", token.location.column)
        });

        self.tokens.push(token);
    }

    /// Record a diagnostic for the lexeme just consumed
    fn report(&mut self, error: LoxError) {
        emit(self.logger, Level::Warn, TARGET, "lexical error", |r| {
            r.field("error", &error)
        });
        self.diagnostics.push(error);
        self.add_token(TokenKind::Error, Literal::None);
    }

    fn advance(&mut self) -> char {
        debug_assert!(!self.finished, "tried advancing a finished lexer");
        let c = self.chars[self.current];
        self.current += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn start_location(&self) -> SourceLocation {
        SourceLocation::new(self.start_line, self.start_column, self.filename.clone())
    }
}
