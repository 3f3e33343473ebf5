//! Error handling and diagnostics for the Lox front end
//!
//! Lexer errors are batched: the scanner records them and keeps going.
//! Parser errors are fatal: the first one aborts the parse and no tree is
//! produced.

use std::fmt;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for front end operations
pub type LoxResult<T> = Result<T, LoxError>;

/// Process exit code for malformed command lines
pub const EXIT_USAGE: i32 = 64;
/// Process exit code when the scanner reported errors
pub const EXIT_LEXER: i32 = 1;
/// Process exit code for a failed parse
pub const EXIT_PARSE: i32 = 2;
/// Process exit code when the input could not be read
pub const EXIT_IO: i32 = 74;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename
    pub filename: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize, filename: Option<String>) -> Self {
        Self {
            line,
            column,
            filename,
        }
    }

    /// Create a source location without a filename
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, None)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref filename) = self.filename {
            write!(f, "{}:{}:{}", filename, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Main error type for the Lox front end
#[derive(Debug, Clone, PartialEq)]
pub enum LoxError {
    /// Unrecognised character; the scanner skips it and continues
    LexerError {
        message: String,
        location: SourceLocation,
    },
    /// A string literal ran into the end of input
    UnterminatedString {
        location: SourceLocation,
    },
    /// A numeric literal that has no finite `f64` value
    NumberFormat {
        lexeme: String,
        location: SourceLocation,
    },
    /// Missing token or no matching production; always fatal
    ParseError {
        message: String,
        location: SourceLocation,
    },
    /// The input file could not be read
    IoError {
        message: String,
    },
    /// Malformed command line
    UsageError {
        message: String,
    },
}

impl LoxError {
    /// Create a new lexer error
    pub fn lexer_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::LexerError {
            message: message.into(),
            location,
        }
    }

    /// Create an unterminated string error
    pub fn unterminated_string(location: SourceLocation) -> Self {
        Self::UnterminatedString { location }
    }

    /// Create a number format error for the captured lexeme
    pub fn number_format(lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self::NumberFormat {
            lexeme: lexeme.into(),
            location,
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }

    /// Create a new I/O error
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }

    /// Create a new usage error
    pub fn usage_error(message: impl Into<String>) -> Self {
        Self::UsageError {
            message: message.into(),
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::LexerError { .. } => "Lexer Error",
            Self::UnterminatedString { .. } => "Lexer Error",
            Self::NumberFormat { .. } => "Lexer Error",
            Self::ParseError { .. } => "Parse Error",
            Self::IoError { .. } => "I/O Error",
            Self::UsageError { .. } => "Usage Error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::UnterminatedString { .. } => "Unterminated string".to_string(),
            Self::NumberFormat { lexeme, .. } => {
                format!("Number literal '{}' is out of range", lexeme)
            }
            Self::LexerError { message, .. }
            | Self::ParseError { message, .. }
            | Self::IoError { message }
            | Self::UsageError { message } => message.clone(),
        }
    }

    /// Get the source location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::LexerError { location, .. }
            | Self::UnterminatedString { location }
            | Self::NumberFormat { location, .. }
            | Self::ParseError { location, .. } => Some(location),
            Self::IoError { .. } | Self::UsageError { .. } => None,
        }
    }

    /// Whether this error was raised while scanning
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            Self::LexerError { .. } | Self::UnterminatedString { .. } | Self::NumberFormat { .. }
        )
    }

    /// Process exit code for this kind of failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LexerError { .. } | Self::UnterminatedString { .. } | Self::NumberFormat { .. } => {
                EXIT_LEXER
            }
            Self::ParseError { .. } => EXIT_PARSE,
            Self::IoError { .. } => EXIT_IO,
            Self::UsageError { .. } => EXIT_USAGE,
        }
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = self.location() {
            write!(f, "{}: {} at {}", self.kind(), self.message(), location)
        } else {
            write!(f, "{}: {}", self.kind(), self.message())
        }
    }
}

impl std::error::Error for LoxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::at(10, 5);
        assert_eq!(loc.to_string(), "10:5");

        let loc_with_file = SourceLocation::new(10, 5, Some("test.lox".to_string()));
        assert_eq!(loc_with_file.to_string(), "test.lox:10:5");
    }

    #[test]
    fn test_error_creation() {
        let loc = SourceLocation::at(1, 1);
        let err = LoxError::lexer_error("Unexpected character: @", loc.clone());

        assert_eq!(err.kind(), "Lexer Error");
        assert_eq!(err.message(), "Unexpected character: @");
        assert_eq!(err.location(), Some(&loc));
        assert!(err.is_lexical());
    }

    #[test]
    fn test_error_display() {
        let loc = SourceLocation::at(5, 10);
        let err = LoxError::parse_error("Expected ')' after expression", loc);

        assert_eq!(
            err.to_string(),
            "Parse Error: Expected ')' after expression at 5:10"
        );
    }

    #[test]
    fn test_derived_messages() {
        let err = LoxError::unterminated_string(SourceLocation::at(2, 3));
        assert_eq!(err.to_string(), "Lexer Error: Unterminated string at 2:3");

        let err = LoxError::number_format("9999", SourceLocation::at(1, 1));
        assert!(err.message().contains("'9999'"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let loc = SourceLocation::at(1, 1);
        let codes = [
            LoxError::lexer_error("x", loc.clone()).exit_code(),
            LoxError::parse_error("x", loc).exit_code(),
            LoxError::io_error("x").exit_code(),
            LoxError::usage_error("x").exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
