//! Parse errors

use crate::lexer::LexError;
use crate::token::{Span, Token};
use std::fmt;

/// Error raised while parsing one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Rendered description, without position
    pub message: String,
    /// Hint shown below the message
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: Vec<Token>, found: Token },
    UnexpectedEof { expected: Vec<Token> },
    InvalidSyntax { reason: String },
    /// A `{`, `(` or `<` that is never closed
    UnclosedDelimiter { open: Token },
    /// Tokenization failed before parsing started
    Lex(LexError),
    /// Type nesting beyond the parser's depth limit
    TooDeep { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.span.line, self.span.column, self.message)?;
        match &self.suggestion {
            Some(hint) => write!(f, " (hint: {})", hint),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let span = match &err {
            LexError::UnexpectedCharacter { span, .. } | LexError::Unterminated { span } => *span,
        };
        ParseError::new(ParseErrorKind::Lex(err.clone()), span, err.to_string())
    }
}

fn quoted(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|tok| format!("'{}'", tok))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ParseError {
    fn new(kind: ParseErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            suggestion: None,
        }
    }

    pub fn unexpected_token(expected: Vec<Token>, found: Token, span: Span) -> Self {
        let message = match expected.as_slice() {
            [] => format!("unexpected '{}'", found),
            [_] => format!("expected {}, found '{}'", quoted(&expected), found),
            _ => format!("expected one of {}, found '{}'", quoted(&expected), found),
        };
        ParseError::new(ParseErrorKind::UnexpectedToken { expected, found }, span, message)
    }

    pub fn unexpected_eof(expected: Vec<Token>, span: Span) -> Self {
        let message = if expected.is_empty() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected end of input, expected {}", quoted(&expected))
        };
        ParseError::new(ParseErrorKind::UnexpectedEof { expected }, span, message)
    }

    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        let message = reason.clone();
        ParseError::new(ParseErrorKind::InvalidSyntax { reason }, span, message)
    }

    pub fn unclosed_delimiter(open: Token, span: Span) -> Self {
        let message = format!("'{}' is never closed", open);
        ParseError::new(ParseErrorKind::UnclosedDelimiter { open }, span, message)
    }

    pub fn too_deep(limit: usize, span: Span) -> Self {
        let message = format!("type nesting deeper than {}", limit);
        ParseError::new(ParseErrorKind::TooDeep { limit }, span, message)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
