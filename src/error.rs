//! Error types for tokenizing and parsing structural lines

use chumsky::error::{Rich, RichPattern};
use thiserror::Error;

use crate::parser::ast::Span;
use crate::parser::lexer::Token;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid character '{character}' at {offset}")]
    InvalidCharacter { character: char, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::InvalidCharacter { offset, .. } => *offset,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token '{found}' at {}", .span.start)]
    UnexpectedToken {
        found: String,
        span: Span,
        expected: Vec<String>,
    },

    #[error("unexpected end of input")]
    UnexpectedEnd { span: Span, expected: Vec<String> },

    #[error("trailing input: unexpected token '{found}' at {}", .span.start)]
    TrailingInput { found: String, span: Span },

    /// `[...]` applied to a group or to an entity that already has content
    #[error("only an entity may take inline content")]
    InvalidContainer { span: Span },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEnd { span, .. }
            | ParseError::TrailingInput { span, .. }
            | ParseError::InvalidContainer { span } => span,
        }
    }

    /// Human-readable descriptions of what would have been accepted
    pub fn expected(&self) -> &[String] {
        match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnexpectedEnd { expected, .. } => expected,
            _ => &[],
        }
    }
}

impl<'a> From<Rich<'a, Token>> for ParseError {
    fn from(err: Rich<'a, Token>) -> Self {
        let span = err.span().into_range();

        // End of input being acceptable here means a full expression was
        // already parsed and something follows it
        let end_allowed = err
            .expected()
            .any(|pattern| matches!(pattern, RichPattern::EndOfInput));

        let expected: Vec<String> = err
            .expected()
            .filter_map(|pattern| match pattern {
                RichPattern::Token(tok) => Some(format!("'{}'", tok.text())),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();

        match err.found() {
            None => ParseError::UnexpectedEnd { span, expected },
            Some(tok) if end_allowed => ParseError::TrailingInput {
                found: tok.to_string(),
                span,
            },
            Some(tok) => ParseError::UnexpectedToken {
                found: tok.to_string(),
                span,
                expected,
            },
        }
    }
}

/// Failure to turn one structural line into an expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// Byte offset of the failure within the parsed text
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::Lex(e) => e.offset(),
            SyntaxError::Parse(e) => e.span().start,
        }
    }
}
