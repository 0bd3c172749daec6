//! Lexer for structural lines using logos

use std::fmt;

use logos::Logos;

use crate::error::LexError;
use crate::parser::ast::Span;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"\s+")]
pub enum Token {
    // Operators
    #[token("+")]
    Plus,
    #[token("/")]
    Slash,

    // Delimiters
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,

    // Entity names start with a letter
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),
}

impl Token {
    /// Source text of the token
    pub fn text(&self) -> &str {
        match self {
            Token::Plus => "+",
            Token::Slash => "/",
            Token::BracketOpen => "[",
            Token::BracketClose => "]",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::Name(name) => name,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Lex one line into tokens with spans, stopping at the first invalid character
pub fn tokenize(input: &str) -> Result<Vec<(Token, Span)>, LexError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let character = input[span.start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(LexError::InvalidCharacter {
                    character,
                    offset: span.start,
                });
            }
        }
    }
    Ok(tokens)
}
