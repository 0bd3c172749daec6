//! Parser implementation using chumsky
//!
//! The grammar, from loosest to tightest binding:
//!
//! ```text
//! column  := row ('/' row)*
//! row     := term ('+' term | term)*      -- bare juxtaposition only inside [...]
//! term    := primary ('[' column ']')*
//! primary := NAME | '(' column ')'
//! ```
//!
//! Chumsky produces a loose syntax tree; [`lower`] then builds the final
//! [`Expression`], collapsing groups and rejecting `[...]` on anything but a
//! plain entity.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::{ParseError, SyntaxError};
use crate::parser::ast::{Direction, Expression, Span};
use crate::parser::lexer::{self, Token};

/// Loose parse result before grouping rules are applied
#[derive(Debug, Clone)]
enum Syntax {
    Name(String),
    Contained {
        target: Box<Syntax>,
        content: Box<Syntax>,
        span: Span,
    },
    Sequence(Direction, Vec<Syntax>),
}

/// Tokenize and parse one structural line
pub fn parse_structure(input: &str) -> Result<Expression, SyntaxError> {
    let tokens = lexer::tokenize(input)?;
    Ok(parse_tokens(tokens, input.len())?)
}

/// Parse a token sequence into an expression
///
/// `len` is the length of the text the tokens came from and positions the
/// end-of-input error.
pub fn parse_tokens(tokens: Vec<(Token, Span)>, len: usize) -> Result<Expression, ParseError> {
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    let syntax = expression_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(ParseError::from)
                .unwrap_or(ParseError::UnexpectedEnd {
                    span: len..len,
                    expected: Vec::new(),
                })
        })?;

    lower(syntax)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> Span {
    e.start()..e.end()
}

/// Top-level expression: bare juxtaposition is rejected here, but accepted
/// anywhere inside brackets
fn expression_parser<'a, I>() -> impl Parser<'a, I, Syntax, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let content = recursive(|content| column(content.clone(), content, true));
    recursive(|nested| column(nested, content.clone(), false))
}

/// One precedence ladder.
///
/// `nested` parses parenthesized sub-expressions (same juxtaposition rule as
/// this level), `content` parses bracket content.
fn column<'a, I, P, C>(
    nested: P,
    content: C,
    implicit: bool,
) -> impl Parser<'a, I, Syntax, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    P: Parser<'a, I, Syntax, extra::Err<Rich<'a, Token>>> + Clone + 'a,
    C: Parser<'a, I, Syntax, extra::Err<Rich<'a, Token>>> + Clone + 'a,
{
    let name = select! {
        Token::Name(name) => Syntax::Name(name),
    };

    let primary = name.or(nested.delimited_by(just(Token::ParenOpen), just(Token::ParenClose)));

    let term = primary
        .then(
            content
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map_with(|(target, suffixes), e| {
            let span = span_range(&e.span());
            suffixes
                .into_iter()
                .fold(target, |target, content| Syntax::Contained {
                    target: Box::new(target),
                    content: Box::new(content),
                    span: span.clone(),
                })
        });

    let explicit_join = just(Token::Plus).ignore_then(term.clone());
    let join = if implicit {
        explicit_join.or(term.clone()).boxed()
    } else {
        explicit_join.boxed()
    };

    let row = term
        .then(join.repeated().collect::<Vec<_>>())
        .map(|(first, rest)| {
            let mut items = Vec::with_capacity(rest.len() + 1);
            items.push(first);
            items.extend(rest);
            Syntax::Sequence(Direction::Row, items)
        });

    row.separated_by(just(Token::Slash))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|rows| Syntax::Sequence(Direction::Column, rows))
}

/// Apply grouping and container rules to the loose syntax tree
fn lower(syntax: Syntax) -> Result<Expression, ParseError> {
    match syntax {
        Syntax::Name(name) => Ok(Expression::entity(name)),
        Syntax::Contained {
            target,
            content,
            span,
        } => match lower(*target)? {
            Expression::Entity { name } => Ok(Expression::container(name, lower(*content)?)),
            _ => Err(ParseError::InvalidContainer { span }),
        },
        Syntax::Sequence(direction, items) => {
            let items = items
                .into_iter()
                .map(lower)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::group(direction, items))
        }
    }
}
