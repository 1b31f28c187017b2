//! Brace-token grammar shared by mana costs and oracle text.
//!
//! A token is `{`, one or more characters other than `}`, then `}`. Any other
//! character, including a `{` that is never closed, is literal text.

use chumsky::prelude::*;
use pf_core::{ManaSymbolKind, OraclePiece, ParsedManaSymbol};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk<'a> {
    /// Token contents without the braces.
    Token(&'a str),
    Literal(&'a str),
}

fn token<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> + Clone {
    just('{')
        .ignore_then(any().filter(|c: &char| *c != '}').repeated().at_least(1).to_slice())
        .then_ignore(just('}'))
}

fn chunks<'a>() -> impl Parser<'a, &'a str, Vec<Chunk<'a>>, extra::Err<Rich<'a, char>>> {
    let literal = any()
        .and_is(token().not())
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Chunk::Literal);

    choice((token().map(Chunk::Token), literal))
        .repeated()
        .collect()
}

fn scan(text: &str) -> Vec<Chunk<'_>> {
    let (output, errors) = chunks().parse(text).into_output_errors();
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "mana grammar reported errors");
    }
    output.unwrap_or_default()
}

/// Classify the contents of one token. Unknown contents yield `None`.
#[must_use]
pub fn classify_symbol(inner: &str) -> Option<ParsedManaSymbol> {
    let kind = match inner {
        "W" | "U" | "B" | "R" | "G" | "C" => ManaSymbolKind::Mana,
        "T" => ManaSymbolKind::Tap,
        "X" => ManaSymbolKind::Generic,
        digits if digits.chars().all(|c| c.is_ascii_digit()) => ManaSymbolKind::Generic,
        hybrid if hybrid.contains('/') => ManaSymbolKind::Hybrid,
        phyrexian if phyrexian.contains('P') => ManaSymbolKind::Phyrexian,
        _ => return None,
    };
    Some(ParsedManaSymbol::new(kind, inner))
}

/// Every recognized symbol of a cost string, in order.
#[must_use]
pub fn parse_mana_string(cost: &str) -> Vec<ParsedManaSymbol> {
    scan(cost)
        .into_iter()
        .filter_map(|chunk| match chunk {
            Chunk::Token(inner) => classify_symbol(inner),
            Chunk::Literal(_) => None,
        })
        .collect()
}

/// Oracle text split into literal runs and symbols. Unrecognized tokens are
/// removed without merging the text around them.
#[must_use]
pub fn parse_oracle_text(text: &str) -> Vec<OraclePiece> {
    scan(text)
        .into_iter()
        .filter_map(|chunk| match chunk {
            Chunk::Token(inner) => classify_symbol(inner).map(OraclePiece::Symbol),
            Chunk::Literal(literal) => Some(OraclePiece::Text(literal.to_string())),
        })
        .collect()
}
