#![forbid(unsafe_code)]

//! Parsers for the text formats the composer consumes: mana costs and oracle
//! text, provider card records, and symbol metadata.

mod card;
mod mana;
mod symbols;

pub use card::{card_from_value, parse_card_json, parse_card_list};
pub use mana::{classify_symbol, parse_mana_string, parse_oracle_text};
pub use symbols::parse_symbol_catalog;
