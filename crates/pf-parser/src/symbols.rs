use std::collections::BTreeMap;

use pf_core::{CardSymbol, ImportError, SymbolCatalog};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCatalog {
    /// The provider's `{"object": "list", "data": [...]}` response.
    Wrapped { data: Vec<CardSymbol> },
    /// Pre-keyed map, e.g. `{"W": {...}}`.
    Map(BTreeMap<String, CardSymbol>),
    List(Vec<CardSymbol>),
}

fn key_of(symbol: &str) -> String {
    symbol
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(symbol)
        .to_string()
}

/// Parse symbol metadata into a catalog keyed by token contents (`"W"`, `"2/W"`).
pub fn parse_symbol_catalog(json: &str) -> Result<SymbolCatalog, ImportError> {
    let raw: RawCatalog =
        serde_json::from_str(json).map_err(|err| ImportError::Json(err.to_string()))?;
    let symbols = match raw {
        RawCatalog::Map(map) => map
            .into_iter()
            .map(|(key, symbol)| (key_of(&key), symbol))
            .collect(),
        RawCatalog::Wrapped { data: list } | RawCatalog::List(list) => list
            .into_iter()
            .map(|symbol| (key_of(&symbol.symbol), symbol))
            .collect(),
    };
    Ok(SymbolCatalog::new(symbols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_form_is_keyed_without_braces() {
        let json = r#"{"object": "list", "data": [
            {"symbol": "{W}", "svg_uri": "https://svgs.scryfall.io/card-symbols/W.svg", "colors": ["W"]},
            {"symbol": "{2/W}", "svg_uri": "https://svgs.scryfall.io/card-symbols/2W.svg", "hybrid": true}
        ]}"#;
        let catalog = parse_symbol_catalog(json).expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.svg_uri("W"),
            Some("https://svgs.scryfall.io/card-symbols/W.svg")
        );
        assert!(catalog.get("2/W").is_some_and(|symbol| symbol.hybrid));
    }

    #[test]
    fn map_form_is_accepted() {
        let json = r#"{"{T}": {"symbol": "{T}", "svg_uri": "t.svg"}, "U": {"symbol": "{U}", "svg_uri": ""}}"#;
        let catalog = parse_symbol_catalog(json).expect("catalog");
        assert_eq!(catalog.svg_uri("T"), Some("t.svg"));
        assert_eq!(catalog.svg_uri("U"), None);
    }

    #[test]
    fn bare_list_is_accepted() {
        let catalog = parse_symbol_catalog(r#"[{"symbol": "{G}", "svg_uri": "g.svg"}]"#)
            .expect("catalog");
        assert_eq!(catalog.svg_uri("G"), Some("g.svg"));
    }
}
