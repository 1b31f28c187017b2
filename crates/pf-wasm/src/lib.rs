#![forbid(unsafe_code)]

//! Browser binding for the proxy composer.
//!
//! [`Composer`] drives a page `<canvas>` through the preview session. The
//! free functions expose the pure pieces (mana parsing, canvas geometry,
//! card lookup) and `init` sets defaults for every composer created later.

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod canvas;
mod composer;
mod config;
#[cfg(target_arch = "wasm32")]
mod studio;

pub use composer::Composer;
#[cfg(target_arch = "wasm32")]
pub use studio::{Backgrounds, LayoutStudio};

use pf_core::geometry::CanvasDimensions;
use pf_core::{FieldKey, ParsedManaSymbol};
use pf_parser::parse_mana_string;
use pf_render_canvas::export_file_name;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

use crate::config::{
    ComposerConfigOverrides, merge_runtime_config, read_runtime_config, write_runtime_config,
};

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

/// Leave a trace of a failed browser call and carry on without its result.
#[cfg(any(test, target_arch = "wasm32"))]
fn traced<T, E: std::fmt::Debug>(operation: &'static str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::trace!(operation, error = ?err, "browser call failed");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn js_detail(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("non-string JS error: {value:?}"))
}

fn parse_js_value_or_default<T>(value: Option<JsValue>) -> Result<T, JsValue>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(raw) if raw.is_undefined() || raw.is_null() => Ok(T::default()),
        Some(raw) => {
            #[cfg(target_arch = "wasm32")]
            {
                serde_wasm_bindgen::from_value(raw)
                    .map_err(|err| js_error(format!("invalid argument: {err}")))
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = raw;
                Ok(T::default())
            }
        }
    }
}

fn to_js_value<T>(value: &T) -> Result<JsValue, JsValue>
where
    T: Serialize,
{
    #[cfg(target_arch = "wasm32")]
    {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        value
            .serialize(&serializer)
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        serde_json::to_string(value)
            .map(|json| JsValue::from_str(&json))
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
}

/// Field keys as they appear in layout documents.
fn parse_field_key(name: &str) -> Result<FieldKey, String> {
    FieldKey::ALL
        .into_iter()
        .find(|field| field.as_str() == name)
        .ok_or_else(|| format!("unknown field '{name}'"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManaCostSummary {
    symbols: Vec<ParsedManaSymbol>,
    count: usize,
}

fn mana_cost_summary(cost: &str) -> ManaCostSummary {
    let symbols = parse_mana_string(cost);
    ManaCostSummary {
        count: symbols.len(),
        symbols,
    }
}

/// Set defaults for composers created afterwards.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn init(config: Option<JsValue>) -> Result<(), JsValue> {
    let overrides: ComposerConfigOverrides = parse_js_value_or_default(config)?;
    let next = merge_runtime_config(&read_runtime_config(), &overrides).map_err(js_error)?;
    write_runtime_config(next);
    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parseManaCost))]
pub fn parse_mana_cost_js(cost: &str) -> Result<JsValue, JsValue> {
    to_js_value(&mana_cost_summary(cost))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = canvasDimensions))]
pub fn canvas_dimensions_js(dpi: u32) -> Result<JsValue, JsValue> {
    if dpi == 0 {
        return Err(js_error("dpi must be positive"));
    }
    to_js_value(&CanvasDimensions::at_dpi(dpi))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = exportFileName))]
#[must_use]
pub fn export_file_name_js(card_name: &str) -> String {
    export_file_name(card_name)
}

#[cfg(target_arch = "wasm32")]
mod lookup {
    use std::rc::Rc;

    use js_sys::Promise;
    use pf_core::CardLookup;
    use wasm_bindgen::JsValue;
    use wasm_bindgen::prelude::wasm_bindgen;
    use wasm_bindgen_futures::future_to_promise;

    use crate::browser::{BrowserTimer, CARD_API_BASE, FetchCardSource};
    use crate::to_js_value;

    thread_local! {
        static CARD_LOOKUP: Rc<CardLookup<FetchCardSource, BrowserTimer>> =
            Rc::new(CardLookup::new(FetchCardSource::new(CARD_API_BASE), BrowserTimer));
    }

    /// Resolve a card by exact, then fuzzy, name. Resolves to `null` when
    /// nothing matches or the provider is unreachable.
    #[wasm_bindgen(js_name = lookupCard)]
    pub fn lookup_card_js(name: String) -> Promise {
        let lookup = CARD_LOOKUP.with(Rc::clone);
        future_to_promise(async move {
            match lookup.card_by_name(&name).await {
                Some(card) => to_js_value(&card),
                None => Ok(JsValue::NULL),
            }
        })
    }

    #[wasm_bindgen(js_name = autocompleteCards)]
    pub fn autocomplete_cards_js(query: String) -> Promise {
        let lookup = CARD_LOOKUP.with(Rc::clone);
        future_to_promise(async move {
            let names = lookup.autocomplete(&query).await;
            to_js_value(&names)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::ManaSymbolKind;

    #[test]
    fn field_keys_parse_by_document_name() {
        assert_eq!(parse_field_key("manaCost"), Ok(FieldKey::ManaCost));
        assert_eq!(parse_field_key("powerToughness"), Ok(FieldKey::PowerToughness));
        assert!(parse_field_key("mana_cost").is_err());
    }

    #[test]
    fn mana_cost_summary_counts_symbols() {
        let summary = mana_cost_summary("{2}{W}{U}");
        assert_eq!(summary.count, 3);
        assert_eq!(summary.symbols[0].kind, ManaSymbolKind::Generic);
        assert_eq!(summary.symbols[1].value, "W");
    }

    #[test]
    fn failed_calls_are_swallowed() {
        assert_eq!(traced("fillText", Ok::<_, String>(())), Some(()));
        assert_eq!(
            traced("drawImage", Err::<(), _>(String::from("InvalidStateError"))),
            None
        );
    }

    #[test]
    fn export_names_follow_card_name() {
        assert_eq!(export_file_name_js("Serra Angel"), "Serra_Angel.png");
    }
}
