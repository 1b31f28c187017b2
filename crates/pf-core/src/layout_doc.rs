//! Layout documents: the JSON files designers import, export and ship.

use serde::Deserialize;
use serde_json::Value;

use crate::{ImportError, LayoutConfig, StoreError};

/// Mints identifiers for imported and newly created layouts.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Format 16 bytes as a version 4 UUID, forcing the version and variant bits.
#[must_use]
pub fn uuid_v4_from_bytes(mut bytes: [u8; 16]) -> String {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Fields a document must carry (non-empty) to be accepted.
const REQUIRED_FIELDS: [&str; 3] = ["name", "images", "textPositions"];

/// Parse an imported layout document. The document's own id is discarded and
/// replaced with a fresh one.
pub fn parse_layout_document(
    json: &str,
    ids: &mut impl IdSource,
) -> Result<LayoutConfig, ImportError> {
    let mut value: Value =
        serde_json::from_str(json).map_err(|err| ImportError::Json(err.to_string()))?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| ImportError::Json(String::from("expected a JSON object")))?;

    for field in REQUIRED_FIELDS {
        if !object.get(field).is_some_and(is_present) {
            return Err(ImportError::MissingField(field));
        }
    }

    object.insert(String::from("id"), Value::String(ids.next_id()));
    let mut layout: LayoutConfig =
        serde_json::from_value(value).map_err(|err| ImportError::Json(err.to_string()))?;
    layout.normalize_legacy_alignment();
    Ok(layout)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Bool(flag) => *flag,
        _ => true,
    }
}

/// Pretty-printed document and its download filename.
pub fn export_layout_document(layout: &LayoutConfig) -> Result<(String, String), StoreError> {
    let json = serde_json::to_string_pretty(layout)
        .map_err(|err| StoreError::Serialize(err.to_string()))?;
    Ok((format!("{}-border.json", layout.id), json))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Bundle {
    Wrapped { borders: Vec<LayoutConfig> },
    List(Vec<LayoutConfig>),
}

/// Parse the built-in layout bundle, either `{"borders": [...]}` or a bare list.
pub fn parse_layout_bundle(json: &str) -> Result<Vec<LayoutConfig>, ImportError> {
    let bundle: Bundle =
        serde_json::from_str(json).map_err(|err| ImportError::Json(err.to_string()))?;
    let mut layouts = match bundle {
        Bundle::Wrapped { borders } => borders,
        Bundle::List(layouts) => layouts,
    };
    for layout in &mut layouts {
        layout.normalize_legacy_alignment();
    }
    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Align, FieldKey, default_layout};

    struct Counter(u32);

    impl IdSource for Counter {
        fn next_id(&mut self) -> String {
            self.0 += 1;
            format!("id-{}", self.0)
        }
    }

    #[test]
    fn import_assigns_fresh_id() {
        let (_, json) = export_layout_document(&default_layout()).expect("export");
        let layout = parse_layout_document(&json, &mut Counter(0)).expect("import");
        assert_eq!(layout.id, "id-1");
        assert_eq!(layout.name, "New Border");
        assert!(layout.position(FieldKey::OracleText).is_some());
    }

    #[test]
    fn import_without_id_is_accepted() {
        let json = r#"{
            "name": "Minimal",
            "images": {"C": "c.png"},
            "textPositions": {
                "name": {"x": 10, "y": 5, "width": 50, "height": 5, "fontSize": 9}
            }
        }"#;
        let layout = parse_layout_document(json, &mut Counter(41)).expect("import");
        assert_eq!(layout.id, "id-42");
        assert!(layout.mana_symbols.is_empty());
    }

    #[test]
    fn left_aligned_cost_is_imported_right_aligned() {
        let json = r#"{
            "name": "Legacy",
            "images": {"C": "c.png"},
            "textPositions": {
                "manaCost": {"x": 68, "y": 8, "width": 19, "height": 5, "fontSize": 7, "align": "left"},
                "name": {"x": 14, "y": 8, "width": 53, "height": 5, "fontSize": 9, "align": "left"}
            }
        }"#;
        let layout = parse_layout_document(json, &mut Counter(0)).expect("import");
        assert_eq!(layout.text_positions[&FieldKey::ManaCost].align, Some(Align::Right));
        assert_eq!(layout.text_positions[&FieldKey::Name].align, Some(Align::Left));

        let bundle = format!("[{}]", json.replace("\"Legacy\"", "\"Legacy\", \"id\": \"legacy\""));
        let layouts = parse_layout_bundle(&bundle).expect("bundle");
        assert_eq!(layouts[0].text_positions[&FieldKey::ManaCost].align, Some(Align::Right));
    }

    #[test]
    fn import_rejects_missing_fields() {
        let err = parse_layout_document(r#"{"name": "x", "images": {}}"#, &mut Counter(0))
            .expect_err("missing positions");
        assert_eq!(err, ImportError::MissingField("textPositions"));

        let err = parse_layout_document(
            r#"{"name": "", "images": {}, "textPositions": {}}"#,
            &mut Counter(0),
        )
        .expect_err("empty name");
        assert_eq!(err, ImportError::MissingField("name"));
    }

    #[test]
    fn import_rejects_invalid_json() {
        let err = parse_layout_document("{not json", &mut Counter(0)).expect_err("bad json");
        assert!(matches!(err, ImportError::Json(_)));
        let err = parse_layout_document("[1, 2]", &mut Counter(0)).expect_err("not an object");
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn export_filename_uses_id() {
        let (filename, json) = export_layout_document(&default_layout()).expect("export");
        assert_eq!(filename, "new-border-border.json");
        assert!(json.contains("\n  \"name\": \"New Border\""));
    }

    #[test]
    fn uuid_sets_version_and_variant() {
        let id = uuid_v4_from_bytes([0xff; 16]);
        assert_eq!(id, "ffffffff-ffff-4fff-bfff-ffffffffffff");
        let id = uuid_v4_from_bytes([0; 16]);
        assert_eq!(id, "00000000-0000-4000-8000-000000000000");
    }

    #[test]
    fn bundle_accepts_both_shapes() {
        let layout = default_layout();
        let list = serde_json::to_string(&vec![layout.clone()]).expect("serialize");
        assert_eq!(parse_layout_bundle(&list).expect("list").len(), 1);

        let wrapped = format!("{{\"borders\": {list}}}");
        assert_eq!(parse_layout_bundle(&wrapped).expect("wrapped")[0], layout);
    }
}
