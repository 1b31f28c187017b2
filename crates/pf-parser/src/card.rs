//! Normalization of provider card JSON into [`CardRecord`].

use pf_core::{CardRecord, ImportError, ManaColor};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageUris {
    art_crop: Option<String>,
}

/// One face of a multi-faced card. Only fields the composer reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFace {
    name: Option<String>,
    type_line: Option<String>,
    oracle_text: Option<String>,
    mana_cost: Option<String>,
    colors: Option<Vec<String>>,
    power: Option<String>,
    toughness: Option<String>,
    loyalty: Option<String>,
    flavor_text: Option<String>,
    artist: Option<String>,
    image_uris: Option<ImageUris>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCard {
    id: String,
    #[serde(flatten)]
    face: RawFace,
    frame_effects: Vec<String>,
    card_faces: Vec<RawFace>,
}

fn colors(raw: &[String]) -> Vec<ManaColor> {
    raw.iter()
        .filter_map(|symbol| ManaColor::from_symbol(symbol))
        .collect()
}

impl From<RawCard> for CardRecord {
    fn from(raw: RawCard) -> Self {
        let RawCard {
            id,
            face,
            frame_effects,
            mut card_faces,
        } = raw;
        // Double-faced cards keep per-face data on the faces; the front wins.
        let front = if card_faces.is_empty() {
            RawFace::default()
        } else {
            card_faces.swap_remove(0)
        };
        let pick = |top: Option<String>, face: Option<String>| top.or(face);

        Self {
            id,
            name: pick(face.name, front.name).unwrap_or_default(),
            type_line: pick(face.type_line, front.type_line).unwrap_or_default(),
            oracle_text: pick(face.oracle_text, front.oracle_text),
            mana_cost: pick(face.mana_cost, front.mana_cost),
            colors: colors(&face.colors.or(front.colors).unwrap_or_default()),
            power: pick(face.power, front.power),
            toughness: pick(face.toughness, front.toughness),
            loyalty: pick(face.loyalty, front.loyalty),
            flavor_text: pick(face.flavor_text, front.flavor_text),
            artist: pick(face.artist, front.artist),
            frame_effects,
            art_crop_url: face
                .image_uris
                .and_then(|uris| uris.art_crop)
                .or_else(|| front.image_uris.and_then(|uris| uris.art_crop)),
        }
    }
}

/// Parse one provider card object.
pub fn parse_card_json(json: &str) -> Result<CardRecord, ImportError> {
    serde_json::from_str::<RawCard>(json)
        .map(CardRecord::from)
        .map_err(|err| ImportError::Json(err.to_string()))
}

/// Parse a value already decoded elsewhere, e.g. a fetch response body.
pub fn card_from_value(value: serde_json::Value) -> Result<CardRecord, ImportError> {
    serde_json::from_value::<RawCard>(value)
        .map(CardRecord::from)
        .map_err(|err| ImportError::Json(err.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCardList {
    Wrapped { data: Vec<RawCard> },
    List(Vec<RawCard>),
}

/// Parse a bulk dump: a bare array or a `{"data": [...]}` list object.
pub fn parse_card_list(json: &str) -> Result<Vec<CardRecord>, ImportError> {
    let list: RawCardList =
        serde_json::from_str(json).map_err(|err| ImportError::Json(err.to_string()))?;
    let raw = match list {
        RawCardList::Wrapped { data } => data,
        RawCardList::List(cards) => cards,
    };
    Ok(raw.into_iter().map(CardRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELVES: &str = r#"{
        "object": "card",
        "id": "6a0b230b-d391-4998-a3f7-7b158a0ec2cd",
        "name": "Llanowar Elves",
        "type_line": "Creature — Elf Druid",
        "oracle_text": "{T}: Add {G}.",
        "mana_cost": "{G}",
        "colors": ["G"],
        "power": "1",
        "toughness": "1",
        "flavor_text": "One bone broken for every twig snapped underfoot.",
        "artist": "Anson Maddocks",
        "image_uris": {"art_crop": "https://cards.scryfall.io/art_crop/front/6/a/6a0b.jpg"}
    }"#;

    #[test]
    fn normalizes_single_faced_card() {
        let card = parse_card_json(ELVES).expect("card");
        assert_eq!(card.name, "Llanowar Elves");
        assert_eq!(card.colors, vec![ManaColor::G]);
        assert_eq!(card.power_toughness_label().as_deref(), Some("1/1"));
        assert_eq!(
            card.art_crop_url.as_deref(),
            Some("https://cards.scryfall.io/art_crop/front/6/a/6a0b.jpg")
        );
        assert!(!card.is_legendary());
    }

    #[test]
    fn falls_back_to_front_face() {
        let json = r#"{
            "id": "dfc",
            "name": "Delver of Secrets // Insectile Aberration",
            "frame_effects": ["legendary"],
            "card_faces": [
                {
                    "name": "Delver of Secrets",
                    "type_line": "Creature — Human Wizard",
                    "mana_cost": "{U}",
                    "colors": ["U"],
                    "power": "1",
                    "toughness": "1",
                    "image_uris": {"art_crop": "front.jpg"}
                },
                {"name": "Insectile Aberration", "colors": ["U"]}
            ]
        }"#;
        let card = parse_card_json(json).expect("card");
        assert_eq!(card.name, "Delver of Secrets // Insectile Aberration");
        assert_eq!(card.type_line, "Creature — Human Wizard");
        assert_eq!(card.mana_cost.as_deref(), Some("{U}"));
        assert_eq!(card.colors, vec![ManaColor::U]);
        assert_eq!(card.art_crop_url.as_deref(), Some("front.jpg"));
        assert!(card.is_legendary());
    }

    #[test]
    fn parses_list_shapes() {
        let bare = format!("[{ELVES}]");
        assert_eq!(parse_card_list(&bare).expect("bare").len(), 1);
        let wrapped = format!("{{\"object\": \"list\", \"data\": [{ELVES}, {ELVES}]}}");
        assert_eq!(parse_card_list(&wrapped).expect("wrapped").len(), 2);
    }

    #[test]
    fn unknown_colors_are_ignored() {
        let card = parse_card_json(r#"{"id": "x", "name": "Odd", "colors": ["G", "Z"]}"#)
            .expect("card");
        assert_eq!(card.colors, vec![ManaColor::G]);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_card_json("{"), Err(ImportError::Json(_))));
    }
}
