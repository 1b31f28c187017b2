use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Font family used when a text position does not name one.
pub const DEFAULT_FONT_FAMILY: &str = "Georgia, serif";
/// Text color used when a text position does not name one.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

// =============================================================================
// Colors
// =============================================================================

/// One of the five colors a card can carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ManaColor {
    W,
    U,
    B,
    R,
    G,
}

impl ManaColor {
    pub const ALL: [Self; 5] = [Self::W, Self::U, Self::B, Self::R, Self::G];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W => "W",
            Self::U => "U",
            Self::B => "B",
            Self::R => "R",
            Self::G => "G",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == symbol)
    }
}

/// Key into a layout's frame image table.
///
/// `C` is used for colorless cards and as the fallback when a layout does
/// not define the resolved key; `M` covers every multicolored card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BorderColorKey {
    W,
    U,
    B,
    R,
    G,
    C,
    M,
}

impl BorderColorKey {
    pub const ALL: [Self; 7] = [
        Self::W,
        Self::U,
        Self::B,
        Self::R,
        Self::G,
        Self::C,
        Self::M,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W => "W",
            Self::U => "U",
            Self::B => "B",
            Self::R => "R",
            Self::G => "G",
            Self::C => "C",
            Self::M => "M",
        }
    }
}

impl From<ManaColor> for BorderColorKey {
    fn from(color: ManaColor) -> Self {
        match color {
            ManaColor::W => Self::W,
            ManaColor::U => Self::U,
            ManaColor::B => Self::B,
            ManaColor::R => Self::R,
            ManaColor::G => Self::G,
        }
    }
}

/// Pick the frame color for a card from its color set.
#[must_use]
pub fn determine_border_color(colors: &[ManaColor]) -> BorderColorKey {
    let distinct: BTreeSet<ManaColor> = colors.iter().copied().collect();
    let mut iter = distinct.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => BorderColorKey::C,
        (Some(color), None) => color.into(),
        (Some(_), Some(_)) => BorderColorKey::M,
    }
}

// =============================================================================
// Card record
// =============================================================================

/// A card as the renderer sees it. Never mutated during a render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    pub type_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    pub colors: Vec<ManaColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toughness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frame_effects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub art_crop_url: Option<String>,
}

impl CardRecord {
    #[must_use]
    pub fn is_legendary(&self) -> bool {
        self.frame_effects.iter().any(|effect| effect == "legendary")
    }

    /// True when both power and toughness are present, even if empty.
    #[must_use]
    pub fn has_power_toughness(&self) -> bool {
        self.power.is_some() && self.toughness.is_some()
    }

    /// The `power/toughness` label, when both values are non-empty.
    #[must_use]
    pub fn power_toughness_label(&self) -> Option<String> {
        match (non_empty(self.power.as_deref()), non_empty(self.toughness.as_deref())) {
            (Some(power), Some(toughness)) => Some(format!("{power}/{toughness}")),
            _ => None,
        }
    }

    #[must_use]
    pub fn oracle(&self) -> Option<&str> {
        non_empty(self.oracle_text.as_deref())
    }

    #[must_use]
    pub fn flavor(&self) -> Option<&str> {
        non_empty(self.flavor_text.as_deref())
    }

    #[must_use]
    pub fn cost(&self) -> Option<&str> {
        non_empty(self.mana_cost.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

// =============================================================================
// Layout configuration
// =============================================================================

/// Horizontal text alignment inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Vertical alignment of a block inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }

    /// Offset of a block of `content` height inside `available` height.
    #[must_use]
    pub fn offset(self, available: f64, content: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => (available - content) / 2.0,
            Self::Bottom => available - content,
        }
    }
}

/// The text fields a layout can position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Name,
    ManaCost,
    TypeLine,
    OracleText,
    FlavorText,
    PowerToughness,
    Loyalty,
    Artist,
    Copyright,
}

impl FieldKey {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::ManaCost,
        Self::TypeLine,
        Self::OracleText,
        Self::FlavorText,
        Self::PowerToughness,
        Self::Loyalty,
        Self::Artist,
        Self::Copyright,
    ];

    /// The camelCase key used in layout documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ManaCost => "manaCost",
            Self::TypeLine => "typeLine",
            Self::OracleText => "oracleText",
            Self::FlavorText => "flavorText",
            Self::PowerToughness => "powerToughness",
            Self::Loyalty => "loyalty",
            Self::Artist => "artist",
            Self::Copyright => "copyright",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::ManaCost => "Mana Cost",
            Self::TypeLine => "Type Line",
            Self::OracleText => "Oracle Text",
            Self::FlavorText => "Flavor Text",
            Self::PowerToughness => "Power/Toughness",
            Self::Loyalty => "Loyalty",
            Self::Artist => "Artist",
            Self::Copyright => "Copyright",
        }
    }

    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }

    /// Alignment applied when the position does not set one.
    #[must_use]
    pub const fn default_align(self) -> Align {
        match self {
            Self::ManaCost => Align::Right,
            Self::PowerToughness | Self::Loyalty => Align::Center,
            _ => Align::Left,
        }
    }
}

/// A text box in percent of the full (margin-inclusive) canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Font size in points at the 72 DPI base resolution.
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
    /// Icon drawn before the artist credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl TextPosition {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64, font_size: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            font_size,
            font_family: None,
            color: None,
            align: None,
            vertical_align: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn font_family_or_default(&self) -> &str {
        self.font_family
            .as_deref()
            .filter(|family| !family.is_empty())
            .unwrap_or(DEFAULT_FONT_FAMILY)
    }

    #[must_use]
    pub fn color_or_default(&self) -> &str {
        self.color
            .as_deref()
            .filter(|color| !color.is_empty())
            .unwrap_or(DEFAULT_TEXT_COLOR)
    }

    /// Whether the box lies inside the canvas.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 100.0
            && self.y + self.height <= 100.0
    }
}

/// Frame images for one color key, normalized from either wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ImageRef", into = "ImageRef")]
pub struct BorderImages {
    pub base: String,
    pub legendary: Option<String>,
    pub power_toughness: Option<String>,
}

impl BorderImages {
    #[must_use]
    pub fn url(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            legendary: None,
            power_toughness: None,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        non_empty(Some(self.base.as_str()))
    }

    #[must_use]
    pub fn legendary_url(&self) -> Option<&str> {
        non_empty(self.legendary.as_deref())
    }

    #[must_use]
    pub fn power_toughness_url(&self) -> Option<&str> {
        non_empty(self.power_toughness.as_deref())
    }
}

/// Wire form of a frame image: a bare URL or a variant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Variants(ImageVariants),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariants {
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legendary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_toughness: Option<String>,
}

impl From<ImageRef> for BorderImages {
    fn from(value: ImageRef) -> Self {
        match value {
            ImageRef::Url(base) => Self::url(base),
            ImageRef::Variants(variants) => Self {
                base: variants.base,
                legendary: variants.legendary,
                power_toughness: variants.power_toughness,
            },
        }
    }
}

impl From<BorderImages> for ImageRef {
    fn from(value: BorderImages) -> Self {
        if value.legendary.is_none() && value.power_toughness.is_none() {
            Self::Url(value.base)
        } else {
            Self::Variants(ImageVariants {
                base: value.base,
                legendary: value.legendary,
                power_toughness: value.power_toughness,
            })
        }
    }
}

/// Where the artwork is centered and how wide it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtAnchor {
    /// Percent of the full canvas width.
    pub center_x: f64,
    /// Percent of the full canvas height.
    pub center_y: f64,
    /// 1.0 draws the image exactly as wide as the canvas.
    pub scale: f64,
}

impl Default for ArtAnchor {
    fn default() -> Self {
        Self {
            center_x: 50.0,
            center_y: 50.0,
            scale: 1.0,
        }
    }
}

/// A named frame plus text layout ("border").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: BTreeMap<BorderColorKey, BorderImages>,
    pub text_positions: BTreeMap<FieldKey, TextPosition>,
    #[serde(default)]
    pub mana_symbols: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<ArtAnchor>,
}

impl LayoutConfig {
    #[must_use]
    pub fn position(&self, field: FieldKey) -> Option<&TextPosition> {
        self.text_positions.get(&field)
    }

    /// Frame images for `key`, falling back to the colorless entry.
    #[must_use]
    pub fn border_images(&self, key: BorderColorKey) -> Option<&BorderImages> {
        self.images
            .get(&key)
            .or_else(|| self.images.get(&BorderColorKey::C))
    }

    #[must_use]
    pub fn art_anchor(&self) -> ArtAnchor {
        self.art.unwrap_or_default()
    }

    /// Older documents carry `align: "left"` on the mana cost, which never
    /// moved the cost away from the right edge. Read it as right alignment.
    pub fn normalize_legacy_alignment(&mut self) {
        if let Some(position) = self.text_positions.get_mut(&FieldKey::ManaCost) {
            if position.align == Some(Align::Left) {
                position.align = Some(Align::Right);
            }
        }
    }

    /// Every font family referenced by a configured text position.
    #[must_use]
    pub fn font_families(&self) -> BTreeSet<String> {
        self.text_positions
            .values()
            .map(|position| position.font_family_or_default().to_string())
            .collect()
    }
}

/// Layout used when nothing better is available.
#[must_use]
pub fn default_layout() -> LayoutConfig {
    let position = |x, y, width, height, font_size| TextPosition {
        font_family: Some(String::from("Beleren2016, Beleren, serif")),
        color: Some(String::from(DEFAULT_TEXT_COLOR)),
        align: Some(Align::Left),
        ..TextPosition::new(x, y, width, height, font_size)
    };

    let images = [
        BorderColorKey::W,
        BorderColorKey::U,
        BorderColorKey::B,
        BorderColorKey::R,
        BorderColorKey::G,
        BorderColorKey::C,
    ]
    .into_iter()
    .map(|key| (key, BorderImages::default()))
    .collect();

    let text_positions = BTreeMap::from([
        (FieldKey::Name, position(14.1, 8.3, 53.6, 5.5, 9.0)),
        (
            FieldKey::ManaCost,
            TextPosition {
                align: Some(Align::Right),
                ..position(67.9, 8.3, 19.1, 5.5, 7.0)
            },
        ),
        (FieldKey::TypeLine, position(14.1, 57.7, 72.6, 4.5, 8.0)),
        (FieldKey::OracleText, position(14.1, 63.5, 72.6, 23.4, 8.0)),
        (FieldKey::FlavorText, position(14.1, 63.5, 72.6, 23.4, 7.0)),
        (FieldKey::PowerToughness, position(75.4, 88.2, 12.2, 5.0, 10.0)),
    ]);

    let mana_symbols = ["W", "U", "B", "R", "G", "C", "T"]
        .into_iter()
        .map(|symbol| (symbol.to_string(), format!("/symbols/{symbol}.svg")))
        .collect();

    LayoutConfig {
        id: String::from("new-border"),
        name: String::from("New Border"),
        description: Some(String::from("Custom border configuration")),
        images,
        text_positions,
        mana_symbols,
        art: Some(ArtAnchor {
            center_x: 50.0,
            center_y: 37.0,
            scale: 1.0,
        }),
    }
}

/// A user pan/zoom applied on top of the layout's art anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundTransform {
    pub scale: f64,
    /// Percent of the canvas width.
    pub offset_x: f64,
    /// Percent of the canvas height.
    pub offset_y: f64,
}

impl BackgroundTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for BackgroundTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Mana symbols
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManaSymbolKind {
    Mana,
    Generic,
    Tap,
    Hybrid,
    Phyrexian,
}

impl ManaSymbolKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mana => "mana",
            Self::Generic => "generic",
            Self::Tap => "tap",
            Self::Hybrid => "hybrid",
            Self::Phyrexian => "phyrexian",
        }
    }
}

/// One `{...}` token that the mana grammar recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedManaSymbol {
    #[serde(rename = "type")]
    pub kind: ManaSymbolKind,
    pub value: String,
}

impl ParsedManaSymbol {
    #[must_use]
    pub fn new(kind: ManaSymbolKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Key used to look up a glyph for this symbol.
    #[must_use]
    pub fn glyph_key(&self) -> &str {
        match self.kind {
            ManaSymbolKind::Tap => "T",
            _ => &self.value,
        }
    }
}

/// A piece of oracle text: literal characters or one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum OraclePiece {
    Text(String),
    Symbol(ParsedManaSymbol),
}

/// Metadata about one symbol from the symbol data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSymbol {
    pub symbol: String,
    pub svg_uri: String,
    pub english: String,
    pub colors: Vec<String>,
    pub represents_mana: bool,
    pub appears_in_mana_costs: bool,
    pub mana_value: Option<f64>,
    pub hybrid: bool,
    pub phyrexian: bool,
}

/// Read-only symbol table keyed by the token text without braces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolCatalog {
    symbols: BTreeMap<String, CardSymbol>,
}

impl SymbolCatalog {
    #[must_use]
    pub fn new(symbols: BTreeMap<String, CardSymbol>) -> Self {
        Self { symbols }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CardSymbol> {
        self.symbols.get(key)
    }

    #[must_use]
    pub fn svg_uri(&self, key: &str) -> Option<&str> {
        self.get(key)
            .map(|symbol| symbol.svg_uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

// =============================================================================
// Backgrounds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSource {
    Scryfall,
    Custom,
}

/// An artwork choice for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<BackgroundSource>,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_color_resolution() {
        assert_eq!(determine_border_color(&[]), BorderColorKey::C);
        assert_eq!(determine_border_color(&[ManaColor::R]), BorderColorKey::R);
        assert_eq!(
            determine_border_color(&[ManaColor::W, ManaColor::U]),
            BorderColorKey::M
        );
        assert_eq!(
            determine_border_color(&[ManaColor::G, ManaColor::G]),
            BorderColorKey::G
        );
    }

    #[test]
    fn border_images_fall_back_to_colorless() {
        let mut layout = default_layout();
        layout.images = BTreeMap::from([(BorderColorKey::C, BorderImages::url("c.png"))]);
        let images = layout
            .border_images(BorderColorKey::U)
            .expect("colorless fallback");
        assert_eq!(images.base, "c.png");
    }

    #[test]
    fn image_ref_normalizes_both_wire_shapes() {
        let plain: BorderImages = serde_json::from_str("\"blue.png\"").expect("plain url");
        assert_eq!(plain, BorderImages::url("blue.png"));

        let variants: BorderImages =
            serde_json::from_str(r#"{"base":"c.png","powerToughness":"c_pt.png"}"#)
                .expect("variant set");
        assert_eq!(variants.base, "c.png");
        assert_eq!(variants.power_toughness_url(), Some("c_pt.png"));
        assert_eq!(variants.legendary_url(), None);
    }

    #[test]
    fn image_ref_serializes_plain_url_without_variants() {
        let json = serde_json::to_string(&BorderImages::url("w.png")).expect("serialize");
        assert_eq!(json, "\"w.png\"");

        let with_variant = BorderImages {
            base: String::from("w.png"),
            legendary: Some(String::from("w_leg.png")),
            power_toughness: None,
        };
        let json = serde_json::to_string(&with_variant).expect("serialize");
        assert_eq!(json, r#"{"base":"w.png","legendary":"w_leg.png"}"#);
    }

    #[test]
    fn layout_document_uses_camel_case_keys() {
        let layout = default_layout();
        let value = serde_json::to_value(&layout).expect("serialize layout");
        assert!(value["textPositions"]["oracleText"].is_object());
        assert_eq!(value["textPositions"]["manaCost"]["fontSize"], 7.0);
        assert_eq!(value["art"]["centerY"], 37.0);
    }

    #[test]
    fn default_layout_right_aligns_the_cost() {
        let layout = default_layout();
        let cost = layout.position(FieldKey::ManaCost).expect("cost box");
        assert_eq!(cost.align, Some(Align::Right));
        let name = layout.position(FieldKey::Name).expect("name box");
        assert_eq!(name.align, Some(Align::Left));
    }

    #[test]
    fn legacy_left_cost_reads_as_right() {
        let mut layout = default_layout();
        for position in layout.text_positions.values_mut() {
            position.align = Some(Align::Left);
        }
        layout.normalize_legacy_alignment();
        assert_eq!(layout.text_positions[&FieldKey::ManaCost].align, Some(Align::Right));
        assert_eq!(layout.text_positions[&FieldKey::TypeLine].align, Some(Align::Left));
    }

    #[test]
    fn card_power_toughness_helpers() {
        let mut card = CardRecord {
            power: Some(String::from("4")),
            toughness: Some(String::from("4")),
            ..CardRecord::default()
        };
        assert!(card.has_power_toughness());
        assert_eq!(card.power_toughness_label().as_deref(), Some("4/4"));

        card.toughness = None;
        assert!(!card.has_power_toughness());
        assert_eq!(card.power_toughness_label(), None);
    }

    #[test]
    fn field_keys_round_trip_through_strings() {
        for field in FieldKey::ALL {
            assert_eq!(FieldKey::parse(field.as_str()), Some(field));
        }
        assert_eq!(FieldKey::ManaCost.default_align(), Align::Right);
        assert_eq!(FieldKey::Loyalty.default_align(), Align::Center);
    }

    #[test]
    fn vertical_align_offsets() {
        assert_eq!(VerticalAlign::Top.offset(100.0, 40.0), 0.0);
        assert_eq!(VerticalAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(VerticalAlign::Bottom.offset(100.0, 40.0), 60.0);
    }
}
