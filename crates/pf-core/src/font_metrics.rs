//! Font descriptors and deterministic text measurement.
//!
//! Canvas backends measure with the real font engine. Native output and tests
//! use [`FontMetrics`], which estimates widths from per-character width
//! classes so that layout decisions are reproducible on every platform.

use serde::{Deserialize, Serialize};

/// Anything that can report the advance width of a run of text.
pub trait TextMeasurer {
    fn text_width(&mut self, font: &FontSpec, text: &str) -> f64;
}

/// A resolved font: family stack, pixel size and style flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// CSS family list, e.g. `Beleren, serif`.
    pub family: String,
    /// Size in pixels.
    pub size: f64,
    pub italic: bool,
    pub bold: bool,
}

impl FontSpec {
    #[must_use]
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            italic: false,
            bold: false,
        }
    }

    #[must_use]
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    #[must_use]
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    #[must_use]
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// The CSS `font` shorthand understood by 2D canvas contexts.
    #[must_use]
    pub fn css(&self) -> String {
        let mut out = String::new();
        if self.italic {
            out.push_str("italic ");
        }
        if self.bold {
            out.push_str("bold ");
        }
        out.push_str(&format!("{}px {}", format_px(self.size), self.family));
        out
    }

    /// Parse a CSS `font` shorthand of the form produced by [`FontSpec::css`].
    #[must_use]
    pub fn parse_css(css: &str) -> Option<Self> {
        let mut italic = false;
        let mut bold = false;
        let mut rest = css.trim();
        loop {
            let (token, tail) = rest.split_once(' ')?;
            match token {
                "italic" | "oblique" => italic = true,
                "bold" | "bolder" => bold = true,
                "normal" => {}
                size => {
                    let size = size.strip_suffix("px")?.parse::<f64>().ok()?;
                    let family = tail.trim();
                    if family.is_empty() {
                        return None;
                    }
                    return Some(Self {
                        family: family.to_string(),
                        size,
                        italic,
                        bold,
                    });
                }
            }
            rest = tail.trim_start();
        }
    }

    /// First family of the stack with quotes removed; the one font loaders fetch.
    #[must_use]
    pub fn primary_family(&self) -> &str {
        primary_family(&self.family)
    }
}

/// First entry of a CSS family list, unquoted.
#[must_use]
pub fn primary_family(family: &str) -> &str {
    family
        .split(',')
        .next()
        .unwrap_or(family)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
}

fn format_px(size: f64) -> String {
    let rounded = (size * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Font metrics preset for known font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontPreset {
    /// Arial/Helvetica style sans-serif
    #[default]
    SansSerif,
    /// Monospace font (fixed width)
    Monospace,
    /// Times/Georgia style serif font
    Serif,
    /// Condensed display faces used for card titles
    Condensed,
}

impl FontPreset {
    /// Get the preset from a font family string.
    #[must_use]
    pub fn from_family(family: &str) -> Self {
        let lower = family.to_lowercase();
        if lower.contains("mono") || lower.contains("courier") || lower.contains("consolas") {
            Self::Monospace
        } else if lower.contains("condensed")
            || lower.contains("narrow")
            || lower.contains("beleren")
        {
            Self::Condensed
        } else if lower.contains("times")
            || lower.contains("georgia")
            || lower.contains("mplantin")
            || (lower.contains("serif") && !lower.contains("sans"))
        {
            Self::Serif
        } else {
            Self::SansSerif
        }
    }

    /// Average character width relative to the em size.
    #[must_use]
    pub const fn avg_char_ratio(&self) -> f64 {
        match self {
            Self::SansSerif => 0.55,
            Self::Monospace => 0.60,
            Self::Serif => 0.52,
            Self::Condensed => 0.47,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Monospace => "monospace",
            Self::SansSerif => "sans-serif",
            Self::Serif => "serif",
            Self::Condensed => "condensed",
        }
    }
}

/// Character width class for proportional fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharWidthClass {
    /// Very narrow characters: i, l, |, !, ', ., ,
    VeryNarrow,
    /// Narrow characters: I, j, t, f, r
    Narrow,
    /// Half-width: space
    Half,
    /// Normal width: most characters
    Normal,
    /// Wide characters: w, m
    Wide,
    /// Very wide characters: W, M, @, %, em-dash
    VeryWide,
}

impl CharWidthClass {
    #[must_use]
    pub fn classify(c: char) -> Self {
        match c {
            'i' | 'l' | '|' | '!' | '\'' | '.' | ',' | ':' | ';' => Self::VeryNarrow,
            'I' | 'j' | 't' | 'f' | 'r' | '(' | ')' | '[' | ']' | '-' => Self::Narrow,
            ' ' => Self::Half,
            'w' | 'm' => Self::Wide,
            'W' | 'M' | '@' | '%' | '&' | '\u{2014}' => Self::VeryWide,
            _ => Self::Normal,
        }
    }

    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::VeryNarrow => 0.4,
            Self::Narrow => 0.6,
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Wide => 1.2,
            Self::VeryWide => 1.5,
        }
    }
}

/// Deterministic width estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Forces one preset instead of detecting it from the family.
    preset: Option<FontPreset>,
    /// Width multiplier applied to bold text.
    bold_factor: f64,
}

impl FontMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            preset: None,
            bold_factor: 1.05,
        }
    }

    #[must_use]
    pub const fn with_preset(preset: FontPreset) -> Self {
        Self {
            preset: Some(preset),
            bold_factor: 1.05,
        }
    }

    #[must_use]
    pub fn preset_for(&self, family: &str) -> FontPreset {
        self.preset
            .unwrap_or_else(|| FontPreset::from_family(primary_family(family)))
    }

    /// Estimate the width of a single line of text.
    #[must_use]
    pub fn estimate_width(&self, font: &FontSpec, text: &str) -> f64 {
        let avg = font.size * self.preset_for(&font.family).avg_char_ratio();
        let units: f64 = text
            .chars()
            .map(|c| CharWidthClass::classify(c).multiplier())
            .sum();
        let width = units * avg;
        if font.bold {
            width * self.bold_factor
        } else {
            width
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for FontMetrics {
    fn text_width(&mut self, font: &FontSpec, text: &str) -> f64 {
        self.estimate_width(font, text)
    }
}
