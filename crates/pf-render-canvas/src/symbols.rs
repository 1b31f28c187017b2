//! Symbol glyph resolution and the locally drawn fallback badge.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use pf_core::{FontSpec, ParsedManaSymbol, SymbolCatalog};

use crate::context::{Canvas2dContext, Gradient, TextAlign, TextBaseline};

/// Gradient and letter colours for one badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgePalette {
    pub start: &'static str,
    pub end: &'static str,
    pub text: &'static str,
}

const COLORLESS: BadgePalette = BadgePalette {
    start: "#CBC2BF",
    end: "#9A9A9A",
    text: "#000",
};

/// Palette keyed by symbol value; anything but a single colour letter is
/// drawn colourless.
#[must_use]
pub fn badge_palette(value: &str) -> BadgePalette {
    match value {
        "W" => BadgePalette {
            start: "#FFFBD5",
            end: "#F8E7B9",
            text: "#000",
        },
        "U" => BadgePalette {
            start: "#AAE0FA",
            end: "#0E68AB",
            text: "#fff",
        },
        "B" => BadgePalette {
            start: "#CAC5C0",
            end: "#150B00",
            text: "#fff",
        },
        "R" => BadgePalette {
            start: "#F9AA8F",
            end: "#D3202A",
            text: "#000",
        },
        "G" => BadgePalette {
            start: "#9BD3AE",
            end: "#00733E",
            text: "#fff",
        },
        _ => COLORLESS,
    }
}

/// Draw a round badge with the symbol's label in the `size` square at
/// `(x, y)`.
pub fn draw_fallback_badge<C: Canvas2dContext + ?Sized>(
    ctx: &mut C,
    symbol: &ParsedManaSymbol,
    x: f64,
    y: f64,
    size: f64,
) {
    let radius = size / 2.0;
    let (cx, cy) = (x + radius, y + radius);
    let palette = badge_palette(&symbol.value);
    let gradient = Gradient::radial(x + radius * 0.3, y + radius * 0.3, 0.0, cx, cy, radius)
        .stop(0.0, palette.start)
        .stop(1.0, palette.end);

    ctx.begin_path();
    ctx.arc(cx, cy, radius, 0.0, PI * 2.0);
    ctx.set_fill_gradient(&gradient);
    ctx.fill();
    ctx.set_stroke_style("rgba(0, 0, 0, 0.3)");
    ctx.set_line_width(1.0);
    ctx.stroke();

    ctx.set_fill_style(palette.text);
    ctx.set_font(&FontSpec::new("Arial, sans-serif", size * 0.6).bold(true).css());
    ctx.set_text_align(TextAlign::Center);
    ctx.set_text_baseline(TextBaseline::Middle);
    ctx.fill_text(symbol.glyph_key(), cx, cy);
}

/// Where a symbol's glyph comes from: a layout override, then the symbol
/// catalog. `None` means the badge is drawn.
#[must_use]
pub fn resolve_symbol_url<'a>(
    overrides: &'a BTreeMap<String, String>,
    catalog: &'a SymbolCatalog,
    symbol: &ParsedManaSymbol,
) -> Option<&'a str> {
    let key = symbol.glyph_key();
    overrides
        .get(key)
        .map(String::as_str)
        .filter(|url| !url.is_empty())
        .or_else(|| catalog.svg_uri(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DrawOperation, GradientKind, MockCanvas2dContext};
    use pf_core::{CardSymbol, ManaSymbolKind};

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::new(BTreeMap::from([
            (
                String::from("U"),
                CardSymbol {
                    symbol: String::from("{U}"),
                    svg_uri: String::from("https://svgs.scryfall.io/card-symbols/U.svg"),
                    ..CardSymbol::default()
                },
            ),
            (
                String::from("T"),
                CardSymbol {
                    symbol: String::from("{T}"),
                    svg_uri: String::from("https://svgs.scryfall.io/card-symbols/T.svg"),
                    ..CardSymbol::default()
                },
            ),
        ]))
    }

    #[test]
    fn override_beats_catalog() {
        let overrides = BTreeMap::from([(String::from("U"), String::from("/symbols/u.svg"))]);
        let blue = ParsedManaSymbol::new(ManaSymbolKind::Mana, "U");
        assert_eq!(resolve_symbol_url(&overrides, &catalog(), &blue), Some("/symbols/u.svg"));
        assert_eq!(
            resolve_symbol_url(&BTreeMap::new(), &catalog(), &blue),
            Some("https://svgs.scryfall.io/card-symbols/U.svg")
        );
    }

    #[test]
    fn empty_override_falls_through() {
        let overrides = BTreeMap::from([(String::from("T"), String::new())]);
        let tap = ParsedManaSymbol::new(ManaSymbolKind::Tap, "T");
        assert_eq!(
            resolve_symbol_url(&overrides, &catalog(), &tap),
            Some("https://svgs.scryfall.io/card-symbols/T.svg")
        );
    }

    #[test]
    fn unknown_symbol_has_no_url() {
        let hybrid = ParsedManaSymbol::new(ManaSymbolKind::Hybrid, "W/U");
        assert_eq!(resolve_symbol_url(&BTreeMap::new(), &catalog(), &hybrid), None);
    }

    #[test]
    fn palettes_by_colour() {
        assert_eq!(badge_palette("U").end, "#0E68AB");
        assert_eq!(badge_palette("W").text, "#000");
        assert_eq!(badge_palette("2"), COLORLESS);
        assert_eq!(badge_palette("W/U"), COLORLESS);
    }

    #[test]
    fn badge_draws_gradient_circle_and_label() {
        let mut ctx = MockCanvas2dContext::new(100.0, 100.0);
        let green = ParsedManaSymbol::new(ManaSymbolKind::Mana, "G");
        draw_fallback_badge(&mut ctx, &green, 10.0, 20.0, 30.0);

        let ops = ctx.operations();
        assert_eq!(ops[1], DrawOperation::Arc(25.0, 35.0, 15.0, 0.0, PI * 2.0));
        match &ops[2] {
            DrawOperation::SetFillGradient(gradient) => {
                assert!(matches!(gradient.kind, GradientKind::Radial { r1, .. } if r1 == 15.0));
                assert_eq!(gradient.stops[0].color, "#9BD3AE");
            }
            other => panic!("unexpected {other:?}"),
        }
        match ops.last() {
            Some(DrawOperation::FillText {
                text,
                x,
                y,
                font,
                align,
                baseline,
            }) => {
                assert_eq!(text, "G");
                assert_eq!((*x, *y), (25.0, 35.0));
                assert_eq!(font, "bold 18px Arial, sans-serif");
                assert_eq!(*align, TextAlign::Center);
                assert_eq!(*baseline, TextBaseline::Middle);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
