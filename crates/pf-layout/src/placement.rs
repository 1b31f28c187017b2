use pf_core::geometry::PixelRect;
use pf_core::{Align, FontSpec, ParsedManaSymbol, TextMeasurer, VerticalAlign};
use serde::Serialize;

use crate::fit::fit_text_to_width;

/// Cost symbol edge length, in font sizes.
pub const COST_SYMBOL_SCALE: f64 = 1.2;
/// Space between cost symbols, in scale units.
pub const COST_SYMBOL_SPACING: f64 = 1.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedSymbol {
    pub symbol: ParsedManaSymbol,
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRow {
    pub symbols: Vec<PlacedSymbol>,
    pub size: f64,
    pub spacing: f64,
    pub total_width: f64,
}

/// Lay out a mana cost as a row of equal symbols inside `rect`.
///
/// A right-aligned row ends flush with the box's right edge. The row is not
/// shrunk when it overflows the box.
#[must_use]
pub fn layout_mana_cost(
    symbols: &[ParsedManaSymbol],
    rect: PixelRect,
    font_size: f64,
    scale: f64,
    align: Align,
    vertical_align: VerticalAlign,
) -> SymbolRow {
    let size = font_size * COST_SYMBOL_SCALE;
    let spacing = COST_SYMBOL_SPACING * scale;
    let count = symbols.len() as f64;
    let total_width = if symbols.is_empty() {
        0.0
    } else {
        count * (size + spacing) - spacing
    };
    let start_x = match align {
        Align::Left => rect.x,
        Align::Center => rect.x + (rect.width - total_width) / 2.0,
        Align::Right => rect.right() - total_width,
    };
    let y = match vertical_align {
        VerticalAlign::Top => rect.y,
        VerticalAlign::Center => rect.y + (rect.height - size) / 2.0,
        VerticalAlign::Bottom => rect.bottom() - size,
    };

    let symbols = symbols
        .iter()
        .enumerate()
        .map(|(index, symbol)| PlacedSymbol {
            symbol: symbol.clone(),
            x: start_x + index as f64 * (size + spacing),
            y,
            size,
        })
        .collect();

    SymbolRow {
        symbols,
        size,
        spacing,
        total_width,
    }
}

/// A fitted single line: the anchor to draw at with a top baseline and the
/// alignment's text anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePlacement {
    pub font: FontSpec,
    pub x: f64,
    pub y: f64,
    pub align: Align,
}

/// Anchor for a line of `fitted` size inside `rect`, drawn with a top
/// baseline. Shrunk text stays vertically centered on the base size.
#[must_use]
pub fn place_single_line(
    rect: PixelRect,
    base_size: f64,
    fitted: f64,
    align: Align,
    vertical_align: VerticalAlign,
) -> (f64, f64) {
    let x = match align {
        Align::Left => rect.x,
        Align::Center => rect.center_x(),
        Align::Right => rect.right(),
    };
    let y = match vertical_align {
        VerticalAlign::Top => rect.y + (base_size - fitted) / 2.0,
        VerticalAlign::Center => rect.y + (rect.height - fitted) / 2.0,
        VerticalAlign::Bottom => rect.bottom() - fitted,
    };
    (x, y)
}

/// Fit `text` to the box width and anchor it.
pub fn fit_single_line<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    rect: PixelRect,
    font: &FontSpec,
    align: Align,
    vertical_align: VerticalAlign,
) -> LinePlacement {
    let fitted = fit_text_to_width(measurer, text, rect.width, font);
    let (x, y) = place_single_line(rect, font.size, fitted, align, vertical_align);
    LinePlacement {
        font: font.with_size(fitted),
        x,
        y,
        align,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::ManaSymbolKind;
    use pf_parser::parse_mana_string;

    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn text_width(&mut self, font: &FontSpec, text: &str) -> f64 {
            text.chars().count() as f64 * font.size * 0.5
        }
    }

    #[test]
    fn cost_row_is_right_aligned() {
        let symbols = parse_mana_string("{1}{U}{U}");
        let rect = PixelRect::new(600.0, 80.0, 200.0, 40.0);
        let row = layout_mana_cost(&symbols, rect, 25.0, 1.0, Align::Right, VerticalAlign::Top);
        assert!((row.size - 30.0).abs() < 1e-9);
        assert!((row.total_width - (3.0 * 31.7 - 1.7)).abs() < 1e-9);
        let last = row.symbols.last().expect("symbols");
        assert!((last.x + last.size - rect.right()).abs() < 1e-9);
        assert!(row.symbols.iter().all(|placed| placed.y == 80.0));
        assert_eq!(row.symbols[0].symbol.kind, ManaSymbolKind::Generic);
    }

    #[test]
    fn empty_cost_has_no_width() {
        let row = layout_mana_cost(&[], PixelRect::new(0.0, 0.0, 10.0, 10.0), 10.0, 1.0, Align::Right, VerticalAlign::Top);
        assert!(row.symbols.is_empty());
        assert_eq!(row.total_width, 0.0);
    }

    #[test]
    fn left_and_centered_rows() {
        let symbols = parse_mana_string("{G}{G}");
        let rect = PixelRect::new(0.0, 0.0, 100.0, 50.0);
        let left = layout_mana_cost(&symbols, rect, 10.0, 0.0, Align::Left, VerticalAlign::Center);
        assert_eq!(left.symbols[0].x, 0.0);
        assert_eq!(left.symbols[1].x, 12.0);
        assert_eq!(left.symbols[0].y, 19.0);
        let centered = layout_mana_cost(&symbols, rect, 10.0, 0.0, Align::Center, VerticalAlign::Bottom);
        assert_eq!(centered.symbols[0].x, 38.0);
        assert_eq!(centered.symbols[0].y, 38.0);
    }

    #[test]
    fn shrunk_line_is_recentred() {
        let rect = PixelRect::new(50.0, 100.0, 80.0, 30.0);
        let font = FontSpec::new("Beleren, serif", 20.0);
        let placed = fit_single_line(&mut HalfEm, "abcdefghij", rect, &font, Align::Left, VerticalAlign::Top);
        assert_eq!(placed.font.size, 16.0);
        assert_eq!(placed.x, 50.0);
        assert_eq!(placed.y, 102.0);
    }

    #[test]
    fn anchors_follow_alignment() {
        let rect = PixelRect::new(10.0, 10.0, 100.0, 40.0);
        assert_eq!(place_single_line(rect, 20.0, 20.0, Align::Center, VerticalAlign::Top), (60.0, 10.0));
        assert_eq!(place_single_line(rect, 20.0, 20.0, Align::Right, VerticalAlign::Center), (110.0, 20.0));
        assert_eq!(place_single_line(rect, 20.0, 16.0, Align::Left, VerticalAlign::Bottom), (10.0, 34.0));
    }
}
