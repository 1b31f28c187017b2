//! Rich text flow: oracle text with inline symbols, word wrap and italics.
//!
//! The same placement pass serves measuring and drawing, so the height used
//! for shrink-to-fit always matches what ends up on the card.

use pf_core::{FontSpec, OraclePiece, ParsedManaSymbol, TextMeasurer};
use pf_parser::parse_oracle_text;
use serde::Serialize;

/// Baseline advance for a wrap-induced line break, in font sizes.
pub const WRAP_LEADING: f64 = 1.1;
/// Baseline advance for an explicit newline, in font sizes.
pub const NEWLINE_LEADING: f64 = 1.55;
/// Inline symbol edge length, in font sizes.
pub const INLINE_SYMBOL_SCALE: f64 = 1.0;
/// Height of the symbol center above the baseline, in font sizes.
const SYMBOL_LIFT: f64 = 0.32;
/// Room left under the last baseline for descenders, in font sizes.
const DESCENT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStyle {
    pub font_size: f64,
    pub font_family: String,
    /// Horizontal space after each inline symbol, in pixels.
    pub symbol_gap: f64,
}

impl FlowStyle {
    #[must_use]
    pub fn font(&self, italic: bool) -> FontSpec {
        FontSpec::new(self.font_family.clone(), self.font_size).italic(italic)
    }
}

/// One placed element of a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FlowItem {
    /// A word with its trailing space, drawn with an alphabetic baseline.
    Word {
        text: String,
        x: f64,
        baseline: f64,
        italic: bool,
    },
    /// A symbol glyph; `y` is its top edge.
    Symbol {
        symbol: ParsedManaSymbol,
        x: f64,
        y: f64,
        size: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFlow {
    pub items: Vec<FlowItem>,
    /// From the origin to just below the last line.
    pub height: f64,
}

impl TextFlow {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            FlowItem::Word { text, .. } => Some(text.as_str()),
            FlowItem::Symbol { .. } => None,
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &ParsedManaSymbol> {
        self.items.iter().filter_map(|item| match item {
            FlowItem::Symbol { symbol, .. } => Some(symbol),
            FlowItem::Word { .. } => None,
        })
    }
}

struct Cursor<'m, M: ?Sized> {
    measurer: &'m mut M,
    style: &'m FlowStyle,
    x: f64,
    baseline: f64,
    line_start: f64,
    right_edge: f64,
    at_line_start: bool,
    /// Parenthesized asides can span segments and symbols.
    in_paren: bool,
    items: Vec<FlowItem>,
}

impl<M: TextMeasurer + ?Sized> Cursor<'_, M> {
    fn wrap(&mut self) {
        self.baseline += self.style.font_size * WRAP_LEADING;
        self.x = self.line_start;
        self.at_line_start = true;
    }

    fn newline(&mut self) {
        self.baseline += self.style.font_size * NEWLINE_LEADING;
        self.x = self.line_start;
        self.at_line_start = true;
    }

    fn flush(&mut self, buffer: &mut String, italic: bool) {
        if buffer.is_empty() {
            return;
        }
        buffer.push(' ');
        let width = self.measurer.text_width(&self.style.font(italic), buffer);
        if self.x + width > self.right_edge && !self.at_line_start {
            self.wrap();
        }
        self.items.push(FlowItem::Word {
            text: std::mem::take(buffer),
            x: self.x,
            baseline: self.baseline,
            italic,
        });
        self.x += width;
        self.at_line_start = false;
    }

    fn symbol(&mut self, symbol: &ParsedManaSymbol) {
        let size = self.style.font_size * INLINE_SYMBOL_SCALE;
        if self.x + size > self.right_edge && !self.at_line_start {
            self.wrap();
        }
        self.items.push(FlowItem::Symbol {
            symbol: symbol.clone(),
            x: self.x,
            y: self.baseline - self.style.font_size * SYMBOL_LIFT - size / 2.0,
            size,
        });
        self.x += size + self.style.symbol_gap;
        self.at_line_start = false;
    }

    fn segment(&mut self, segment: &str) {
        let ability_end = if self.at_line_start {
            ability_word_len(segment)
        } else {
            0
        };

        let mut buffer = String::new();
        let mut italic = false;
        for (index, ch) in segment.chars().enumerate() {
            let in_ability = index < ability_end;
            match ch {
                '(' => {
                    self.flush(&mut buffer, italic);
                    self.in_paren = true;
                    italic = true;
                    buffer.push(ch);
                }
                ')' => {
                    buffer.push(ch);
                    self.flush(&mut buffer, italic);
                    self.in_paren = false;
                    italic = false;
                }
                ' ' => {
                    self.flush(&mut buffer, italic);
                    italic = self.in_paren || in_ability;
                }
                _ => {
                    let wanted = self.in_paren || in_ability;
                    if buffer.is_empty() || (self.in_paren == italic && in_ability == italic) {
                        italic = wanted;
                    } else if wanted != italic {
                        self.flush(&mut buffer, italic);
                        italic = wanted;
                    }
                    buffer.push(ch);
                }
            }
        }
        self.flush(&mut buffer, italic);
    }
}

/// Length in chars of a leading ability word: text up to and including the
/// first em-dash or hyphen plus the whitespace after it. At least one
/// non-dash character must precede the dash.
#[must_use]
pub fn ability_word_len(segment: &str) -> usize {
    let is_dash = |c: char| c == '\u{2014}' || c == '-';
    let Some(dash) = segment.chars().position(is_dash) else {
        return 0;
    };
    if dash == 0 {
        return 0;
    }
    let trailing = segment
        .chars()
        .skip(dash + 1)
        .take_while(|c| c.is_whitespace())
        .count();
    dash + 1 + trailing
}

/// Place oracle text starting at `origin` (top-left) within `max_width`.
pub fn flow_rich_text<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    origin: (f64, f64),
    max_width: f64,
    style: &FlowStyle,
) -> TextFlow {
    flow_pieces(measurer, &parse_oracle_text(text), origin, max_width, style)
}

/// [`flow_rich_text`] over already parsed pieces.
pub fn flow_pieces<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    pieces: &[OraclePiece],
    origin: (f64, f64),
    max_width: f64,
    style: &FlowStyle,
) -> TextFlow {
    let mut cursor = Cursor {
        measurer,
        style,
        x: origin.0,
        baseline: origin.1 + style.font_size,
        line_start: origin.0,
        right_edge: origin.0 + max_width,
        at_line_start: true,
        in_paren: false,
        items: Vec::new(),
    };

    for piece in pieces {
        match piece {
            OraclePiece::Text(text) => {
                for (index, segment) in text.split('\n').enumerate() {
                    if index > 0 {
                        cursor.newline();
                    }
                    cursor.segment(segment);
                }
            }
            OraclePiece::Symbol(symbol) => cursor.symbol(symbol),
        }
    }

    let height = cursor.baseline - origin.1 + style.font_size * DESCENT;
    TextFlow {
        items: cursor.items,
        height,
    }
}

/// Height of the flow without keeping the placements.
pub fn measure_rich_text<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    max_width: f64,
    style: &FlowStyle,
) -> f64 {
    flow_rich_text(measurer, text, (0.0, 0.0), max_width, style).height
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::ManaSymbolKind;

    /// Every char is half the font size wide; italics add nothing.
    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn text_width(&mut self, font: &FontSpec, text: &str) -> f64 {
            text.chars().count() as f64 * font.size * 0.5
        }
    }

    fn style(size: f64) -> FlowStyle {
        FlowStyle {
            font_size: size,
            font_family: String::from("Georgia, serif"),
            symbol_gap: 7.0,
        }
    }

    fn words(flow: &TextFlow) -> Vec<(String, f64, bool)> {
        flow.items
            .iter()
            .filter_map(|item| match item {
                FlowItem::Word {
                    text,
                    baseline,
                    italic,
                    ..
                } => Some((text.clone(), *baseline, *italic)),
                FlowItem::Symbol { .. } => None,
            })
            .collect()
    }

    #[test]
    fn explicit_newline_uses_wide_leading() {
        let flow = flow_rich_text(&mut HalfEm, "Flying\nVigilance", (10.0, 100.0), 500.0, &style(20.0));
        let placed = words(&flow);
        assert_eq!(placed[0].1, 120.0);
        assert_eq!(placed[1].1, 120.0 + 1.55 * 20.0);
        assert!((flow.height - (20.0 + 31.0 + 6.0)).abs() < 1e-9);
    }

    #[test]
    fn long_text_wraps_with_narrow_leading() {
        // "aaaa " is 50px wide at size 20; three of them do not fit in 120px.
        let flow = flow_rich_text(&mut HalfEm, "aaaa bbbb cccc", (0.0, 0.0), 120.0, &style(20.0));
        let placed = words(&flow);
        assert_eq!(placed[0].1, 20.0);
        assert_eq!(placed[1].1, 20.0);
        assert_eq!(placed[2].1, 20.0 + 22.0);
        match &flow.items[2] {
            FlowItem::Word { x, .. } => assert_eq!(*x, 0.0),
            FlowItem::Symbol { .. } => panic!("expected a word"),
        }
    }

    #[test]
    fn overlong_word_at_line_start_does_not_wrap() {
        let flow = flow_rich_text(&mut HalfEm, "Supercalifragilistic", (0.0, 0.0), 20.0, &style(20.0));
        assert_eq!(words(&flow)[0].1, 20.0);
        assert!((flow.height - 26.0).abs() < 1e-9);
    }

    #[test]
    fn symbols_are_placed_inline() {
        let flow = flow_rich_text(&mut HalfEm, "{T}: Add {G}.", (0.0, 0.0), 1000.0, &style(20.0));
        let symbols: Vec<_> = flow.symbols().cloned().collect();
        assert_eq!(
            symbols,
            vec![
                ParsedManaSymbol::new(ManaSymbolKind::Tap, "T"),
                ParsedManaSymbol::new(ManaSymbolKind::Mana, "G"),
            ]
        );
        match &flow.items[0] {
            FlowItem::Symbol { x, y, size, .. } => {
                assert_eq!(*x, 0.0);
                assert_eq!(*size, 20.0);
                assert!((*y - (20.0 - 6.4 - 10.0)).abs() < 1e-9);
            }
            FlowItem::Word { .. } => panic!("expected a symbol"),
        }
        match &flow.items[1] {
            FlowItem::Word { x, text, .. } => {
                assert_eq!(*x, 27.0);
                assert_eq!(text, ": ");
            }
            FlowItem::Symbol { .. } => panic!("expected a word"),
        }
    }

    #[test]
    fn parenthesized_reminder_is_italic() {
        let flow = flow_rich_text(
            &mut HalfEm,
            "Flying (This creature can't be blocked.)",
            (0.0, 0.0),
            10_000.0,
            &style(10.0),
        );
        let placed = words(&flow);
        assert!(!placed[0].2);
        assert!(placed[1..].iter().all(|(_, _, italic)| *italic));
        assert_eq!(placed[1].0, "(This ");
        assert_eq!(placed.last().map(|w| w.0.as_str()), Some("blocked.) "));
    }

    #[test]
    fn ability_word_is_italic_at_line_start() {
        let flow = flow_rich_text(
            &mut HalfEm,
            "Landfall \u{2014} Whenever a land enters",
            (0.0, 0.0),
            10_000.0,
            &style(10.0),
        );
        let placed = words(&flow);
        assert_eq!(placed[0], (String::from("Landfall "), 10.0, true));
        assert_eq!(placed[1].0, "\u{2014} ");
        assert!(placed[1].2);
        assert!(!placed[2].2);
    }

    #[test]
    fn ability_word_after_symbol_is_not_detected() {
        let flow = flow_rich_text(&mut HalfEm, "{T}: Add one-shot", (0.0, 0.0), 10_000.0, &style(10.0));
        assert!(words(&flow).iter().all(|(_, _, italic)| !*italic));
    }

    #[test]
    fn ability_word_length_rules() {
        assert_eq!(ability_word_len("Raid \u{2014} When"), 7);
        assert_eq!(ability_word_len("- leading dash"), 0);
        assert_eq!(ability_word_len("Flying"), 0);
        assert_eq!(ability_word_len("two-headed"), 4);
    }

    #[test]
    fn measure_matches_flow_height() {
        let text = "Landfall \u{2014} Whenever a land enters, gain 1 life.\n{2}{G}: Draw a card.";
        let style = style(18.0);
        let measured = measure_rich_text(&mut HalfEm, text, 240.0, &style);
        let flowed = flow_rich_text(&mut HalfEm, text, (33.0, 71.0), 240.0, &style);
        assert!((measured - flowed.height).abs() < 1e-9);
    }
}
