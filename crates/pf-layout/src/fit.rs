//! Shrink-to-fit for single lines and the oracle/flavor body block.

use pf_core::geometry::PixelRect;
use pf_core::{FontSpec, TextMeasurer, VerticalAlign};
use serde::Serialize;

use crate::flow::{FlowStyle, TextFlow, flow_rich_text, measure_rich_text};

/// Smallest size any fitted text may reach, as a share of its base size.
pub const MIN_FONT_RATIO: f64 = 0.5;
/// Decrement used when shrinking a single line.
pub const LINE_FIT_STEP: f64 = 0.5;
/// Decrement used when shrinking the body block.
pub const BODY_FIT_STEP: f64 = 1.0;
/// Flavor line height, in font sizes.
pub const FLAVOR_LINE_HEIGHT: f64 = 1.3;
/// Space between oracle and flavor text, in font sizes.
pub const BODY_GAP: f64 = 1.5;

/// Largest size in half-pixel steps from `font.size` down at which `text`
/// fits `max_width`, never below half the base size.
pub fn fit_text_to_width<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    max_width: f64,
    font: &FontSpec,
) -> f64 {
    let min = font.size * MIN_FONT_RATIO;
    let mut size = font.size;
    while size > min {
        if measurer.text_width(&font.with_size(size), text) <= max_width {
            return size;
        }
        size -= LINE_FIT_STEP;
    }
    min
}

/// Greedy space-separated word wrap. A word wider than `max_width` gets a
/// line of its own. Explicit newlines start new paragraphs and a blank
/// paragraph yields an empty line.
pub fn wrap_words<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    font: &FontSpec,
    text: &str,
    max_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut produced = false;
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measurer.text_width(font, &candidate) > max_width && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                produced = true;
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() || !produced {
            lines.push(current);
        }
    }
    lines
}

/// Wrapped flavor text, italic, drawn from a top baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlavorBlock {
    pub lines: Vec<String>,
    pub font: FontSpec,
    pub line_height: f64,
    pub height: f64,
}

impl FlavorBlock {
    /// Top of each line when the block starts at `top`.
    pub fn line_tops(&self, top: f64) -> impl Iterator<Item = (f64, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(move |(index, line)| (top + index as f64 * self.line_height, line.as_str()))
    }
}

pub fn layout_flavor<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    max_width: f64,
    font_size: f64,
    family: &str,
) -> FlavorBlock {
    let font = FontSpec::new(family, font_size).italic(true);
    let lines = wrap_words(measurer, &font, text, max_width);
    let line_height = font_size * FLAVOR_LINE_HEIGHT;
    FlavorBlock {
        height: lines.len() as f64 * line_height,
        lines,
        font,
        line_height,
    }
}

/// Inputs of the shared oracle/flavor fit. Both texts use one font size.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyBlock<'a> {
    pub oracle: Option<&'a str>,
    pub flavor: Option<&'a str>,
    /// The oracle box; it bounds both texts.
    pub rect: PixelRect,
    pub base_font_size: f64,
    pub oracle_family: &'a str,
    pub flavor_family: &'a str,
    pub symbol_gap: f64,
    pub vertical_align: VerticalAlign,
}

impl BodyBlock<'_> {
    fn style(&self, font_size: f64) -> FlowStyle {
        FlowStyle {
            font_size,
            font_family: self.oracle_family.to_string(),
            symbol_gap: self.symbol_gap,
        }
    }

    fn total_height<M: TextMeasurer + ?Sized>(&self, measurer: &mut M, font_size: f64) -> f64 {
        let mut total = 0.0;
        if let Some(oracle) = self.oracle {
            total += measure_rich_text(measurer, oracle, self.rect.width, &self.style(font_size));
        }
        if let Some(flavor) = self.flavor {
            if self.oracle.is_some() {
                total += font_size * BODY_GAP;
            }
            total += layout_flavor(measurer, flavor, self.rect.width, font_size, self.flavor_family)
                .height;
        }
        total
    }
}

/// Where everything in the body block goes once fitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyBlockFit {
    pub font_size: f64,
    pub total_height: f64,
    /// Top of the block after vertical alignment.
    pub start_y: f64,
    pub oracle: Option<TextFlow>,
    /// Vertical center of the separator between oracle and flavor.
    pub divider_y: Option<f64>,
    /// Top of the first flavor line.
    pub flavor_y: Option<f64>,
    pub flavor: Option<FlavorBlock>,
}

/// Shrink oracle and flavor together in whole-pixel steps until the block
/// fits the box height, never below half the base size, then align it.
pub fn fit_body_block<M: TextMeasurer + ?Sized>(measurer: &mut M, block: &BodyBlock<'_>) -> BodyBlockFit {
    let min = block.base_font_size * MIN_FONT_RATIO;
    let available = block.rect.height;
    let mut size = block.base_font_size;
    while size > min {
        if block.total_height(measurer, size) <= available {
            break;
        }
        size -= BODY_FIT_STEP;
    }
    let font_size = size.max(min);
    let total_height = block.total_height(measurer, font_size);
    let start_y = block.rect.y + block.vertical_align.offset(available, total_height);
    tracing::trace!(
        base = block.base_font_size,
        fitted = font_size,
        total_height,
        available,
        "fitted body block"
    );

    let oracle = block.oracle.map(|text| {
        flow_rich_text(
            measurer,
            text,
            (block.rect.x, start_y),
            block.rect.width,
            &block.style(font_size),
        )
    });
    let gap = font_size * BODY_GAP;
    let oracle_end = oracle.as_ref().map(|flow| start_y + flow.height);

    let flavor = block.flavor.map(|text| {
        layout_flavor(measurer, text, block.rect.width, font_size, block.flavor_family)
    });
    let (divider_y, flavor_y) = match (oracle_end, &flavor) {
        (Some(end), Some(_)) => (Some(end + gap / 2.0), Some(end + gap)),
        (None, Some(_)) => (None, Some(start_y)),
        (_, None) => (None, None),
    };

    BodyBlockFit {
        font_size,
        total_height,
        start_y,
        oracle,
        divider_y,
        flavor_y,
        flavor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::FontMetrics;
    use proptest::prelude::*;

    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn text_width(&mut self, font: &FontSpec, text: &str) -> f64 {
            text.chars().count() as f64 * font.size * 0.5
        }
    }

    fn body<'a>(oracle: Option<&'a str>, flavor: Option<&'a str>, rect: PixelRect) -> BodyBlock<'a> {
        BodyBlock {
            oracle,
            flavor,
            rect,
            base_font_size: 20.0,
            oracle_family: "Georgia, serif",
            flavor_family: "Georgia, serif",
            symbol_gap: 7.0,
            vertical_align: VerticalAlign::Top,
        }
    }

    #[test]
    fn line_that_fits_keeps_base_size() {
        let font = FontSpec::new("Georgia, serif", 20.0);
        assert_eq!(fit_text_to_width(&mut HalfEm, "abcd", 40.0, &font), 20.0);
    }

    #[test]
    fn line_shrinks_in_half_steps() {
        // Ten chars need size <= 16 to fit 80px.
        let font = FontSpec::new("Georgia, serif", 20.0);
        assert_eq!(fit_text_to_width(&mut HalfEm, "abcdefghij", 80.0, &font), 16.0);
    }

    #[test]
    fn line_never_goes_below_half() {
        let font = FontSpec::new("Georgia, serif", 25.0);
        assert_eq!(fit_text_to_width(&mut HalfEm, "a very long card name indeed", 10.0, &font), 12.5);
    }

    #[test]
    fn wrap_breaks_between_words() {
        let font = FontSpec::new("Georgia, serif", 10.0);
        // 5px per char, 40px fits eight chars.
        let lines = wrap_words(&mut HalfEm, &font, "one two three four", 40.0);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn wrap_keeps_overlong_word_alone() {
        let font = FontSpec::new("Georgia, serif", 10.0);
        let lines = wrap_words(&mut HalfEm, &font, "a enormousword b", 20.0);
        assert_eq!(lines, vec!["a", "enormousword", "b"]);
    }

    #[test]
    fn wrap_respects_paragraphs() {
        let font = FontSpec::new("Georgia, serif", 10.0);
        let lines = wrap_words(&mut HalfEm, &font, "first\n\nsecond", 400.0);
        assert_eq!(lines, vec!["first", "", "second"]);
        assert!(wrap_words(&mut HalfEm, &font, "", 400.0).is_empty());
    }

    #[test]
    fn flavor_block_height_counts_lines() {
        let flavor = layout_flavor(&mut HalfEm, "one two three four", 40.0, 10.0, "Georgia, serif");
        assert!(flavor.font.italic);
        assert_eq!(flavor.lines.len(), 3);
        assert!((flavor.height - 39.0).abs() < 1e-9);
        let tops: Vec<f64> = flavor.line_tops(100.0).map(|(top, _)| top).collect();
        assert_eq!(tops, vec![100.0, 113.0, 126.0]);
    }

    #[test]
    fn body_fits_without_shrinking_when_room() {
        let block = body(Some("Flying"), Some("Soar."), PixelRect::new(10.0, 200.0, 400.0, 400.0));
        let fit = fit_body_block(&mut HalfEm, &block);
        assert_eq!(fit.font_size, 20.0);
        // oracle 1.3fs, gap 1.5fs, flavor 1.3fs
        assert!((fit.total_height - 82.0).abs() < 1e-9);
        assert_eq!(fit.start_y, 200.0);
        assert!(fit.divider_y.is_some_and(|y| (y - 241.0).abs() < 1e-9));
        assert!(fit.flavor_y.is_some_and(|y| (y - 256.0).abs() < 1e-9));
    }

    #[test]
    fn body_shrinks_to_fit_height() {
        let block = body(Some("Flying\nVigilance\nTrample"), None, PixelRect::new(0.0, 0.0, 400.0, 60.0));
        let fit = fit_body_block(&mut HalfEm, &block);
        // height = fs * (1 + 2 * 1.55 + 0.3) = 4.4 fs, which needs fs <= 13.6.
        assert_eq!(fit.font_size, 13.0);
        assert!(fit.total_height <= 60.0);
        assert!(fit.divider_y.is_none());
    }

    #[test]
    fn body_floor_is_half_base() {
        let block = body(Some("x\nx\nx\nx\nx\nx\nx\nx"), None, PixelRect::new(0.0, 0.0, 400.0, 10.0));
        let fit = fit_body_block(&mut HalfEm, &block);
        assert_eq!(fit.font_size, 10.0);
        assert!(fit.total_height > 10.0);
    }

    #[test]
    fn flavor_only_starts_at_block_top() {
        let mut block = body(None, Some("Quiet."), PixelRect::new(0.0, 100.0, 400.0, 100.0));
        block.vertical_align = VerticalAlign::Bottom;
        let fit = fit_body_block(&mut HalfEm, &block);
        assert!(fit.oracle.is_none());
        assert!(fit.divider_y.is_none());
        assert!((fit.start_y - (200.0 - 26.0)).abs() < 1e-9);
        assert_eq!(fit.flavor_y, Some(fit.start_y));
    }

    #[test]
    fn centered_body_is_offset_by_half_the_slack() {
        let mut block = body(Some("Flying"), None, PixelRect::new(0.0, 0.0, 400.0, 100.0));
        block.vertical_align = VerticalAlign::Center;
        let fit = fit_body_block(&mut HalfEm, &block);
        assert!((fit.start_y - 37.0).abs() < 1e-9);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_line_fit_is_bounded(text in "[a-zA-Z ]{1,40}", base in 8.0f64..60.0, width in 10.0f64..600.0) {
            let font = FontSpec::new("Georgia, serif", base);
            let mut metrics = FontMetrics::new();
            let fitted = fit_text_to_width(&mut metrics, &text, width, &font);
            prop_assert!(fitted <= base);
            prop_assert!(fitted >= base * MIN_FONT_RATIO);
            if fitted > base * MIN_FONT_RATIO {
                prop_assert!(metrics.text_width(&font.with_size(fitted), &text) <= width);
            }
        }

        #[test]
        fn prop_wider_box_never_shrinks_more(text in "[a-z ]{1,30}", width in 10.0f64..300.0, extra in 0.0f64..300.0) {
            let font = FontSpec::new("Georgia, serif", 24.0);
            let narrow = fit_text_to_width(&mut HalfEm, &text, width, &font);
            let wide = fit_text_to_width(&mut HalfEm, &text, width + extra, &font);
            prop_assert!(wide >= narrow);
        }

        #[test]
        fn prop_body_fit_is_bounded(
            oracle in "[a-z {}GTU\\n]{0,80}",
            height in 20.0f64..400.0,
        ) {
            let block = body(Some(&oracle), Some("Flavor line"), PixelRect::new(0.0, 0.0, 300.0, height));
            let fit = fit_body_block(&mut HalfEm, &block);
            prop_assert!(fit.font_size <= 20.0);
            prop_assert!(fit.font_size >= 10.0);
            if fit.font_size > 10.0 {
                prop_assert!(fit.total_height <= height + 1e-9);
            }
        }
    }
}
