#![forbid(unsafe_code)]

//! Typography for card proxies: rich oracle text flow, shrink-to-fit and
//! the placement of cost symbols and single-line fields.
//!
//! Everything here is backend independent. Widths come from a
//! [`pf_core::TextMeasurer`], so the same layout drives the browser canvas,
//! the SVG backend and the CLI's estimates.

mod fit;
mod flow;
mod placement;

pub use fit::{
    BODY_FIT_STEP, BODY_GAP, BodyBlock, BodyBlockFit, FLAVOR_LINE_HEIGHT, FlavorBlock,
    LINE_FIT_STEP, MIN_FONT_RATIO, fit_body_block, fit_text_to_width, layout_flavor, wrap_words,
};
pub use flow::{
    FlowItem, FlowStyle, INLINE_SYMBOL_SCALE, NEWLINE_LEADING, TextFlow, WRAP_LEADING,
    ability_word_len, flow_pieces, flow_rich_text, measure_rich_text,
};
pub use placement::{
    COST_SYMBOL_SCALE, COST_SYMBOL_SPACING, LinePlacement, PlacedSymbol, SymbolRow,
    fit_single_line, layout_mana_cost, place_single_line,
};
