//! Debug overlay: labelled field boxes and the art anchor.

use std::f64::consts::PI;

use pf_core::geometry::{CanvasDimensions, FieldGeometry, percent_to_pixels};
use pf_core::{FieldKey, FontSpec, LayoutConfig};

use crate::context::{Canvas2dContext, TextAlign, TextBaseline};

const ART_RGB: (u8, u8, u8) = (128, 0, 255);

/// Outline colour per field.
#[must_use]
pub const fn field_rgb(field: FieldKey) -> (u8, u8, u8) {
    match field {
        FieldKey::Name => (255, 0, 0),
        FieldKey::ManaCost => (0, 255, 0),
        FieldKey::TypeLine => (0, 0, 255),
        FieldKey::OracleText => (255, 255, 0),
        FieldKey::FlavorText => (255, 0, 255),
        FieldKey::PowerToughness => (0, 255, 255),
        FieldKey::Loyalty => (255, 128, 0),
        FieldKey::Artist | FieldKey::Copyright => (128, 128, 128),
    }
}

fn rgba((r, g, b): (u8, u8, u8), alpha: f64) -> String {
    format!("rgba({r}, {g}, {b}, {alpha})")
}

/// Draw every configured text box and the art anchor crosshair on the full
/// surface.
pub fn draw_debug_overlay<C: Canvas2dContext + ?Sized>(
    ctx: &mut C,
    layout: &LayoutConfig,
    dims: &CanvasDimensions,
) {
    let scale = dims.scale_factor();
    ctx.save();
    ctx.set_line_width(scale * 2.0 / 3.0);

    let anchor = layout.art_anchor();
    let cx = percent_to_pixels(anchor.center_x, f64::from(dims.full_width));
    let cy = percent_to_pixels(anchor.center_y, f64::from(dims.full_height));
    let radius = 10.0 * scale;
    ctx.set_stroke_style(&rgba(ART_RGB, 0.8));
    ctx.begin_path();
    ctx.arc(cx, cy, radius, 0.0, PI * 2.0);
    ctx.stroke();
    ctx.begin_path();
    ctx.move_to(cx - radius * 2.0, cy);
    ctx.line_to(cx + radius * 2.0, cy);
    ctx.move_to(cx, cy - radius * 2.0);
    ctx.line_to(cx, cy + radius * 2.0);
    ctx.stroke();
    ctx.set_fill_style(&rgba(ART_RGB, 1.0));
    ctx.set_font(&FontSpec::new("sans-serif", 6.0 * scale).bold(true).css());
    ctx.set_text_align(TextAlign::Left);
    ctx.set_text_baseline(TextBaseline::Middle);
    ctx.fill_text("ART CENTER", cx + radius * 2.0, cy);

    let label_font = FontSpec::new("sans-serif", 5.0 * scale).bold(true).css();
    ctx.set_text_baseline(TextBaseline::Top);
    for (field, position) in &layout.text_positions {
        let rect = FieldGeometry::resolve(position, dims, scale).rect;
        let color = field_rgb(*field);
        ctx.set_stroke_style(&rgba(color, 0.8));
        ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
        ctx.set_fill_style(&rgba(color, 1.0));
        ctx.set_font(&label_font);
        ctx.fill_text(&field.as_str().to_uppercase(), rect.x + 2.0, rect.y + 2.0);
    }
    ctx.restore();
}
