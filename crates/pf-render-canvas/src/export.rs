//! Cropping the full surface for export.

use pf_core::RenderError;
use pf_core::geometry::{CanvasDimensions, mm_to_pixels};
use serde::Serialize;

use crate::context::{Canvas2dContext, SurfaceFactory};

/// Largest bleed an export may keep; the full surface has no more.
pub const MAX_EXPORT_MARGIN_MM: f64 = pf_core::geometry::MARGIN_MM;

/// The rectangle of the full surface that an export keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportCrop {
    /// Pixels removed from every side of the full surface.
    pub crop: u32,
    pub width: u32,
    pub height: u32,
    /// Bleed kept around the card, in pixels.
    pub export_margin: u32,
}

/// Crop for keeping `margin_mm` of bleed, clamped to `0..=5` mm.
#[must_use]
pub fn export_crop(dims: &CanvasDimensions, margin_mm: f64) -> ExportCrop {
    let margin_mm = if margin_mm.is_finite() {
        margin_mm.clamp(0.0, MAX_EXPORT_MARGIN_MM)
    } else {
        0.0
    };
    let export_margin = mm_to_pixels(margin_mm, dims.dpi).min(dims.margin_pixels);
    let crop = dims.margin_pixels - export_margin;
    ExportCrop {
        crop,
        width: dims.full_width - 2 * crop,
        height: dims.full_height - 2 * crop,
        export_margin,
    }
}

/// `<name>.png` with every character outside ASCII letters and digits
/// replaced by an underscore.
#[must_use]
pub fn export_file_name(card_name: &str) -> String {
    let stem: String = card_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.png")
}

/// Copy the kept rectangle of `full` onto a new surface.
pub fn export_surface<F>(
    factory: &mut F,
    full: &F::Surface,
    dims: &CanvasDimensions,
    margin_mm: f64,
) -> Result<F::Surface, RenderError>
where
    F: SurfaceFactory,
{
    let crop = export_crop(dims, margin_mm);
    let mut target = factory.create(crop.width, crop.height)?;
    let offset = f64::from(crop.crop);
    let (width, height) = (f64::from(crop.width), f64::from(crop.height));
    target.draw_surface(full, offset, offset, width, height, 0.0, 0.0, width, height);
    tracing::debug!(
        width = crop.width,
        height = crop.height,
        margin_mm,
        "exported card surface"
    );
    Ok(target)
}
