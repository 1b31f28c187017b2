//! Geometry and typography reports for the `dims`, `fit` and `cost` commands.
//!
//! Widths come from the deterministic [`FontMetrics`] estimator, so reports
//! are stable across machines but only approximate a real font.

use pf_core::geometry::{CanvasDimensions, FieldGeometry, PixelRect};
use pf_core::{
    Align, FieldKey, FontMetrics, FontSpec, LayoutConfig, TextMeasurer, TextPosition,
    VerticalAlign,
};
use pf_layout::{SymbolRow, fit_single_line, layout_mana_cost};
use pf_parser::parse_mana_string;
use pf_render_canvas::{ExportCrop, export_crop};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InspectError {
    #[error("layout '{layout}' has no position for field '{field}'")]
    MissingField { layout: String, field: &'static str },
    #[error("'{0}' contains no mana symbols")]
    EmptyCost(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionsReport {
    #[serde(flatten)]
    pub canvas: CanvasDimensions,
    pub scale_factor: f64,
    pub margin_mm: f64,
    pub export: ExportCrop,
}

#[must_use]
pub fn dimensions_report(dpi: u32, margin_mm: f64) -> DimensionsReport {
    let canvas = CanvasDimensions::at_dpi(dpi);
    DimensionsReport {
        scale_factor: canvas.scale_factor(),
        margin_mm,
        export: export_crop(&canvas, margin_mm),
        canvas,
    }
}

/// A single line fitted into a field box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitReport {
    pub field: Option<&'static str>,
    pub text: String,
    pub family: String,
    pub box_width: f64,
    pub base_size: f64,
    pub fitted_size: f64,
    pub text_width: f64,
    pub shrunk: bool,
    pub x: f64,
    pub y: f64,
}

fn field_position<'a>(
    layout: &'a LayoutConfig,
    field: FieldKey,
) -> Result<&'a TextPosition, InspectError> {
    layout
        .position(field)
        .ok_or_else(|| InspectError::MissingField {
            layout: layout.name.clone(),
            field: field.as_str(),
        })
}

/// Fit `text` into a free-standing box of `rect`.
#[must_use]
pub fn fit_in_rect(text: &str, font: &FontSpec, rect: PixelRect, align: Align) -> FitReport {
    let mut metrics = FontMetrics::new();
    let placed = fit_single_line(&mut metrics, text, rect, font, align, VerticalAlign::Top);
    FitReport {
        field: None,
        text: text.to_string(),
        family: font.family.clone(),
        box_width: rect.width,
        base_size: font.size,
        fitted_size: placed.font.size,
        text_width: metrics.text_width(&placed.font, text),
        shrunk: placed.font.size < font.size,
        x: placed.x,
        y: placed.y,
    }
}

/// Fit `text` into a layout field the way the renderer does.
pub fn fit_field(
    layout: &LayoutConfig,
    field: FieldKey,
    text: &str,
    dpi: u32,
    default_family: &str,
    bold: bool,
) -> Result<FitReport, InspectError> {
    let position = field_position(layout, field)?;
    let dims = CanvasDimensions::at_dpi(dpi);
    let geometry = FieldGeometry::resolve(position, &dims, dims.scale_factor());
    let family = position
        .font_family
        .as_deref()
        .filter(|family| !family.is_empty())
        .unwrap_or(default_family);
    let font = FontSpec::new(family, geometry.font_size).bold(bold);
    let align = position.align.unwrap_or(field.default_align());
    let mut report = fit_in_rect(text, &font, geometry.rect, align);
    report.field = Some(field.as_str());
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub cost: String,
    pub dpi: u32,
    pub field_rect: PixelRect,
    #[serde(flatten)]
    pub row: SymbolRow,
    /// The row is wider than the field box.
    pub overflows: bool,
}

/// Place a mana cost in the layout's cost box.
pub fn cost_report(layout: &LayoutConfig, cost: &str, dpi: u32) -> Result<CostReport, InspectError> {
    let symbols = parse_mana_string(cost);
    if symbols.is_empty() {
        return Err(InspectError::EmptyCost(cost.to_string()));
    }
    let position = field_position(layout, FieldKey::ManaCost)?;
    let dims = CanvasDimensions::at_dpi(dpi);
    let scale = dims.scale_factor();
    let geometry = FieldGeometry::resolve(position, &dims, scale);
    let row = layout_mana_cost(
        &symbols,
        geometry.rect,
        geometry.font_size,
        scale,
        position.align.unwrap_or(Align::Right),
        position.vertical_align.unwrap_or(VerticalAlign::Top),
    );
    Ok(CostReport {
        cost: cost.to_string(),
        dpi,
        field_rect: geometry.rect,
        overflows: row.total_width > geometry.rect.width,
        row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::default_layout;

    #[test]
    fn dimensions_at_300_dpi_without_bleed() {
        let report = dimensions_report(300, 0.0);
        assert_eq!(report.canvas.card_width, 750);
        assert_eq!(report.canvas.card_height, 1050);
        assert_eq!((report.export.width, report.export.height), (750, 1050));
        assert!((report.scale_factor - 300.0 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn full_bleed_exports_the_whole_canvas() {
        let report = dimensions_report(300, 5.0);
        assert_eq!(report.export.width, report.canvas.full_width);
        assert_eq!(report.export.crop, 0);
    }

    #[test]
    fn long_names_shrink_short_names_do_not() {
        let layout = default_layout();
        let short = fit_field(&layout, FieldKey::Name, "Opt", 300, "serif", true).expect("fit");
        assert!(!short.shrunk);
        assert_eq!(short.fitted_size, short.base_size);

        let long = fit_field(
            &layout,
            FieldKey::Name,
            "Asmoranomardicadaistinaculdacar, the Unbearably Verbose",
            300,
            "serif",
            true,
        )
        .expect("fit");
        assert!(long.shrunk);
        assert!(long.fitted_size < long.base_size);
        assert!(long.fitted_size >= long.base_size * 0.5);
    }

    #[test]
    fn missing_field_is_reported() {
        let layout = default_layout();
        let err = fit_field(&layout, FieldKey::Loyalty, "3", 300, "serif", false)
            .expect_err("no loyalty box");
        assert_eq!(
            err,
            InspectError::MissingField {
                layout: String::from("New Border"),
                field: "loyalty",
            }
        );
    }

    #[test]
    fn cost_row_is_right_aligned_in_its_box() {
        let report = cost_report(&default_layout(), "{1}{U}{U}", 300).expect("cost");
        assert_eq!(report.row.symbols.len(), 3);
        let last = report.row.symbols.last().expect("symbol");
        let right_edge = report.field_rect.x + report.field_rect.width;
        assert!((last.x + last.size - right_edge).abs() < 1e-6);
        assert!(!report.overflows);
    }

    #[test]
    fn empty_cost_is_rejected() {
        let err = cost_report(&default_layout(), "free", 300).expect_err("no symbols");
        assert_eq!(err, InspectError::EmptyCost(String::from("free")));
    }
}
