//! Physical card geometry and the coordinate systems built on it.
//!
//! Layout percentages are stored relative to the *full* canvas, which
//! includes a bleed margin on every side. The preview and export show the
//! *card* area only, so converting between the two needs the margin in
//! inches. [`DisplayMapping`] is the single place where that happens.

use serde::{Deserialize, Serialize};

use crate::TextPosition;

/// Resolution at which font sizes are authored.
pub const BASE_DPI: f64 = 72.0;
pub const CARD_WIDTH_INCHES: f64 = 2.5;
pub const CARD_HEIGHT_INCHES: f64 = 3.5;
/// Bleed margin on each side of the full canvas.
pub const MARGIN_MM: f64 = 5.0;
pub const MM_PER_INCH: f64 = 25.4;
pub const DEFAULT_DPI: u32 = 300;
pub const DPI_PRESETS: [u32; 4] = [150, 300, 500, 800];

/// Multiplier from base-DPI sizes to pixels at `dpi`.
#[must_use]
pub fn scale_factor(dpi: u32) -> f64 {
    f64::from(dpi) / BASE_DPI
}

#[must_use]
pub fn margin_inches() -> f64 {
    MARGIN_MM / MM_PER_INCH
}

/// Millimeters to whole pixels at `dpi`.
#[must_use]
pub fn mm_to_pixels(mm: f64, dpi: u32) -> u32 {
    let pixels = (mm / MM_PER_INCH * f64::from(dpi)).round();
    if pixels <= 0.0 { 0 } else { pixels as u32 }
}

/// The full bleed margin in pixels.
#[must_use]
pub fn margin_pixels(dpi: u32) -> u32 {
    mm_to_pixels(MARGIN_MM, dpi)
}

fn inches_to_pixels(inches: f64, dpi: u32) -> u32 {
    (inches * f64::from(dpi)).round() as u32
}

/// Pixel sizes of the card and the margin-inclusive canvas at one DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDimensions {
    pub dpi: u32,
    pub full_width: u32,
    pub full_height: u32,
    pub card_width: u32,
    pub card_height: u32,
    pub margin_pixels: u32,
}

impl CanvasDimensions {
    #[must_use]
    pub fn at_dpi(dpi: u32) -> Self {
        let card_width = inches_to_pixels(CARD_WIDTH_INCHES, dpi);
        let card_height = inches_to_pixels(CARD_HEIGHT_INCHES, dpi);
        let margin = margin_pixels(dpi);
        Self {
            dpi,
            full_width: card_width + 2 * margin,
            full_height: card_height + 2 * margin,
            card_width,
            card_height,
            margin_pixels: margin,
        }
    }

    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        scale_factor(self.dpi)
    }

    #[must_use]
    pub fn full_len(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => f64::from(self.full_width),
            Axis::Vertical => f64::from(self.full_height),
        }
    }
}

#[must_use]
pub fn percent_to_pixels(percent: f64, canvas_pixels: f64) -> f64 {
    percent / 100.0 * canvas_pixels
}

#[must_use]
pub fn pixels_to_percent(pixels: f64, canvas_pixels: f64) -> f64 {
    if canvas_pixels == 0.0 {
        0.0
    } else {
        pixels / canvas_pixels * 100.0
    }
}

/// Round to one decimal place, the precision of interactive edits.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    #[must_use]
    pub const fn card_inches(self) -> f64 {
        match self {
            Self::Horizontal => CARD_WIDTH_INCHES,
            Self::Vertical => CARD_HEIGHT_INCHES,
        }
    }

    #[must_use]
    pub fn full_inches(self) -> f64 {
        self.card_inches() + 2.0 * margin_inches()
    }
}

/// A percentage of the full (margin-inclusive) canvas, as stored in layouts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct FullPercent(pub f64);

/// Card-relative pixels on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct DisplayPixels(pub f64);

/// Converts between stored percentages and display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMapping {
    pub display_width: f64,
    pub display_height: f64,
}

impl DisplayMapping {
    #[must_use]
    pub const fn new(display_width: f64, display_height: f64) -> Self {
        Self {
            display_width,
            display_height,
        }
    }

    #[must_use]
    pub const fn display_len(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.display_width,
            Axis::Vertical => self.display_height,
        }
    }

    /// A stored coordinate on the display. The margin band is not shown, so
    /// its width is subtracted.
    #[must_use]
    pub fn position_to_display(&self, position: FullPercent, axis: Axis) -> DisplayPixels {
        let inches = position.0 / 100.0 * axis.full_inches() - margin_inches();
        DisplayPixels(inches / axis.card_inches() * self.display_len(axis))
    }

    /// A stored extent on the display. Extents are margin-independent.
    #[must_use]
    pub fn size_to_display(&self, size: FullPercent, axis: Axis) -> DisplayPixels {
        let inches = size.0 / 100.0 * axis.full_inches();
        DisplayPixels(inches / axis.card_inches() * self.display_len(axis))
    }

    #[must_use]
    pub fn display_to_position(&self, pixels: DisplayPixels, axis: Axis) -> FullPercent {
        let len = self.display_len(axis);
        if len == 0.0 {
            return FullPercent(0.0);
        }
        let inches = pixels.0 / len * axis.card_inches() + margin_inches();
        FullPercent(inches / axis.full_inches() * 100.0)
    }

    /// A pointer movement in display pixels as a change in stored percent.
    #[must_use]
    pub fn display_delta_to_percent(&self, delta: DisplayPixels, axis: Axis) -> f64 {
        let len = self.display_len(axis);
        if len == 0.0 {
            return 0.0;
        }
        delta.0 / len * axis.card_inches() / axis.full_inches() * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// A text position resolved to full-canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldGeometry {
    pub rect: PixelRect,
    /// Font size in pixels at the canvas DPI.
    pub font_size: f64,
}

impl FieldGeometry {
    #[must_use]
    pub fn resolve(position: &TextPosition, dims: &CanvasDimensions, scale: f64) -> Self {
        let width = f64::from(dims.full_width);
        let height = f64::from(dims.full_height);
        Self {
            rect: PixelRect {
                x: percent_to_pixels(position.x, width),
                y: percent_to_pixels(position.y, height),
                width: percent_to_pixels(position.width, width),
                height: percent_to_pixels(position.height, height),
            },
            font_size: position.font_size * scale,
        }
    }
}
