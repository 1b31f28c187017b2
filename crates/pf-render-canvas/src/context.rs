//! Canvas2D context abstraction.
//!
//! The card renderer draws through [`Canvas2dContext`], implemented by the
//! browser's `CanvasRenderingContext2d`, by the SVG surface used for native
//! output, and by [`MockCanvas2dContext`], which records every call.

use pf_core::{Align, FontMetrics, FontSpec, RenderError, TextMeasurer};

/// Text alignment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl From<Align> for TextAlign {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => Self::Left,
            Align::Center => Self::Center,
            Align::Right => Self::Right,
        }
    }
}

/// Text baseline options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
}

impl TextBaseline {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Alphabetic => "alphabetic",
        }
    }
}

/// Text measurement result.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Radial {
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    },
}

/// A canvas gradient description, materialized by each backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    #[must_use]
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            kind: GradientKind::Linear { x0, y0, x1, y1 },
            stops: Vec::new(),
        }
    }

    #[must_use]
    pub fn radial(x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Self {
        Self {
            kind: GradientKind::Radial {
                x0,
                y0,
                r0,
                x1,
                y1,
                r1,
            },
            stops: Vec::new(),
        }
    }

    #[must_use]
    pub fn stop(mut self, offset: f64, color: impl Into<String>) -> Self {
        self.stops.push(ColorStop {
            offset,
            color: color.into(),
        });
        self
    }
}

/// A decoded image a context can draw.
pub trait ImageSource {
    fn natural_width(&self) -> f64;
    fn natural_height(&self) -> f64;
}

/// Trait for Canvas2D-like drawing contexts.
pub trait Canvas2dContext {
    type Image: ImageSource + Clone;

    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn save(&mut self);
    fn restore(&mut self);

    fn set_fill_style(&mut self, color: &str);
    fn set_fill_gradient(&mut self, gradient: &Gradient);
    fn set_stroke_style(&mut self, color: &str);
    fn set_stroke_gradient(&mut self, gradient: &Gradient);
    fn set_line_width(&mut self, width: f64);

    /// Set the font from a CSS `font` shorthand.
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    /// Measure with the current font.
    fn measure_text(&self, text: &str) -> TextMetrics;

    fn set_shadow_blur(&mut self, blur: f64);
    fn set_shadow_color(&mut self, color: &str);
    fn set_shadow_offset(&mut self, x: f64, y: f64);

    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64);

    /// Copy the `(sx, sy, sw, sh)` region of another surface of the same
    /// backend into `(dx, dy, dw, dh)`.
    #[allow(clippy::too_many_arguments)]
    fn draw_surface(
        &mut self,
        source: &Self,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    );

    /// Clear shadow state so later layers draw flat.
    fn reset_shadow(&mut self) {
        self.set_shadow_color("transparent");
        self.set_shadow_blur(0.0);
        self.set_shadow_offset(0.0, 0.0);
    }
}

/// Creates offscreen surfaces for a backend.
pub trait SurfaceFactory {
    type Surface: Canvas2dContext;

    fn create(&mut self, width: u32, height: u32) -> Result<Self::Surface, RenderError>;
}

/// Measures text through a context so layout sees the real font engine.
pub struct ContextMeasurer<'a, C: ?Sized>(pub &'a mut C);

impl<C: Canvas2dContext + ?Sized> TextMeasurer for ContextMeasurer<'_, C> {
    fn text_width(&mut self, font: &FontSpec, text: &str) -> f64 {
        self.0.set_font(&font.css());
        self.0.measure_text(text).width
    }
}

// ============================================================================
// Recording mock
// ============================================================================

/// Image handle for [`MockCanvas2dContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockImage {
    pub url: String,
    pub width: f64,
    pub height: f64,
}

impl ImageSource for MockImage {
    fn natural_width(&self) -> f64 {
        self.width
    }

    fn natural_height(&self) -> f64 {
        self.height
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOperation {
    Save,
    Restore,
    SetFillStyle(String),
    SetFillGradient(Gradient),
    SetStrokeStyle(String),
    SetStrokeGradient(Gradient),
    SetLineWidth(f64),
    SetShadowColor(String),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc(f64, f64, f64, f64, f64),
    Fill,
    Stroke,
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    ClearRect(f64, f64, f64, f64),
    FillText {
        text: String,
        x: f64,
        y: f64,
        font: String,
        align: TextAlign,
        baseline: TextBaseline,
    },
    DrawImage {
        url: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    DrawSurface {
        source: (f64, f64, f64, f64),
        dest: (f64, f64, f64, f64),
        source_operations: usize,
    },
}

#[derive(Debug, Clone)]
struct DrawState {
    font: String,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            font: String::from("10px sans-serif"),
            text_align: TextAlign::Left,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

/// A mock Canvas2D context that records operations and measures with
/// [`FontMetrics`].
#[derive(Debug, Clone)]
pub struct MockCanvas2dContext {
    width: f64,
    height: f64,
    operations: Vec<DrawOperation>,
    state_stack: Vec<DrawState>,
    current_state: DrawState,
    metrics: FontMetrics,
}

impl MockCanvas2dContext {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            operations: Vec::new(),
            state_stack: Vec::new(),
            current_state: DrawState::default(),
            metrics: FontMetrics::new(),
        }
    }

    #[must_use]
    pub fn operations(&self) -> &[DrawOperation] {
        &self.operations
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// URLs of drawn images, in draw order.
    #[must_use]
    pub fn drawn_images(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                DrawOperation::DrawImage { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Filled text runs, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                DrawOperation::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }
}

impl Canvas2dContext for MockCanvas2dContext {
    type Image = MockImage;

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn save(&mut self) {
        self.state_stack.push(self.current_state.clone());
        self.operations.push(DrawOperation::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.current_state = state;
        }
        self.operations.push(DrawOperation::Restore);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.operations
            .push(DrawOperation::SetFillStyle(color.to_string()));
    }

    fn set_fill_gradient(&mut self, gradient: &Gradient) {
        self.operations
            .push(DrawOperation::SetFillGradient(gradient.clone()));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.operations
            .push(DrawOperation::SetStrokeStyle(color.to_string()));
    }

    fn set_stroke_gradient(&mut self, gradient: &Gradient) {
        self.operations
            .push(DrawOperation::SetStrokeGradient(gradient.clone()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.operations.push(DrawOperation::SetLineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.current_state.font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.current_state.text_align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.current_state.text_baseline = baseline;
    }

    fn begin_path(&mut self) {
        self.operations.push(DrawOperation::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.operations.push(DrawOperation::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.operations.push(DrawOperation::LineTo(x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.operations
            .push(DrawOperation::Arc(x, y, radius, start_angle, end_angle));
    }

    fn fill(&mut self) {
        self.operations.push(DrawOperation::Fill);
    }

    fn stroke(&mut self) {
        self.operations.push(DrawOperation::Stroke);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.operations
            .push(DrawOperation::FillRect(x, y, width, height));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.operations
            .push(DrawOperation::StrokeRect(x, y, width, height));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.operations
            .push(DrawOperation::ClearRect(x, y, width, height));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.operations.push(DrawOperation::FillText {
            text: text.to_string(),
            x,
            y,
            font: self.current_state.font.clone(),
            align: self.current_state.text_align,
            baseline: self.current_state.text_baseline,
        });
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        let width = match FontSpec::parse_css(&self.current_state.font) {
            Some(font) => self.metrics.estimate_width(&font, text),
            None => text.chars().count() as f64 * 8.0,
        };
        TextMetrics { width }
    }

    fn set_shadow_blur(&mut self, _blur: f64) {}

    fn set_shadow_color(&mut self, color: &str) {
        self.operations
            .push(DrawOperation::SetShadowColor(color.to_string()));
    }

    fn set_shadow_offset(&mut self, _x: f64, _y: f64) {}

    fn draw_image(&mut self, image: &MockImage, x: f64, y: f64, width: f64, height: f64) {
        self.operations.push(DrawOperation::DrawImage {
            url: image.url.clone(),
            x,
            y,
            width,
            height,
        });
    }

    fn draw_surface(
        &mut self,
        source: &Self,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) {
        self.operations.push(DrawOperation::DrawSurface {
            source: (sx, sy, sw, sh),
            dest: (dx, dy, dw, dh),
            source_operations: source.operation_count(),
        });
    }
}

/// Creates [`MockCanvas2dContext`] surfaces; can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MockSurfaceFactory {
    pub created: Vec<(u32, u32)>,
    pub fail: bool,
}

impl SurfaceFactory for MockSurfaceFactory {
    type Surface = MockCanvas2dContext;

    fn create(&mut self, width: u32, height: u32) -> Result<Self::Surface, RenderError> {
        if self.fail {
            return Err(RenderError::ContextUnavailable(String::from(
                "mock surface creation disabled",
            )));
        }
        self.created.push((width, height));
        Ok(MockCanvas2dContext::new(f64::from(width), f64::from(height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_context_records_operations() {
        let mut ctx = MockCanvas2dContext::new(800.0, 600.0);

        ctx.begin_path();
        ctx.move_to(10.0, 10.0);
        ctx.line_to(100.0, 100.0);
        ctx.stroke();

        assert_eq!(ctx.operation_count(), 4);
        assert_eq!(ctx.operations()[0], DrawOperation::BeginPath);
        assert_eq!(ctx.operations()[1], DrawOperation::MoveTo(10.0, 10.0));
    }

    #[test]
    fn fill_text_captures_text_state() {
        let mut ctx = MockCanvas2dContext::new(100.0, 100.0);
        ctx.set_font("bold 12px Arial");
        ctx.set_text_align(TextAlign::Center);
        ctx.save();
        ctx.set_text_baseline(TextBaseline::Top);
        ctx.fill_text("7", 5.0, 6.0);
        ctx.restore();
        ctx.fill_text("8", 0.0, 0.0);

        match &ctx.operations()[1] {
            DrawOperation::FillText {
                font,
                align,
                baseline,
                ..
            } => {
                assert_eq!(font, "bold 12px Arial");
                assert_eq!(*align, TextAlign::Center);
                assert_eq!(*baseline, TextBaseline::Top);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &ctx.operations()[3] {
            DrawOperation::FillText { baseline, .. } => {
                assert_eq!(*baseline, TextBaseline::Alphabetic);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn measurer_uses_font_spec() {
        let mut ctx = MockCanvas2dContext::new(100.0, 100.0);
        let font = FontSpec::new("Georgia, serif", 20.0);
        let small = ContextMeasurer(&mut ctx).text_width(&font.with_size(10.0), "Flying");
        let large = ContextMeasurer(&mut ctx).text_width(&font, "Flying");
        assert!(large > small);
        assert!((large - 2.0 * small).abs() < 1e-9);
    }

    #[test]
    fn factory_reports_unavailable_surface() {
        let mut factory = MockSurfaceFactory {
            fail: true,
            ..MockSurfaceFactory::default()
        };
        assert!(matches!(
            factory.create(10, 10),
            Err(RenderError::ContextUnavailable(_))
        ));
    }

    #[test]
    fn gradient_builder_keeps_stop_order() {
        let gradient = Gradient::linear(0.0, 0.0, 10.0, 0.0)
            .stop(0.0, "rgba(0, 0, 0, 0)")
            .stop(1.0, "rgba(0, 0, 0, 0.3)");
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.stops[1].offset, 1.0);
    }
}
