//! `web-sys` implementations of the drawing traits.

use pf_core::RenderError;
use pf_render_canvas::{
    Canvas2dContext, Gradient, GradientKind, ImageSource, SurfaceFactory, TextAlign, TextBaseline,
    TextMetrics,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasGradient, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement,
};

use crate::{js_detail, traced};

/// A loaded `<img>`.
#[derive(Debug, Clone)]
pub(crate) struct WebImage {
    element: HtmlImageElement,
}

impl WebImage {
    pub(crate) fn new(element: HtmlImageElement) -> Self {
        Self { element }
    }
}

impl ImageSource for WebImage {
    fn natural_width(&self) -> f64 {
        f64::from(self.element.natural_width())
    }

    fn natural_height(&self) -> f64 {
        f64::from(self.element.natural_height())
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
    canvas
        .get_context("2d")
        .map_err(|err| RenderError::ContextUnavailable(js_detail(&err)))?
        .ok_or_else(|| RenderError::ContextUnavailable(String::from("canvas has no 2d context")))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| {
            RenderError::ContextUnavailable(String::from(
                "failed to cast context to CanvasRenderingContext2d",
            ))
        })
}

#[derive(Debug, Clone)]
pub(crate) struct WebCanvas2dContext {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl WebCanvas2dContext {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let context = context_2d(&canvas)?;
        Ok(Self { canvas, context })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
    }

    pub(crate) fn to_png_data_url(&self) -> Result<String, RenderError> {
        self.canvas
            .to_data_url_with_type("image/png")
            .map_err(|err| RenderError::Encode(js_detail(&err)))
    }

    fn gradient(&self, gradient: &Gradient) -> Option<CanvasGradient> {
        let canvas_gradient = match gradient.kind {
            GradientKind::Linear { x0, y0, x1, y1 } => {
                self.context.create_linear_gradient(x0, y0, x1, y1)
            }
            GradientKind::Radial {
                x0,
                y0,
                r0,
                x1,
                y1,
                r1,
            } => traced(
                "createRadialGradient",
                self.context.create_radial_gradient(x0, y0, r0, x1, y1, r1),
            )?,
        };
        for stop in &gradient.stops {
            traced(
                "addColorStop",
                canvas_gradient.add_color_stop(stop.offset as f32, &stop.color),
            );
        }
        Some(canvas_gradient)
    }
}

impl Canvas2dContext for WebCanvas2dContext {
    type Image = WebImage;

    fn width(&self) -> f64 {
        f64::from(self.canvas.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.canvas.height())
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn set_fill_style(&mut self, color: &str) {
        self.context.set_fill_style(&JsValue::from_str(color));
    }

    fn set_fill_gradient(&mut self, gradient: &Gradient) {
        if let Some(canvas_gradient) = self.gradient(gradient) {
            self.context.set_fill_style(&canvas_gradient);
        }
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.context.set_stroke_style(&JsValue::from_str(color));
    }

    fn set_stroke_gradient(&mut self, gradient: &Gradient) {
        if let Some(canvas_gradient) = self.gradient(gradient) {
            self.context.set_stroke_style(&canvas_gradient);
        }
    }

    fn set_line_width(&mut self, width: f64) {
        self.context.set_line_width(width);
    }

    fn set_font(&mut self, font: &str) {
        self.context.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.context.set_text_align(align.as_str());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.context.set_text_baseline(baseline.as_str());
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        traced("arc", self.context.arc(x, y, radius, start_angle, end_angle));
    }

    fn fill(&mut self) {
        self.context.fill();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.fill_rect(x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.stroke_rect(x, y, width, height);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.clear_rect(x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        traced("fillText", self.context.fill_text(text, x, y));
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        let width = traced("measureText", self.context.measure_text(text))
            .map_or(text.len() as f64 * 8.0, |metrics| metrics.width());
        TextMetrics { width }
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.context.set_shadow_blur(blur);
    }

    fn set_shadow_color(&mut self, color: &str) {
        self.context.set_shadow_color(color);
    }

    fn set_shadow_offset(&mut self, x: f64, y: f64) {
        self.context.set_shadow_offset_x(x);
        self.context.set_shadow_offset_y(y);
    }

    fn draw_image(&mut self, image: &WebImage, x: f64, y: f64, width: f64, height: f64) {
        traced(
            "drawImage",
            self.context
                .draw_image_with_html_image_element_and_dw_and_dh(&image.element, x, y, width, height),
        );
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
        traced(
            "drawImage",
            self.context
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &source.canvas,
                    sx,
                    sy,
                    sw,
                    sh,
                    dx,
                    dy,
                    dw,
                    dh,
                ),
        );
    }
}

/// Offscreen `<canvas>` elements created from the page's document.
#[derive(Debug, Clone)]
pub(crate) struct WebSurfaceFactory {
    document: Document,
}

impl WebSurfaceFactory {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SurfaceFactory for WebSurfaceFactory {
    type Surface = WebCanvas2dContext;

    fn create(&mut self, width: u32, height: u32) -> Result<WebCanvas2dContext, RenderError> {
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(|err| RenderError::ContextUnavailable(js_detail(&err)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| {
                RenderError::ContextUnavailable(String::from("created element is not a canvas"))
            })?;
        canvas.set_width(width);
        canvas.set_height(height);
        WebCanvas2dContext::new(canvas)
    }
}
