//! A [`Canvas2dContext`] that records drawing as SVG elements.
//!
//! Paths, fills, text and images map one to one onto SVG primitives.
//! Gradients and drop shadows become `<defs>` entries whose ids carry the
//! surface's prefix, so surfaces nested through `draw_surface` never clash.

use std::f64::consts::PI;

use pf_core::{FontMetrics, FontSpec, RenderError};
use pf_render_canvas::{
    Canvas2dContext, Gradient, GradientKind, ImageSource, SurfaceFactory, TextAlign, TextBaseline,
    TextMetrics,
};
use rustc_hash::FxHashMap;

use crate::attributes::format_number;
use crate::document::SvgDocument;
use crate::element::{Element, ElementKind};

const FULL_TURN_EPSILON: f64 = 1e-9;

/// An image referenced by URL with its intrinsic size.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgImage {
    pub href: String,
    pub width: f64,
    pub height: f64,
}

impl ImageSource for SvgImage {
    fn natural_width(&self) -> f64 {
        self.width
    }

    fn natural_height(&self) -> f64 {
        self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Shadow {
    color: String,
    blur: f64,
    dx: f64,
    dy: f64,
}

impl Shadow {
    fn none() -> Self {
        Self {
            color: String::from("transparent"),
            blur: 0.0,
            dx: 0.0,
            dy: 0.0,
        }
    }

    fn is_visible(&self) -> bool {
        let transparent = matches!(
            self.color.replace(' ', "").as_str(),
            "transparent" | "rgba(0,0,0,0)" | ""
        );
        !transparent && (self.blur > 0.0 || self.dx != 0.0 || self.dy != 0.0)
    }

    fn key(&self) -> String {
        format!("{}|{}|{}|{}", self.color, self.blur, self.dx, self.dy)
    }
}

#[derive(Debug, Clone)]
struct DrawState {
    fill: String,
    stroke: String,
    line_width: f64,
    font: FontSpec,
    align: TextAlign,
    baseline: TextBaseline,
    shadow: Shadow,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: String::from("#000000"),
            stroke: String::from("#000000"),
            line_width: 1.0,
            font: FontSpec::new("sans-serif", 10.0),
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
            shadow: Shadow::none(),
        }
    }
}

/// An in-memory SVG drawing surface.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    prefix: String,
    defs: Vec<Element>,
    elements: Vec<Element>,
    path: String,
    state: DrawState,
    stack: Vec<DrawState>,
    metrics: FontMetrics,
    next_def: usize,
    shadows: FxHashMap<String, String>,
}

impl SvgCanvas {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_prefix(width, height, "svg")
    }

    /// A surface whose generated ids start with `prefix`.
    #[must_use]
    pub fn with_prefix(width: f64, height: f64, prefix: impl Into<String>) -> Self {
        Self {
            width,
            height,
            prefix: prefix.into(),
            defs: Vec::new(),
            elements: Vec::new(),
            path: String::new(),
            state: DrawState::default(),
            stack: Vec::new(),
            metrics: FontMetrics::new(),
            next_def: 0,
            shadows: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn defs(&self) -> &[Element] {
        &self.defs
    }

    #[must_use]
    pub fn document(&self) -> SvgDocument {
        SvgDocument::new(self.width, self.height)
            .defs(self.defs.iter().cloned())
            .children(self.elements.iter().cloned())
    }

    #[must_use]
    pub fn to_svg_string(&self) -> String {
        self.document().to_string()
    }

    fn def_id(&mut self, kind: &str) -> String {
        let id = format!("{}-{kind}-{}", self.prefix, self.next_def);
        self.next_def += 1;
        id
    }

    fn shadow_filter(&mut self) -> Option<String> {
        if !self.state.shadow.is_visible() {
            return None;
        }
        let key = self.state.shadow.key();
        if let Some(id) = self.shadows.get(&key) {
            return Some(id.clone());
        }
        let id = self.def_id("shadow");
        let shadow = &self.state.shadow;
        let filter = Element::new(ElementKind::Filter)
            .id(&id)
            .attr("x", "-50%")
            .attr("y", "-50%")
            .attr("width", "200%")
            .attr("height", "200%")
            .child(
                Element::new(ElementKind::FeDropShadow)
                    .attr("dx", shadow.dx)
                    .attr("dy", shadow.dy)
                    .attr("stdDeviation", shadow.blur / 2.0)
                    .attr("flood-color", shadow.color.as_str()),
            );
        self.defs.push(filter);
        self.shadows.insert(key, id.clone());
        Some(id)
    }

    fn push(&mut self, mut element: Element) {
        if let Some(filter) = self.shadow_filter() {
            element = element.attr("filter", format!("url(#{filter})"));
        }
        self.elements.push(element);
    }

    fn gradient_paint(&mut self, gradient: &Gradient) -> String {
        let id = self.def_id("gradient");
        let element = match gradient.kind {
            GradientKind::Linear { x0, y0, x1, y1 } => Element::new(ElementKind::LinearGradient)
                .attr("x1", x0)
                .attr("y1", y0)
                .attr("x2", x1)
                .attr("y2", y1),
            GradientKind::Radial {
                x0,
                y0,
                r0,
                x1,
                y1,
                r1,
            } => Element::new(ElementKind::RadialGradient)
                .attr("fx", x0)
                .attr("fy", y0)
                .attr("fr", r0)
                .attr("cx", x1)
                .attr("cy", y1)
                .attr("r", r1),
        };
        let stops = gradient
            .stops
            .iter()
            .map(|stop| Element::stop(stop.offset, &stop.color));
        self.defs.push(
            element
                .id(&id)
                .attr("gradientUnits", "userSpaceOnUse")
                .children(stops),
        );
        format!("url(#{id})")
    }

    fn path_point(&mut self, command: char, x: f64, y: f64) {
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        self.path.push(command);
        self.path.push(' ');
        self.path.push_str(&format_number(x));
        self.path.push(' ');
        self.path.push_str(&format_number(y));
    }

    fn arc_to(&mut self, radius: f64, large: bool, x: f64, y: f64) {
        self.path.push_str(&format!(
            " A {r} {r} 0 {large} 1 {x} {y}",
            r = format_number(radius),
            large = u8::from(large),
            x = format_number(x),
            y = format_number(y)
        ));
    }
}

impl Canvas2dContext for SvgCanvas {
    type Image = SvgImage;

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_fill_style(&mut self, color: &str) {
        self.state.fill = color.to_string();
    }

    fn set_fill_gradient(&mut self, gradient: &Gradient) {
        self.state.fill = self.gradient_paint(gradient);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.state.stroke = color.to_string();
    }

    fn set_stroke_gradient(&mut self, gradient: &Gradient) {
        self.state.stroke = self.gradient_paint(gradient);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_font(&mut self, font: &str) {
        match FontSpec::parse_css(font) {
            Some(spec) => self.state.font = spec,
            None => tracing::debug!(font, "ignoring unparsable font"),
        }
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.baseline = baseline;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path_point('M', x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path_point('L', x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        let point = |angle: f64| (x + radius * angle.cos(), y + radius * angle.sin());
        let (sx, sy) = point(start_angle);
        let command = if self.path.is_empty() { 'M' } else { 'L' };
        self.path_point(command, sx, sy);

        let sweep = end_angle - start_angle;
        if sweep >= 2.0 * PI - FULL_TURN_EPSILON {
            // A single SVG arc cannot close on itself.
            let (mx, my) = point(start_angle + PI);
            self.arc_to(radius, false, mx, my);
            self.arc_to(radius, false, sx, sy);
            self.path.push_str(" Z");
        } else {
            let sweep = sweep.rem_euclid(2.0 * PI);
            let (ex, ey) = point(start_angle + sweep);
            self.arc_to(radius, sweep > PI, ex, ey);
        }
    }

    fn fill(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let paint = self.state.fill.clone();
        let element = Element::path(self.path.clone()).fill(&paint);
        self.push(element);
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let paint = self.state.stroke.clone();
        let element = Element::path(self.path.clone())
            .fill("none")
            .stroke(&paint)
            .stroke_width(self.state.line_width);
        self.push(element);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let paint = self.state.fill.clone();
        self.push(Element::rect(x, y, width, height).fill(&paint));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let paint = self.state.stroke.clone();
        let element = Element::rect(x, y, width, height)
            .fill("none")
            .stroke(&paint)
            .stroke_width(self.state.line_width);
        self.push(element);
    }

    /// Clearing the whole surface drops everything drawn so far. SVG has no
    /// erase, so a partial clear paints white instead.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if x <= 0.0 && y <= 0.0 && x + width >= self.width && y + height >= self.height {
            self.elements.clear();
            return;
        }
        self.elements
            .push(Element::rect(x, y, width, height).fill("#ffffff"));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let font = &self.state.font;
        let mut element = Element::text(x, y, text)
            .attr("font-family", font.family.as_str())
            .attr("font-size", font.size)
            .fill(&self.state.fill.clone());
        if font.bold {
            element = element.attr("font-weight", "bold");
        }
        if font.italic {
            element = element.attr("font-style", "italic");
        }
        match self.state.align {
            TextAlign::Left => {}
            TextAlign::Center => element = element.attr("text-anchor", "middle"),
            TextAlign::Right => element = element.attr("text-anchor", "end"),
        }
        match self.state.baseline {
            TextBaseline::Alphabetic => {}
            TextBaseline::Top => element = element.attr("dominant-baseline", "text-before-edge"),
            TextBaseline::Middle => element = element.attr("dominant-baseline", "central"),
        }
        self.push(element);
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        TextMetrics {
            width: self.metrics.estimate_width(&self.state.font, text),
        }
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.state.shadow.blur = blur.max(0.0);
    }

    fn set_shadow_color(&mut self, color: &str) {
        self.state.shadow.color = color.to_string();
    }

    fn set_shadow_offset(&mut self, x: f64, y: f64) {
        self.state.shadow.dx = x;
        self.state.shadow.dy = y;
    }

    fn draw_image(&mut self, image: &SvgImage, x: f64, y: f64, width: f64, height: f64) {
        self.push(Element::image(&image.href, x, y, width, height));
    }

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
    ) {
        let view_box = [sx, sy, sw, sh].map(format_number).join(" ");
        let mut nested = Element::new(ElementKind::Svg)
            .attr("x", dx)
            .attr("y", dy)
            .attr("width", dw)
            .attr("height", dh)
            .attr("viewBox", view_box)
            .attr("preserveAspectRatio", "none");
        if !source.defs.is_empty() {
            nested = nested.child(Element::new(ElementKind::Defs).children(source.defs.iter().cloned()));
        }
        nested = nested.children(source.elements.iter().cloned());
        self.push(nested);
    }
}

/// Creates [`SvgCanvas`] surfaces with distinct id prefixes.
#[derive(Debug, Clone, Default)]
pub struct SvgSurfaceFactory {
    created: usize,
}

impl SvgSurfaceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn created(&self) -> usize {
        self.created
    }
}

impl SurfaceFactory for SvgSurfaceFactory {
    type Surface = SvgCanvas;

    fn create(&mut self, width: u32, height: u32) -> Result<SvgCanvas, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::ContextUnavailable(format!(
                "cannot create a {width}x{height} svg surface"
            )));
        }
        let prefix = format!("s{}", self.created);
        self.created += 1;
        Ok(SvgCanvas::with_prefix(f64::from(width), f64::from(height), prefix))
    }
}
