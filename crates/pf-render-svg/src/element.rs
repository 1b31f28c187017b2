//! SVG element primitives with a fluent builder API.

use std::fmt::Write;

use crate::attributes::{AttributeValue, Attributes, escape_xml_text};

/// Element kinds the card backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Svg,
    Rect,
    Path,
    Text,
    Image,
    Group,
    Defs,
    LinearGradient,
    RadialGradient,
    Stop,
    Filter,
    FeDropShadow,
}

impl ElementKind {
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Rect => "rect",
            Self::Path => "path",
            Self::Text => "text",
            Self::Image => "image",
            Self::Group => "g",
            Self::Defs => "defs",
            Self::LinearGradient => "linearGradient",
            Self::RadialGradient => "radialGradient",
            Self::Stop => "stop",
            Self::Filter => "filter",
            Self::FeDropShadow => "feDropShadow",
        }
    }

    /// Elements written as `<tag/>` when they have no content.
    #[must_use]
    pub const fn is_self_closing(self) -> bool {
        matches!(
            self,
            Self::Rect | Self::Path | Self::Image | Self::Stop | Self::FeDropShadow
        )
    }
}

/// An SVG element with attributes and optional children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    kind: ElementKind,
    attrs: Attributes,
    children: Vec<Element>,
    text_content: Option<String>,
}

impl Element {
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Attributes::new(),
            children: Vec::new(),
            text_content: None,
        }
    }

    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Rect)
            .attr("x", x)
            .attr("y", y)
            .attr("width", width)
            .attr("height", height)
    }

    #[must_use]
    pub fn path(d: impl Into<String>) -> Self {
        Self::new(ElementKind::Path).attr("d", d.into())
    }

    #[must_use]
    pub fn text(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self::new(ElementKind::Text)
            .attr("x", x)
            .attr("y", y)
            .content(content)
    }

    #[must_use]
    pub fn image(href: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Image)
            .attr("href", href)
            .attr("x", x)
            .attr("y", y)
            .attr("width", width)
            .attr("height", height)
            .attr("preserveAspectRatio", "none")
    }

    #[must_use]
    pub fn group() -> Self {
        Self::new(ElementKind::Group)
    }

    #[must_use]
    pub fn stop(offset: f64, color: &str) -> Self {
        Self::new(ElementKind::Stop)
            .attr("offset", offset)
            .attr("stop-color", color)
    }

    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<AttributeValue>) -> Self {
        self.attrs = self.attrs.set(name, value);
        self
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn fill(self, paint: &str) -> Self {
        self.attr("fill", paint)
    }

    #[must_use]
    pub fn stroke(self, paint: &str) -> Self {
        self.attr("stroke", paint)
    }

    #[must_use]
    pub fn stroke_width(self, width: f64) -> Self {
        self.attr("stroke-width", width)
    }

    /// Set text content.
    #[must_use]
    pub fn content(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, elem: Element) -> Self {
        self.children.push(elem);
        self
    }

    #[must_use]
    pub fn children<I: IntoIterator<Item = Element>>(mut self, elems: I) -> Self {
        self.children.extend(elems);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs.get(name)
    }

    #[must_use]
    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }

    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.text_content.as_deref()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::with_capacity(256);
        self.write_to_string(&mut output);
        output
    }

    pub fn write_to_string(&self, output: &mut String) {
        let tag = self.kind.tag_name();
        let _ = write!(output, "<{tag}");
        output.push_str(&self.attrs.render());

        if self.kind.is_self_closing() && self.children.is_empty() && self.text_content.is_none() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        if let Some(text) = &self.text_content {
            output.push_str(&escape_xml_text(text));
        }
        for child in &self.children {
            child.write_to_string(output);
        }
        let _ = write!(output, "</{tag}>");
    }
}
