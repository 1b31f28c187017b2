//! SVG document root.

use std::fmt::{self, Write};
use std::io;

use crate::attributes::format_number;
use crate::element::Element;

/// A standalone SVG document sized in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    defs: Vec<Element>,
    children: Vec<Element>,
}

impl SvgDocument {
    /// A document whose viewBox matches its pixel size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn defs<I: IntoIterator<Item = Element>>(mut self, defs: I) -> Self {
        self.defs.extend(defs);
        self
    }

    #[must_use]
    pub fn children<I: IntoIterator<Item = Element>>(mut self, elems: I) -> Self {
        self.children.extend(elems);
        self
    }

    #[must_use]
    pub const fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn write_to_string(&self, output: &mut String) {
        let (w, h) = (format_number(self.width), format_number(self.height));
        let _ = write!(
            output,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
             width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
        );
        if !self.defs.is_empty() {
            output.push_str("<defs>");
            for def in &self.defs {
                def.write_to_string(output);
            }
            output.push_str("</defs>");
        }
        for child in &self.children {
            child.write_to_string(output);
        }
        output.push_str("</svg>");
    }

    /// Write the document to an `io::Write` implementor.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_string().as_bytes())
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::with_capacity(4096);
        self.write_to_string(&mut output);
        f.write_str(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_carries_size_and_viewbox() {
        let svg = SvgDocument::new(750.0, 1050.0).to_string();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"750\" height=\"1050\" viewBox=\"0 0 750 1050\""));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("<defs>"));
    }

    #[test]
    fn defs_precede_content() {
        let svg = SvgDocument::new(10.0, 10.0)
            .defs([Element::stop(0.0, "#fff")])
            .children([Element::rect(0.0, 0.0, 10.0, 10.0)])
            .to_string();
        let defs = svg.find("<defs>").expect("defs");
        let rect = svg.find("<rect").expect("rect");
        assert!(defs < rect);
    }

    #[test]
    fn writes_to_io() {
        let mut bytes = Vec::new();
        SvgDocument::new(1.0, 2.0).write_to(&mut bytes).expect("write");
        assert!(String::from_utf8(bytes).expect("utf8").contains("height=\"2\""));
    }
}
