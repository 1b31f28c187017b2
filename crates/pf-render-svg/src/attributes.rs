//! SVG attributes with escaping and compact number formatting.

use std::fmt::{self, Write};

/// A single SVG attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub value: AttributeValue,
}

/// Value of an SVG attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Number(f64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(&escape_xml_attr(s)),
            Self::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Ordered attribute list. Setting a name twice replaces the first value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    attrs: Vec<Attribute>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    #[must_use]
    pub fn set(mut self, name: &'static str, value: impl Into<AttributeValue>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
        self
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// Render as ` name="value"` pairs.
    #[must_use]
    pub fn render(&self) -> String {
        let mut result = String::new();
        for attr in &self.attrs {
            let _ = write!(result, " {}=\"{}\"", attr.name, attr.value);
        }
        result
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Integers print bare; everything else keeps at most two decimals without
/// trailing zeros.
#[must_use]
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return String::from("0");
    }
    let rounded = (n * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}

fn escape_xml_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters in XML text content.
#[must_use]
pub fn escape_xml_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn renders_attributes() {
        let attrs = Attributes::new()
            .set("id", "frame")
            .set("width", 868.0)
            .set("x", 12.346);
        let rendered = attrs.render();
        assert_eq!(rendered, " id=\"frame\" width=\"868\" x=\"12.35\"");
    }

    #[test]
    fn later_set_replaces_value() {
        let attrs = Attributes::new().set("fill", "red").set("fill", "blue");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("fill"), Some(&AttributeValue::from("blue")));
    }

    #[test]
    fn escapes_special_characters() {
        let rendered = Attributes::new()
            .set("href", "a.png?x=1&y=\"2\" 'q' <z>")
            .render();
        assert!(rendered.contains("&amp;"));
        assert!(rendered.contains("&quot;"));
        assert!(rendered.contains("&#39;"));
        assert!(rendered.contains("&lt;z&gt;"));
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.25), "-3.25");
        assert_eq!(format_number(1.999), "2");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn text_escaping_keeps_quotes() {
        assert_eq!(escape_xml_text("\"Fire\" & <Ice>"), "\"Fire\" &amp; &lt;Ice&gt;");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_formatted_numbers_parse_back_closely(n in -1.0e6_f64..1.0e6) {
            let text = format_number(n);
            let parsed: f64 = text.parse().expect("numeric");
            prop_assert!((parsed - n).abs() <= 0.005 + 1e-9);
            prop_assert!(text.split('.').nth(1).is_none_or(|decimals| decimals.len() <= 2));
        }
    }
}
