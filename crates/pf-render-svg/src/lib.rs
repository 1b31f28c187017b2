#![forbid(unsafe_code)]

//! SVG backend for the card renderer.
//!
//! [`SvgCanvas`] implements the renderer's 2D context by emitting SVG
//! elements, so a card composed for the browser canvas can be written to disk
//! or rasterized natively.

mod attributes;
mod canvas;
mod document;
mod element;

pub use attributes::{Attribute, AttributeValue, Attributes, escape_xml_text, format_number};
pub use canvas::{SvgCanvas, SvgImage, SvgSurfaceFactory};
pub use document::SvgDocument;
pub use element::{Element, ElementKind};

use pf_core::{RenderError, UrlRewriter};
use pf_render_canvas::{
    AssetLoader, CardRenderer, RenderReport, RenderRequest, export_file_name, export_surface,
};

/// A rendered card ready to be written out.
#[derive(Debug, Clone)]
pub struct SvgCard {
    /// Cropped to the requested bleed.
    pub document: SvgDocument,
    pub file_name: String,
    pub report: RenderReport,
}

/// Render a card and crop it to `margin_mm` of bleed.
pub async fn render_card_svg<L, R>(
    renderer: &mut CardRenderer<L, R>,
    request: &RenderRequest<'_>,
    margin_mm: f64,
) -> Result<SvgCard, RenderError>
where
    L: AssetLoader<Image = SvgImage>,
    R: UrlRewriter,
{
    let mut factory = SvgSurfaceFactory::new();
    let rendered = renderer.render(&mut factory, request).await?;
    let exported = export_surface(&mut factory, &rendered.surface, &rendered.dimensions, margin_mm)?;
    Ok(SvgCard {
        document: exported.document(),
        file_name: export_file_name(&request.card.name).replace(".png", ".svg"),
        report: rendered.report,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use futures::executor::block_on;
    use pf_core::{AssetError, BorderColorKey, BorderImages, PassthroughRewriter, default_layout};
    use pf_parser::parse_card_json;
    use pf_render_canvas::RenderConfig;

    struct TableLoader(BTreeMap<&'static str, (f64, f64)>);

    impl AssetLoader for TableLoader {
        type Image = SvgImage;

        async fn load_image(&self, url: &str) -> Result<SvgImage, AssetError> {
            self.0
                .get(url)
                .map(|&(width, height)| SvgImage {
                    href: url.to_string(),
                    width,
                    height,
                })
                .ok_or_else(|| AssetError::Load {
                    url: url.to_string(),
                    reason: String::from("missing"),
                })
        }

        async fn load_font(&self, _family: &str) -> Result<(), AssetError> {
            Ok(())
        }
    }

    fn renderer() -> CardRenderer<TableLoader> {
        let loader = TableLoader(BTreeMap::from([
            ("frames/u.png", (868.0, 1168.0)),
            ("/symbols/U.svg", (100.0, 100.0)),
            ("art/bolt.jpg", (626.0, 457.0)),
        ]));
        CardRenderer::new(loader, PassthroughRewriter, RenderConfig::default())
    }

    #[test]
    fn renders_a_card_document() {
        let card = parse_card_json(
            r#"{
                "id": "abc",
                "name": "Mahamoti Djinn",
                "type_line": "Creature — Djinn",
                "mana_cost": "{4}{U}{U}",
                "colors": ["U"],
                "oracle_text": "Flying",
                "power": "5",
                "toughness": "6"
            }"#,
        )
        .expect("card");
        let mut layout = default_layout();
        layout.images.insert(BorderColorKey::U, BorderImages::url("frames/u.png"));

        let mut renderer = renderer();
        let request = RenderRequest::new(&card, &layout);
        let svg = block_on(render_card_svg(&mut renderer, &request, 0.0)).expect("render");

        assert_eq!(svg.file_name, "Mahamoti_Djinn.svg");
        assert_eq!(svg.document.size(), (750.0, 1050.0));
        let text = svg.document.to_string();
        assert!(text.contains("href=\"frames/u.png\""));
        assert!(text.contains(">Mahamoti Djinn</text>"));
        assert!(text.contains(">5/6</text>"));
        // {4} has no glyph in this layout and falls back to a badge.
        assert!(text.contains(">4</text>"));
        assert_eq!(
            svg.report.images_drawn.iter().filter(|url| *url == "/symbols/U.svg").count(),
            2
        );
    }

    #[test]
    fn bleed_widens_the_document() {
        let card = parse_card_json(r#"{"name": "Lightning Bolt", "type_line": "Instant"}"#).expect("card");
        let layout = default_layout();
        let mut renderer = renderer();
        let request = RenderRequest::new(&card, &layout)
            .background(Some("art/bolt.jpg"), pf_core::BackgroundTransform::IDENTITY);
        let svg = block_on(render_card_svg(&mut renderer, &request, 5.0)).expect("render");
        assert_eq!(svg.document.size(), (868.0, 1168.0));
        assert!(svg.document.to_string().contains("href=\"art/bolt.jpg\""));
    }
}
