//! Native card rendering: the card renderer over [`FsAssetLoader`] into SVG,
//! and SVG to PNG behind the `png` feature.

use futures::executor::block_on;
use pf_core::{
    BackgroundTransform, BorderColorKey, CardRecord, LayoutConfig, ProxyRewriter, RenderError,
    SymbolCatalog,
};
use pf_render_canvas::{CardRenderer, RenderConfig, RenderRequest};
use pf_render_svg::{SvgCard, render_card_svg};
use serde::Serialize;

use crate::assets::FsAssetLoader;

/// One card to render.
#[derive(Debug, Clone)]
pub struct CardJob {
    pub card: CardRecord,
    pub layout: LayoutConfig,
    pub background_url: Option<String>,
    pub transform: BackgroundTransform,
    pub copyright: Option<String>,
}

impl CardJob {
    #[must_use]
    pub fn new(card: CardRecord, layout: LayoutConfig) -> Self {
        Self {
            card,
            layout,
            background_url: None,
            transform: BackgroundTransform::IDENTITY,
            copyright: None,
        }
    }

    /// The explicit background, else the card's art crop.
    #[must_use]
    pub fn background(&self) -> Option<&str> {
        self.background_url
            .as_deref()
            .or(self.card.art_crop_url.as_deref())
    }
}

pub struct NativeRenderer {
    renderer: CardRenderer<FsAssetLoader, ProxyRewriter>,
}

impl NativeRenderer {
    #[must_use]
    pub fn new(loader: FsAssetLoader, rewriter: ProxyRewriter, config: RenderConfig) -> Self {
        Self {
            renderer: CardRenderer::new(loader, rewriter, config),
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: SymbolCatalog) -> Self {
        self.renderer.set_catalog(catalog);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        self.renderer.config()
    }

    /// Render with the configured export margin.
    pub fn render(&mut self, job: &CardJob) -> Result<SvgCard, RenderError> {
        let margin_mm = self.renderer.config().export_margin_mm;
        let request = RenderRequest::new(&job.card, &job.layout)
            .background(job.background(), job.transform)
            .copyright(job.copyright.as_deref());
        block_on(render_card_svg(&mut self.renderer, &request, margin_mm))
    }
}

/// Machine-readable outcome of `render --json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub card: String,
    pub layout: String,
    pub file_name: String,
    pub format: &'static str,
    pub dpi: u32,
    pub width: f64,
    pub height: f64,
    pub border: BorderColorKey,
    pub images_drawn: Vec<String>,
    pub failures: Vec<String>,
    pub fields_drawn: Vec<&'static str>,
    pub body_font_size: Option<f64>,
    pub output_bytes: usize,
    pub render_time_ms: f64,
}

impl RenderSummary {
    #[must_use]
    pub fn new(job: &CardJob, svg: &SvgCard, dpi: u32) -> Self {
        let (width, height) = svg.document.size();
        let report = &svg.report;
        Self {
            card: job.card.name.clone(),
            layout: job.layout.name.clone(),
            file_name: svg.file_name.clone(),
            format: "svg",
            dpi,
            width,
            height,
            border: report.border,
            images_drawn: report.images_drawn.clone(),
            failures: report.failures.iter().map(ToString::to_string).collect(),
            fields_drawn: report.fields_drawn.iter().map(|field| field.as_str()).collect(),
            body_font_size: report.body_font_size,
            output_bytes: 0,
            render_time_ms: 0.0,
        }
    }
}

/// Rasterize an SVG at its own pixel size.
#[cfg(feature = "png")]
pub fn svg_to_png(svg: &str) -> anyhow::Result<(Vec<u8>, u32, u32)> {
    use anyhow::Context;
    use resvg::tiny_skia;
    use usvg::{Options, Transform, Tree};

    let mut options = Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = Tree::from_str(svg, &options).context("Failed to parse SVG")?;

    let size = tree.size();
    let (width, height) = (size.width().round() as u32, size.height().round() as u32);
    let mut pixmap = tiny_skia::Pixmap::new(width, height).context("Failed to create pixmap")?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    let bytes = pixmap.encode_png().context("Failed to encode PNG")?;
    Ok((bytes, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::default_layout;
    use pf_parser::parse_card_json;

    #[test]
    fn explicit_background_beats_art_crop() {
        let card = parse_card_json(
            r#"{"name": "Opt", "image_uris": {"art_crop": "art/opt.jpg"}}"#,
        )
        .expect("card");
        let mut job = CardJob::new(card, default_layout());
        assert_eq!(job.background(), Some("art/opt.jpg"));
        job.background_url = Some(String::from("art/custom.png"));
        assert_eq!(job.background(), Some("art/custom.png"));
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_matches_svg_size() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="100" height="50" fill="#f00"/></svg>"##;
        let (_bytes, width, height) = svg_to_png(svg).expect("png");
        assert_eq!((width, height), (100, 50));
    }
}
