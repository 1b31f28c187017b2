//! Card renderer.
//!
//! Composites one card onto a margin-inclusive surface: fallback fill,
//! background art, frame layers, text fields and the optional debug overlay.
//! Asset failures skip the affected layer; only surface acquisition fails the
//! render.

use std::collections::BTreeMap;

use pf_core::geometry::{CanvasDimensions, FieldGeometry, PixelRect, percent_to_pixels};
use pf_core::{
    Align, AssetError, BackgroundTransform, BorderColorKey, CardRecord, DEFAULT_FONT_FAMILY,
    FieldKey, FontSpec, LayoutConfig, ParsedManaSymbol, PassthroughRewriter, RenderError,
    SymbolCatalog, TextPosition, UrlRewriter, VerticalAlign, determine_border_color,
};
use pf_layout::{BodyBlock, FlowItem, fit_body_block, fit_single_line, layout_mana_cost};
use pf_parser::parse_mana_string;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetCache, AssetLoader};
use crate::context::{
    Canvas2dContext, ContextMeasurer, Gradient, ImageSource, SurfaceFactory, TextAlign,
    TextBaseline,
};
use crate::debug::draw_debug_overlay;
use crate::symbols::{draw_fallback_badge, resolve_symbol_url};

/// Space between an inline symbol and the next word, in 72 DPI points.
pub const DEFAULT_SYMBOL_GAP: f64 = 7.0;
/// Horizontal advance past the artist icon, in multiples of the font size.
const ARTIST_ICON_ADVANCE: f64 = 1.25;

/// Configuration for card rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub dpi: u32,
    /// Draw field boxes and the art anchor on top of the card.
    pub debug: bool,
    /// Fill behind everything, visible where no art covers the card.
    pub fallback_color: String,
    /// Used by text positions without a family of their own.
    pub default_font_family: String,
    /// Space after inline symbols, in 72 DPI points.
    pub symbol_gap: f64,
    /// Bleed kept on export, in millimeters.
    pub export_margin_mm: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: pf_core::geometry::DEFAULT_DPI,
            debug: false,
            fallback_color: String::from("#1a1a2e"),
            default_font_family: String::from(DEFAULT_FONT_FAMILY),
            symbol_gap: DEFAULT_SYMBOL_GAP,
            export_margin_mm: 0.0,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn dimensions(&self) -> CanvasDimensions {
        CanvasDimensions::at_dpi(self.dpi)
    }
}

/// Everything one render draws.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest<'a> {
    pub card: &'a CardRecord,
    pub layout: &'a LayoutConfig,
    pub background_url: Option<&'a str>,
    pub transform: BackgroundTransform,
    /// Text for the copyright field, when the layout has one.
    pub copyright: Option<&'a str>,
}

impl<'a> RenderRequest<'a> {
    #[must_use]
    pub fn new(card: &'a CardRecord, layout: &'a LayoutConfig) -> Self {
        Self {
            card,
            layout,
            background_url: None,
            transform: BackgroundTransform::IDENTITY,
            copyright: None,
        }
    }

    #[must_use]
    pub fn background(mut self, url: Option<&'a str>, transform: BackgroundTransform) -> Self {
        self.background_url = url.filter(|url| !url.is_empty());
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn copyright(mut self, text: Option<&'a str>) -> Self {
        self.copyright = text.filter(|text| !text.is_empty());
        self
    }
}

/// What a render actually drew.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub border: BorderColorKey,
    /// Resolved URLs of drawn images, in draw order.
    pub images_drawn: Vec<String>,
    pub failures: Vec<AssetError>,
    pub fields_drawn: Vec<FieldKey>,
    /// Size shared by oracle and flavor text after fitting.
    pub body_font_size: Option<f64>,
}

impl RenderReport {
    fn new(border: BorderColorKey) -> Self {
        Self {
            border,
            images_drawn: Vec::new(),
            failures: Vec::new(),
            fields_drawn: Vec::new(),
            body_font_size: None,
        }
    }
}

/// A finished render: the full surface, ready for export.
#[derive(Debug, Clone)]
pub struct RenderedCard<S> {
    pub surface: S,
    pub dimensions: CanvasDimensions,
    pub report: RenderReport,
}

/// Copy the card-only rectangle of `full` onto `display`.
pub fn blit_card<C: Canvas2dContext>(display: &mut C, full: &C, dims: &CanvasDimensions) {
    let margin = f64::from(dims.margin_pixels);
    let width = f64::from(dims.card_width);
    let height = f64::from(dims.card_height);
    display.clear_rect(0.0, 0.0, width, height);
    display.draw_surface(full, margin, margin, width, height, 0.0, 0.0, width, height);
}

/// Card renderer owning its asset cache.
pub struct CardRenderer<L: AssetLoader, R = PassthroughRewriter> {
    loader: L,
    rewriter: R,
    catalog: SymbolCatalog,
    cache: AssetCache<L::Image>,
    config: RenderConfig,
}

impl<L: AssetLoader, R: UrlRewriter> CardRenderer<L, R> {
    #[must_use]
    pub fn new(loader: L, rewriter: R, config: RenderConfig) -> Self {
        Self {
            loader,
            rewriter,
            catalog: SymbolCatalog::default(),
            cache: AssetCache::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: SymbolCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn set_catalog(&mut self, catalog: SymbolCatalog) {
        self.catalog = catalog;
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    #[must_use]
    pub fn cache(&self) -> &AssetCache<L::Image> {
        &self.cache
    }

    /// Create a full surface at the configured DPI and draw the card on it.
    pub async fn render<F>(
        &mut self,
        factory: &mut F,
        request: &RenderRequest<'_>,
    ) -> Result<RenderedCard<F::Surface>, RenderError>
    where
        F: SurfaceFactory,
        F::Surface: Canvas2dContext<Image = L::Image>,
    {
        let dimensions = self.config.dimensions();
        let mut surface = factory.create(dimensions.full_width, dimensions.full_height)?;
        let report = self.draw_card(&mut surface, &dimensions, request).await;
        Ok(RenderedCard {
            surface,
            dimensions,
            report,
        })
    }

    /// Draw the card onto an existing full-size surface.
    pub async fn draw_card<C>(
        &mut self,
        ctx: &mut C,
        dims: &CanvasDimensions,
        request: &RenderRequest<'_>,
    ) -> RenderReport
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let border = determine_border_color(&request.card.colors);
        let mut pass = Pass {
            loader: &self.loader,
            rewriter: &self.rewriter,
            catalog: &self.catalog,
            cache: &mut self.cache,
            config: &self.config,
            dims: *dims,
            scale: dims.scale_factor(),
            overrides: &request.layout.mana_symbols,
            report: RenderReport::new(border),
        };

        pass.fonts(request.layout).await;

        let (width, height) = (f64::from(dims.full_width), f64::from(dims.full_height));
        ctx.reset_shadow();
        ctx.set_fill_style(&pass.config.fallback_color);
        ctx.fill_rect(0.0, 0.0, width, height);

        pass.background(ctx, request).await;
        pass.frame(ctx, request, border).await;
        pass.text_fields(ctx, request).await;

        if pass.config.debug {
            draw_debug_overlay(ctx, request.layout, dims);
        }

        tracing::debug!(
            card = %request.card.name,
            border = border.as_str(),
            images = pass.report.images_drawn.len(),
            failures = pass.report.failures.len(),
            "rendered card"
        );
        pass.report
    }
}

/// State of one render invocation.
struct Pass<'r, L: AssetLoader, R> {
    loader: &'r L,
    rewriter: &'r R,
    catalog: &'r SymbolCatalog,
    cache: &'r mut AssetCache<L::Image>,
    config: &'r RenderConfig,
    dims: CanvasDimensions,
    scale: f64,
    overrides: &'r BTreeMap<String, String>,
    report: RenderReport,
}

impl<L: AssetLoader, R: UrlRewriter> Pass<'_, L, R> {
    fn family<'p>(&'p self, position: &'p TextPosition) -> &'p str {
        position
            .font_family
            .as_deref()
            .filter(|family| !family.is_empty())
            .unwrap_or(self.config.default_font_family.as_str())
    }

    fn geometry(&self, position: &TextPosition) -> FieldGeometry {
        FieldGeometry::resolve(position, &self.dims, self.scale)
    }

    async fn image(&mut self, url: &str) -> Option<L::Image> {
        let resolved = self.rewriter.rewrite(url);
        match self.cache.image(self.loader, &resolved).await {
            Ok(image) => Some(image),
            Err(err) => {
                tracing::warn!(url = %resolved, error = %err, "skipping image layer");
                self.report.failures.push(err);
                None
            }
        }
    }

    async fn draw_layer<C>(&mut self, ctx: &mut C, url: &str, rect: PixelRect)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        if let Some(image) = self.image(url).await {
            ctx.draw_image(&image, rect.x, rect.y, rect.width, rect.height);
            self.report.images_drawn.push(self.rewriter.rewrite(url));
        }
    }

    async fn fonts(&mut self, layout: &LayoutConfig) {
        let mut families = layout.font_families();
        families.insert(self.config.default_font_family.clone());
        for family in &families {
            if let Err(err) = self.cache.ensure_font(self.loader, family).await {
                tracing::warn!(family = %family, error = %err, "font unavailable, using fallback");
                self.report.failures.push(err);
            }
        }
    }

    async fn background<C>(&mut self, ctx: &mut C, request: &RenderRequest<'_>)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let Some(url) = request.background_url else {
            return;
        };
        let Some(image) = self.image(url).await else {
            return;
        };
        if image.natural_width() <= 0.0 {
            tracing::warn!(url, "background has no width");
            return;
        }

        let full_width = f64::from(self.dims.full_width);
        let full_height = f64::from(self.dims.full_height);
        let anchor = request.layout.art_anchor();
        let transform = request.transform;
        let width = full_width * anchor.scale * transform.scale;
        let height = image.natural_height() / image.natural_width() * width;
        let center_x = percent_to_pixels(anchor.center_x, full_width)
            + percent_to_pixels(transform.offset_x, full_width);
        let center_y = percent_to_pixels(anchor.center_y, full_height)
            + percent_to_pixels(transform.offset_y, full_height);

        ctx.draw_image(
            &image,
            center_x - width / 2.0,
            center_y - height / 2.0,
            width,
            height,
        );
        self.report.images_drawn.push(self.rewriter.rewrite(url));
    }

    async fn frame<C>(&mut self, ctx: &mut C, request: &RenderRequest<'_>, border: BorderColorKey)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let Some(images) = request.layout.border_images(border) else {
            tracing::warn!(border = border.as_str(), "layout has no frame for this colour");
            return;
        };
        let full = PixelRect::new(
            0.0,
            0.0,
            f64::from(self.dims.full_width),
            f64::from(self.dims.full_height),
        );

        if let Some(base) = images.base_url() {
            self.draw_layer(ctx, base, full).await;
        }
        if request.card.is_legendary() {
            if let Some(legendary) = images.legendary_url() {
                self.draw_layer(ctx, legendary, full).await;
            }
        }
        if request.card.has_power_toughness() {
            if let Some(overlay) = images.power_toughness_url() {
                self.draw_layer(ctx, overlay, full).await;
            }
        }
    }

    async fn text_fields<C>(&mut self, ctx: &mut C, request: &RenderRequest<'_>)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let card = request.card;
        let layout = request.layout;

        if let Some(position) = layout.position(FieldKey::Name) {
            self.text_line(ctx, FieldKey::Name, &card.name, position, false);
        }
        self.mana_cost(ctx, card, layout).await;
        if let Some(position) = layout.position(FieldKey::TypeLine) {
            self.text_line(ctx, FieldKey::TypeLine, &card.type_line, position, false);
        }
        self.body(ctx, card, layout).await;
        if let (Some(label), Some(position)) = (
            card.power_toughness_label(),
            layout.position(FieldKey::PowerToughness),
        ) {
            self.text_line(ctx, FieldKey::PowerToughness, &label, position, true);
        }
        if let (Some(loyalty), Some(position)) = (
            card.loyalty.as_deref().filter(|value| !value.is_empty()),
            layout.position(FieldKey::Loyalty),
        ) {
            self.text_line(ctx, FieldKey::Loyalty, loyalty, position, true);
        }
        if let (Some(artist), Some(position)) = (
            card.artist.as_deref().filter(|value| !value.is_empty()),
            layout.position(FieldKey::Artist),
        ) {
            self.artist(ctx, artist, position).await;
        }
        if let (Some(copyright), Some(position)) =
            (request.copyright, layout.position(FieldKey::Copyright))
        {
            self.text_line(ctx, FieldKey::Copyright, copyright, position, false);
        }
    }

    fn text_line<C: Canvas2dContext>(
        &mut self,
        ctx: &mut C,
        field: FieldKey,
        text: &str,
        position: &TextPosition,
        bold: bool,
    ) {
        if text.is_empty() {
            return;
        }
        let rect = self.geometry(position).rect;
        self.text_in_rect(ctx, field, text, position, rect, bold);
    }

    fn text_in_rect<C: Canvas2dContext>(
        &mut self,
        ctx: &mut C,
        field: FieldKey,
        text: &str,
        position: &TextPosition,
        rect: PixelRect,
        bold: bool,
    ) {
        let geometry = self.geometry(position);
        let font = FontSpec::new(self.family(position), geometry.font_size).bold(bold);
        let align = position.align.unwrap_or(field.default_align());
        let vertical_align = position.vertical_align.unwrap_or(VerticalAlign::Top);
        let placed = fit_single_line(
            &mut ContextMeasurer(&mut *ctx),
            text,
            rect,
            &font,
            align,
            vertical_align,
        );
        if placed.font.size < font.size {
            tracing::debug!(
                field = field.as_str(),
                base = font.size,
                fitted = placed.font.size,
                "shrunk single line"
            );
        }

        ctx.set_font(&placed.font.css());
        ctx.set_fill_style(position.color_or_default());
        ctx.set_text_align(align.into());
        ctx.set_text_baseline(TextBaseline::Top);
        ctx.fill_text(text, placed.x, placed.y);
        self.report.fields_drawn.push(field);
    }

    async fn symbol<C>(&mut self, ctx: &mut C, symbol: &ParsedManaSymbol, x: f64, y: f64, size: f64)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let url = resolve_symbol_url(self.overrides, self.catalog, symbol).map(str::to_owned);
        if let Some(url) = url {
            if let Some(image) = self.image(&url).await {
                ctx.draw_image(&image, x, y, size, size);
                self.report.images_drawn.push(self.rewriter.rewrite(&url));
                return;
            }
        }
        draw_fallback_badge(ctx, symbol, x, y, size);
    }

    async fn mana_cost<C>(&mut self, ctx: &mut C, card: &CardRecord, layout: &LayoutConfig)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let (Some(cost), Some(position)) = (card.cost(), layout.position(FieldKey::ManaCost)) else {
            return;
        };
        let symbols = parse_mana_string(cost);
        if symbols.is_empty() {
            return;
        }
        let geometry = self.geometry(position);
        let row = layout_mana_cost(
            &symbols,
            geometry.rect,
            geometry.font_size,
            self.scale,
            position.align.unwrap_or(Align::Right),
            position.vertical_align.unwrap_or(VerticalAlign::Top),
        );

        ctx.save();
        ctx.set_shadow_color("rgba(0, 0, 0, 0.8)");
        ctx.set_shadow_blur(row.size * 0.05);
        ctx.set_shadow_offset(0.0, row.size * 0.1);
        for placed in &row.symbols {
            self.symbol(ctx, &placed.symbol, placed.x, placed.y, placed.size)
                .await;
        }
        ctx.restore();
        ctx.reset_shadow();
        self.report.fields_drawn.push(FieldKey::ManaCost);
    }

    async fn body<C>(&mut self, ctx: &mut C, card: &CardRecord, layout: &LayoutConfig)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let Some(oracle_position) = layout.position(FieldKey::OracleText) else {
            return;
        };
        let flavor_position = layout.position(FieldKey::FlavorText);
        let oracle = card.oracle();
        let flavor = card.flavor().filter(|_| flavor_position.is_some());
        if oracle.is_none() && flavor.is_none() {
            return;
        }

        let geometry = self.geometry(oracle_position);
        let oracle_family = self.family(oracle_position).to_string();
        let flavor_family = flavor_position
            .map_or(oracle_family.as_str(), |position| self.family(position))
            .to_string();
        let block = BodyBlock {
            oracle,
            flavor,
            rect: geometry.rect,
            base_font_size: geometry.font_size,
            oracle_family: &oracle_family,
            flavor_family: &flavor_family,
            symbol_gap: self.config.symbol_gap * self.scale,
            vertical_align: oracle_position
                .vertical_align
                .unwrap_or(VerticalAlign::Top),
        };
        let fit = fit_body_block(&mut ContextMeasurer(&mut *ctx), &block);
        tracing::debug!(
            base = geometry.font_size,
            fitted = fit.font_size,
            total_height = fit.total_height,
            "fitted oracle block"
        );
        self.report.body_font_size = Some(fit.font_size);

        if let Some(flow) = &fit.oracle {
            let color = oracle_position.color_or_default();
            for item in &flow.items {
                match item {
                    FlowItem::Word {
                        text,
                        x,
                        baseline,
                        italic,
                    } => {
                        let font = FontSpec::new(oracle_family.as_str(), fit.font_size).italic(*italic);
                        ctx.set_font(&font.css());
                        ctx.set_fill_style(color);
                        ctx.set_text_align(TextAlign::Left);
                        ctx.set_text_baseline(TextBaseline::Alphabetic);
                        ctx.fill_text(text, *x, *baseline);
                    }
                    FlowItem::Symbol { symbol, x, y, size } => {
                        self.symbol(ctx, symbol, *x, *y, *size).await;
                    }
                }
            }
            self.report.fields_drawn.push(FieldKey::OracleText);
        }

        if let Some(divider_y) = fit.divider_y {
            let rect = geometry.rect;
            let gradient = Gradient::linear(rect.x, divider_y, rect.right(), divider_y)
                .stop(0.0, "rgba(0, 0, 0, 0)")
                .stop(0.15, "rgba(0, 0, 0, 0.3)")
                .stop(0.85, "rgba(0, 0, 0, 0.3)")
                .stop(1.0, "rgba(0, 0, 0, 0)");
            ctx.set_stroke_gradient(&gradient);
            ctx.set_line_width(self.scale);
            ctx.begin_path();
            ctx.move_to(rect.x, divider_y);
            ctx.line_to(rect.right(), divider_y);
            ctx.stroke();
        }

        if let (Some(block), Some(top), Some(position)) = (&fit.flavor, fit.flavor_y, flavor_position) {
            let rect = geometry.rect;
            let align = position.align.unwrap_or(Align::Left);
            let x = match align {
                Align::Left => rect.x,
                Align::Center => rect.center_x(),
                Align::Right => rect.right(),
            };
            ctx.set_font(&block.font.css());
            ctx.set_fill_style(position.color_or_default());
            ctx.set_text_align(align.into());
            ctx.set_text_baseline(TextBaseline::Top);
            for (line_top, line) in block.line_tops(top) {
                ctx.fill_text(line, x, line_top);
            }
            self.report.fields_drawn.push(FieldKey::FlavorText);
        }
    }

    async fn artist<C>(&mut self, ctx: &mut C, artist: &str, position: &TextPosition)
    where
        C: Canvas2dContext<Image = L::Image>,
    {
        let geometry = self.geometry(position);
        let mut rect = geometry.rect;
        if let Some(icon) = position.icon.as_deref().filter(|icon| !icon.is_empty()) {
            let size = geometry.font_size;
            let icon_rect = PixelRect::new(rect.x, rect.y, size, size);
            self.draw_layer(ctx, icon, icon_rect).await;
            let advance = size * ARTIST_ICON_ADVANCE;
            rect = PixelRect::new(rect.x + advance, rect.y, (rect.width - advance).max(0.0), rect.height);
        }
        self.text_in_rect(ctx, FieldKey::Artist, artist, position, rect, false);
    }
}
