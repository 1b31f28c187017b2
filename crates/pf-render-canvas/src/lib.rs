#![forbid(unsafe_code)]

//! Card compositing over an abstract 2D context.
//!
//! [`CardRenderer`] draws one card onto a margin-inclusive surface through
//! [`Canvas2dContext`], loading images and fonts through an [`AssetLoader`].
//! [`PreviewSession`] orders overlapping renders so only the newest reaches
//! the display, and [`export_surface`] crops the kept bleed for download.

mod assets;
mod context;
mod debug;
mod export;
mod preview;
mod renderer;
mod sequencer;
mod symbols;

pub use assets::{AssetCache, AssetLoader, MockAssetLoader};
pub use context::{
    Canvas2dContext, ColorStop, ContextMeasurer, DrawOperation, Gradient, GradientKind,
    ImageSource, MockCanvas2dContext, MockImage, MockSurfaceFactory, SurfaceFactory, TextAlign,
    TextBaseline, TextMetrics,
};
pub use debug::{draw_debug_overlay, field_rgb};
pub use export::{ExportCrop, MAX_EXPORT_MARGIN_MM, export_crop, export_file_name, export_surface};
pub use preview::{PreviewSession, RefreshOutcome};
pub use renderer::{
    CardRenderer, DEFAULT_SYMBOL_GAP, RenderConfig, RenderReport, RenderRequest, RenderedCard,
    blit_card,
};
pub use sequencer::{RenderSequencer, RenderTicket};
pub use symbols::{BadgePalette, badge_palette, draw_fallback_badge, resolve_symbol_url};
