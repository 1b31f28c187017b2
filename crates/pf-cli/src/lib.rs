#![forbid(unsafe_code)]

//! Native collaborators for the proxy composer: a directory-backed asset
//! loader, a JSON file layout store, a local card-data dump, TOML
//! configuration and SVG/PNG rendering.

pub mod assets;
pub mod config;
pub mod dump;
pub mod ids;
pub mod inspect;
pub mod render;
pub mod store;

pub use assets::{FsAssetLoader, svg_dimensions};
pub use config::{CliConfig, ConfigError, load_config, parse_config};
pub use dump::{CardDump, SystemTimer};
pub use ids::DigestIds;
pub use inspect::{
    CostReport, DimensionsReport, FitReport, InspectError, cost_report, dimensions_report,
    fit_field, fit_in_rect,
};
#[cfg(feature = "png")]
pub use render::svg_to_png;
pub use render::{CardJob, NativeRenderer, RenderSummary};
pub use store::FileStore;
