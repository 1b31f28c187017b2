#![forbid(unsafe_code)]

//! Core model and session logic for the proxy composer.
//!
//! Everything here is renderer-independent: card and layout documents, the
//! coordinate systems shared by the renderer and the interactive overlay,
//! persistence of layouts and background settings, and the card-data lookup
//! seam.

mod backgrounds;
mod error;
mod font_metrics;
pub mod geometry;
mod layout_doc;
mod library;
mod model;
pub mod overlay;
mod proxy;
mod source;
mod store;

pub use backgrounds::{BackgroundLibrary, BackgroundSelection, BackgroundSettings, SETTINGS_KEY};
pub use error::{AssetError, ErrorCode, ImportError, RenderError, SourceError, StoreError};
pub use font_metrics::{
    CharWidthClass, FontMetrics, FontPreset, FontSpec, TextMeasurer, primary_family,
};
pub use layout_doc::{
    IdSource, export_layout_document, parse_layout_bundle, parse_layout_document,
    uuid_v4_from_bytes,
};
pub use library::{COLLECTION_KEY, DRAFT_KEY, LayoutEditor, LayoutLibrary};
pub use model::*;
pub use proxy::{
    PassthroughRewriter, ProxyMode, ProxyRewriter, UrlRewriter, encode_uri_component,
};
pub use source::{
    AUTOCOMPLETE_MIN_CHARS, CardLookup, CardSource, MIN_REQUEST_INTERVAL_MS, Throttle, Timer,
    Uploader,
};
pub use store::{
    Clock, DEFAULT_DEBOUNCE_MS, DebouncedStore, DebouncedWriter, KeyValueStore, MemoryStore,
};
