use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Asset,
    Import,
    Render,
    Source,
    Store,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "proxyforge/error/asset",
            Self::Import => "proxyforge/error/import",
            Self::Render => "proxyforge/error/render",
            Self::Source => "proxyforge/error/source",
            Self::Store => "proxyforge/error/store",
        }
    }
}

/// An image or font could not be made available. Renders skip the layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("failed to load image {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("failed to decode image {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("unsupported asset url: {url}")]
    Unsupported { url: String },
    #[error("font '{family}' could not be loaded: {reason}")]
    Font { family: String, reason: String },
}

impl AssetError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::Asset
    }
}

/// A layout document was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("invalid layout document: {0}")]
    Json(String),
    #[error("layout document is missing required field '{0}'")]
    MissingField(&'static str),
}

impl ImportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::Import
    }
}

/// A render could not run at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("2d drawing context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

impl RenderError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::Render
    }
}

/// The card data provider could not answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl SourceError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::Source
    }
}

/// The key-value store rejected a read or write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("stored value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("failed to serialize value: {0}")]
    Serialize(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::Store
    }
}
