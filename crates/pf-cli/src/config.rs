//! Configuration file loading for the CLI.
//!
//! A TOML file carries the same render overrides and proxy settings the
//! browser binding accepts, plus the paths the native front end reads from.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use pf_core::geometry::DPI_PRESETS;
use pf_core::{ProxyMode, ProxyRewriter};
use pf_render_canvas::RenderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "proxyforge.toml";
/// File name of the layout store inside the data directory.
const STORE_FILE_NAME: &str = "layouts.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// `[render]` table. Every key is optional and overrides [`RenderConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOverrides {
    pub dpi: Option<u32>,
    pub debug: Option<bool>,
    pub fallback_color: Option<String>,
    pub default_font_family: Option<String>,
    pub symbol_gap: Option<f64>,
    pub export_margin_mm: Option<f64>,
}

/// `[proxy]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyOverrides {
    pub mode: Option<ProxyMode>,
    pub cors_proxy: Option<String>,
    pub base_url: Option<String>,
}

/// `[paths]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory local asset URLs are resolved against.
    pub assets: Option<PathBuf>,
    /// Symbol catalog JSON.
    pub symbols: Option<PathBuf>,
    /// Bundle of built-in layouts.
    pub layouts: Option<PathBuf>,
    /// JSON file holding custom layouts and the draft.
    pub store: Option<PathBuf>,
    /// Local card-data dump used by `lookup` and `render --name`.
    pub cards: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub render: RenderOverrides,
    pub proxy: ProxyOverrides,
    pub paths: PathsConfig,
}

impl CliConfig {
    /// Apply the `[render]` overrides on top of `base`.
    pub fn render_config(&self, base: RenderConfig) -> Result<RenderConfig, ConfigError> {
        let overrides = &self.render;
        let mut config = base;
        if let Some(dpi) = overrides.dpi {
            config.dpi = validate_dpi(dpi)?;
        }
        if let Some(debug) = overrides.debug {
            config.debug = debug;
        }
        if let Some(color) = &overrides.fallback_color {
            config.fallback_color.clone_from(color);
        }
        if let Some(family) = &overrides.default_font_family {
            config.default_font_family.clone_from(family);
        }
        if let Some(gap) = overrides.symbol_gap {
            if !gap.is_finite() || gap < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "symbol_gap must be a non-negative number, got {gap}"
                )));
            }
            config.symbol_gap = gap;
        }
        if let Some(margin) = overrides.export_margin_mm {
            config.export_margin_mm = validate_margin(margin)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn proxy_rewriter(&self) -> ProxyRewriter {
        let defaults = ProxyRewriter::default();
        ProxyRewriter::new(
            self.proxy.mode.unwrap_or(defaults.mode),
            self.proxy.cors_proxy.clone(),
            self.proxy.base_url.clone().unwrap_or(defaults.base_url),
        )
    }

    /// The layout store path: configured, else the platform data directory,
    /// else the working directory.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.paths.store {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.data_dir().join(STORE_FILE_NAME),
            None => PathBuf::from(STORE_FILE_NAME),
        }
    }

    #[must_use]
    pub fn assets_root(&self) -> PathBuf {
        self.paths.assets.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// DPI values outside the presets are rejected.
pub fn validate_dpi(dpi: u32) -> Result<u32, ConfigError> {
    if DPI_PRESETS.contains(&dpi) {
        Ok(dpi)
    } else {
        let presets: Vec<String> = DPI_PRESETS.iter().map(u32::to_string).collect();
        Err(ConfigError::Validation(format!(
            "invalid dpi '{dpi}'; expected one of {}",
            presets.join(",")
        )))
    }
}

pub fn validate_margin(margin_mm: f64) -> Result<f64, ConfigError> {
    if margin_mm.is_finite() && margin_mm >= 0.0 {
        Ok(margin_mm)
    } else {
        Err(ConfigError::Validation(format!(
            "export margin must be a non-negative number of millimeters, got {margin_mm}"
        )))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "proxyforge", "proxyforge")
}

pub fn parse_config(content: &str) -> Result<CliConfig, ConfigError> {
    toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
}

/// Find and load configuration.
///
/// Search order:
/// 1. `explicit_path`, which must exist
/// 2. `proxyforge.toml` in the working directory
/// 3. `config.toml` in the platform config directory
/// 4. defaults
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    if let Some(path) = explicit_path {
        info!(path = %path.display(), "loading configuration from explicit path");
        return load_config_file(path);
    }

    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.exists() {
        info!(path = %local.display(), "loading configuration from working directory");
        return load_config_file(local);
    }

    if let Some(dirs) = project_dirs() {
        let system_config = dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = %system_config.display(), "loading configuration from config directory");
            return load_config_file(&system_config);
        }
        debug!(path = %system_config.display(), "no configuration in config directory");
    } else {
        debug!("could not determine platform config directory");
    }

    debug!("no configuration file found, using defaults");
    Ok(CliConfig::default())
}

fn load_config_file(path: &Path) -> Result<CliConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}
