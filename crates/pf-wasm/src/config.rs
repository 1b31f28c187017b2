//! Runtime configuration shared by every composer on the page.

use std::sync::{LazyLock, RwLock};

use pf_core::geometry::DPI_PRESETS;
use pf_core::{ProxyMode, ProxyRewriter};
use pf_render_canvas::RenderConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RuntimeConfig {
    pub(crate) render: RenderConfig,
    pub(crate) proxy: ProxyRewriter,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ComposerConfigOverrides {
    pub(crate) dpi: Option<u32>,
    pub(crate) debug: Option<bool>,
    pub(crate) fallback_color: Option<String>,
    pub(crate) default_font_family: Option<String>,
    pub(crate) symbol_gap: Option<f64>,
    pub(crate) export_margin_mm: Option<f64>,
    pub(crate) proxy: ProxyConfigOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ProxyConfigOverrides {
    pub(crate) mode: Option<String>,
    pub(crate) cors_proxy: Option<String>,
    pub(crate) base_url: Option<String>,
}

static RUNTIME_CONFIG: LazyLock<RwLock<RuntimeConfig>> =
    LazyLock::new(|| RwLock::new(RuntimeConfig::default()));

pub(crate) fn read_runtime_config() -> RuntimeConfig {
    match RUNTIME_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn write_runtime_config(config: RuntimeConfig) {
    match RUNTIME_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => {
            let mut guard = poisoned.into_inner();
            *guard = config;
        }
    }
}

pub(crate) fn merge_render_config(
    base: &RenderConfig,
    overrides: &ComposerConfigOverrides,
) -> Result<RenderConfig, String> {
    let mut merged = base.clone();

    if let Some(value) = overrides.dpi {
        if !DPI_PRESETS.contains(&value) {
            return Err(format!(
                "invalid dpi '{value}'; expected one of 150,300,500,800"
            ));
        }
        merged.dpi = value;
    }
    if let Some(value) = overrides.debug {
        merged.debug = value;
    }
    if let Some(value) = overrides.fallback_color.as_ref() {
        merged.fallback_color = value.clone();
    }
    if let Some(value) = overrides.default_font_family.as_ref() {
        merged.default_font_family = value.clone();
    }
    if let Some(value) = overrides.symbol_gap {
        merged.symbol_gap = value;
    }
    if let Some(value) = overrides.export_margin_mm {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("invalid export margin '{value}'"));
        }
        merged.export_margin_mm = value;
    }

    Ok(merged)
}

pub(crate) fn merge_proxy_config(
    base: &ProxyRewriter,
    overrides: &ProxyConfigOverrides,
) -> Result<ProxyRewriter, String> {
    let mode = match overrides.mode.as_deref() {
        None => base.mode,
        Some("development") => ProxyMode::Development,
        Some("production") => ProxyMode::Production,
        Some(other) => {
            return Err(format!(
                "invalid proxy mode '{other}'; expected development or production"
            ));
        }
    };
    let cors_proxy = overrides
        .cors_proxy
        .clone()
        .or_else(|| base.cors_proxy.clone());
    let base_url = overrides
        .base_url
        .clone()
        .unwrap_or_else(|| base.base_url.clone());
    Ok(ProxyRewriter::new(mode, cors_proxy, base_url))
}

pub(crate) fn merge_runtime_config(
    base: &RuntimeConfig,
    overrides: &ComposerConfigOverrides,
) -> Result<RuntimeConfig, String> {
    Ok(RuntimeConfig {
        render: merge_render_config(&base.render, overrides)?,
        proxy: merge_proxy_config(&base.proxy, &overrides.proxy)?,
    })
}
