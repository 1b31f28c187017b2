//! Asset loading from a local directory.

#![allow(async_fn_in_trait)]

use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use pf_core::AssetError;
use pf_render_canvas::AssetLoader;
use pf_render_svg::SvgImage;
use tracing::trace;

/// Resolves asset URLs to files under `root`.
///
/// `/frames/u.png` and `frames/u.png` both name `<root>/frames/u.png`. The
/// emitted image keeps the absolute file path as its `href` so the SVG can be
/// rasterized from anywhere. Remote and `data:` URLs are not fetched.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a URL names, or `None` for URLs this loader does not serve.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        if url.is_empty() || url.contains("://") || url.starts_with("data:") {
            return None;
        }
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl AssetLoader for FsAssetLoader {
    type Image = SvgImage;

    async fn load_image(&self, url: &str) -> Result<SvgImage, AssetError> {
        let path = self.resolve(url).ok_or_else(|| AssetError::Unsupported {
            url: url.to_string(),
        })?;
        let bytes = fs::read(&path).map_err(|err| AssetError::Load {
            url: url.to_string(),
            reason: format!("{}: {err}", path.display()),
        })?;
        let (width, height) = image_dimensions(url, &path, &bytes)?;
        trace!(url, width, height, "image loaded");
        Ok(SvgImage {
            href: path.to_string_lossy().into_owned(),
            width,
            height,
        })
    }

    /// Fonts are resolved when the SVG is rasterized.
    async fn load_font(&self, family: &str) -> Result<(), AssetError> {
        trace!(family, "font deferred to rasterizer");
        Ok(())
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn image_dimensions(url: &str, path: &Path, bytes: &[u8]) -> Result<(f64, f64), AssetError> {
    let decode_error = |reason: String| AssetError::Decode {
        url: url.to_string(),
        reason,
    };
    if is_svg(path) {
        let text = std::str::from_utf8(bytes).map_err(|err| decode_error(err.to_string()))?;
        return svg_dimensions(text)
            .ok_or_else(|| decode_error(String::from("svg has no usable width/height or viewBox")));
    }
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| decode_error(err.to_string()))?
        .into_dimensions()
        .map_err(|err| decode_error(err.to_string()))?;
    Ok((f64::from(width), f64::from(height)))
}

/// Value of `name="..."` on the root `<svg>` element.
fn root_attribute<'a>(svg: &'a str, name: &str) -> Option<&'a str> {
    let start = svg.find("<svg")?;
    let tag_end = svg[start..].find('>').map(|end| start + end)?;
    let tag = &svg[start..tag_end];
    let needle = format!(" {name}=\"");
    let value_start = tag.find(&needle)? + needle.len();
    let value_end = tag[value_start..].find('"')? + value_start;
    Some(&tag[value_start..value_end])
}

fn parse_length(value: &str) -> Option<f64> {
    let number = value.trim().trim_end_matches("px");
    number.parse::<f64>().ok().filter(|len| *len > 0.0)
}

/// Intrinsic size of an SVG from its `width`/`height`, else its `viewBox`.
#[must_use]
pub fn svg_dimensions(svg: &str) -> Option<(f64, f64)> {
    let width = root_attribute(svg, "width").and_then(parse_length);
    let height = root_attribute(svg, "height").and_then(parse_length);
    if let (Some(width), Some(height)) = (width, height) {
        return Some((width, height));
    }

    let view_box: Vec<f64> = root_attribute(svg, "viewBox")?
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();
    match view_box.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some((*width, *height)),
        _ => None,
    }
}
