//! Image and font loading with a per-renderer cache.

#![allow(async_fn_in_trait)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pf_core::{AssetError, primary_family};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::{ImageSource, MockImage};

/// Fetches and decodes assets for one backend.
pub trait AssetLoader {
    type Image: ImageSource + Clone;

    async fn load_image(&self, url: &str) -> Result<Self::Image, AssetError>;

    /// Make `family` (a single family name) available for drawing.
    async fn load_font(&self, family: &str) -> Result<(), AssetError>;
}

/// Decoded images by resolved URL and loaded font families. Entries are
/// never evicted.
#[derive(Debug, Clone)]
pub struct AssetCache<I> {
    images: FxHashMap<String, I>,
    fonts: FxHashSet<String>,
}

impl<I> Default for AssetCache<I> {
    fn default() -> Self {
        Self {
            images: FxHashMap::default(),
            fonts: FxHashSet::default(),
        }
    }
}

impl<I: Clone> AssetCache<I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cached_image(&self, url: &str) -> Option<&I> {
        self.images.get(url)
    }

    pub fn insert_image(&mut self, url: impl Into<String>, image: I) {
        self.images.insert(url.into(), image);
    }

    #[must_use]
    pub fn has_font(&self, family: &str) -> bool {
        self.fonts.contains(family)
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// The image at `url`, loading it on a miss.
    pub async fn image<L>(&mut self, loader: &L, url: &str) -> Result<I, AssetError>
    where
        L: AssetLoader<Image = I>,
    {
        if let Some(image) = self.images.get(url) {
            tracing::trace!(url, "image cache hit");
            return Ok(image.clone());
        }
        let image = loader.load_image(url).await?;
        self.images.insert(url.to_string(), image.clone());
        Ok(image)
    }

    /// Load the primary family of a CSS family list once. Failures are not
    /// remembered, so the next render retries.
    pub async fn ensure_font<L>(&mut self, loader: &L, family: &str) -> Result<(), AssetError>
    where
        L: AssetLoader<Image = I>,
    {
        let primary = primary_family(family);
        if primary.is_empty() || self.fonts.contains(primary) {
            return Ok(());
        }
        loader.load_font(primary).await?;
        self.fonts.insert(primary.to_string());
        Ok(())
    }
}

// ============================================================================
// Mock loader
// ============================================================================

/// Suspends once before completing.
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Serves images from a fixed table and records every request.
#[derive(Debug, Default)]
pub struct MockAssetLoader {
    images: BTreeMap<String, (f64, f64)>,
    broken_fonts: BTreeSet<String>,
    /// Suspend once per load so concurrent renders interleave.
    yields: bool,
    image_requests: RefCell<Vec<String>>,
    font_requests: RefCell<Vec<String>>,
}

impl MockAssetLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>, width: f64, height: f64) -> Self {
        self.images.insert(url.into(), (width, height));
        self
    }

    #[must_use]
    pub fn with_broken_font(mut self, family: impl Into<String>) -> Self {
        self.broken_fonts.insert(family.into());
        self
    }

    #[must_use]
    pub fn yielding(mut self) -> Self {
        self.yields = true;
        self
    }

    #[must_use]
    pub fn image_requests(&self) -> Vec<String> {
        self.image_requests.borrow().clone()
    }

    #[must_use]
    pub fn font_requests(&self) -> Vec<String> {
        self.font_requests.borrow().clone()
    }
}

impl AssetLoader for MockAssetLoader {
    type Image = MockImage;

    async fn load_image(&self, url: &str) -> Result<MockImage, AssetError> {
        self.image_requests.borrow_mut().push(url.to_string());
        if self.yields {
            YieldNow(false).await;
        }
        match self.images.get(url) {
            Some(&(width, height)) => Ok(MockImage {
                url: url.to_string(),
                width,
                height,
            }),
            None => Err(AssetError::Load {
                url: url.to_string(),
                reason: String::from("not found"),
            }),
        }
    }

    async fn load_font(&self, family: &str) -> Result<(), AssetError> {
        self.font_requests.borrow_mut().push(family.to_string());
        if self.yields {
            YieldNow(false).await;
        }
        if self.broken_fonts.contains(family) {
            return Err(AssetError::Font {
                family: family.to_string(),
                reason: String::from("unavailable"),
            });
        }
        Ok(())
    }
}
