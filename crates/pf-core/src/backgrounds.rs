//! Artwork choices per card and the pan/zoom remembered for each.

use std::collections::BTreeMap;

use tracing::warn;

use crate::{
    BackgroundImage, BackgroundSource, BackgroundTransform, CardRecord, DebouncedWriter,
    ImportError, KeyValueStore, SourceError, Uploader,
};

/// Store key of the per-card background transforms.
pub const SETTINGS_KEY: &str = "proxyforge-background-settings";

/// Custom backgrounds keyed by card id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundLibrary {
    custom: BTreeMap<String, Vec<BackgroundImage>>,
}

impl BackgroundLibrary {
    #[must_use]
    pub fn new(custom: BTreeMap<String, Vec<BackgroundImage>>) -> Self {
        Self { custom }
    }

    /// Parse a `{cardId: [BackgroundImage]}` document.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        serde_json::from_str(json)
            .map(Self::new)
            .map_err(|err| ImportError::Json(err.to_string()))
    }

    /// The card's own art crop, then every custom background for its id.
    #[must_use]
    pub fn available_for(&self, card: &CardRecord) -> Vec<BackgroundImage> {
        let mut available = Vec::new();
        if let Some(url) = card.art_crop_url.as_deref().filter(|url| !url.is_empty()) {
            available.push(BackgroundImage {
                url: url.to_string(),
                label: Some(String::from("Default Art")),
                source: Some(BackgroundSource::Scryfall),
            });
        }
        if let Some(custom) = self.custom.get(&card.id) {
            available.extend(custom.iter().cloned());
        }
        available
    }

    pub fn add_custom(&mut self, card_id: &str, image: BackgroundImage) {
        self.custom
            .entry(card_id.to_string())
            .or_default()
            .push(image);
    }

    /// Upload artwork and register the resulting URL for `card_id`.
    pub async fn add_uploaded<U: Uploader>(
        &mut self,
        uploader: &U,
        card_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<BackgroundImage, SourceError> {
        let url = uploader.upload(file_name, bytes).await?;
        let image = BackgroundImage {
            url,
            label: Some(file_name.to_string()),
            source: Some(BackgroundSource::Custom),
        };
        self.add_custom(card_id, image.clone());
        Ok(image)
    }
}

/// Transforms keyed by card id, then by background URL. Writes are debounced
/// and flushed when the settings are dropped.
#[derive(Debug)]
pub struct BackgroundSettings<S: KeyValueStore> {
    entries: BTreeMap<String, BTreeMap<String, BackgroundTransform>>,
    writer: DebouncedWriter<S>,
}

impl<S: KeyValueStore> BackgroundSettings<S> {
    /// Load saved settings. Missing or corrupt data starts empty.
    #[must_use]
    pub fn load(writer: DebouncedWriter<S>) -> Self {
        let entries = match writer.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "discarding corrupt background settings");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                warn!(error = %err, "failed to read background settings");
                BTreeMap::new()
            }
        };
        Self { entries, writer }
    }

    #[must_use]
    pub fn transform_for(&self, card_id: &str, url: &str) -> BackgroundTransform {
        self.entries
            .get(card_id)
            .and_then(|per_card| per_card.get(url))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, card_id: &str, url: &str, transform: BackgroundTransform, now_ms: f64) {
        self.entries
            .entry(card_id.to_string())
            .or_default()
            .insert(url.to_string(), transform);
        match serde_json::to_string(&self.entries) {
            Ok(json) => self.writer.stage(SETTINGS_KEY, json, now_ms),
            Err(err) => warn!(error = %err, "failed to serialize background settings"),
        }
    }

    /// Commit if the debounce delay has passed.
    pub fn poll(&mut self, now_ms: f64) {
        if let Err(err) = self.writer.poll(now_ms) {
            warn!(error = %err, "failed to save background settings");
        }
    }

    pub fn flush(&mut self) {
        if let Err(err) = self.writer.flush() {
            warn!(error = %err, "failed to save background settings");
        }
    }

    #[must_use]
    pub fn deadline_ms(&self) -> Option<f64> {
        self.writer.deadline_ms()
    }
}

/// The card being composed and which of its backgrounds is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundSelection {
    card: Option<CardRecord>,
    index: usize,
    transform: BackgroundTransform,
}

impl BackgroundSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn card(&self) -> Option<&CardRecord> {
        self.card.as_ref()
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn transform(&self) -> BackgroundTransform {
        self.transform
    }

    #[must_use]
    pub fn available(&self, library: &BackgroundLibrary) -> Vec<BackgroundImage> {
        self.card
            .as_ref()
            .map(|card| library.available_for(card))
            .unwrap_or_default()
    }

    /// The selected background, falling back to the first one.
    #[must_use]
    pub fn selected(&self, library: &BackgroundLibrary) -> Option<BackgroundImage> {
        let mut available = self.available(library);
        if self.index < available.len() {
            Some(available.swap_remove(self.index))
        } else {
            available.into_iter().next()
        }
    }

    /// Switch cards. The first background is selected with its remembered transform.
    pub fn select_card<S: KeyValueStore>(
        &mut self,
        card: CardRecord,
        library: &BackgroundLibrary,
        settings: &BackgroundSettings<S>,
    ) {
        self.card = Some(card);
        self.index = 0;
        self.transform = self.remembered(library, settings);
    }

    /// Switch to `background` if the card offers it. Returns whether it did.
    pub fn select_background<S: KeyValueStore>(
        &mut self,
        background: &BackgroundImage,
        library: &BackgroundLibrary,
        settings: &BackgroundSettings<S>,
    ) -> bool {
        let Some(index) = self
            .available(library)
            .iter()
            .position(|candidate| candidate.url == background.url)
        else {
            return false;
        };
        self.index = index;
        self.transform = self.remembered(library, settings);
        true
    }

    /// Record a new transform for the current card and background.
    pub fn set_transform<S: KeyValueStore>(
        &mut self,
        transform: BackgroundTransform,
        library: &BackgroundLibrary,
        settings: &mut BackgroundSettings<S>,
        now_ms: f64,
    ) {
        self.transform = transform;
        if let (Some(card), Some(background)) = (self.card.as_ref(), self.selected(library)) {
            settings.set(&card.id, &background.url, transform, now_ms);
        }
    }

    fn remembered<S: KeyValueStore>(
        &self,
        library: &BackgroundLibrary,
        settings: &BackgroundSettings<S>,
    ) -> BackgroundTransform {
        match (self.card.as_ref(), self.selected(library)) {
            (Some(card), Some(background)) => settings.transform_for(&card.id, &background.url),
            _ => BackgroundTransform::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoreError};

    fn card() -> CardRecord {
        CardRecord {
            id: String::from("card-1"),
            name: String::from("Llanowar Elves"),
            art_crop_url: Some(String::from("https://cards.scryfall.io/art_crop/elves.jpg")),
            ..CardRecord::default()
        }
    }

    fn library() -> BackgroundLibrary {
        BackgroundLibrary::from_json(
            r#"{"card-1": [{"url": "/art/elves-alt.png", "label": "Alt", "source": "custom"}]}"#,
        )
        .expect("backgrounds")
    }

    struct FixedUploader;

    impl Uploader for FixedUploader {
        async fn upload(&self, name: &str, _bytes: &[u8]) -> Result<String, SourceError> {
            Ok(format!("https://drive.google.com/uc?id={name}"))
        }
    }

    #[test]
    fn available_lists_art_crop_first() {
        let available = library().available_for(&card());
        assert_eq!(available.len(), 2);
        assert_eq!(available[0].label.as_deref(), Some("Default Art"));
        assert_eq!(available[0].source, Some(BackgroundSource::Scryfall));
        assert_eq!(available[1].url, "/art/elves-alt.png");
    }

    #[test]
    fn selection_restores_transform_per_background() {
        let store = MemoryStore::new();
        let library = library();
        let mut settings = BackgroundSettings::load(DebouncedWriter::new(store.clone()));
        let mut selection = BackgroundSelection::new();

        selection.select_card(card(), &library, &settings);
        let zoomed = BackgroundTransform {
            scale: 1.5,
            offset_x: 4.0,
            offset_y: -2.0,
        };
        selection.set_transform(zoomed, &library, &mut settings, 0.0);

        let alt = library.available_for(&card())[1].clone();
        assert!(selection.select_background(&alt, &library, &settings));
        assert_eq!(selection.transform(), BackgroundTransform::IDENTITY);

        let original = library.available_for(&card())[0].clone();
        assert!(selection.select_background(&original, &library, &settings));
        assert_eq!(selection.transform(), zoomed);
    }

    #[test]
    fn select_card_resets_index() {
        let store = MemoryStore::new();
        let library = library();
        let settings = BackgroundSettings::load(DebouncedWriter::new(store));
        let mut selection = BackgroundSelection::new();
        selection.select_card(card(), &library, &settings);
        let alt = library.available_for(&card())[1].clone();
        selection.select_background(&alt, &library, &settings);
        assert_eq!(selection.index(), 1);

        selection.select_card(card(), &library, &settings);
        assert_eq!(selection.index(), 0);
    }

    #[test]
    fn settings_persist_after_drop() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        {
            let mut settings = BackgroundSettings::load(DebouncedWriter::new(store.clone()));
            settings.set("card-1", "a.png", BackgroundTransform::IDENTITY, 0.0);
            assert!(store.is_empty());
        }
        assert!(store.get(SETTINGS_KEY)?.is_some());

        let reloaded = BackgroundSettings::load(DebouncedWriter::new(store));
        assert_eq!(
            reloaded.transform_for("card-1", "a.png"),
            BackgroundTransform::IDENTITY
        );
        Ok(())
    }

    #[test]
    fn corrupt_settings_start_empty() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, "not json").expect("seed");
        let settings = BackgroundSettings::load(DebouncedWriter::new(store));
        assert_eq!(settings.transform_for("x", "y"), BackgroundTransform::IDENTITY);
    }

    #[test]
    fn upload_registers_custom_background() {
        let mut library = BackgroundLibrary::default();
        let image = futures::executor::block_on(library.add_uploaded(
            &FixedUploader,
            "card-9",
            "art.png",
            b"png-bytes",
        ))
        .expect("upload");
        assert_eq!(image.source, Some(BackgroundSource::Custom));
        let mut card = card();
        card.id = String::from("card-9");
        card.art_crop_url = None;
        assert_eq!(library.available_for(&card), vec![image]);
    }
}
