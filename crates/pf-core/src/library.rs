//! Persisted custom layouts and the layout editing session.

use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use crate::geometry::DisplayMapping;
use crate::overlay::{BoxGesture, GestureAction};
use crate::{
    ArtAnchor, BackgroundTransform, BorderColorKey, BorderImages, FieldKey, IdSource, ImportError,
    KeyValueStore, LayoutConfig, StoreError, TextPosition, default_layout, export_layout_document,
    parse_layout_document,
};

/// Store key of the JSON array of custom layouts.
pub const COLLECTION_KEY: &str = "proxyforge-custom-layouts";
/// Store key of the layout currently being edited.
pub const DRAFT_KEY: &str = "proxyforge-layout-draft";

/// Built-in layout that new layouts are copied from.
const TEMPLATE_LAYOUT_ID: &str = "classic";

/// Built-in layouts plus the custom layouts kept in a [`KeyValueStore`].
#[derive(Debug)]
pub struct LayoutLibrary<S> {
    store: S,
    built_ins: Vec<LayoutConfig>,
}

impl<S: KeyValueStore> LayoutLibrary<S> {
    #[must_use]
    pub fn new(store: S, built_ins: Vec<LayoutConfig>) -> Self {
        Self { store, built_ins }
    }

    #[must_use]
    pub fn built_ins(&self) -> &[LayoutConfig] {
        &self.built_ins
    }

    #[must_use]
    pub fn is_built_in(&self, id: &str) -> bool {
        self.built_ins.iter().any(|layout| layout.id == id)
    }

    /// Custom layouts. Unreadable or corrupt collections read as empty.
    #[must_use]
    pub fn custom(&self) -> Vec<LayoutConfig> {
        match self.read_json::<Vec<LayoutConfig>>(COLLECTION_KEY) {
            Ok(layouts) => layouts.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "failed to read custom layouts");
                Vec::new()
            }
        }
    }

    /// Built-ins first, then custom layouts.
    #[must_use]
    pub fn all(&self) -> Vec<LayoutConfig> {
        let mut layouts = self.built_ins.clone();
        layouts.extend(self.custom());
        layouts
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<LayoutConfig> {
        self.all().into_iter().find(|layout| layout.id == id)
    }

    /// Insert or replace a custom layout. Built-in ids are never written.
    pub fn save(&mut self, layout: &LayoutConfig) -> Result<(), StoreError> {
        if self.is_built_in(&layout.id) {
            debug!(id = %layout.id, "not persisting built-in layout");
            return Ok(());
        }
        let mut layouts = self.custom();
        match layouts.iter_mut().find(|existing| existing.id == layout.id) {
            Some(existing) => *existing = layout.clone(),
            None => layouts.push(layout.clone()),
        }
        self.write_json(COLLECTION_KEY, &layouts)
    }

    /// Remove a custom layout. The draft slot is cleared as well.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let mut layouts = self.custom();
        layouts.retain(|layout| layout.id != id);
        self.write_json(COLLECTION_KEY, &layouts)?;
        self.store.remove(DRAFT_KEY)
    }

    /// The saved draft, but only when it belongs to the custom collection.
    #[must_use]
    pub fn active_draft(&self) -> Option<LayoutConfig> {
        let draft = match self.read_json::<LayoutConfig>(DRAFT_KEY) {
            Ok(draft) => draft?,
            Err(err) => {
                warn!(error = %err, "failed to read layout draft");
                return None;
            }
        };
        let known = self.custom().iter().any(|layout| layout.id == draft.id);
        known.then_some(draft)
    }

    pub fn write_draft(&mut self, layout: &LayoutConfig) -> Result<(), StoreError> {
        self.write_json(DRAFT_KEY, layout)
    }

    pub fn clear_draft(&mut self) -> Result<(), StoreError> {
        self.store.remove(DRAFT_KEY)
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StoreError::Corrupt {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }

    fn write_json<T: serde::Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(value).map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.store.set(key, &json)
    }
}

/// One editing session over a [`LayoutLibrary`].
///
/// While a layout is active every change is written to the draft slot and,
/// for non-built-in layouts, upserted into the custom collection. Open the
/// library over a [`DebouncedStore`](crate::DebouncedStore) to coalesce those
/// writes during drags.
#[derive(Debug)]
pub struct LayoutEditor<S, I> {
    library: LayoutLibrary<S>,
    ids: I,
    editing: LayoutConfig,
    active: bool,
    selected: Option<FieldKey>,
    preview_transform: BackgroundTransform,
}

impl<S: KeyValueStore, I: IdSource> LayoutEditor<S, I> {
    /// Start a session, resuming the saved draft when it is still a custom layout.
    #[must_use]
    pub fn open(library: LayoutLibrary<S>, ids: I) -> Self {
        let draft = library.active_draft();
        let active = draft.is_some();
        Self {
            library,
            ids,
            editing: draft.unwrap_or_else(default_layout),
            active,
            selected: None,
            preview_transform: BackgroundTransform::IDENTITY,
        }
    }

    #[must_use]
    pub const fn editing(&self) -> &LayoutConfig {
        &self.editing
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn library(&self) -> &LayoutLibrary<S> {
        &self.library
    }

    #[must_use]
    pub const fn selected_field(&self) -> Option<FieldKey> {
        self.selected
    }

    pub fn select_field(&mut self, field: Option<FieldKey>) {
        self.selected = field;
    }

    #[must_use]
    pub const fn preview_transform(&self) -> BackgroundTransform {
        self.preview_transform
    }

    pub fn set_preview_transform(&mut self, transform: BackgroundTransform) {
        self.preview_transform = transform;
    }

    /// Apply an arbitrary change, then autosave.
    pub fn update(&mut self, change: impl FnOnce(&mut LayoutConfig)) -> Result<(), StoreError> {
        change(&mut self.editing);
        self.autosave()
    }

    pub fn set_general_info(
        &mut self,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<(), StoreError> {
        self.update(|layout| {
            if let Some(name) = name {
                layout.name = name;
            }
            if let Some(description) = description {
                layout.description = Some(description);
            }
        })
    }

    pub fn set_text_position(
        &mut self,
        field: FieldKey,
        position: TextPosition,
    ) -> Result<(), StoreError> {
        self.update(|layout| {
            layout.text_positions.insert(field, position);
        })
    }

    pub fn remove_text_position(&mut self, field: FieldKey) -> Result<(), StoreError> {
        if self.selected == Some(field) {
            self.selected = None;
        }
        self.update(|layout| {
            layout.text_positions.remove(&field);
        })
    }

    pub fn set_border_images(
        &mut self,
        images: BTreeMap<BorderColorKey, BorderImages>,
    ) -> Result<(), StoreError> {
        self.update(|layout| layout.images = images)
    }

    pub fn set_art(&mut self, art: ArtAnchor) -> Result<(), StoreError> {
        self.update(|layout| layout.art = Some(art))
    }

    pub fn set_mana_symbols(&mut self, symbols: BTreeMap<String, String>) -> Result<(), StoreError> {
        self.update(|layout| layout.mana_symbols = symbols)
    }

    /// Start a fresh layout copied from the `classic` built-in, or from the
    /// default layout when there is none.
    pub fn create_new(&mut self) -> Result<(), StoreError> {
        let mut layout = match self
            .library
            .built_ins()
            .iter()
            .find(|layout| layout.id == TEMPLATE_LAYOUT_ID)
        {
            Some(template) => {
                let mut copy = template.clone();
                copy.name = String::from("New Custom Border");
                copy.description = Some(String::from("Custom border configuration"));
                copy
            }
            None => default_layout(),
        };
        layout.id = self.ids.next_id();
        self.activate(layout)
    }

    pub fn load_existing(&mut self, layout: &LayoutConfig) -> Result<(), StoreError> {
        self.activate(layout.clone())
    }

    /// Import a layout document. On failure the session is left untouched.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        let layout = match parse_layout_document(json, &mut self.ids) {
            Ok(layout) => layout,
            Err(err) => {
                error!(error = %err, "layout import rejected");
                return Err(err);
            }
        };
        if let Err(err) = self.activate(layout) {
            warn!(error = %err, "imported layout could not be saved");
        }
        Ok(())
    }

    /// Download filename and pretty JSON of the layout being edited.
    pub fn export_json(&self) -> Result<(String, String), StoreError> {
        export_layout_document(&self.editing)
    }

    /// Delete a custom layout and end the session.
    pub fn delete_custom(&mut self, id: &str) -> Result<(), StoreError> {
        self.library.delete(id)?;
        self.selected = None;
        self.active = false;
        Ok(())
    }

    /// Begin a drag on `field`, selecting it.
    pub fn begin_gesture(
        &mut self,
        field: FieldKey,
        action: GestureAction,
        mapping: DisplayMapping,
        pointer: (f64, f64),
    ) -> Option<BoxGesture> {
        let start = self.editing.position(field)?.clone();
        self.selected = Some(field);
        Some(BoxGesture::begin(action, mapping, pointer, start))
    }

    pub fn apply_gesture(
        &mut self,
        field: FieldKey,
        gesture: &BoxGesture,
        pointer: (f64, f64),
    ) -> Result<(), StoreError> {
        self.set_text_position(field, gesture.update(pointer))
    }

    pub fn into_library(self) -> LayoutLibrary<S> {
        self.library
    }

    fn activate(&mut self, layout: LayoutConfig) -> Result<(), StoreError> {
        self.editing = layout;
        self.selected = None;
        self.active = true;
        self.autosave()
    }

    fn autosave(&mut self) -> Result<(), StoreError> {
        if !self.active {
            return Ok(());
        }
        self.library.write_draft(&self.editing)?;
        self.library.save(&self.editing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Clock, DebouncedStore, MemoryStore};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: Rc<Cell<usize>>,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes.set(self.writes.get() + 1);
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.writes.set(self.writes.get() + 1);
            self.inner.remove(key)
        }
    }

    #[derive(Debug, Clone, Copy)]
    struct Frozen;

    impl Clock for Frozen {
        fn now_ms(&self) -> f64 {
            0.0
        }
    }

    struct Counter(u32);

    impl IdSource for Counter {
        fn next_id(&mut self) -> String {
            self.0 += 1;
            format!("custom-{}", self.0)
        }
    }

    fn classic() -> LayoutConfig {
        LayoutConfig {
            id: String::from("classic"),
            name: String::from("Classic"),
            ..default_layout()
        }
    }

    fn editor(store: &MemoryStore) -> LayoutEditor<MemoryStore, Counter> {
        LayoutEditor::open(LayoutLibrary::new(store.clone(), vec![classic()]), Counter(0))
    }

    #[test]
    fn create_new_copies_classic_and_saves() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        assert!(!editor.is_active());

        editor.create_new().expect("create");
        assert!(editor.is_active());
        assert_eq!(editor.editing().id, "custom-1");
        assert_eq!(editor.editing().name, "New Custom Border");

        let custom = editor.library().custom();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].id, "custom-1");
    }

    #[test]
    fn create_new_without_template_uses_default() {
        let store = MemoryStore::new();
        let mut editor = LayoutEditor::open(LayoutLibrary::new(store, Vec::new()), Counter(0));
        editor.create_new().expect("create");
        assert_eq!(editor.editing().name, "New Border");
        assert_eq!(editor.editing().id, "custom-1");
    }

    #[test]
    fn draft_resumes_only_for_custom_layouts() {
        let store = MemoryStore::new();
        {
            let mut editor = editor(&store);
            editor.create_new().expect("create");
            editor
                .set_general_info(Some(String::from("Renamed")), None)
                .expect("rename");
        }
        let resumed = editor(&store);
        assert!(resumed.is_active());
        assert_eq!(resumed.editing().name, "Renamed");

        let mut stray = store.clone();
        stray
            .set(DRAFT_KEY, &serde_json::to_string(&default_layout()).expect("json"))
            .expect("seed");
        let fresh = editor(&store);
        assert!(!fresh.is_active());
    }

    #[test]
    fn built_in_layouts_are_never_collected() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        editor.load_existing(&classic()).expect("load");
        editor
            .set_general_info(Some(String::from("Edited")), None)
            .expect("edit");
        assert!(editor.library().custom().is_empty());
        assert!(store.get(DRAFT_KEY).expect("get").is_some());
    }

    #[test]
    fn inactive_session_does_not_autosave() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        editor
            .set_general_info(Some(String::from("Scratch")), None)
            .expect("edit");
        assert!(store.is_empty());
    }

    #[test]
    fn import_keeps_state_on_failure() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        editor.create_new().expect("create");
        let before = editor.editing().clone();

        let err = editor
            .import_json(r#"{"name": "Broken"}"#)
            .expect_err("missing fields");
        assert_eq!(err, ImportError::MissingField("images"));
        assert_eq!(editor.editing(), &before);
    }

    #[test]
    fn import_assigns_new_id_and_activates() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        let (_, json) = export_layout_document(&classic()).expect("export");
        editor.import_json(&json).expect("import");
        assert_eq!(editor.editing().id, "custom-1");
        assert!(editor.is_active());
        assert_eq!(editor.library().custom().len(), 1);
    }

    #[test]
    fn delete_clears_draft_and_deactivates() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        editor.create_new().expect("create");
        editor.delete_custom("custom-1").expect("delete");
        assert!(!editor.is_active());
        assert!(editor.library().custom().is_empty());
        assert_eq!(store.get(DRAFT_KEY).expect("get"), None);
    }

    #[test]
    fn corrupt_collection_reads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(COLLECTION_KEY, "{oops").expect("seed");
        let library = LayoutLibrary::new(store, vec![classic()]);
        assert!(library.custom().is_empty());
        assert_eq!(library.all().len(), 1);
    }

    #[test]
    fn gesture_writes_back_through_autosave() {
        let store = MemoryStore::new();
        let mut editor = editor(&store);
        editor.create_new().expect("create");

        let mapping = DisplayMapping::new(250.0, 350.0);
        let gesture = editor
            .begin_gesture(FieldKey::Name, GestureAction::Move, mapping, (0.0, 0.0))
            .expect("name box");
        assert_eq!(editor.selected_field(), Some(FieldKey::Name));
        editor
            .apply_gesture(FieldKey::Name, &gesture, (-1000.0, -1000.0))
            .expect("apply");

        let saved = editor.library().custom();
        let name = saved[0].position(FieldKey::Name).expect("position");
        assert_eq!((name.x, name.y), (0.0, 0.0));
    }

    #[test]
    fn drag_writes_are_coalesced_until_teardown() {
        let backend = CountingStore::default();
        let store = DebouncedStore::new(backend.clone(), Frozen);
        let mut editor =
            LayoutEditor::open(LayoutLibrary::new(store.clone(), vec![classic()]), Counter(0));
        editor.create_new().expect("create");

        let mapping = DisplayMapping::new(250.0, 350.0);
        let gesture = editor
            .begin_gesture(FieldKey::Name, GestureAction::Move, mapping, (0.0, 0.0))
            .expect("name box");
        for step in 1..=20 {
            editor
                .apply_gesture(FieldKey::Name, &gesture, (f64::from(step), 0.0))
                .expect("apply");
        }
        assert_eq!(backend.writes.get(), 0);
        assert!(store.has_pending());
        assert_eq!(editor.library().custom().len(), 1);

        let moved = editor.editing().clone();
        drop(editor);
        drop(store);
        assert_eq!(backend.writes.get(), 2);

        let reopened = LayoutLibrary::new(backend.inner.clone(), vec![classic()]);
        assert_eq!(reopened.active_draft(), Some(moved.clone()));
        assert_eq!(reopened.custom(), vec![moved]);
    }
}
