//! Layout editing and per-card background state, persisted in `localStorage`.

use std::cell::RefCell;
use std::rc::Rc;

use pf_core::geometry::DisplayMapping;
use pf_core::overlay::{BoxGesture, GestureAction, PanGesture, zoom_background};
use pf_core::{
    BackgroundImage, BackgroundLibrary, BackgroundSelection, BackgroundSettings,
    BackgroundTransform, Clock, DebouncedStore, DebouncedWriter, FieldKey, LayoutEditor,
    LayoutLibrary, StoreError, TextPosition, Timer, parse_layout_bundle,
};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::spawn_local;

use crate::browser::{BrowserTimer, LocalStorageStore, RandomIds};
use crate::{js_error, parse_field_key, to_js_value};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedLayout {
    file_name: String,
    json: String,
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|err| js_error(format!("invalid {what}: {err}")))
}

fn store_error(err: impl std::fmt::Display) -> JsValue {
    js_error(err.to_string())
}

type LayoutStore = DebouncedStore<LocalStorageStore, BrowserTimer>;

/// Commit staged layout writes once the debounce delay has passed.
fn schedule_layout_autosave(store: &LayoutStore) {
    let Some(deadline) = store.deadline_ms() else {
        return;
    };
    let store = store.clone();
    spawn_local(async move {
        let timer = BrowserTimer;
        let wait = deadline - timer.now_ms();
        if wait > 0.0 {
            timer.sleep_ms(wait).await;
        }
        if let Err(err) = store.poll() {
            warn!(error = %err, "failed to save layouts");
        }
    });
}

/// The layout editor: custom layout library, draft autosave and box drags.
#[wasm_bindgen]
pub struct LayoutStudio {
    editor: LayoutEditor<LayoutStore, RandomIds>,
    autosave: LayoutStore,
    drag: Option<(FieldKey, BoxGesture)>,
}

impl LayoutStudio {
    fn edited(&self, result: Result<(), StoreError>) -> Result<(), JsValue> {
        schedule_layout_autosave(&self.autosave);
        result.map_err(store_error)
    }
}

#[wasm_bindgen]
impl LayoutStudio {
    /// `builtIns` is a layout bundle, `{"borders": [...]}` or a bare list.
    #[wasm_bindgen(constructor)]
    pub fn new(built_ins: Option<String>) -> Result<Self, JsValue> {
        let built_ins = match built_ins.as_deref() {
            Some(json) => parse_layout_bundle(json).map_err(store_error)?,
            None => Vec::new(),
        };
        let store = LocalStorageStore::open().map_err(store_error)?;
        let autosave = DebouncedStore::new(store, BrowserTimer);
        let editor = LayoutEditor::open(LayoutLibrary::new(autosave.clone(), built_ins), RandomIds);
        Ok(Self {
            editor,
            autosave,
            drag: None,
        })
    }

    pub fn layouts(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.editor.library().all())
    }

    pub fn editing(&self) -> Result<JsValue, JsValue> {
        to_js_value(self.editor.editing())
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.editor.is_active()
    }

    #[wasm_bindgen(js_name = isBuiltIn)]
    pub fn is_built_in(&self, id: &str) -> bool {
        self.editor.library().is_built_in(id)
    }

    #[wasm_bindgen(js_name = createNew)]
    pub fn create_new(&mut self) -> Result<(), JsValue> {
        self.drag = None;
        let result = self.editor.create_new();
        self.edited(result)
    }

    #[wasm_bindgen(js_name = loadExisting)]
    pub fn load_existing(&mut self, id: &str) -> Result<(), JsValue> {
        let layout = self
            .editor
            .library()
            .find(id)
            .ok_or_else(|| js_error(format!("unknown layout '{id}'")))?;
        self.drag = None;
        let result = self.editor.load_existing(&layout);
        self.edited(result)
    }

    /// Import a layout document under a fresh id. Rejected documents leave
    /// the session as it was.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.editor.import_json(json).map_err(store_error)?;
        self.drag = None;
        schedule_layout_autosave(&self.autosave);
        Ok(())
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<JsValue, JsValue> {
        let (file_name, json) = self.editor.export_json().map_err(store_error)?;
        to_js_value(&ExportedLayout { file_name, json })
    }

    #[wasm_bindgen(js_name = deleteCustom)]
    pub fn delete_custom(&mut self, id: &str) -> Result<(), JsValue> {
        self.drag = None;
        let result = self.editor.delete_custom(id);
        self.edited(result)
    }

    #[wasm_bindgen(js_name = setGeneralInfo)]
    pub fn set_general_info(
        &mut self,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<(), JsValue> {
        let result = self.editor.set_general_info(name, description);
        self.edited(result)
    }

    #[wasm_bindgen(js_name = setTextPosition)]
    pub fn set_text_position(&mut self, field: &str, position: JsValue) -> Result<(), JsValue> {
        let field = parse_field_key(field).map_err(js_error)?;
        let position: TextPosition = from_js(position, "text position")?;
        let result = self.editor.set_text_position(field, position);
        self.edited(result)
    }

    #[wasm_bindgen(js_name = removeTextPosition)]
    pub fn remove_text_position(&mut self, field: &str) -> Result<(), JsValue> {
        let field = parse_field_key(field).map_err(js_error)?;
        let result = self.editor.remove_text_position(field);
        self.edited(result)
    }

    #[wasm_bindgen(js_name = selectedField)]
    pub fn selected_field(&self) -> Option<String> {
        self.editor
            .selected_field()
            .map(|field| field.as_str().to_string())
    }

    /// Start dragging a text box. `action` is `{kind: "move"}` or
    /// `{kind: "resize", handle: "se"}`. Returns false when the layout has no
    /// box for `field`.
    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(
        &mut self,
        field: &str,
        action: JsValue,
        display_width: f64,
        display_height: f64,
        x: f64,
        y: f64,
    ) -> Result<bool, JsValue> {
        let field = parse_field_key(field).map_err(js_error)?;
        let action: GestureAction = from_js(action, "gesture")?;
        let mapping = DisplayMapping::new(display_width, display_height);
        let gesture = self.editor.begin_gesture(field, action, mapping, (x, y));
        let started = gesture.is_some();
        self.drag = gesture.map(|gesture| (field, gesture));
        Ok(started)
    }

    pub fn drag(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let Some((field, gesture)) = self.drag.as_ref() else {
            return Ok(());
        };
        let result = self.editor.apply_gesture(*field, gesture, (x, y));
        self.edited(result)
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Commit staged layout writes now, e.g. on `pagehide`.
    pub fn flush(&self) -> Result<(), JsValue> {
        self.autosave.flush().map_err(store_error)
    }
}

/// Commit the background settings once the debounce delay has passed.
fn schedule_autosave(settings: &Rc<RefCell<BackgroundSettings<LocalStorageStore>>>) {
    let Some(deadline) = settings.borrow().deadline_ms() else {
        return;
    };
    let settings = Rc::clone(settings);
    spawn_local(async move {
        let timer = BrowserTimer;
        let wait = deadline - timer.now_ms();
        if wait > 0.0 {
            timer.sleep_ms(wait).await;
        }
        settings.borrow_mut().poll(timer.now_ms());
    });
}

/// The backgrounds offered for the current card and the pan/zoom remembered
/// for each of them.
#[wasm_bindgen]
pub struct Backgrounds {
    library: BackgroundLibrary,
    selection: BackgroundSelection,
    settings: Rc<RefCell<BackgroundSettings<LocalStorageStore>>>,
    pan: Option<PanGesture>,
}

impl Backgrounds {
    fn set_transform(&mut self, transform: BackgroundTransform) -> Result<JsValue, JsValue> {
        self.selection.set_transform(
            transform,
            &self.library,
            &mut self.settings.borrow_mut(),
            BrowserTimer.now_ms(),
        );
        schedule_autosave(&self.settings);
        to_js_value(&transform)
    }
}

#[wasm_bindgen]
impl Backgrounds {
    /// `custom` maps card ids to extra background images.
    #[wasm_bindgen(constructor)]
    pub fn new(custom: Option<String>) -> Result<Self, JsValue> {
        let library = match custom.as_deref() {
            Some(json) => BackgroundLibrary::from_json(json).map_err(store_error)?,
            None => BackgroundLibrary::default(),
        };
        let store = LocalStorageStore::open().map_err(store_error)?;
        let settings = BackgroundSettings::load(DebouncedWriter::new(store));
        Ok(Self {
            library,
            selection: BackgroundSelection::new(),
            settings: Rc::new(RefCell::new(settings)),
            pan: None,
        })
    }

    #[wasm_bindgen(js_name = selectCard)]
    pub fn select_card(&mut self, card: JsValue) -> Result<JsValue, JsValue> {
        let raw: serde_json::Value = from_js(card, "card")?;
        let card = pf_parser::card_from_value(raw).map_err(store_error)?;
        self.pan = None;
        self.selection
            .select_card(card, &self.library, &self.settings.borrow());
        to_js_value(&self.selection.transform())
    }

    pub fn available(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.selection.available(&self.library))
    }

    pub fn selected(&self) -> Result<JsValue, JsValue> {
        match self.selection.selected(&self.library) {
            Some(image) => to_js_value(&image),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = selectBackground)]
    pub fn select_background(&mut self, url: &str) -> bool {
        let background = BackgroundImage {
            url: url.to_string(),
            label: None,
            source: None,
        };
        self.pan = None;
        self.selection
            .select_background(&background, &self.library, &self.settings.borrow())
    }

    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.selection.transform())
    }

    /// `width`/`height` are the on-screen size of the preview.
    #[wasm_bindgen(js_name = beginPan)]
    pub fn begin_pan(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.pan = Some(PanGesture::begin(
            (x, y),
            (width, height),
            self.selection.transform(),
        ));
    }

    pub fn pan(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let Some(pan) = self.pan else {
            return to_js_value(&self.selection.transform());
        };
        self.set_transform(pan.update((x, y)))
    }

    #[wasm_bindgen(js_name = endPan)]
    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    /// One wheel notch; positive `deltaY` zooms out.
    pub fn zoom(&mut self, delta_y: f64) -> Result<JsValue, JsValue> {
        self.set_transform(zoom_background(self.selection.transform(), delta_y))
    }

    #[wasm_bindgen(js_name = resetTransform)]
    pub fn reset_transform(&mut self) -> Result<JsValue, JsValue> {
        self.set_transform(BackgroundTransform::IDENTITY)
    }

    pub fn flush(&self) {
        self.settings.borrow_mut().flush();
    }
}
