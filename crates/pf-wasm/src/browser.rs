//! Browser collaborators: image and font loading, timers, `localStorage`,
//! identifiers and the card-data API.

#![allow(async_fn_in_trait)]

use js_sys::{Array, Promise};
use pf_core::{
    AssetError, CardRecord, CardSource, Clock, IdSource, KeyValueStore, SourceError, StoreError,
    Timer, encode_uri_component, uuid_v4_from_bytes,
};
use pf_parser::card_from_value;
use pf_render_canvas::AssetLoader;
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlImageElement, Request, RequestInit, Response, Storage, Window};

use crate::canvas::WebImage;
use crate::js_detail;

pub(crate) const CARD_API_BASE: &str = "https://api.scryfall.com";

/// Size used when asking the font loader for a family.
const FONT_PROBE_SIZE: &str = "16px";

pub(crate) fn window() -> Option<Window> {
    web_sys::window()
}

pub(crate) fn document() -> Option<Document> {
    window()?.document()
}

/// Loads images through `<img>` elements and fonts through `document.fonts`.
#[derive(Debug, Clone)]
pub(crate) struct BrowserAssetLoader {
    document: Document,
}

impl BrowserAssetLoader {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }
}

impl AssetLoader for BrowserAssetLoader {
    type Image = WebImage;

    async fn load_image(&self, url: &str) -> Result<WebImage, AssetError> {
        let load_error = |reason: String| AssetError::Load {
            url: url.to_string(),
            reason,
        };
        let element = HtmlImageElement::new().map_err(|err| load_error(js_detail(&err)))?;
        if !url.starts_with("data:") {
            element.set_cross_origin(Some("anonymous"));
        }

        let promise = Promise::new(&mut |resolve, reject| {
            element.set_onload(Some(&resolve));
            element.set_onerror(Some(&reject));
        });
        element.set_src(url);
        let outcome = JsFuture::from(promise).await;
        element.set_onload(None);
        element.set_onerror(None);

        outcome.map_err(|_| load_error(String::from("image failed to load")))?;
        tracing::trace!(url, "image loaded");
        Ok(WebImage::new(element))
    }

    async fn load_font(&self, family: &str) -> Result<(), AssetError> {
        let font_error = |reason: String| AssetError::Font {
            family: family.to_string(),
            reason,
        };
        let promise = self
            .document
            .fonts()
            .load(&format!("{FONT_PROBE_SIZE} \"{family}\""))
            .map_err(|err| font_error(js_detail(&err)))?;
        let faces = JsFuture::from(promise)
            .await
            .map_err(|err| font_error(js_detail(&err)))?;
        if Array::from(&faces).length() == 0 {
            return Err(font_error(String::from("no matching font face")));
        }
        Ok(())
    }
}

/// `Date.now()` and `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BrowserTimer;

impl Clock for BrowserTimer {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

impl Timer for BrowserTimer {
    async fn sleep_ms(&self, ms: f64) {
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = window().is_some_and(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        &resolve,
                        ms.ceil() as i32,
                    )
                    .is_ok()
            });
            if !scheduled {
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}

/// `window.localStorage` as a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub(crate) struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub(crate) fn open() -> Result<Self, StoreError> {
        let storage = window()
            .ok_or_else(|| StoreError::Backend(String::from("no window")))?
            .local_storage()
            .map_err(|err| StoreError::Backend(js_detail(&err)))?
            .ok_or_else(|| StoreError::Backend(String::from("localStorage is unavailable")))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|err| StoreError::Backend(js_detail(&err)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| StoreError::Backend(js_detail(&err)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|err| StoreError::Backend(js_detail(&err)))
    }
}

/// Version 4 UUIDs from `Math.random`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        let mut bytes = [0_u8; 16];
        for byte in &mut bytes {
            *byte = (js_sys::Math::random() * 256.0) as u8;
        }
        uuid_v4_from_bytes(bytes)
    }
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    data: Vec<String>,
}

/// The public card-data API over `fetch`.
#[derive(Debug, Clone)]
pub(crate) struct FetchCardSource {
    base_url: String,
}

impl FetchCardSource {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    async fn get_json(&self, path: &str) -> Result<JsValue, SourceError> {
        let request_error = |err: JsValue| SourceError::Request(js_detail(&err));
        let window = window().ok_or_else(|| SourceError::Request(String::from("no window")))?;

        let init = RequestInit::new();
        init.set_method("GET");
        let url = format!("{}{path}", self.base_url);
        let request = Request::new_with_str_and_init(&url, &init).map_err(request_error)?;
        request
            .headers()
            .set("Accept", "application/json")
            .map_err(request_error)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(request_error)?
            .dyn_into()
            .map_err(|_| SourceError::Decode(String::from("fetch did not return a Response")))?;
        if !response.ok() {
            return Err(SourceError::Status(response.status()));
        }

        let body = response
            .json()
            .map_err(|err| SourceError::Decode(js_detail(&err)))?;
        JsFuture::from(body)
            .await
            .map_err(|err| SourceError::Decode(js_detail(&err)))
    }

    async fn fetch_card(&self, mode: &str, name: &str) -> Result<CardRecord, SourceError> {
        let raw = self
            .get_json(&format!("/cards/named?{mode}={}", encode_uri_component(name)))
            .await?;
        let value: serde_json::Value = serde_wasm_bindgen::from_value(raw)
            .map_err(|err| SourceError::Decode(err.to_string()))?;
        card_from_value(value).map_err(|err| SourceError::Decode(err.to_string()))
    }
}

impl CardSource for FetchCardSource {
    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, SourceError> {
        let raw = self
            .get_json(&format!("/cards/autocomplete?q={}", encode_uri_component(query)))
            .await?;
        let response: AutocompleteResponse = serde_wasm_bindgen::from_value(raw)
            .map_err(|err| SourceError::Decode(err.to_string()))?;
        Ok(response.data)
    }

    async fn fetch_exact(&self, name: &str) -> Result<CardRecord, SourceError> {
        self.fetch_card("exact", name).await
    }

    async fn fetch_fuzzy(&self, name: &str) -> Result<CardRecord, SourceError> {
        self.fetch_card("fuzzy", name).await
    }
}
