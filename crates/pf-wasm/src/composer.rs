//! The `Composer` class: one page canvas showing the live card preview.

use pf_core::{AssetError, BackgroundTransform};
use pf_render_canvas::{RefreshOutcome, RenderReport};
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use wasm_bindgen::JsValue;

#[cfg(not(target_arch = "wasm32"))]
use crate::js_error;

/// Per-render inputs beside the card and the layout.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RenderOptions {
    pub(crate) background_url: Option<String>,
    pub(crate) transform: Option<BackgroundTransform>,
    pub(crate) copyright: Option<String>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenderSummary {
    outcome: &'static str,
    border: Option<&'static str>,
    images_drawn: Vec<String>,
    failures: Vec<String>,
    fields_drawn: Vec<&'static str>,
    body_font_size: Option<f64>,
}

impl RenderSummary {
    fn skipped(outcome: &'static str) -> Self {
        Self {
            outcome,
            border: None,
            images_drawn: Vec::new(),
            failures: Vec::new(),
            fields_drawn: Vec::new(),
            body_font_size: None,
        }
    }

    fn drawn(report: &RenderReport) -> Self {
        Self {
            outcome: "drawn",
            border: Some(report.border.as_str()),
            images_drawn: report.images_drawn.clone(),
            failures: report.failures.iter().map(AssetError::to_string).collect(),
            fields_drawn: report.fields_drawn.iter().map(|field| field.as_str()).collect(),
            body_font_size: report.body_font_size,
        }
    }
}

impl From<&RefreshOutcome> for RenderSummary {
    fn from(outcome: &RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Drawn(report) => Self::drawn(report),
            RefreshOutcome::Stale => Self::skipped("stale"),
            RefreshOutcome::Superseded => Self::skipped("superseded"),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportedImage {
    data_url: String,
    file_name: String,
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use js_sys::Promise;
    use pf_core::{CardRecord, LayoutConfig, ProxyRewriter, default_layout};
    use pf_parser::{card_from_value, parse_symbol_catalog};
    use pf_render_canvas::{
        Canvas2dContext, CardRenderer, PreviewSession, RefreshOutcome, RenderRequest,
    };
    use wasm_bindgen::JsValue;
    use wasm_bindgen::prelude::wasm_bindgen;
    use wasm_bindgen_futures::future_to_promise;
    use web_sys::HtmlCanvasElement;

    use super::{ExportedImage, RenderOptions, RenderSummary};
    use crate::browser::{BrowserAssetLoader, document};
    use crate::canvas::{WebCanvas2dContext, WebSurfaceFactory};
    use crate::config::{
        ComposerConfigOverrides, RuntimeConfig, merge_render_config, merge_runtime_config,
        read_runtime_config,
    };
    use crate::{js_error, parse_js_value_or_default, to_js_value};

    type Session = PreviewSession<BrowserAssetLoader, ProxyRewriter, WebSurfaceFactory>;

    fn card_from_js(value: JsValue) -> Result<CardRecord, JsValue> {
        let raw: serde_json::Value = serde_wasm_bindgen::from_value(value)
            .map_err(|err| js_error(format!("invalid card: {err}")))?;
        card_from_value(raw).map_err(|err| js_error(err.to_string()))
    }

    fn layout_from_js(value: Option<JsValue>) -> Result<LayoutConfig, JsValue> {
        match value {
            Some(raw) if !raw.is_undefined() && !raw.is_null() => {
                serde_wasm_bindgen::from_value(raw)
                    .map_err(|err| js_error(format!("invalid layout: {err}")))
            }
            _ => Ok(default_layout()),
        }
    }

    /// Show the session's display surface on the page canvas.
    fn present(canvas: &mut WebCanvas2dContext, display: &WebCanvas2dContext) {
        let (width, height) = (display.width(), display.height());
        canvas.resize(width as u32, height as u32);
        canvas.clear_rect(0.0, 0.0, width, height);
        canvas.draw_surface(display, 0.0, 0.0, width, height, 0.0, 0.0, width, height);
    }

    #[wasm_bindgen]
    pub struct Composer {
        session: Rc<Session>,
        canvas: Rc<RefCell<WebCanvas2dContext>>,
        config: RuntimeConfig,
        destroyed: bool,
    }

    impl Composer {
        fn ensure_alive(&self) -> Result<(), JsValue> {
            if self.destroyed {
                return Err(js_error("composer has been destroyed"));
            }
            Ok(())
        }
    }

    #[wasm_bindgen]
    impl Composer {
        #[wasm_bindgen(constructor)]
        pub fn new(canvas: HtmlCanvasElement, config: Option<JsValue>) -> Result<Self, JsValue> {
            let overrides: ComposerConfigOverrides = parse_js_value_or_default(config)?;
            let config = merge_runtime_config(&read_runtime_config(), &overrides).map_err(js_error)?;
            let canvas = WebCanvas2dContext::new(canvas).map_err(|err| js_error(err.to_string()))?;
            let document = document().ok_or_else(|| js_error("document is unavailable"))?;

            let renderer = CardRenderer::new(
                BrowserAssetLoader::new(document.clone()),
                config.proxy.clone(),
                config.render.clone(),
            );
            let session = PreviewSession::new(renderer, WebSurfaceFactory::new(document));
            Ok(Self {
                session: Rc::new(session),
                canvas: Rc::new(RefCell::new(canvas)),
                config,
                destroyed: false,
            })
        }

        /// Schedule a render. Resolves to a summary whose `outcome` is
        /// `drawn`, `stale` or `superseded`.
        pub fn render(
            &self,
            card: JsValue,
            layout: Option<JsValue>,
            options: Option<JsValue>,
        ) -> Result<Promise, JsValue> {
            self.ensure_alive()?;
            let card = card_from_js(card)?;
            let layout = layout_from_js(layout)?;
            let options: RenderOptions = parse_js_value_or_default(options)?;
            let session = Rc::clone(&self.session);
            let canvas = Rc::clone(&self.canvas);

            Ok(future_to_promise(async move {
                let request = RenderRequest::new(&card, &layout)
                    .background(
                        options.background_url.as_deref(),
                        options.transform.unwrap_or_default(),
                    )
                    .copyright(options.copyright.as_deref());
                let outcome = session
                    .refresh(&request)
                    .await
                    .map_err(|err| js_error(err.to_string()))?;
                if matches!(outcome, RefreshOutcome::Drawn(_)) {
                    session
                        .with_display(|display| {
                            if let Some(display) = display {
                                present(&mut canvas.borrow_mut(), display);
                            }
                        })
                        .await;
                }
                to_js_value(&RenderSummary::from(&outcome))
            }))
        }

        /// Crop the last render to `marginMm` of bleed (the configured bleed
        /// when omitted). Resolves to `{dataUrl, fileName}` or `null` before
        /// the first render.
        #[wasm_bindgen(js_name = exportPng)]
        pub fn export_png(&self, margin_mm: Option<f64>) -> Result<Promise, JsValue> {
            self.ensure_alive()?;
            let session = Rc::clone(&self.session);
            Ok(future_to_promise(async move {
                let exported = match margin_mm {
                    Some(margin) => session.export(margin).await,
                    None => session.export_default().await,
                }
                .map_err(|err| js_error(err.to_string()))?;
                let Some((surface, file_name)) = exported else {
                    return Ok(JsValue::NULL);
                };
                let data_url = surface
                    .to_png_data_url()
                    .map_err(|err| js_error(err.to_string()))?;
                tracing::info!(file_name = %file_name, "exported card");
                to_js_value(&ExportedImage {
                    data_url,
                    file_name,
                })
            }))
        }

        /// Merge render overrides. Proxy settings are fixed at construction.
        #[wasm_bindgen(js_name = setConfig)]
        pub fn set_config(&mut self, config: Option<JsValue>) -> Result<Promise, JsValue> {
            self.ensure_alive()?;
            let overrides: ComposerConfigOverrides = parse_js_value_or_default(config)?;
            let render = merge_render_config(&self.config.render, &overrides).map_err(js_error)?;
            self.config.render = render.clone();
            let session = Rc::clone(&self.session);
            Ok(future_to_promise(async move {
                session.set_config(render).await;
                Ok(JsValue::UNDEFINED)
            }))
        }

        /// Replace the symbol catalog with the provider's symbology JSON.
        #[wasm_bindgen(js_name = setSymbols)]
        pub fn set_symbols(&self, json: &str) -> Result<Promise, JsValue> {
            self.ensure_alive()?;
            let catalog = parse_symbol_catalog(json).map_err(|err| js_error(err.to_string()))?;
            let session = Rc::clone(&self.session);
            Ok(future_to_promise(async move {
                session
                    .with_renderer(|renderer| renderer.set_catalog(catalog))
                    .await;
                Ok(JsValue::UNDEFINED)
            }))
        }

        pub fn dimensions(&self) -> Result<JsValue, JsValue> {
            to_js_value(&self.config.render.dimensions())
        }

        pub fn destroy(&mut self) {
            if self.destroyed {
                return;
            }
            let mut canvas = self.canvas.borrow_mut();
            let (width, height) = (canvas.width(), canvas.height());
            canvas.clear_rect(0.0, 0.0, width, height);
            self.destroyed = true;
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::Composer;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct Composer;

#[cfg(not(target_arch = "wasm32"))]
impl Composer {
    pub fn new(_canvas: JsValue, _config: Option<JsValue>) -> Result<Self, JsValue> {
        Err(js_error("Composer is only available on wasm32 targets"))
    }

    pub fn render(
        &self,
        _card: JsValue,
        _layout: Option<JsValue>,
        _options: Option<JsValue>,
    ) -> Result<JsValue, JsValue> {
        Err(js_error("Composer is only available on wasm32 targets"))
    }

    pub fn export_png(&self, _margin_mm: Option<f64>) -> Result<JsValue, JsValue> {
        Err(js_error("Composer is only available on wasm32 targets"))
    }

    pub fn set_config(&mut self, _config: Option<JsValue>) -> Result<JsValue, JsValue> {
        Err(js_error("Composer is only available on wasm32 targets"))
    }

    pub fn destroy(&mut self) {}
}
