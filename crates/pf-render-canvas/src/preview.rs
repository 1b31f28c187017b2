//! Live preview: renders in scheduling order, blits the newest one to the
//! display surface and keeps it for export.

use std::future::Future;

use pf_core::{RenderError, UrlRewriter};

use crate::assets::AssetLoader;
use crate::context::{Canvas2dContext, SurfaceFactory};
use crate::export::{export_file_name, export_surface};
use crate::renderer::{
    CardRenderer, RenderConfig, RenderReport, RenderRequest, RenderedCard, blit_card,
};
use crate::sequencer::RenderSequencer;

/// What happened to one scheduled refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The render reached the display.
    Drawn(RenderReport),
    /// A newer refresh was scheduled before this one started.
    Stale,
    /// A newer refresh was scheduled while this one was drawing.
    Superseded,
}

struct PreviewState<L: AssetLoader, R, F: SurfaceFactory> {
    renderer: CardRenderer<L, R>,
    factory: F,
    display: Option<F::Surface>,
    last: Option<RenderedCard<F::Surface>>,
    card_name: String,
}

/// A renderer, its surfaces and the last finished render.
pub struct PreviewSession<L: AssetLoader, R, F: SurfaceFactory> {
    sequencer: RenderSequencer<PreviewState<L, R, F>>,
}

impl<L, R, F> PreviewSession<L, R, F>
where
    L: AssetLoader,
    R: UrlRewriter,
    F: SurfaceFactory,
    F::Surface: Canvas2dContext<Image = L::Image>,
{
    #[must_use]
    pub fn new(renderer: CardRenderer<L, R>, factory: F) -> Self {
        Self {
            sequencer: RenderSequencer::new(PreviewState {
                renderer,
                factory,
                display: None,
                last: None,
                card_name: String::new(),
            }),
        }
    }

    /// Schedule a render. The ticket is taken now; the returned future waits
    /// for earlier renders and only draws if nothing newer was scheduled.
    pub fn refresh<'s>(
        &'s self,
        request: &'s RenderRequest<'s>,
    ) -> impl Future<Output = Result<RefreshOutcome, RenderError>> + 's {
        let ticket = self.sequencer.ticket();
        async move {
            let Some(mut state) = self.sequencer.acquire(ticket).await else {
                return Ok(RefreshOutcome::Stale);
            };
            let state = &mut *state;
            let rendered = state.renderer.render(&mut state.factory, request).await?;

            if !self.sequencer.is_current(ticket) {
                tracing::debug!(ticket = ticket.id(), "render superseded before blit");
                return Ok(RefreshOutcome::Superseded);
            }

            let dims = rendered.dimensions;
            let reusable = state.display.as_ref().is_some_and(|display| {
                display.width() == f64::from(dims.card_width)
                    && display.height() == f64::from(dims.card_height)
            });
            if !reusable {
                state.display = Some(state.factory.create(dims.card_width, dims.card_height)?);
            }
            if let Some(display) = state.display.as_mut() {
                blit_card(display, &rendered.surface, &dims);
            }

            let report = rendered.report.clone();
            state.card_name = request.card.name.clone();
            state.last = Some(rendered);
            Ok(RefreshOutcome::Drawn(report))
        }
    }

    /// Crop the last drawn render for download. `None` before the first
    /// render has reached the display.
    pub async fn export(&self, margin_mm: f64) -> Result<Option<(F::Surface, String)>, RenderError> {
        let mut state = self.sequencer.lock().await;
        let state = &mut *state;
        let Some(last) = state.last.as_ref() else {
            return Ok(None);
        };
        let surface = export_surface(&mut state.factory, &last.surface, &last.dimensions, margin_mm)?;
        Ok(Some((surface, export_file_name(&state.card_name))))
    }

    /// Export with the configured bleed.
    pub async fn export_default(&self) -> Result<Option<(F::Surface, String)>, RenderError> {
        let margin = self.sequencer.lock().await.renderer.config().export_margin_mm;
        self.export(margin).await
    }

    pub async fn set_config(&self, config: RenderConfig) {
        self.sequencer.lock().await.renderer.set_config(config);
    }

    /// Run `f` against the display surface.
    pub async fn with_display<T>(&self, f: impl FnOnce(Option<&F::Surface>) -> T) -> T {
        let state = self.sequencer.lock().await;
        f(state.display.as_ref())
    }

    /// Run `f` against the renderer.
    pub async fn with_renderer<T>(&self, f: impl FnOnce(&mut CardRenderer<L, R>) -> T) -> T {
        let mut state = self.sequencer.lock().await;
        f(&mut state.renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MockAssetLoader;
    use crate::context::{DrawOperation, MockCanvas2dContext, MockSurfaceFactory};
    use futures::executor::block_on;
    use futures::join;
    use pf_core::{
        BorderColorKey, BorderImages, CardRecord, LayoutConfig, PassthroughRewriter, default_layout,
    };

    type Session = PreviewSession<MockAssetLoader, PassthroughRewriter, MockSurfaceFactory>;

    fn session(loader: MockAssetLoader) -> Session {
        PreviewSession::new(
            CardRenderer::new(loader, PassthroughRewriter, RenderConfig::default()),
            MockSurfaceFactory::default(),
        )
    }

    fn layout() -> LayoutConfig {
        let mut layout = default_layout();
        layout.images.insert(BorderColorKey::C, BorderImages::url("frame.png"));
        layout
    }

    fn card(name: &str) -> CardRecord {
        CardRecord {
            id: name.to_lowercase(),
            name: name.to_string(),
            type_line: String::from("Artifact"),
            ..CardRecord::default()
        }
    }

    fn blits(display: Option<&MockCanvas2dContext>) -> usize {
        display.map_or(0, |display| {
            display
                .operations()
                .iter()
                .filter(|op| matches!(op, DrawOperation::DrawSurface { .. }))
                .count()
        })
    }

    #[test]
    fn refresh_blits_to_display() {
        let session = session(MockAssetLoader::new().with_image("frame.png", 10.0, 14.0));
        let layout = layout();
        let card = card("Ornithopter");
        let request = RenderRequest::new(&card, &layout);
        let outcome = block_on(session.refresh(&request)).expect("refresh");
        assert!(matches!(outcome, RefreshOutcome::Drawn(ref report) if report.images_drawn == vec!["frame.png"]));
        assert_eq!(block_on(session.with_display(blits)), 1);
    }

    #[test]
    fn refreshes_scheduled_together_draw_only_the_last() {
        let session = session(MockAssetLoader::new().with_image("frame.png", 10.0, 14.0).yielding());
        let layout = layout();
        let (first, second, third) = (card("First"), card("Second"), card("Third"));
        let requests = [
            RenderRequest::new(&first, &layout),
            RenderRequest::new(&second, &layout),
            RenderRequest::new(&third, &layout),
        ];

        let (a, b, c) = block_on(async {
            join!(
                session.refresh(&requests[0]),
                session.refresh(&requests[1]),
                session.refresh(&requests[2])
            )
        });
        assert_eq!(a.expect("first"), RefreshOutcome::Stale);
        assert_eq!(b.expect("second"), RefreshOutcome::Stale);
        assert!(matches!(c.expect("third"), RefreshOutcome::Drawn(_)));
        assert_eq!(block_on(session.with_display(blits)), 1);

        let (_, name) = block_on(session.export(0.0)).expect("export").expect("rendered");
        assert_eq!(name, "Third.png");
    }

    #[test]
    fn refresh_scheduled_mid_render_supersedes_it() {
        let session = session(MockAssetLoader::new().with_image("frame.png", 10.0, 14.0).yielding());
        let layout = layout();
        let (first, second) = (card("First"), card("Second"));
        let (early, late) = (RenderRequest::new(&first, &layout), RenderRequest::new(&second, &layout));

        let (a, b) = block_on(async {
            let mut running = Box::pin(session.refresh(&early));
            assert!(futures::poll!(running.as_mut()).is_pending());
            let newer = session.refresh(&late);
            join!(running, newer)
        });
        assert_eq!(a.expect("first"), RefreshOutcome::Superseded);
        assert!(matches!(b.expect("second"), RefreshOutcome::Drawn(_)));
        assert_eq!(block_on(session.with_display(blits)), 1);

        let (_, name) = block_on(session.export(0.0)).expect("export").expect("rendered");
        assert_eq!(name, "Second.png");
    }

    #[test]
    fn sequential_refreshes_all_draw() {
        let session = session(MockAssetLoader::new().yielding());
        let layout = layout();
        let card = card("Solo");
        let request = RenderRequest::new(&card, &layout);
        for _ in 0..3 {
            let outcome = block_on(session.refresh(&request)).expect("refresh");
            assert!(matches!(outcome, RefreshOutcome::Drawn(_)));
        }
        assert_eq!(block_on(session.with_display(blits)), 3);
    }

    #[test]
    fn export_before_render_is_empty() {
        let session = session(MockAssetLoader::new());
        assert!(block_on(session.export(0.0)).expect("export").is_none());
    }

    #[test]
    fn export_uses_configured_margin() {
        let session = session(MockAssetLoader::new());
        let layout = layout();
        let card = card("Fire // Ice");
        let request = RenderRequest::new(&card, &layout);
        block_on(session.set_config(RenderConfig {
            dpi: 150,
            export_margin_mm: 5.0,
            ..RenderConfig::default()
        }));
        block_on(session.refresh(&request)).expect("refresh");
        let (surface, name) = block_on(session.export_default()).expect("export").expect("rendered");
        let dims = pf_core::geometry::CanvasDimensions::at_dpi(150);
        assert_eq!(surface.width(), f64::from(dims.full_width));
        assert_eq!(surface.height(), f64::from(dims.full_height));
        assert_eq!(name, "Fire____Ice.png");
    }

    #[test]
    fn renderer_failure_propagates() {
        let session = PreviewSession::new(
            CardRenderer::new(MockAssetLoader::new(), PassthroughRewriter, RenderConfig::default()),
            MockSurfaceFactory {
                fail: true,
                ..MockSurfaceFactory::default()
            },
        );
        let layout = layout();
        let card = card("Broken");
        let request = RenderRequest::new(&card, &layout);
        assert!(block_on(session.refresh(&request)).is_err());
        assert_eq!(block_on(session.with_renderer(|renderer| renderer.config().dpi)), 300);
    }
}
