use crate::{
    config::RotationConfig,
    error::SpinframeResult,
    host::{DisplayMetrics, DrawHandle, FrameScheduler},
    preload::{FrameFetcher, FrameImage, FramePreloader, FrameSet},
    progress::{RegionBounds, ScrollOffsets, ScrollTracker, SpringSmoother},
    render::{CanvasGeometry, Renderer},
    resolve::{ResolvedFrame, resolve},
};

/// Lifecycle phase of a mounted scene.
///
/// `Loading -> Ready` happens exactly once, when the final frame finishes
/// decoding; there is no transition back. `TornDown` makes every later
/// callback a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenePhase {
    Loading,
    Ready,
    TornDown,
}

/// One scroll-driven sprite rotation instance.
///
/// The five near-identical revisions in the source material collapse into
/// this single parameterized design; everything that varied between them
/// (window bounds, frame count, spring constants, section height) lives in
/// [`RotationConfig`].
pub struct RotationScene<S: FrameScheduler> {
    config: RotationConfig,
    tracker: ScrollTracker,
    spring: SpringSmoother,
    preloader: FramePreloader,
    frames: Option<FrameSet>,
    renderer: Renderer,
    scheduler: S,
    pending_draw: Option<(DrawHandle, ResolvedFrame)>,
    last_resolved: ResolvedFrame,
    phase: ScenePhase,
}

impl<S: FrameScheduler> RotationScene<S> {
    /// Mount the scene: validate configuration, anchor the scroll region at
    /// `region_top`, and size the drawing surface to the current container.
    ///
    /// The region's height is `section_height_factor` viewport heights, so
    /// scrolling through its extra height drives the full rotation.
    pub fn mount(
        config: RotationConfig,
        offsets: ScrollOffsets,
        region_top: f64,
        display: &impl DisplayMetrics,
        scheduler: S,
    ) -> SpinframeResult<Self> {
        config.validate()?;

        let viewport = display.viewport();
        let tracker = ScrollTracker::new(
            RegionBounds {
                top: region_top,
                height: config.region_height(viewport.height),
            },
            offsets,
        )?;
        let preloader = FramePreloader::new(config.frame_sources.clone())?;
        let spring = SpringSmoother::new(config.smoothing);
        let mut renderer = Renderer::new(config.margin_factor);

        let (cw, ch) = display.container();
        renderer.resize(cw, ch, display.device_pixel_ratio());

        tracing::debug!(frames = config.frame_count(), "rotation scene mounted");
        Ok(Self {
            config,
            tracker,
            spring,
            preloader,
            frames: None,
            renderer,
            scheduler,
            pending_draw: None,
            last_resolved: ResolvedFrame::first(),
            phase: ScenePhase::Loading,
        })
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ScenePhase::Ready
    }

    /// True while the host should keep showing its loading indicator.
    pub fn is_loading(&self) -> bool {
        self.phase == ScenePhase::Loading
    }

    pub fn has_load_errors(&self) -> bool {
        self.preloader.has_errors()
    }

    pub fn smoothed_progress(&self) -> f64 {
        self.spring.value()
    }

    /// True once scroll motion has visually settled; hosts may pause their
    /// tick loop until the next scroll event.
    pub fn is_settled(&self) -> bool {
        self.spring.is_settled()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn geometry(&self) -> Option<CanvasGeometry> {
        self.renderer.geometry()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Drive every pending frame fetch synchronously through `fetcher`.
    pub fn preload_with(&mut self, fetcher: &impl FrameFetcher) -> SpinframeResult<()> {
        if self.phase != ScenePhase::Loading {
            return Ok(());
        }
        if let Some(frames) = self.preloader.fetch_all(fetcher)? {
            self.become_ready(frames);
        }
        Ok(())
    }

    /// Deliver one asynchronous load completion. Completions arriving after
    /// teardown are dropped without touching the torn-down surface.
    pub fn deliver_frame(
        &mut self,
        index: usize,
        result: SpinframeResult<FrameImage>,
    ) -> SpinframeResult<()> {
        if self.phase == ScenePhase::TornDown {
            tracing::debug!(index, "dropping frame completion after teardown");
            return Ok(());
        }
        if let Some(frames) = self.preloader.complete(index, result)? {
            self.become_ready(frames);
        }
        Ok(())
    }

    fn become_ready(&mut self, frames: FrameSet) {
        self.frames = Some(frames);
        self.phase = ScenePhase::Ready;
        tracing::debug!("rotation scene ready");
        // initial paint of the resting frame
        self.schedule_draw(ResolvedFrame::first());
    }

    /// Handle a scroll notification: re-derive raw progress, advance the
    /// smoother by `dt` seconds, and schedule a redraw if the resolved frame
    /// changed. Ignored until the scene is ready.
    pub fn handle_scroll(&mut self, display: &impl DisplayMetrics, dt: f64) -> SpinframeResult<()> {
        if self.phase != ScenePhase::Ready {
            return Ok(());
        }

        let raw = self
            .tracker
            .raw_progress(display.scroll_y(), display.viewport());
        self.spring.set_target(raw.clamp(0.0, 1.0));
        let smoothed = self.spring.tick(dt).clamp(0.0, 1.0);

        let resolved = resolve(
            smoothed,
            self.config.rotation_window,
            self.config.frame_count(),
        );
        self.schedule_if_changed(resolved);
        Ok(())
    }

    /// Handle a window/layout resize: re-anchor the scroll region against the
    /// new viewport, rebuild surface geometry, and redraw so the surface is
    /// never left stale. When a scheduled draw is still outstanding its
    /// resolution wins over the last painted one, so a resize landing between
    /// a scroll event and its paint callback cannot roll the surface back.
    pub fn handle_resize(&mut self, display: &impl DisplayMetrics) -> SpinframeResult<()> {
        if self.phase == ScenePhase::TornDown {
            return Ok(());
        }

        let viewport = display.viewport();
        let region = self.tracker.region();
        self.tracker.set_region(RegionBounds {
            top: region.top,
            height: self.config.region_height(viewport.height),
        });

        let (cw, ch) = display.container();
        self.renderer.resize(cw, ch, display.device_pixel_ratio());

        if self.phase == ScenePhase::Ready {
            let target = self
                .pending_draw
                .map(|(_, resolved)| resolved)
                .unwrap_or(self.last_resolved);
            self.schedule_draw(target);
        }
        Ok(())
    }

    fn schedule_if_changed(&mut self, resolved: ResolvedFrame) {
        const MIX_TOLERANCE: f64 = 1.0 / 512.0;

        if let Some((_, pending)) = self.pending_draw {
            if pending.approx_eq(&resolved, MIX_TOLERANCE) {
                return;
            }
        } else if let Some(last) = self.renderer.last_drawn()
            && last.approx_eq(&resolved, MIX_TOLERANCE)
        {
            return;
        }
        self.schedule_draw(resolved);
    }

    /// At most one scheduled draw may be outstanding; a new request cancels
    /// the prior unexecuted one so rapid scroll events coalesce to one paint
    /// per refresh.
    fn schedule_draw(&mut self, resolved: ResolvedFrame) {
        if let Some((handle, _)) = self.pending_draw.take() {
            self.scheduler.cancel(handle);
        }
        let handle = self.scheduler.request();
        self.pending_draw = Some((handle, resolved));
    }

    /// Paint-callback delivery. Returns `true` when the surface was redrawn;
    /// stale or unknown handles (cancelled requests the host delivered
    /// anyway) and post-teardown deliveries are no-ops.
    pub fn on_frame(&mut self, handle: DrawHandle) -> SpinframeResult<bool> {
        if self.phase == ScenePhase::TornDown {
            return Ok(false);
        }
        let Some((pending_handle, resolved)) = self.pending_draw else {
            return Ok(false);
        };
        if pending_handle != handle {
            return Ok(false);
        }
        self.pending_draw = None;

        let Some(frames) = self.frames.as_ref() else {
            return Ok(false);
        };
        let drew = self.renderer.draw(frames, resolved)?;
        self.last_resolved = resolved;
        Ok(drew)
    }

    /// Tear the scene down: cancel the pending scheduled draw and invalidate
    /// outstanding load completions. Idempotent.
    pub fn teardown(&mut self) {
        if self.phase == ScenePhase::TornDown {
            return;
        }
        if let Some((handle, _)) = self.pending_draw.take() {
            self.scheduler.cancel(handle);
        }
        self.phase = ScenePhase::TornDown;
        tracing::debug!("rotation scene torn down");
    }
}
