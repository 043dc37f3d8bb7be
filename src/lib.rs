//! Spinframe is a scroll-linked sprite rotation engine.
//!
//! It implements the deterministic core of a scroll-driven rotation scene: a
//! small ordered set of pre-rendered frames is preloaded once, continuous
//! scroll progress is smoothed with a critically-damped spring, mapped to a
//! pair of adjacent frames with a blend weight, and painted into a
//! device-pixel-ratio-aware square surface as a two-layer alpha cross-fade.
//!
//! # Pipeline overview
//!
//! 1. **Track**: scroll position + region bounds -> raw progress (`ScrollTracker`)
//! 2. **Smooth**: raw progress -> smoothed progress (`SpringSmoother`)
//! 3. **Resolve**: smoothed progress -> `(index_a, index_b, mix)` (`resolve`)
//! 4. **Render**: resolved frame pair -> premultiplied RGBA8 pixels (`Renderer`)
//!
//! [`RotationScene`] ties the stages together behind a
//! `Loading -> Ready -> TornDown` lifecycle, gated on [`FramePreloader`]
//! readiness and driven through two injected collaborators: a
//! [`DisplayMetrics`] provider and a [`FrameScheduler`]. Draw requests
//! coalesce to at most one outstanding paint callback, and redraws of an
//! unchanged frame are skipped.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic resolution**: frame resolution is a pure function of
//!   progress and configuration.
//! - **No IO in the renderer**: frame decoding is front-loaded in the
//!   preloader; the draw path only composites.
//! - **Premultiplied RGBA8** end-to-end.
#![forbid(unsafe_code)]

pub mod composite;
pub mod config;
pub mod curve;
pub mod error;
pub mod host;
pub mod preload;
pub mod progress;
pub mod render;
pub mod resolve;
pub mod scene;

pub use composite::{BlitParams, PremulRgba8, blit_scaled_over, over, premultiply_rgba8_in_place};
pub use config::{RotationConfig, RotationWindow, SpringParams};
pub use curve::ProgressMap;
pub use error::{SpinframeError, SpinframeResult};
pub use host::{DisplayMetrics, DrawHandle, FrameScheduler, ManualScheduler, StaticDisplay};
pub use preload::{
    FrameFetcher, FrameImage, FramePreloader, FrameSet, FsFrameFetcher, LoadState, decode_frame,
};
pub use progress::{
    Edge, OffsetAnchor, RegionBounds, ScrollOffsets, ScrollTracker, SpringSmoother, Viewport,
};
pub use render::{CanvasGeometry, Renderer, Surface};
pub use resolve::{ResolvedFrame, resolve};
pub use scene::{RotationScene, ScenePhase};
