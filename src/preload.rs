use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    composite::premultiply_rgba8_in_place,
    error::{SpinframeError, SpinframeResult},
};

/// One decoded rotation frame in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode raster image bytes (any format `image` understands) into a
/// premultiplied RGBA8 frame.
pub fn decode_frame(bytes: &[u8]) -> SpinframeResult<FrameImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(FrameImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Ordered, fixed-length set of decoded frames. Index order corresponds
/// monotonically to increasing rotation angle.
#[derive(Clone, Debug)]
pub struct FrameSet {
    frames: Vec<FrameImage>,
}

impl FrameSet {
    pub fn from_frames(frames: Vec<FrameImage>) -> SpinframeResult<Self> {
        if frames.is_empty() {
            return Err(SpinframeError::asset("frame set must be non-empty"));
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FrameImage> {
        self.frames.get(index)
    }
}

/// Per-slot load state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Errored,
}

/// Byte retrieval for frame sources. The crate does not know or care how
/// source paths are resolved; hosts inject whatever fits their packaging.
pub trait FrameFetcher {
    fn fetch(&self, source: &str) -> SpinframeResult<Vec<u8>>;
}

/// Filesystem-backed fetcher resolving sources relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsFrameFetcher {
    root: PathBuf,
}

impl FsFrameFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameFetcher for FsFrameFetcher {
    fn fetch(&self, source: &str) -> SpinframeResult<Vec<u8>> {
        let path = self.root.join(source);
        std::fs::read(&path)
            .with_context(|| format!("read frame bytes from '{}'", path.display()))
            .map_err(SpinframeError::from)
    }
}

/// Preloads a fixed ordered set of frames exactly once.
///
/// Completions may arrive in any order; each is written to its positional
/// slot, and readiness fires exactly once when every slot is loaded. A failed
/// slot is recorded and logged but never retried; readiness is withheld (the
/// host can see the stall through [`FramePreloader::has_errors`]).
#[derive(Debug)]
pub struct FramePreloader {
    sources: Vec<String>,
    slots: Vec<Option<FrameImage>>,
    states: Vec<LoadState>,
    loaded: usize,
    ready_fired: bool,
}

impl FramePreloader {
    pub fn new(sources: Vec<String>) -> SpinframeResult<Self> {
        if sources.is_empty() {
            return Err(SpinframeError::asset(
                "preloader requires at least one frame source",
            ));
        }
        let n = sources.len();
        Ok(Self {
            sources,
            slots: vec![None; n],
            states: vec![LoadState::Pending; n],
            loaded: 0,
            ready_fired: false,
        })
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn frame_count(&self) -> usize {
        self.sources.len()
    }

    pub fn state(&self, index: usize) -> Option<LoadState> {
        self.states.get(index).copied()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn is_ready(&self) -> bool {
        self.ready_fired
    }

    pub fn has_errors(&self) -> bool {
        self.states.iter().any(|s| *s == LoadState::Errored)
    }

    /// Deliver one completion. Returns the completed [`FrameSet`] exactly
    /// once, on the call that loads the final pending slot.
    ///
    /// Repeat completions for an already-resolved slot are ignored so that
    /// late callbacks after teardown or races cannot fire readiness twice.
    pub fn complete(
        &mut self,
        index: usize,
        result: SpinframeResult<FrameImage>,
    ) -> SpinframeResult<Option<FrameSet>> {
        let n = self.sources.len();
        if index >= n {
            return Err(SpinframeError::asset(format!(
                "frame completion index {index} out of range (frame count {n})"
            )));
        }
        if self.states[index] != LoadState::Pending {
            tracing::debug!(index, "ignoring repeat frame completion");
            return Ok(None);
        }

        match result {
            Ok(frame) => {
                self.slots[index] = Some(frame);
                self.states[index] = LoadState::Loaded;
                self.loaded += 1;
            }
            Err(err) => {
                self.states[index] = LoadState::Errored;
                tracing::warn!(index, source = %self.sources[index], error = %err,
                    "frame failed to load; readiness withheld");
                return Ok(None);
            }
        }

        if self.loaded == n && !self.ready_fired {
            self.ready_fired = true;
            tracing::debug!(frames = n, "frame set ready");
            let frames = self
                .slots
                .iter()
                .map(|slot| {
                    slot.clone()
                        .ok_or_else(|| SpinframeError::asset("loaded slot missing frame"))
                })
                .collect::<SpinframeResult<Vec<_>>>()?;
            return FrameSet::from_frames(frames).map(Some);
        }
        Ok(None)
    }

    /// Drive every pending fetch synchronously through `fetcher`.
    ///
    /// Convenience for hosts without an async loading pipeline; fetch errors
    /// are folded into per-slot error states, not returned.
    #[tracing::instrument(skip(self, fetcher), fields(frames = self.sources.len()))]
    pub fn fetch_all(&mut self, fetcher: &impl FrameFetcher) -> SpinframeResult<Option<FrameSet>> {
        let mut ready = None;
        for index in 0..self.sources.len() {
            if self.states[index] != LoadState::Pending {
                continue;
            }
            let result = fetcher
                .fetch(&self.sources[index])
                .and_then(|bytes| decode_frame(&bytes));
            if let Some(set) = self.complete(index, result)? {
                ready = Some(set);
            }
        }
        Ok(ready)
    }
}
