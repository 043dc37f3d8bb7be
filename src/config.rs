use crate::error::{SpinframeError, SpinframeResult};

/// Sub-range of scroll progress inside which the frame index advances.
///
/// Outside the window the resolved frame holds at the boundary frame: index 0
/// below `start`, index N-1 above `end`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RotationWindow {
    pub start: f64,
    pub end: f64,
}

impl RotationWindow {
    pub fn new(start: f64, end: f64) -> SpinframeResult<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn full() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn validate(&self) -> SpinframeResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SpinframeError::config("rotation window must be finite"));
        }
        if !(0.0..=1.0).contains(&self.start) || !(0.0..=1.0).contains(&self.end) {
            return Err(SpinframeError::config(
                "rotation window bounds must lie in [0, 1]",
            ));
        }
        if self.span() <= 0.0 {
            return Err(SpinframeError::config(
                "rotation window must have positive span (start < end)",
            ));
        }
        Ok(())
    }
}

impl Default for RotationWindow {
    fn default() -> Self {
        Self {
            start: 0.02,
            end: 0.98,
        }
    }
}

/// Critically-damped spring constants for scroll smoothing.
///
/// The defaults are empirically tuned, not derived; treat them as taste.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringParams {
    pub fn validate(&self) -> SpinframeResult<()> {
        for (name, v) in [
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("mass", self.mass),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SpinframeError::config(format!(
                    "spring {name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 140.0,
            damping: 34.0,
            mass: 0.6,
        }
    }
}

/// Full configuration for one rotation scene.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RotationConfig {
    /// Ordered frame sources, one per rotation step. Order corresponds
    /// monotonically to increasing rotation angle.
    pub frame_sources: Vec<String>,
    #[serde(default)]
    pub rotation_window: RotationWindow,
    #[serde(default)]
    pub smoothing: SpringParams,
    /// Uniform shrink applied to the fitted frame scale, leaving breathing
    /// room around the subject. Must lie in (0, 1].
    #[serde(default = "default_margin_factor")]
    pub margin_factor: f64,
    /// Scroll region height as a multiple of viewport height. A factor of 2.2
    /// corresponds to the source material's 220vh pin-and-rotate section.
    #[serde(default = "default_section_height_factor")]
    pub section_height_factor: f64,
}

fn default_margin_factor() -> f64 {
    0.92
}

fn default_section_height_factor() -> f64 {
    2.2
}

impl RotationConfig {
    pub fn new(frame_sources: Vec<String>) -> Self {
        Self {
            frame_sources,
            rotation_window: RotationWindow::default(),
            smoothing: SpringParams::default(),
            margin_factor: default_margin_factor(),
            section_height_factor: default_section_height_factor(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_sources.len()
    }

    /// Document height of the scroll region driving the full rotation.
    pub fn region_height(&self, viewport_height: f64) -> f64 {
        viewport_height * self.section_height_factor
    }

    pub fn validate(&self) -> SpinframeResult<()> {
        if self.frame_sources.is_empty() {
            return Err(SpinframeError::config(
                "rotation config requires at least one frame source",
            ));
        }
        if self.frame_sources.iter().any(|s| s.trim().is_empty()) {
            return Err(SpinframeError::config("frame sources must be non-empty"));
        }
        self.rotation_window.validate()?;
        self.smoothing.validate()?;
        if !self.margin_factor.is_finite()
            || self.margin_factor <= 0.0
            || self.margin_factor > 1.0
        {
            return Err(SpinframeError::config("margin_factor must lie in (0, 1]"));
        }
        if !self.section_height_factor.is_finite() || self.section_height_factor <= 0.0 {
            return Err(SpinframeError::config(
                "section_height_factor must be finite and > 0",
            ));
        }
        Ok(())
    }
}
