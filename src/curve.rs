use crate::error::{SpinframeError, SpinframeResult};

/// Piecewise-linear map from smoothed progress to a presentation value.
///
/// Hosts drive ornaments (entry opacity, glow, parallax offsets, text-reveal
/// tracks) from the same smoothed progress signal as the rotation itself,
/// each through its own map. Below the first breakpoint and above the last
/// the output clamps to the end value.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProgressMap {
    points: Vec<(f64, f64)>,
}

impl ProgressMap {
    /// Build from `(progress, value)` breakpoints sorted by progress.
    pub fn new(points: Vec<(f64, f64)>) -> SpinframeResult<Self> {
        if points.is_empty() {
            return Err(SpinframeError::config(
                "progress map requires at least one breakpoint",
            ));
        }
        if points.iter().any(|(p, v)| !p.is_finite() || !v.is_finite()) {
            return Err(SpinframeError::config(
                "progress map breakpoints must be finite",
            ));
        }
        if !points.windows(2).all(|w| w[0].0 <= w[1].0) {
            return Err(SpinframeError::config(
                "progress map breakpoints must be sorted by progress",
            ));
        }
        Ok(Self { points })
    }

    pub fn map(&self, progress: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if !progress.is_finite() || progress <= first.0 {
            return first.1;
        }
        if progress >= last.0 {
            return last.1;
        }

        let idx = self.points.partition_point(|(p, _)| *p <= progress);
        let a = self.points[idx - 1];
        let b = self.points[idx];
        let span = b.0 - a.0;
        if span <= 0.0 {
            return a.1;
        }
        let t = (progress - a.0) / span;
        a.1 + (b.1 - a.1) * t
    }
}
