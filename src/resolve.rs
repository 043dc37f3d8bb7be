use crate::config::RotationWindow;

/// Pair of adjacent frame indices plus the blend weight toward the second.
///
/// Derived statelessly from scroll progress on every update; never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedFrame {
    pub index_a: usize,
    pub index_b: usize,
    /// Interpolation weight toward `index_b`, in [0, 1).
    pub mix: f64,
}

impl ResolvedFrame {
    pub fn first() -> Self {
        Self {
            index_a: 0,
            index_b: 0,
            mix: 0.0,
        }
    }

    /// Visual equality within a mix tolerance, used for redraw skipping.
    ///
    /// When both mixes are within tolerance of zero, frame B is invisible and
    /// `index_b` is irrelevant; `(0, 1, 0.0)` and the resting `(0, 0, 0.0)`
    /// paint identical pixels.
    pub fn approx_eq(&self, other: &Self, mix_tolerance: f64) -> bool {
        if self.index_a != other.index_a || (self.mix - other.mix).abs() > mix_tolerance {
            return false;
        }
        self.index_b == other.index_b
            || (self.mix <= mix_tolerance && other.mix <= mix_tolerance)
    }
}

/// Map clamped scroll progress through `window` onto a blended frame pair.
///
/// Progress outside the window holds steady at the boundary frame; there is no
/// extrapolation and no wraparound. A degenerate window or a frame count of
/// zero/one resolves to the constant first frame rather than dividing by zero
/// (config validation rejects both upstream).
pub fn resolve(progress: f64, window: RotationWindow, frame_count: usize) -> ResolvedFrame {
    if frame_count <= 1 {
        return ResolvedFrame::first();
    }

    let span = window.span();
    let t = if span <= 0.0 || !progress.is_finite() {
        0.0
    } else {
        ((progress - window.start) / span).clamp(0.0, 1.0)
    };

    let exact = t * (frame_count - 1) as f64;
    let index_a = (exact.floor() as usize).min(frame_count - 1);
    let index_b = (index_a + 1).min(frame_count - 1);
    let mix = exact - index_a as f64;

    ResolvedFrame {
        index_a,
        index_b,
        mix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_blends_adjacent_frames() {
        let r = resolve(0.5, RotationWindow::full(), 6);
        assert_eq!(r.index_a, 2);
        assert_eq!(r.index_b, 3);
        assert!((r.mix - 0.5).abs() < 1e-12);
    }

    #[test]
    fn window_start_is_first_frame() {
        let r = resolve(0.08, RotationWindow::new(0.08, 0.85).unwrap(), 12);
        assert_eq!(r.index_a, 0);
        assert_eq!(r.index_b, 1);
        assert_eq!(r.mix, 0.0);
    }

    #[test]
    fn window_end_clamps_to_last_frame() {
        let r = resolve(0.85, RotationWindow::new(0.08, 0.85).unwrap(), 12);
        assert_eq!(r.index_a, 11);
        assert_eq!(r.index_b, 11);
        assert_eq!(r.mix, 0.0);
    }

    #[test]
    fn progress_past_window_holds_last_frame() {
        let window = RotationWindow::new(0.08, 0.85).unwrap();
        for p in [0.86, 0.95, 1.0, 2.5] {
            let r = resolve(p, window, 12);
            assert_eq!((r.index_a, r.index_b, r.mix), (11, 11, 0.0));
        }
    }

    #[test]
    fn progress_before_window_holds_first_frame() {
        let window = RotationWindow::new(0.08, 0.85).unwrap();
        for p in [-1.0, 0.0, 0.079] {
            let r = resolve(p, window, 12);
            assert_eq!(r.index_a, 0);
            assert_eq!(r.mix, 0.0);
        }
    }

    #[test]
    fn indices_stay_adjacent_across_the_window() {
        let window = RotationWindow::full();
        for i in 0..=1000 {
            let r = resolve(i as f64 / 1000.0, window, 12);
            assert!(r.index_b - r.index_a <= 1);
            assert!(r.index_b < 12);
            assert!((0.0..1.0).contains(&r.mix));
        }
    }

    #[test]
    fn resolver_is_deterministic() {
        let window = RotationWindow::default();
        let a = resolve(0.371, window, 12);
        let b = resolve(0.371, window, 12);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_inputs_resolve_to_constant_first_frame() {
        let zero_span = RotationWindow {
            start: 0.4,
            end: 0.4,
        };
        assert_eq!(resolve(0.9, zero_span, 12), ResolvedFrame::first());
        assert_eq!(resolve(0.9, RotationWindow::full(), 1), ResolvedFrame::first());
        assert_eq!(resolve(0.9, RotationWindow::full(), 0), ResolvedFrame::first());
        assert_eq!(
            resolve(f64::NAN, RotationWindow::full(), 12),
            ResolvedFrame::first()
        );
    }

    #[test]
    fn approx_eq_uses_mix_tolerance() {
        let a = ResolvedFrame {
            index_a: 3,
            index_b: 4,
            mix: 0.500,
        };
        let b = ResolvedFrame {
            index_a: 3,
            index_b: 4,
            mix: 0.5005,
        };
        assert!(a.approx_eq(&b, 1e-3));
        assert!(!a.approx_eq(&b, 1e-4));
    }

    #[test]
    fn approx_eq_ignores_index_b_when_mix_is_invisible() {
        let resting = ResolvedFrame::first();
        let at_window_start = ResolvedFrame {
            index_a: 0,
            index_b: 1,
            mix: 0.0,
        };
        assert!(resting.approx_eq(&at_window_start, 1e-3));

        let visible = ResolvedFrame {
            index_a: 0,
            index_b: 1,
            mix: 0.1,
        };
        assert!(!resting.approx_eq(&visible, 1e-3));
    }
}
