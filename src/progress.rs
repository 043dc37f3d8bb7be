use crate::{
    config::SpringParams,
    error::{SpinframeError, SpinframeResult},
};

/// Region or viewport edge used to anchor progress endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Edge {
    Start,
    End,
}

/// "This region edge meets this viewport edge" anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OffsetAnchor {
    pub region: Edge,
    pub viewport: Edge,
}

/// Viewport-relative offsets defining where progress is 0 and where it is 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScrollOffsets {
    pub zero: OffsetAnchor,
    pub one: OffsetAnchor,
}

impl ScrollOffsets {
    /// Pin-and-rotate: 0 when the region top reaches the viewport top, 1 when
    /// the region bottom leaves the viewport top. The visible slice stays
    /// pinned while the region's extra height drives the rotation.
    pub fn pin_through() -> Self {
        Self {
            zero: OffsetAnchor {
                region: Edge::Start,
                viewport: Edge::Start,
            },
            one: OffsetAnchor {
                region: Edge::End,
                viewport: Edge::Start,
            },
        }
    }

    /// 0..1 over the region's full scroll extent (non-pinned variants).
    pub fn full_extent() -> Self {
        Self {
            zero: OffsetAnchor {
                region: Edge::Start,
                viewport: Edge::Start,
            },
            one: OffsetAnchor {
                region: Edge::End,
                viewport: Edge::End,
            },
        }
    }

    pub fn validate(&self) -> SpinframeResult<()> {
        if self.zero == self.one {
            return Err(SpinframeError::config(
                "scroll offsets must anchor progress 0 and 1 at distinct positions",
            ));
        }
        Ok(())
    }
}

/// Document-space bounds of the scroll region driving the rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionBounds {
    /// Document y of the region's top edge.
    pub top: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Maps raw scroll position against a bounded region to normalized progress.
///
/// Pull-based: callers recompute on each scroll/layout notification rather
/// than subscribing to an implicit reactive graph.
#[derive(Clone, Debug)]
pub struct ScrollTracker {
    region: RegionBounds,
    offsets: ScrollOffsets,
}

impl ScrollTracker {
    pub fn new(region: RegionBounds, offsets: ScrollOffsets) -> SpinframeResult<Self> {
        offsets.validate()?;
        Ok(Self { region, offsets })
    }

    /// Re-anchor after a layout change moves or resizes the region.
    pub fn set_region(&mut self, region: RegionBounds) {
        self.region = region;
    }

    pub fn region(&self) -> RegionBounds {
        self.region
    }

    fn anchor_scroll_y(&self, anchor: OffsetAnchor, viewport: Viewport) -> f64 {
        let region_pos = match anchor.region {
            Edge::Start => self.region.top,
            Edge::End => self.region.top + self.region.height,
        };
        let viewport_offset = match anchor.viewport {
            Edge::Start => 0.0,
            Edge::End => viewport.height,
        };
        region_pos - viewport_offset
    }

    /// Raw progress for a scroll position. May transiently leave [0, 1]
    /// during fast scrolling; callers clamp before use. A zero-height region
    /// (anchors collapsed by layout) reports constant 0 rather than dividing
    /// by zero.
    pub fn raw_progress(&self, scroll_y: f64, viewport: Viewport) -> f64 {
        let y0 = self.anchor_scroll_y(self.offsets.zero, viewport);
        let y1 = self.anchor_scroll_y(self.offsets.one, viewport);
        let span = y1 - y0;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        (scroll_y - y0) / span
    }
}

/// Critically-damped spring low-pass over raw scroll progress.
///
/// Suppresses stutter from fast or discrete scroll events without unbounded
/// lag; with the default constants a step target settles within a few hundred
/// milliseconds.
#[derive(Clone, Debug)]
pub struct SpringSmoother {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
}

/// Largest integration step fed to the semi-implicit Euler update. Longer
/// frame gaps are split into substeps so stiff springs stay stable.
const MAX_SUBSTEP: f64 = 1.0 / 120.0;

const SETTLE_EPSILON: f64 = 1e-4;

impl SpringSmoother {
    pub fn new(params: SpringParams) -> Self {
        Self {
            params,
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
        }
    }

    /// Jump to `value` with no transient, e.g. on mount.
    pub fn snap_to(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Advance the spring by `dt` seconds and return the smoothed value.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if !dt.is_finite() || dt <= 0.0 {
            return self.position;
        }

        let mut remaining = dt.min(0.25);
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP);
            let accel = (self.params.stiffness * (self.target - self.position)
                - self.params.damping * self.velocity)
                / self.params.mass;
            self.velocity += accel * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if self.is_settled() {
            self.position = self.target;
            self.velocity = 0.0;
        }
        self.position
    }

    pub fn value(&self) -> f64 {
        self.position
    }

    /// True once motion is visually over; hosts may stop ticking.
    pub fn is_settled(&self) -> bool {
        (self.position - self.target).abs() < SETTLE_EPSILON
            && self.velocity.abs() < SETTLE_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(offsets: ScrollOffsets) -> ScrollTracker {
        ScrollTracker::new(
            RegionBounds {
                top: 1000.0,
                height: 2200.0,
            },
            offsets,
        )
        .unwrap()
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 1280.0,
            height: 1000.0,
        }
    }

    #[test]
    fn pin_through_progress_spans_region_height() {
        let t = tracker(ScrollOffsets::pin_through());
        assert_eq!(t.raw_progress(1000.0, viewport()), 0.0);
        assert_eq!(t.raw_progress(2100.0, viewport()), 0.5);
        assert_eq!(t.raw_progress(3200.0, viewport()), 1.0);
    }

    #[test]
    fn full_extent_progress_ends_when_bottom_meets_viewport_bottom() {
        let t = tracker(ScrollOffsets::full_extent());
        assert_eq!(t.raw_progress(1000.0, viewport()), 0.0);
        // region bottom (3200) meets viewport bottom at scroll_y 2200
        assert_eq!(t.raw_progress(2200.0, viewport()), 1.0);
    }

    #[test]
    fn raw_progress_may_leave_unit_range() {
        let t = tracker(ScrollOffsets::pin_through());
        assert!(t.raw_progress(500.0, viewport()) < 0.0);
        assert!(t.raw_progress(4000.0, viewport()) > 1.0);
    }

    #[test]
    fn zero_height_region_reports_constant_zero() {
        let mut t = tracker(ScrollOffsets::pin_through());
        t.set_region(RegionBounds {
            top: 1000.0,
            height: 0.0,
        });
        assert_eq!(t.raw_progress(5000.0, viewport()), 0.0);
    }

    #[test]
    fn identical_anchors_are_rejected() {
        let offsets = ScrollOffsets {
            zero: OffsetAnchor {
                region: Edge::Start,
                viewport: Edge::Start,
            },
            one: OffsetAnchor {
                region: Edge::Start,
                viewport: Edge::Start,
            },
        };
        assert!(
            ScrollTracker::new(
                RegionBounds {
                    top: 0.0,
                    height: 100.0
                },
                offsets
            )
            .is_err()
        );
    }

    #[test]
    fn spring_settles_on_step_target() {
        let mut spring = SpringSmoother::new(SpringParams::default());
        spring.set_target(1.0);
        let mut value = 0.0;
        for _ in 0..90 {
            value = spring.tick(1.0 / 60.0);
        }
        assert!((value - 1.0).abs() < 1e-2, "spring lagged at {value}");
    }

    #[test]
    fn spring_moves_monotonically_toward_small_steps() {
        let mut spring = SpringSmoother::new(SpringParams::default());
        spring.set_target(0.3);
        let a = spring.tick(1.0 / 60.0);
        let b = spring.tick(1.0 / 60.0);
        assert!(a > 0.0 && b > a);
        assert!(b < 0.3 + 1e-6);
    }

    #[test]
    fn spring_survives_long_frame_gaps() {
        let mut spring = SpringSmoother::new(SpringParams::default());
        spring.set_target(1.0);
        let value = spring.tick(2.0);
        assert!(value.is_finite());
        assert!((0.0..=1.5).contains(&value));
    }

    #[test]
    fn snap_to_clears_transient() {
        let mut spring = SpringSmoother::new(SpringParams::default());
        spring.set_target(1.0);
        spring.tick(0.05);
        spring.snap_to(0.5);
        assert_eq!(spring.value(), 0.5);
        assert!(spring.is_settled());
        assert_eq!(spring.tick(0.1), 0.5);
    }
}
