use crate::{
    composite::{BlitParams, blit_scaled_over},
    error::SpinframeResult,
    preload::FrameSet,
    resolve::ResolvedFrame,
};

/// Drawing surface geometry derived from the container box and display
/// density. The pixel surface is square on the smaller container side; the
/// CSS box uses un-scaled device-independent pixels so the element occupies
/// the same layout box on any display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasGeometry {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
}

impl CanvasGeometry {
    pub fn for_container(container_width: f64, container_height: f64, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let side_css = container_width.min(container_height).max(0.0);
        let side_px = if side_css.is_finite() {
            (side_css * dpr).floor() as u32
        } else {
            0
        };
        Self {
            pixel_width: side_px,
            pixel_height: side_px,
            css_width: side_css,
            css_height: side_css,
            device_pixel_ratio: dpr,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_width == 0 || self.pixel_height == 0
    }
}

/// Owned premultiplied RGBA8 pixel surface.
#[derive(Clone, Debug)]
pub struct Surface {
    geometry: CanvasGeometry,
    pixels: Vec<u8>,
}

impl Surface {
    fn new(geometry: CanvasGeometry) -> Self {
        let len = geometry.pixel_width as usize * geometry.pixel_height as usize * 4;
        Self {
            geometry,
            pixels: vec![0u8; len],
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Mix weights below this never cause a second blend layer to be painted.
const MIX_EPSILON: f64 = 1e-3;

/// Tolerance for treating a resolved frame as identical to the last drawn one.
const SKIP_MIX_TOLERANCE: f64 = 1.0 / 512.0;

/// Paints resolved frame pairs into an owned surface with alpha cross-fade.
///
/// Draws are no-ops until the first resize attaches a surface, and whenever
/// geometry is zero-area; neither case is an error in a decorative component.
#[derive(Debug)]
pub struct Renderer {
    surface: Option<Surface>,
    margin_factor: f64,
    last_drawn: Option<ResolvedFrame>,
    draw_count: u64,
}

impl Renderer {
    pub fn new(margin_factor: f64) -> Self {
        Self {
            surface: None,
            margin_factor,
            last_drawn: None,
            draw_count: 0,
        }
    }

    /// Rebuild the surface for a new container box. The previous contents are
    /// discarded, so the caller must redraw the last resolved frame.
    pub fn resize(&mut self, container_width: f64, container_height: f64, dpr: f64) -> CanvasGeometry {
        let geometry = CanvasGeometry::for_container(container_width, container_height, dpr);
        self.surface = Some(Surface::new(geometry));
        self.last_drawn = None;
        geometry
    }

    pub fn geometry(&self) -> Option<CanvasGeometry> {
        self.surface.as_ref().map(Surface::geometry)
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn last_drawn(&self) -> Option<ResolvedFrame> {
        self.last_drawn
    }

    /// Number of surface mutations since construction. Skipped draws do not
    /// count.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Paint `resolved` from `frames`, cross-fading frame B over frame A.
    ///
    /// Returns `true` when the surface was mutated and `false` when the draw
    /// was skipped (unchanged frame, missing surface, or zero-area geometry).
    pub fn draw(&mut self, frames: &FrameSet, resolved: ResolvedFrame) -> SpinframeResult<bool> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(false);
        };
        if surface.geometry.is_empty() {
            return Ok(false);
        }
        if let Some(last) = self.last_drawn
            && last.approx_eq(&resolved, SKIP_MIX_TOLERANCE)
        {
            return Ok(false);
        }
        let (Some(frame_a), Some(frame_b)) =
            (frames.get(resolved.index_a), frames.get(resolved.index_b))
        else {
            return Ok(false);
        };

        let geometry = surface.geometry;
        let sw = f64::from(geometry.pixel_width);
        let sh = f64::from(geometry.pixel_height);

        // Same fitted scale and centered offset for both frames so they align
        // pixel-for-pixel when blended.
        let scale = (sw / f64::from(frame_a.width))
            .min(sh / f64::from(frame_a.height))
            * self.margin_factor;
        if !scale.is_finite() || scale <= 0.0 {
            return Ok(false);
        }
        let offset_x = (sw - f64::from(frame_a.width) * scale) / 2.0;
        let offset_y = (sh - f64::from(frame_a.height) * scale) / 2.0;

        surface.clear();
        blit_scaled_over(
            &mut surface.pixels,
            BlitParams {
                dst_width: geometry.pixel_width,
                dst_height: geometry.pixel_height,
                offset_x,
                offset_y,
                scale,
                opacity: 1.0,
            },
            &frame_a.rgba8_premul,
            frame_a.width,
            frame_a.height,
        )?;

        if resolved.index_b != resolved.index_a && resolved.mix > MIX_EPSILON {
            blit_scaled_over(
                &mut surface.pixels,
                BlitParams {
                    dst_width: geometry.pixel_width,
                    dst_height: geometry.pixel_height,
                    offset_x,
                    offset_y,
                    scale,
                    opacity: resolved.mix as f32,
                },
                &frame_b.rgba8_premul,
                frame_b.width,
                frame_b.height,
            )?;
        }

        self.last_drawn = Some(resolved);
        self.draw_count += 1;
        Ok(true)
    }
}
