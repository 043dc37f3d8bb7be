use crate::error::{SpinframeError, SpinframeResult};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over composite of one premultiplied pixel at the given opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Convert straight-alpha RGBA8 to premultiplied in place.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Placement of a scaled source image on a destination surface.
#[derive(Clone, Copy, Debug)]
pub struct BlitParams {
    pub dst_width: u32,
    pub dst_height: u32,
    /// Top-left of the scaled image in destination pixels.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Uniform scale from source to destination pixels. Must be > 0.
    pub scale: f64,
    pub opacity: f32,
}

/// Composite `src` over `dst` at a uniform scale with bilinear sampling.
///
/// Both buffers are premultiplied RGBA8. Destination pixels outside the scaled
/// source rect are untouched; a zero-area destination is a no-op.
pub fn blit_scaled_over(
    dst: &mut [u8],
    params: BlitParams,
    src: &[u8],
    src_width: u32,
    src_height: u32,
) -> SpinframeResult<()> {
    let dst_len = (params.dst_width as usize)
        .checked_mul(params.dst_height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| SpinframeError::render("destination surface size overflow"))?;
    let src_len = (src_width as usize)
        .checked_mul(src_height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| SpinframeError::render("source image size overflow"))?;

    if dst.len() != dst_len {
        return Err(SpinframeError::render(
            "destination buffer does not match width*height*4",
        ));
    }
    if src.len() != src_len {
        return Err(SpinframeError::render(
            "source buffer does not match width*height*4",
        ));
    }
    if dst_len == 0 || src_len == 0 {
        return Ok(());
    }
    if !params.scale.is_finite() || params.scale <= 0.0 {
        return Err(SpinframeError::render("blit scale must be finite and > 0"));
    }
    if params.opacity <= 0.0 {
        return Ok(());
    }

    let scaled_w = src_width as f64 * params.scale;
    let scaled_h = src_height as f64 * params.scale;

    let x0 = params.offset_x.floor().max(0.0) as u32;
    let y0 = params.offset_y.floor().max(0.0) as u32;
    let x1 = ((params.offset_x + scaled_w).ceil().max(0.0) as u32).min(params.dst_width);
    let y1 = ((params.offset_y + scaled_h).ceil().max(0.0) as u32).min(params.dst_height);

    let max_sx = (src_width - 1) as f64;
    let max_sy = (src_height - 1) as f64;

    for dy in y0..y1 {
        let sy = ((dy as f64 + 0.5 - params.offset_y) / params.scale - 0.5).clamp(0.0, max_sy);
        for dx in x0..x1 {
            let sx = ((dx as f64 + 0.5 - params.offset_x) / params.scale - 0.5).clamp(0.0, max_sx);

            let sample = sample_bilinear(src, src_width, src_height, sx, sy);
            let idx = ((dy as usize) * (params.dst_width as usize) + dx as usize) * 4;
            let d = [dst[idx], dst[idx + 1], dst[idx + 2], dst[idx + 3]];
            let out = over(d, sample, params.opacity);
            dst[idx..idx + 4].copy_from_slice(&out);
        }
    }

    Ok(())
}

fn sample_bilinear(src: &[u8], width: u32, height: u32, sx: f64, sy: f64) -> PremulRgba8 {
    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = (sx - x0 as f64) as f32;
    let fy = (sy - y0 as f64) as f32;

    let p00 = pixel_at(src, width, x0, y0);
    let p10 = pixel_at(src, width, x1, y0);
    let p01 = pixel_at(src, width, x0, y1);
    let p11 = pixel_at(src, width, x1, y1);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f32::from(p00[i]) * (1.0 - fx) + f32::from(p10[i]) * fx;
        let bot = f32::from(p01[i]) * (1.0 - fx) + f32::from(p11[i]) * fx;
        out[i] = (top * (1.0 - fy) + bot * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn pixel_at(src: &[u8], width: u32, x: u32, y: u32) -> PremulRgba8 {
    let idx = ((y as usize) * (width as usize) + x as usize) * 4;
    [src[idx], src[idx + 1], src[idx + 2], src[idx + 3]]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
