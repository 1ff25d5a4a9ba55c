// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Porter–Duff compositing over straight 8-bit channels, plus shadow
//! coverage synthesis (offset + multi-pass box blur).

use crate::color::Color;
use crate::state::CompositeOperator;

/// Composite `src` over `dst` under `op`, with `global_alpha` already
/// folded into the source's effective alpha
/// (`alpha_s = (channel_s/255) * globalAlpha`, `alpha_d = channel_d/255`).
/// Returns the resulting straight RGBA color.
#[must_use]
pub fn composite_pixel(src: Color, dst: Color, op: CompositeOperator, global_alpha: f32) -> Color {
    let alpha_s = src.effective_alpha(global_alpha);
    let alpha_d = dst.alpha_f32();
    let (fs, fd) = porter_duff_factors(op, alpha_s, alpha_d);
    let out_alpha = alpha_s * fs + alpha_d * fd;
    if out_alpha <= 0.0 {
        return Color::TRANSPARENT;
    }
    let src_c = src.to_f32_array();
    let dst_c = dst.to_f32_array();
    let mut out = [0.0f32; 4];
    for i in 0..3 {
        out[i] = (src_c[i] * alpha_s * fs + dst_c[i] * alpha_d * fd) / out_alpha;
    }
    out[3] = out_alpha;
    Color::from_f32_array(out)
}

/// The `(Fs, Fd)` Porter–Duff coefficients for each of the ten supported
/// operators. Any `peniko::Compose` variant outside the ten falls back to
/// source-over, matching the "unknown enum literal -> documented default"
/// policy.
#[must_use]
pub fn porter_duff_factors(op: CompositeOperator, alpha_s: f32, alpha_d: f32) -> (f32, f32) {
    match op {
        CompositeOperator::DestOver => (1.0 - alpha_d, 1.0),
        CompositeOperator::SrcIn => (alpha_d, 0.0),
        CompositeOperator::DestIn => (0.0, alpha_s),
        CompositeOperator::SrcOut => (1.0 - alpha_d, 0.0),
        CompositeOperator::DestOut => (0.0, 1.0 - alpha_s),
        CompositeOperator::SrcAtop => (alpha_d, 1.0 - alpha_s),
        CompositeOperator::DestAtop => (1.0 - alpha_d, alpha_s),
        CompositeOperator::Xor => (1.0 - alpha_d, 1.0 - alpha_s),
        CompositeOperator::Copy => (1.0, 0.0),
        // SrcOver and any other/unknown variant.
        _ => (1.0, 1.0 - alpha_s),
    }
}

/// Whether `op`'s result depends on destination regions outside the actual
/// painted shape, requiring the caller to visit every pixel of the shape's
/// bounding region (compositing a transparent source where the shape does
/// not cover), not only the pixels the scan converter actually painted.
#[must_use]
pub fn needs_full_region_compositing(op: CompositeOperator) -> bool {
    matches!(
        op,
        CompositeOperator::SrcIn
            | CompositeOperator::SrcOut
            | CompositeOperator::DestAtop
            | CompositeOperator::Copy
    )
}

/// Number of box-blur passes used to approximate a Gaussian shadow blur.
pub const SHADOW_BLUR_PASSES: u32 = 3;

/// Compute the box widths (odd integers) that together approximate a
/// Gaussian of standard deviation `sigma` via `passes` successive box blurs
/// (Central Limit Theorem approximation).
#[must_use]
pub fn gaussian_box_sizes(sigma: f64, passes: u32) -> Vec<u32> {
    if sigma <= 0.0 || passes == 0 {
        return vec![1; passes as usize];
    }
    let n = f64::from(passes);
    let ideal_width = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut wl = ideal_width.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    wl = wl.max(1);
    let wu = wl + 2;
    let wl_f = wl as f64;
    let ideal_m = (12.0 * sigma * sigma - n * wl_f * wl_f - 4.0 * n * wl_f - 3.0 * n)
        / (-4.0 * wl_f - 4.0);
    let m = ideal_m.round() as i64;
    (0..passes as i64).map(|i| if i < m { wl as u32 } else { wu as u32 }).collect()
}

/// Run `passes` box blurs (each a separable horizontal+vertical pass) over
/// a single-channel coverage buffer of `width * height` floats, in place,
/// with `sigma = blur / 2` as specified for shadow blur.
pub fn box_blur_coverage(buffer: &mut [f32], width: u32, height: u32, blur: f64) {
    let sigma = blur / 2.0;
    for box_size in gaussian_box_sizes(sigma, SHADOW_BLUR_PASSES) {
        let radius = (box_size.saturating_sub(1)) / 2;
        box_blur_pass(buffer, width, height, radius);
    }
}

fn box_blur_pass(buffer: &mut [f32], width: u32, height: u32, radius: u32) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let w = width as usize;
    let h = height as usize;
    let mut tmp = vec![0.0f32; w * h];
    box_blur_horizontal(buffer, &mut tmp, w, h, radius as i32);
    box_blur_horizontal_transposed(&tmp, buffer, w, h, radius as i32);
}

fn box_blur_horizontal(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: i32) {
    let window = (2 * r + 1) as f32;
    for y in 0..h {
        let row = y * w;
        let mut acc = 0.0f32;
        for x in -r..=r {
            acc += sample_clamped(src, w, h, x, y as i32);
        }
        for x in 0..w as i32 {
            dst[row + x as usize] = acc / window;
            acc += sample_clamped(src, w, h, x + r + 1, y as i32);
            acc -= sample_clamped(src, w, h, x - r, y as i32);
        }
    }
}

/// Same box-average sweep as [`box_blur_horizontal`] but reads `src` as if
/// transposed and writes `dst` back in the original (non-transposed) row
/// order, giving the vertical pass without materializing a transposed copy.
fn box_blur_horizontal_transposed(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: i32) {
    let window = (2 * r + 1) as f32;
    for x in 0..w {
        let mut acc = 0.0f32;
        for y in -r..=r {
            acc += sample_clamped(src, w, h, x as i32, y);
        }
        for y in 0..h as i32 {
            dst[y as usize * w + x] = acc / window;
            acc += sample_clamped(src, w, h, x as i32, y + r + 1);
            acc -= sample_clamped(src, w, h, x as i32, y - r);
        }
    }
}

fn sample_clamped(buf: &[f32], w: usize, h: usize, x: i32, y: i32) -> f32 {
    let cx = x.clamp(0, w as i32 - 1) as usize;
    let cy = y.clamp(0, h as i32 - 1) as usize;
    buf[cy * w + cx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_over_opaque_replaces_destination() {
        let src = Color::new(0, 128, 0, 255);
        let dst = Color::new(255, 255, 255, 255);
        let out = composite_pixel(src, dst, CompositeOperator::SrcOver, 1.0);
        assert_eq!(out, src);
    }

    #[test]
    fn source_over_half_alpha_over_white() {
        let src = Color::new(0, 128, 0, 255);
        let dst = Color::new(255, 255, 255, 255);
        let out = composite_pixel(src, dst, CompositeOperator::SrcOver, 0.5);
        assert!((i16::from(out.r) - 127).abs() <= 1);
        assert!((i16::from(out.g) - 191).abs() <= 1);
        assert!((i16::from(out.b) - 127).abs() <= 1);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn destination_out_with_opaque_source_clears_alpha() {
        let src = Color::new(0, 0, 255, 255);
        let dst = Color::new(255, 0, 0, 255);
        let out = composite_pixel(src, dst, CompositeOperator::DestOut, 1.0);
        assert_eq!(out.a, 0);
    }

    #[test]
    fn copy_replaces_even_with_transparent_source() {
        let src = Color::TRANSPARENT;
        let dst = Color::new(255, 0, 0, 255);
        let out = composite_pixel(src, dst, CompositeOperator::Copy, 1.0);
        assert_eq!(out, Color::TRANSPARENT);
    }

    #[test]
    fn full_region_operators_are_flagged() {
        assert!(needs_full_region_compositing(CompositeOperator::SrcIn));
        assert!(!needs_full_region_compositing(CompositeOperator::SrcOver));
    }

    #[test]
    fn box_blur_smooths_a_single_spike() {
        let w = 9u32;
        let h = 9u32;
        let mut buf = vec![0.0f32; (w * h) as usize];
        buf[(4 * w + 4) as usize] = 1.0;
        box_blur_coverage(&mut buf, w, h, 4.0);
        assert!(buf[(4 * w + 4) as usize] < 1.0);
        assert!(buf[(4 * w + 4) as usize] > 0.0);
        assert!(buf[0] > 0.0);
    }
}
