// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct-rendering specializers: contract-preserving shortcuts that bypass
//! flattening and scan conversion for common shapes under restricted
//! conditions (axis-aligned/rotated rects, rounded rects, circles, arcs).
//!
//! Every function here assumes its qualification conditions (checked by
//! the caller in `context`) already hold; callers fall back to the general
//! polygon pipeline whenever they don't.

pub mod circle;
pub mod rect;
pub mod roundrect;

use crate::color::Color;
use crate::composite::composite_pixel;
use crate::state::CompositeOperator;
use crate::stencil::StencilBuffer;
use crate::surface::{pack_rgba, Surface};

/// Composite a single source color onto `surface` at `(x, y)`, honoring the
/// optional stencil and the active composite operator / global alpha. The
/// one blending primitive every fast path funnels through.
pub fn composite_set(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    x: i32,
    y: i32,
    src: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    if !surface.in_bounds(i64::from(x), i64::from(y)) {
        return;
    }
    if let Some(st) = stencil {
        if !st.is_visible(x, y) {
            return;
        }
    }
    let dst = surface.get_pixel(x, y);
    let out = composite_pixel(src, dst, op, global_alpha);
    surface.set_pixel(x, y, out);
}

/// Fill `[x0, x1) x [y0, y1)` (already clamped by the caller to surface
/// bounds) with `color`, bypassing per-pixel blending with a bulk packed
/// row-fill when the color is fully opaque, the operator is source-over,
/// global alpha is 1, and there is no stencil to consult.
pub fn fill_rect_device(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let bulk_opaque =
        stencil.is_none() && color.a == 255 && global_alpha >= 1.0 && op == CompositeOperator::SrcOver;
    if bulk_opaque {
        let packed = pack_rgba(color);
        for y in y0..y1 {
            surface.fill_row_u32(y, x0, x1, packed);
        }
        return;
    }
    for y in y0..y1 {
        for x in x0..x1 {
            composite_set(surface, stencil, x, y, color, op, global_alpha);
        }
    }
}

/// Whether the qualification conditions common to every fast path hold:
/// solid color paint, source-over compositing, no shadow, no dash (stroke
/// paths only need to check this for stroking).
#[must_use]
pub fn common_fast_path_ok(op: CompositeOperator, shadow_enabled: bool) -> bool {
    op == CompositeOperator::SrcOver && !shadow_enabled
}

/// Convert a half-open floating-point interval `[lo, hi)` sampled at pixel
/// centers into an inclusive-exclusive integer pixel range `[lo_i, hi_i)`,
/// matching the scan converter's "scanline at coordinate + 0.5" convention:
/// a pixel index `i` is covered iff `lo <= i + 0.5 < hi`.
#[must_use]
pub fn centered_interval_to_pixels(lo: f64, hi: f64) -> (i32, i32) {
    if hi <= lo {
        return (0, 0);
    }
    let lo_i = (lo - 0.5).ceil() as i32;
    let hi_i = (hi - 0.5).ceil() as i32;
    (lo_i, hi_i)
}
