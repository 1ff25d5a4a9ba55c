// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circle and arc fill/stroke fast paths.

use super::{centered_interval_to_pixels, composite_set};
use crate::color::Color;
use crate::state::CompositeOperator;
use crate::stencil::StencilBuffer;
use crate::surface::Surface;

/// Fill a full circle via a scanline sweep: for each row, the extent is
/// `+-sqrt(r^2 - dy^2)` around the center.
pub fn fill_circle(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    cx: f64,
    cy: f64,
    r: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let y0 = (cy - r).floor().max(0.0) as i32;
    let y1 = ((cy + r).ceil() as i32).min(surface.height() as i32);
    for y in y0..y1 {
        let dy = f64::from(y) + 0.5 - cy;
        if dy.abs() > r {
            continue;
        }
        let half_chord = (r * r - dy * dy).max(0.0).sqrt();
        let (x0, x1) = centered_interval_to_pixels(cx - half_chord, cx + half_chord);
        let x0 = x0.max(0);
        let x1 = x1.min(surface.width() as i32);
        for x in x0..x1 {
            composite_set(surface, stencil, x, y, color, op, global_alpha);
        }
    }
}

/// Stroke a circle outline of the given `line_width` as the annulus between
/// the outer radius `r + line_width/2` and the inner radius
/// `r - line_width/2` (clamped at zero), via the same scanline sweep as
/// [`fill_circle`] applied twice per row. This one sweep covers every width
/// and alpha uniformly, including an opaque 1-px outline, rather than
/// switching to a dedicated midpoint-circle walk for that narrower case.
pub fn stroke_circle(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    cx: f64,
    cy: f64,
    r: f64,
    line_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let outer = r + line_width / 2.0;
    let inner = (r - line_width / 2.0).max(0.0);
    let y0 = (cy - outer).floor().max(0.0) as i32;
    let y1 = ((cy + outer).ceil() as i32).min(surface.height() as i32);
    for y in y0..y1 {
        let dy = f64::from(y) + 0.5 - cy;
        if dy.abs() > outer {
            continue;
        }
        let outer_half = (outer * outer - dy * dy).max(0.0).sqrt();
        let (ox0, ox1) = centered_interval_to_pixels(cx - outer_half, cx + outer_half);
        if dy.abs() >= inner {
            paint_span(surface, stencil, ox0, ox1, y, color, op, global_alpha);
            continue;
        }
        let inner_half = (inner * inner - dy * dy).max(0.0).sqrt();
        let (ix0, ix1) = centered_interval_to_pixels(cx - inner_half, cx + inner_half);
        paint_span(surface, stencil, ox0, ix0, y, color, op, global_alpha);
        paint_span(surface, stencil, ix1, ox1, y, color, op, global_alpha);
    }
}

fn paint_span(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    x0: i32,
    x1: i32,
    y: i32,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let x0 = x0.max(0);
    let x1 = x1.min(surface.width() as i32);
    for x in x0..x1 {
        composite_set(surface, stencil, x, y, color, op, global_alpha);
    }
}

fn angle_in_range(angle: f64, a0: f64, a1: f64, ccw: bool) -> bool {
    let two_pi = core::f64::consts::TAU;
    let norm = |a: f64| a.rem_euclid(two_pi);
    let a = norm(angle);
    let (lo, hi) = if ccw { (norm(a1), norm(a0)) } else { (norm(a0), norm(a1)) };
    if lo <= hi { a >= lo && a <= hi } else { a >= lo || a <= hi }
}

/// Fill the pie sector of a circle spanning `[a0, a1]` (direction `ccw`):
/// pixels within radius `r` of center whose angle falls in range.
#[allow(clippy::too_many_arguments, reason = "sector fill needs both the circle and the angular range")]
pub fn fill_arc(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    cx: f64,
    cy: f64,
    r: f64,
    a0: f64,
    a1: f64,
    ccw: bool,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let y0 = (cy - r).floor().max(0.0) as i32;
    let y1 = ((cy + r).ceil() as i32).min(surface.height() as i32);
    let x_lo = (cx - r).floor().max(0.0) as i32;
    let x_hi = ((cx + r).ceil() as i32).min(surface.width() as i32);
    for y in y0..y1 {
        let dy = f64::from(y) + 0.5 - cy;
        for x in x_lo..x_hi {
            let dx = f64::from(x) + 0.5 - cx;
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let angle = dy.atan2(dx);
            if angle_in_range(angle, a0, a1, ccw) {
                composite_set(surface, stencil, x, y, color, op, global_alpha);
            }
        }
    }
}

/// Stroke only the curved perimeter of an arc sector (not the two radii),
/// as the angularly-restricted annulus of [`stroke_circle`].
#[allow(clippy::too_many_arguments, reason = "outer-stroke needs the circle, angular range, and stroke width together")]
pub fn outer_stroke_arc(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    cx: f64,
    cy: f64,
    r: f64,
    a0: f64,
    a1: f64,
    ccw: bool,
    line_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let outer = r + line_width / 2.0;
    let inner = (r - line_width / 2.0).max(0.0);
    let y0 = (cy - outer).floor().max(0.0) as i32;
    let y1 = ((cy + outer).ceil() as i32).min(surface.height() as i32);
    let x_lo = (cx - outer).floor().max(0.0) as i32;
    let x_hi = ((cx + outer).ceil() as i32).min(surface.width() as i32);
    for y in y0..y1 {
        let dy = f64::from(y) + 0.5 - cy;
        for x in x_lo..x_hi {
            let dx = f64::from(x) + 0.5 - cx;
            let d2 = dx * dx + dy * dy;
            if d2 > outer * outer || d2 < inner * inner {
                continue;
            }
            let angle = dy.atan2(dx);
            if angle_in_range(angle, a0, a1, ccw) {
                composite_set(surface, stencil, x, y, color, op, global_alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_circle_paints_center_not_corner() {
        let mut s = Surface::new(20, 20).unwrap();
        fill_circle(&mut s, None, 10.0, 10.0, 8.0, Color::new(1, 2, 3, 255), CompositeOperator::SrcOver, 1.0);
        assert_eq!(s.get_pixel(10, 10), Color::new(1, 2, 3, 255));
        assert_eq!(s.get_pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn stroke_circle_leaves_center_transparent() {
        let mut s = Surface::new(20, 20).unwrap();
        stroke_circle(&mut s, None, 10.0, 10.0, 8.0, 2.0, Color::new(1, 2, 3, 255), CompositeOperator::SrcOver, 1.0);
        assert_eq!(s.get_pixel(10, 10), Color::TRANSPARENT);
    }
}
