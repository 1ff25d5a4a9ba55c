// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rounded-rectangle fill/stroke fast paths: a direct scanline sweep for
//! the axis-aligned case, and Edge-Buffer / Dual Edge-Buffer Rasterization
//! for the rotated case.

use super::{centered_interval_to_pixels, fill_rect_device};
use crate::color::Color;
use crate::geom::{Point, Rect, Transform};
use crate::state::CompositeOperator;
use crate::stencil::StencilBuffer;
use crate::surface::Surface;

const CORNER_STEPS: u32 = 12;

/// Fill an axis-aligned rounded rectangle: rows in the top/bottom corner
/// bands derive their horizontal extent from the corner circle
/// (`x = cx +- sqrt(r^2 - dy^2)`); middle rows are plain full-width fills.
pub fn fill_axis_aligned(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    radius: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let r = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);
    let (y0, y1) = centered_interval_to_pixels(rect.top(), rect.bottom());
    let y0 = y0.max(0);
    let y1 = y1.min(surface.height() as i32);
    let top_band_end = rect.top() + r;
    let bottom_band_start = rect.bottom() - r;
    for y in y0..y1 {
        let cy = f64::from(y) + 0.5;
        let (left, right) = if cy < top_band_end {
            let dy = top_band_end - cy;
            let half = (r * r - dy * dy).max(0.0).sqrt();
            (rect.left() + r - half, rect.right() - r + half)
        } else if cy > bottom_band_start {
            let dy = cy - bottom_band_start;
            let half = (r * r - dy * dy).max(0.0).sqrt();
            (rect.left() + r - half, rect.right() - r + half)
        } else {
            (rect.left(), rect.right())
        };
        let (x0, x1) = centered_interval_to_pixels(left, right);
        fill_rect_device(surface, stencil, x0.max(0), y, x1.min(surface.width() as i32), y + 1, color, op, global_alpha);
    }
}

/// Build the device-space outline of a rounded rect (4 straight edges + 4
/// quarter-circle corners), as a closed polyline, mapped through
/// `transform`.
fn outline_device(rect: Rect, radius: f64, transform: Transform) -> Vec<Point> {
    let r = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);
    let mut pts = Vec::new();
    let half_pi = core::f64::consts::FRAC_PI_2;
    pts.push(Point::new(rect.left() + r, rect.top()));
    pts.push(Point::new(rect.right() - r, rect.top()));
    push_arc(&mut pts, rect.right() - r, rect.top() + r, r, -half_pi, 0.0);
    pts.push(Point::new(rect.right(), rect.bottom() - r));
    push_arc(&mut pts, rect.right() - r, rect.bottom() - r, r, 0.0, half_pi);
    pts.push(Point::new(rect.left() + r, rect.bottom()));
    push_arc(&mut pts, rect.left() + r, rect.bottom() - r, r, half_pi, half_pi * 2.0);
    pts.push(Point::new(rect.left(), rect.top() + r));
    push_arc(&mut pts, rect.left() + r, rect.top() + r, r, half_pi * 2.0, half_pi * 3.0);
    pts.into_iter().map(|p| transform.transform_point(p)).collect()
}

fn push_arc(pts: &mut Vec<Point>, cx: f64, cy: f64, r: f64, a0: f64, a1: f64) {
    if r <= 0.0 {
        pts.push(Point::new(cx, cy));
        return;
    }
    for i in 0..=CORNER_STEPS {
        let t = a0 + (a1 - a0) * (f64::from(i) / f64::from(CORNER_STEPS));
        pts.push(Point::new(cx + r * t.cos(), cy + r * t.sin()));
    }
}

/// Per-row min/max device-x extent of a closed device-space outline,
/// computed by walking its edges exactly as the scan converter does but
/// retaining only the extreme crossings per row (Edge-Buffer Rasterization:
/// valid because a rounded rect's rows each have exactly one inside span).
fn edge_buffer(outline: &[Point], y0: i32, y1: i32) -> Vec<Option<(f64, f64)>> {
    let h = (y1 - y0).max(0) as usize;
    let mut bounds: Vec<Option<(f64, f64)>> = vec![None; h];
    let n = outline.len();
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        if (a.y - b.y).abs() < 1e-9 {
            continue;
        }
        let (top, bot) = if a.y < b.y { (a, b) } else { (b, a) };
        let dxdy = (bot.x - top.x) / (bot.y - top.y);
        let row_start = ((top.y - 0.5).ceil() as i32).max(y0);
        let row_end = ((bot.y - 0.5).ceil() as i32).min(y1);
        for y in row_start..row_end {
            let scan_y = f64::from(y) + 0.5;
            let x = top.x + (scan_y - top.y) * dxdy;
            let idx = (y - y0) as usize;
            bounds[idx] = Some(match bounds[idx] {
                None => (x, x),
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
            });
        }
    }
    bounds
}

/// Fill a rotated rounded rectangle via Edge-Buffer Rasterization.
pub fn fill_rotated(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    radius: f64,
    transform: Transform,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let outline = outline_device(rect, radius, transform);
    let bbox = Rect::bounding_box(&outline);
    let y0 = bbox.top().floor().max(0.0) as i32;
    let y1 = (bbox.bottom().ceil() as i32).min(surface.height() as i32);
    if y1 <= y0 {
        return;
    }
    let bounds = edge_buffer(&outline, y0, y1);
    for (row, bound) in bounds.into_iter().enumerate() {
        let Some((lo, hi)) = bound else { continue };
        let y = y0 + row as i32;
        let x0 = (lo.ceil() as i32).max(0);
        let x1 = ((hi.floor() as i32) + 1).min(surface.width() as i32);
        fill_rect_device(surface, stencil, x0, y, x1, y + 1, color, op, global_alpha);
    }
}

/// Stroke a rotated rounded rectangle via Dual Edge-Buffer Rasterization:
/// an outer perimeter (expanded by `w/2`) and an inner perimeter
/// (contracted by `w/2`, empty once the radius or half-extent is
/// exhausted) are each edge-buffered; each row then fills the span(s)
/// between outer and inner, or the full outer span where no inner span
/// exists, so every pixel is visited exactly once (satisfying the
/// no-overdraw invariant for alpha-blended strokes, including the 1-px
/// case).
pub fn stroke_rotated(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    radius: f64,
    transform: Transform,
    line_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let hw = line_width / 2.0;
    let outer_rect = Rect::new(rect.x - hw, rect.y - hw, rect.width + line_width, rect.height + line_width);
    let outer_radius = radius + hw;
    let inner_w = rect.width - line_width;
    let inner_h = rect.height - line_width;
    let has_inner = inner_w > 0.0 && inner_h > 0.0;
    let inner_rect = Rect::new(rect.x + hw, rect.y + hw, inner_w.max(0.0), inner_h.max(0.0));
    let inner_radius = (radius - hw).max(0.0);

    let outer_outline = outline_device(outer_rect, outer_radius, transform);
    let bbox = Rect::bounding_box(&outer_outline);
    let y0 = bbox.top().floor().max(0.0) as i32;
    let y1 = (bbox.bottom().ceil() as i32).min(surface.height() as i32);
    if y1 <= y0 {
        return;
    }
    let outer_bounds = edge_buffer(&outer_outline, y0, y1);
    let inner_bounds = if has_inner {
        let inner_outline = outline_device(inner_rect, inner_radius, transform);
        edge_buffer(&inner_outline, y0, y1)
    } else {
        vec![None; (y1 - y0) as usize]
    };

    for row in 0..(y1 - y0) as usize {
        let Some((olo, ohi)) = outer_bounds[row] else { continue };
        let y = y0 + row as i32;
        match inner_bounds[row] {
            None => {
                let x0 = (olo.ceil() as i32).max(0);
                let x1 = ((ohi.floor() as i32) + 1).min(surface.width() as i32);
                fill_rect_device(surface, stencil, x0, y, x1, y + 1, color, op, global_alpha);
            }
            Some((ilo, ihi)) => {
                let x0 = (olo.ceil() as i32).max(0);
                let x1 = ((ilo.ceil() as i32)).min(surface.width() as i32);
                fill_rect_device(surface, stencil, x0, y, x1, y + 1, color, op, global_alpha);
                let x2 = ((ihi.floor() as i32) + 1).max(0);
                let x3 = ((ohi.floor() as i32) + 1).min(surface.width() as i32);
                fill_rect_device(surface, stencil, x2, y, x3, y + 1, color, op, global_alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_round_rect_center_is_filled() {
        let mut s = Surface::new(30, 30).unwrap();
        fill_axis_aligned(
            &mut s,
            None,
            Rect::new(5.0, 5.0, 20.0, 20.0),
            5.0,
            Color::new(1, 2, 3, 255),
            CompositeOperator::SrcOver,
            1.0,
        );
        assert_eq!(s.get_pixel(15, 15), Color::new(1, 2, 3, 255));
    }

    #[test]
    fn axis_aligned_round_rect_corner_outside_radius_is_empty() {
        let mut s = Surface::new(30, 30).unwrap();
        fill_axis_aligned(
            &mut s,
            None,
            Rect::new(5.0, 5.0, 20.0, 20.0),
            5.0,
            Color::new(1, 2, 3, 255),
            CompositeOperator::SrcOver,
            1.0,
        );
        assert_eq!(s.get_pixel(5, 5), Color::TRANSPARENT);
    }

    #[test]
    fn rotated_stroke_leaves_interior_transparent() {
        let mut s = Surface::new(40, 40).unwrap();
        let transform = Transform::IDENTITY.translate(20.0, 20.0).rotate(0.4);
        stroke_rotated(
            &mut s,
            None,
            Rect::new(-10.0, -7.0, 20.0, 14.0),
            3.0,
            transform,
            2.0,
            Color::new(0, 180, 0, 153),
            CompositeOperator::SrcOver,
            1.0,
        );
        assert_eq!(s.get_pixel(20, 20), Color::TRANSPARENT);
    }
}
