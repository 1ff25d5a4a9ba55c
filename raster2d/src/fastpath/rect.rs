// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned and rotated rectangle fill/stroke fast paths.

use super::{centered_interval_to_pixels, composite_set, fill_rect_device};
use crate::color::Color;
use crate::geom::{Point, Rect, Transform};
use crate::state::CompositeOperator;
use crate::stencil::StencilBuffer;
use crate::surface::Surface;

/// Fill an axis-aligned device-space rectangle.
pub fn fill_axis_aligned(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let (x0, x1) = centered_interval_to_pixels(rect.left(), rect.right());
    let (y0, y1) = centered_interval_to_pixels(rect.top(), rect.bottom());
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(surface.width() as i32);
    let y1 = y1.min(surface.height() as i32);
    fill_rect_device(surface, stencil, x0, y0, x1, y1, color, op, global_alpha);
}

/// Stroke an axis-aligned device-space rectangle as four edge fills (top and
/// bottom span the full outer width including corners; left and right fill
/// only the remaining middle height), which both avoids doubly-blending the
/// corners under alpha and keeps 1-px strokes crisp on the pixel grid.
pub fn stroke_axis_aligned(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    line_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let hw = line_width / 2.0;
    let top = Rect::new(rect.x - hw, rect.y - hw, rect.width + line_width, line_width);
    let bottom =
        Rect::new(rect.x - hw, rect.bottom() - hw, rect.width + line_width, line_width);
    let middle_h = (rect.height - line_width).max(0.0);
    let left = Rect::new(rect.x - hw, rect.y + hw, line_width, middle_h);
    let right = Rect::new(rect.right() - hw, rect.y + hw, line_width, middle_h);
    for r in [top, bottom, left, right] {
        fill_axis_aligned(surface, stencil, r, color, op, global_alpha);
    }
}

/// The four corners of `rect` mapped through `transform`, in order
/// top-left, top-right, bottom-right, bottom-left (pre-transform).
fn rotated_corners(rect: Rect, transform: Transform) -> [Point; 4] {
    [
        transform.transform_point(Point::new(rect.left(), rect.top())),
        transform.transform_point(Point::new(rect.right(), rect.top())),
        transform.transform_point(Point::new(rect.right(), rect.bottom())),
        transform.transform_point(Point::new(rect.left(), rect.bottom())),
    ]
}

/// A half-plane `a*x + b*y + c >= 0`.
struct HalfPlane {
    a: f64,
    b: f64,
    c: f64,
}

impl HalfPlane {
    fn through_edge(p0: Point, p1: Point, inside: Point) -> Self {
        // Inward normal of the edge p0->p1, oriented toward `inside`.
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let mut a = -dy;
        let mut b = dx;
        let mut c = -(a * p0.x + b * p0.y);
        if a * inside.x + b * inside.y + c < 0.0 {
            a = -a;
            b = -b;
            c = -c;
        }
        Self { a, b, c }
    }

    fn value(&self, p: Point) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }
}

/// Fill a rotated (or otherwise non-axis-aligned) device-space rectangle:
/// derive the four edge half-planes and iterate the clamped bounding box,
/// keeping pixels where all four are non-negative.
pub fn fill_rotated(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    transform: Transform,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let corners = rotated_corners(rect, transform);
    let center = Point::new(
        (corners[0].x + corners[1].x + corners[2].x + corners[3].x) / 4.0,
        (corners[0].y + corners[1].y + corners[2].y + corners[3].y) / 4.0,
    );
    let planes: Vec<HalfPlane> = (0..4)
        .map(|i| HalfPlane::through_edge(corners[i], corners[(i + 1) % 4], center))
        .collect();
    let bbox = Rect::bounding_box(&corners);
    let x0 = bbox.left().floor().max(0.0) as i32;
    let y0 = bbox.top().floor().max(0.0) as i32;
    let x1 = (bbox.right().ceil() as i32).min(surface.width() as i32);
    let y1 = (bbox.bottom().ceil() as i32).min(surface.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if planes.iter().all(|pl| pl.value(p) >= 0.0) {
                composite_set(surface, stencil, x, y, color, op, global_alpha);
            }
        }
    }
}

/// Stroke a rotated rectangle. Opaque colors render the four edges as thick
/// line segments with two opposite edges extended by `w/2` and the other
/// two shortened by `w/2`, so the miter joins at the corners cover exactly
/// without gap or double paint (safe because opaque drawing doesn't care
/// about overdraw). Semi-transparent colors instead rasterize the two
/// "short" (shortened) edges into a pixel set first, then the "long"
/// (extended) edges skipping any pixel already painted, so every pixel
/// blends exactly once.
pub fn stroke_rotated(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    rect: Rect,
    transform: Transform,
    line_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
) {
    let corners = rotated_corners(rect, transform);
    let hw = line_width / 2.0;
    // Edges 0-1 and 2-3 are "horizontal" in rect-local space (top/bottom);
    // edges 1-2 and 3-0 are "vertical" (left/right). Horizontal edges are
    // extended by half the line width, vertical edges are shortened by the
    // same amount, so the four thick segments tile the outline exactly.
    let extended = [(corners[0], corners[1]), (corners[3], corners[2])];
    let shortened = [(corners[1], corners[2]), (corners[0], corners[3])];

    if color.a == 255 {
        for (a, b) in extended.iter().chain(shortened.iter()) {
            thick_segment(surface, stencil, *a, *b, hw, color, op, global_alpha, true);
        }
        return;
    }

    let mut painted = std::collections::HashSet::new();
    for (a, b) in shortened {
        paint_thick_segment_dedup(surface, stencil, a, b, hw, color, op, global_alpha, &mut painted, false);
    }
    for (a, b) in extended {
        paint_thick_segment_dedup(surface, stencil, a, b, hw, color, op, global_alpha, &mut painted, true);
    }
}

#[allow(clippy::too_many_arguments, reason = "device-space thick-segment rasterizer mirrors the stroke's own parameter set")]
fn thick_segment(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    a: Point,
    b: Point,
    half_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
    extend_by_half_width: bool,
) {
    let dir = Point::new(b.x - a.x, b.y - a.y);
    let len = dir.hypot();
    if len < 1e-9 {
        return;
    }
    let unit = Point::new(dir.x / len, dir.y / len);
    let normal = Point::new(-unit.y, unit.x);
    let ext = if extend_by_half_width { half_width } else { 0.0 };
    let a2 = Point::new(a.x - unit.x * ext, a.y - unit.y * ext);
    let b2 = Point::new(b.x + unit.x * ext, b.y + unit.y * ext);
    let corners = [
        Point::new(a2.x + normal.x * half_width, a2.y + normal.y * half_width),
        Point::new(b2.x + normal.x * half_width, b2.y + normal.y * half_width),
        Point::new(b2.x - normal.x * half_width, b2.y - normal.y * half_width),
        Point::new(a2.x - normal.x * half_width, a2.y - normal.y * half_width),
    ];
    let center = Point::new(
        (corners[0].x + corners[1].x + corners[2].x + corners[3].x) / 4.0,
        (corners[0].y + corners[1].y + corners[2].y + corners[3].y) / 4.0,
    );
    let planes: Vec<HalfPlane> = (0..4)
        .map(|i| HalfPlane::through_edge(corners[i], corners[(i + 1) % 4], center))
        .collect();
    let bbox = Rect::bounding_box(&corners);
    let x0 = bbox.left().floor().max(0.0) as i32;
    let y0 = bbox.top().floor().max(0.0) as i32;
    let x1 = (bbox.right().ceil() as i32).min(surface.width() as i32);
    let y1 = (bbox.bottom().ceil() as i32).min(surface.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if planes.iter().all(|pl| pl.value(p) >= 0.0) {
                composite_set(surface, stencil, x, y, color, op, global_alpha);
            }
        }
    }
}

#[allow(clippy::too_many_arguments, reason = "device-space thick-segment rasterizer mirrors the stroke's own parameter set")]
fn paint_thick_segment_dedup(
    surface: &mut Surface,
    stencil: Option<&StencilBuffer>,
    a: Point,
    b: Point,
    half_width: f64,
    color: Color,
    op: CompositeOperator,
    global_alpha: f32,
    painted: &mut std::collections::HashSet<(i32, i32)>,
    extend_by_half_width: bool,
) {
    let dir = Point::new(b.x - a.x, b.y - a.y);
    let len = dir.hypot();
    if len < 1e-9 {
        return;
    }
    let unit = Point::new(dir.x / len, dir.y / len);
    let normal = Point::new(-unit.y, unit.x);
    let ext = if extend_by_half_width { half_width } else { 0.0 };
    let a2 = Point::new(a.x - unit.x * ext, a.y - unit.y * ext);
    let b2 = Point::new(b.x + unit.x * ext, b.y + unit.y * ext);
    let corners = [
        Point::new(a2.x + normal.x * half_width, a2.y + normal.y * half_width),
        Point::new(b2.x + normal.x * half_width, b2.y + normal.y * half_width),
        Point::new(b2.x - normal.x * half_width, b2.y - normal.y * half_width),
        Point::new(a2.x - normal.x * half_width, a2.y - normal.y * half_width),
    ];
    let center = Point::new(
        (corners[0].x + corners[1].x + corners[2].x + corners[3].x) / 4.0,
        (corners[0].y + corners[1].y + corners[2].y + corners[3].y) / 4.0,
    );
    let planes: Vec<HalfPlane> = (0..4)
        .map(|i| HalfPlane::through_edge(corners[i], corners[(i + 1) % 4], center))
        .collect();
    let bbox = Rect::bounding_box(&corners);
    let x0 = bbox.left().floor().max(0.0) as i32;
    let y0 = bbox.top().floor().max(0.0) as i32;
    let x1 = (bbox.right().ceil() as i32).min(surface.width() as i32);
    let y1 = (bbox.bottom().ceil() as i32).min(surface.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            if painted.contains(&(x, y)) {
                continue;
            }
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if planes.iter().all(|pl| pl.value(p) >= 0.0) {
                composite_set(surface, stencil, x, y, color, op, global_alpha);
                painted.insert((x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn axis_aligned_fill_writes_exact_region() {
        let mut s = Surface::new(10, 10).unwrap();
        fill_axis_aligned(
            &mut s,
            None,
            Rect::new(2.0, 2.0, 4.0, 4.0),
            Color::new(1, 2, 3, 255),
            CompositeOperator::SrcOver,
            1.0,
        );
        assert_eq!(s.get_pixel(3, 3), Color::new(1, 2, 3, 255));
        assert_eq!(s.get_pixel(7, 7), Color::TRANSPARENT);
    }

    #[test]
    fn rotated_fill_qualifies_center_pixel() {
        let mut s = Surface::new(20, 20).unwrap();
        let transform = Transform::IDENTITY.translate(10.0, 10.0).rotate(0.3);
        fill_rotated(
            &mut s,
            None,
            Rect::new(-4.0, -4.0, 8.0, 8.0),
            transform,
            Color::new(5, 5, 5, 255),
            CompositeOperator::SrcOver,
            1.0,
        );
        assert_eq!(s.get_pixel(10, 10), Color::new(5, 5, 5, 255));
    }
}
