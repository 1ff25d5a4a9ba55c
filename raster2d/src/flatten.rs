// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Converts a [`Path`] into device-space polygons consumable by the scan
//! converter: Béziers are adaptively subdivided, arcs are sampled by arc
//! length, and each vertex is transformed in a single pass.

use crate::geom::{Point, Transform};
use crate::path::{Path, PathCommand};

/// Flatness tolerance for adaptive Bézier subdivision, in device pixels at
/// 1x scale.
const FLATNESS_TOLERANCE: f64 = 0.25;
/// Maximum de Casteljau subdivision depth, guaranteeing termination on
/// pathological control polygons.
const MAX_SUBDIVISION_DEPTH: u32 = 20;
/// Minimum number of samples for any arc/ellipse segment, regardless of
/// radius.
const MIN_ARC_STEPS: u32 = 4;
/// Tangential step length (device pixels) targeted by adaptive arc
/// sampling.
const ARC_STEP_PX: f64 = 1.0;

/// A closed or open ring of device-space points produced by flattening one
/// sub-path.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Device-space vertices, in order.
    pub points: Vec<Point>,
    /// Whether the sub-path was explicitly closed with `ClosePath` (or is a
    /// `Rect`, which is always closed).
    pub closed: bool,
}

/// Flatten `path` under `transform`, producing one polygon per sub-path.
/// Each vertex is the user-space point mapped through `transform`.
#[must_use]
pub fn flatten_path(path: &Path, transform: Transform) -> Vec<Polygon> {
    let mut polygons = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut closed = false;
    let mut cursor_user = Point::new(0.0, 0.0);
    let mut subpath_start_user = Point::new(0.0, 0.0);

    let finish = |polygons: &mut Vec<Polygon>, current: &mut Vec<Point>, closed: &mut bool| {
        if current.len() >= 2 {
            polygons.push(Polygon { points: core::mem::take(current), closed: *closed });
        } else {
            current.clear();
        }
        *closed = false;
    };

    for cmd in path.commands() {
        match *cmd {
            PathCommand::MoveTo(x, y) => {
                finish(&mut polygons, &mut current, &mut closed);
                cursor_user = Point::new(x, y);
                subpath_start_user = cursor_user;
                current.push(transform.transform_point(cursor_user));
            }
            PathCommand::LineTo(x, y) => {
                cursor_user = Point::new(x, y);
                current.push(transform.transform_point(cursor_user));
            }
            PathCommand::QuadTo { cx, cy, x, y } => {
                let p0 = cursor_user;
                let p1 = Point::new(cx, cy);
                let p2 = Point::new(x, y);
                flatten_quad(p0, p1, p2, transform, &mut current, 0);
                cursor_user = p2;
            }
            PathCommand::CubicTo { c1x, c1y, c2x, c2y, x, y } => {
                let p0 = cursor_user;
                let p1 = Point::new(c1x, c1y);
                let p2 = Point::new(c2x, c2y);
                let p3 = Point::new(x, y);
                flatten_cubic(p0, p1, p2, p3, transform, &mut current, 0);
                cursor_user = p3;
            }
            PathCommand::Arc { cx, cy, r, a0, a1, ccw } => {
                flatten_arc(cx, cy, r, r, 0.0, a0, a1, ccw, transform, &mut current);
                cursor_user = Point::new(cx + r * a1.cos(), cy + r * a1.sin());
            }
            PathCommand::Ellipse { cx, cy, rx, ry, rotation, a0, a1, ccw } => {
                flatten_arc(cx, cy, rx, ry, rotation, a0, a1, ccw, transform, &mut current);
                let (s, c) = rotation.sin_cos();
                let local = Point::new(rx * a1.cos(), ry * a1.sin());
                cursor_user =
                    Point::new(cx + local.x * c - local.y * s, cy + local.x * s + local.y * c);
            }
            PathCommand::Rect { x, y, w, h } => {
                finish(&mut polygons, &mut current, &mut closed);
                let corners = [
                    Point::new(x, y),
                    Point::new(x + w, y),
                    Point::new(x + w, y + h),
                    Point::new(x, y + h),
                ];
                current = corners.iter().map(|p| transform.transform_point(*p)).collect();
                closed = true;
                finish(&mut polygons, &mut current, &mut closed);
                cursor_user = Point::new(x, y);
                subpath_start_user = cursor_user;
                continue;
            }
            PathCommand::ClosePath => {
                closed = true;
                cursor_user = subpath_start_user;
            }
        }
    }
    finish(&mut polygons, &mut current, &mut closed);
    polygons
}

/// Flatten for **filling**: open sub-paths are treated as implicitly closed
/// (a virtual line back to the sub-path's start).
#[must_use]
pub fn flatten_path_for_fill(path: &Path, transform: Transform) -> Vec<Polygon> {
    flatten_path(path, transform)
        .into_iter()
        .map(|mut p| {
            p.closed = true;
            p
        })
        .collect()
}

fn flatten_quad(
    p0: Point,
    p1: Point,
    p2: Point,
    transform: Transform,
    out: &mut Vec<Point>,
    depth: u32,
) {
    if depth >= MAX_SUBDIVISION_DEPTH || quad_is_flat(p0, p1, p2) {
        out.push(transform.transform_point(p2));
        return;
    }
    let p01 = midpoint(p0, p1);
    let p12 = midpoint(p1, p2);
    let p012 = midpoint(p01, p12);
    flatten_quad(p0, p01, p012, transform, out, depth + 1);
    flatten_quad(p012, p12, p2, transform, out, depth + 1);
}

fn flatten_cubic(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    transform: Transform,
    out: &mut Vec<Point>,
    depth: u32,
) {
    if depth >= MAX_SUBDIVISION_DEPTH || cubic_is_flat(p0, p1, p2, p3) {
        out.push(transform.transform_point(p3));
        return;
    }
    let p01 = midpoint(p0, p1);
    let p12 = midpoint(p1, p2);
    let p23 = midpoint(p2, p3);
    let p012 = midpoint(p01, p12);
    let p123 = midpoint(p12, p23);
    let p0123 = midpoint(p012, p123);
    flatten_cubic(p0, p01, p012, p0123, transform, out, depth + 1);
    flatten_cubic(p0123, p123, p23, p3, transform, out, depth + 1);
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

fn quad_is_flat(p0: Point, p1: Point, p2: Point) -> bool {
    perpendicular_distance(p1, p0, p2) <= FLATNESS_TOLERANCE
}

fn cubic_is_flat(p0: Point, p1: Point, p2: Point, p3: Point) -> bool {
    perpendicular_distance(p1, p0, p3) <= FLATNESS_TOLERANCE
        && perpendicular_distance(p2, p0, p3) <= FLATNESS_TOLERANCE
}

/// Perpendicular distance from `p` to the line through `a`-`b`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let d = b - a;
    let len = d.hypot();
    if len < 1e-12 {
        return (p - a).hypot();
    }
    ((p.x - a.x) * d.y - (p.y - a.y) * d.x).abs() / len
}

#[allow(clippy::too_many_arguments, reason = "arc parameters mirror the path command fields")]
fn flatten_arc(
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    rotation: f64,
    a0: f64,
    a1: f64,
    ccw: bool,
    transform: Transform,
    out: &mut Vec<Point>,
) {
    let mut sweep = a1 - a0;
    if ccw {
        while sweep > 0.0 {
            sweep -= core::f64::consts::TAU;
        }
    } else {
        while sweep < 0.0 {
            sweep += core::f64::consts::TAU;
        }
    }
    let r = rx.max(ry).max(1e-6);
    let steps = ((r * sweep.abs() / ARC_STEP_PX).ceil() as u32).max(MIN_ARC_STEPS);
    let (s, c) = rotation.sin_cos();
    for i in 1..=steps {
        let t = a0 + sweep * (i as f64 / steps as f64);
        let local = Point::new(rx * t.cos(), ry * t.sin());
        let p = Point::new(cx + local.x * c - local.y * s, cy + local.x * s + local.y * c);
        out.push(transform.transform_point(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_path_flattens_to_its_own_points() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        let polys = flatten_path(&p, Transform::IDENTITY);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].points.len(), 3);
    }

    #[test]
    fn rect_produces_closed_four_point_polygon() {
        let mut p = Path::new();
        p.rect(0.0, 0.0, 10.0, 5.0);
        let polys = flatten_path(&p, Transform::IDENTITY);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].points.len(), 4);
        assert!(polys[0].closed);
    }

    #[test]
    fn quad_bezier_subdivides_into_multiple_segments() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.quad_to(50.0, 100.0, 100.0, 0.0);
        let polys = flatten_path(&p, Transform::IDENTITY);
        assert!(polys[0].points.len() > 2);
    }

    #[test]
    fn full_circle_arc_samples_many_points() {
        let mut p = Path::new();
        p.arc(0.0, 0.0, 50.0, 0.0, core::f64::consts::TAU, false);
        let polys = flatten_path(&p, Transform::IDENTITY);
        assert!(polys[0].points.len() > 30);
    }

    #[test]
    fn open_subpath_fill_variant_is_marked_closed() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        let polys = flatten_path_for_fill(&p, Transform::IDENTITY);
        assert!(polys[0].closed);
    }
}
