// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke-to-fill expansion: turns a stroked polyline into a set of
//! same-winding fill polygons (segment quads, join wedges, end caps) that
//! the nonzero scan converter unions seamlessly.

use crate::flatten::Polygon;
use crate::geom::Point;
use crate::state::{LineCap, LineDash, LineJoin};

const ROUND_JOIN_STEPS: u32 = 8;
const ROUND_CAP_STEPS: u32 = 8;

/// Expand one flattened sub-path into the fill polygons that render its
/// stroke. `closed` indicates whether the sub-path was explicitly closed;
/// closed sub-paths get joins (not caps) at the wrap-around vertex, open
/// ones get caps at both ends.
#[must_use]
pub fn stroke_polyline(
    points: &[Point],
    closed: bool,
    line_width: f64,
    join: LineJoin,
    cap: LineCap,
    miter_limit: f64,
) -> Vec<Polygon> {
    let half_width = line_width / 2.0;
    let mut polys = Vec::new();
    let n = points.len();
    if n < 2 || half_width <= 0.0 {
        return polys;
    }

    let segment_count = if closed { n } else { n - 1 };
    for i in 0..segment_count {
        let a = points[i];
        let b = points[(i + 1) % n];
        if (b - a).hypot() < 1e-12 {
            continue;
        }
        polys.push(segment_quad(a, b, half_width));
    }

    let joint_indices: Vec<usize> = if closed { (0..n).collect() } else { (1..n - 1).collect() };
    for idx in joint_indices {
        let prev = points[(idx + n - 1) % n];
        let cur = points[idx];
        let next = points[(idx + 1) % n];
        polys.extend(join_polygons(prev, cur, next, half_width, join, miter_limit));
    }

    if !closed {
        if let Some(p) = cap_polygon(points[1], points[0], half_width, cap) {
            polys.push(p);
        }
        if let Some(p) = cap_polygon(points[n - 2], points[n - 1], half_width, cap) {
            polys.push(p);
        }
    }

    polys
}

/// Split a polyline into "on" segments under a dash pattern, walked from
/// `offset` along the path's arc length. An empty effective pattern leaves
/// the line solid (single segment, same `closed`-ness as the input).
#[must_use]
pub fn apply_dash(points: &[Point], closed: bool, dash: &LineDash) -> Vec<(Vec<Point>, bool)> {
    let pattern = dash.effective_pattern();
    if pattern.is_empty() || points.len() < 2 {
        return vec![(points.to_vec(), closed)];
    }
    let total: f64 = pattern.iter().sum();
    if total <= 0.0 {
        return vec![(points.to_vec(), closed)];
    }

    let ring: Vec<Point> = if closed {
        let mut v = points.to_vec();
        v.push(points[0]);
        v
    } else {
        points.to_vec()
    };

    let mut dash_idx = 0usize;
    let mut remaining_in_dash = pattern[0];
    let mut pos = dash.offset.rem_euclid(total);
    // advance the virtual cursor to `pos` within the pattern cycle.
    while pos > 0.0 {
        if pos < remaining_in_dash {
            remaining_in_dash -= pos;
            break;
        }
        pos -= remaining_in_dash;
        dash_idx = (dash_idx + 1) % pattern.len();
        remaining_in_dash = pattern[dash_idx];
    }
    let mut on = dash_idx % 2 == 0;

    let mut segments = Vec::new();
    let mut current: Vec<Point> = if on { vec![ring[0]] } else { Vec::new() };

    for w in ring.windows(2) {
        let mut a = w[0];
        let b = w[1];
        let mut seg_len = (b - a).hypot();
        while seg_len > 0.0 {
            let step = remaining_in_dash.min(seg_len);
            let t = step / seg_len;
            let next = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            if on {
                if current.is_empty() {
                    current.push(a);
                }
                current.push(next);
            }
            seg_len -= step;
            remaining_in_dash -= step;
            a = next;
            if remaining_in_dash <= 1e-9 {
                if on && current.len() >= 2 {
                    segments.push((core::mem::take(&mut current), false));
                }
                current.clear();
                dash_idx = (dash_idx + 1) % pattern.len();
                remaining_in_dash = pattern[dash_idx];
                on = !on;
                if on {
                    current.push(a);
                }
            }
        }
    }
    if on && current.len() >= 2 {
        segments.push((current, false));
    }
    segments
}

fn unit(v: Point) -> Point {
    let len = v.hypot();
    if len < 1e-12 { Point::new(0.0, 0.0) } else { Point::new(v.x / len, v.y / len) }
}

fn perp(t: Point) -> Point {
    Point::new(-t.y, t.x)
}

fn segment_quad(a: Point, b: Point, half_width: f64) -> Polygon {
    let t = unit(b - a);
    let offset = perp(t) * half_width;
    Polygon { points: vec![a + offset, b + offset, b - offset, a - offset], closed: true }
}

fn join_polygons(
    prev: Point,
    cur: Point,
    next: Point,
    half_width: f64,
    join: LineJoin,
    miter_limit: f64,
) -> Vec<Polygon> {
    let in_t = unit(cur - prev);
    let out_t = unit(next - cur);
    if in_t.hypot() < 1e-9 || out_t.hypot() < 1e-9 {
        return Vec::new();
    }
    let cross = in_t.x * out_t.y - in_t.y * out_t.x;
    if cross.abs() < 1e-9 {
        return Vec::new();
    }

    let mut polys = Vec::new();
    for sign in [1.0, -1.0] {
        let n1 = perp(in_t) * (half_width * sign);
        let n2 = perp(out_t) * (half_width * sign);
        let p1 = cur + n1;
        let p2 = cur + n2;
        match join {
            LineJoin::Bevel => polys.push(Polygon { points: vec![cur, p1, p2], closed: true }),
            LineJoin::Round => polys.push(round_fan(cur, p1, p2, half_width)),
            LineJoin::Miter => {
                let miter_poly = line_intersect(p1, in_t, p2, out_t).and_then(|apex| {
                    let miter_len = (apex - cur).hypot();
                    (miter_len <= miter_limit * half_width)
                        .then_some(Polygon { points: vec![cur, p1, apex, p2], closed: true })
                });
                polys.push(
                    miter_poly.unwrap_or(Polygon { points: vec![cur, p1, p2], closed: true }),
                );
            }
        }
    }
    polys
}

fn line_intersect(p1: Point, d1: Point, p2: Point, d2: Point) -> Option<Point> {
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let diff = p2 - p1;
    let t = (diff.x * d2.y - diff.y * d2.x) / denom;
    Some(p1 + d1 * t)
}

fn round_fan(center: Point, p1: Point, p2: Point, radius: f64) -> Polygon {
    let a0 = (p1.y - center.y).atan2(p1.x - center.x);
    let mut a1 = (p2.y - center.y).atan2(p2.x - center.x);
    let mut diff = a1 - a0;
    while diff > core::f64::consts::PI {
        diff -= core::f64::consts::TAU;
    }
    while diff < -core::f64::consts::PI {
        diff += core::f64::consts::TAU;
    }
    a1 = a0 + diff;
    let mut pts = vec![center];
    for i in 0..=ROUND_JOIN_STEPS {
        let t = a0 + (a1 - a0) * (f64::from(i) / f64::from(ROUND_JOIN_STEPS));
        pts.push(Point::new(center.x + radius * t.cos(), center.y + radius * t.sin()));
    }
    Polygon { points: pts, closed: true }
}

fn cap_polygon(prev: Point, endpoint: Point, half_width: f64, cap: LineCap) -> Option<Polygon> {
    let t = unit(endpoint - prev);
    if t.hypot() < 1e-9 {
        return None;
    }
    let n = perp(t) * half_width;
    match cap {
        LineCap::Butt => None,
        LineCap::Square => {
            let ext = t * half_width;
            Some(Polygon {
                points: vec![endpoint + n, endpoint + n + ext, endpoint - n + ext, endpoint - n],
                closed: true,
            })
        }
        LineCap::Round => {
            let a0 = n.y.atan2(n.x);
            let cross = n.x * t.y - n.y * t.x;
            let delta = if cross > 0.0 { -core::f64::consts::PI } else { core::f64::consts::PI };
            let mut pts = vec![endpoint + n];
            for i in 1..=ROUND_CAP_STEPS {
                let a = a0 + delta * (f64::from(i) / f64::from(ROUND_CAP_STEPS));
                pts.push(Point::new(
                    endpoint.x + half_width * a.cos(),
                    endpoint.y + half_width * a.sin(),
                ));
            }
            Some(Polygon { points: pts, closed: true })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_segment_has_one_quad_no_joins() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let polys = stroke_polyline(&pts, false, 4.0, LineJoin::Miter, LineCap::Butt, 10.0);
        assert_eq!(polys.len(), 1);
    }

    #[test]
    fn zero_width_produces_nothing() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let polys = stroke_polyline(&pts, false, 0.0, LineJoin::Miter, LineCap::Butt, 10.0);
        assert!(polys.is_empty());
    }

    #[test]
    fn square_cap_extends_past_endpoint() {
        let prev = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);
        let cap = cap_polygon(prev, end, 2.0, LineCap::Square).unwrap();
        assert!(cap.points.iter().any(|p| p.x > 10.0));
    }

    #[test]
    fn butt_cap_is_none() {
        let prev = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);
        assert!(cap_polygon(prev, end, 2.0, LineCap::Butt).is_none());
    }

    #[test]
    fn even_dash_pattern_alternates_on_off() {
        let pts = [Point::new(0.0, 0.0), Point::new(20.0, 0.0)];
        let dash = LineDash { pattern: vec![5.0, 5.0], offset: 0.0 };
        let segments = apply_dash(&pts, false, &dash);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn no_dash_pattern_keeps_line_solid() {
        let pts = [Point::new(0.0, 0.0), Point::new(20.0, 0.0)];
        let dash = LineDash::default();
        let segments = apply_dash(&pts, false, &dash);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].0.len(), 2);
    }
}
