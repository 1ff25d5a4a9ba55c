// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-space path construction: an append-only sequence of drawing commands.

use crate::geom::Point;

/// A single primitive path command, in user-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Begin a new sub-path at `(x, y)`.
    MoveTo(f64, f64),
    /// A straight line to `(x, y)`.
    LineTo(f64, f64),
    /// A quadratic Bézier with control point `(cx, cy)` to `(x, y)`.
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    /// A cubic Bézier with control points `(c1x, c1y)`, `(c2x, c2y)` to
    /// `(x, y)`.
    CubicTo { c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64 },
    /// A circular arc of radius `r` centered at `(cx, cy)` spanning angles
    /// `a0` to `a1` (radians), in the direction given by `ccw`.
    Arc { cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool },
    /// An elliptical arc centered at `(cx, cy)` with radii `rx`/`ry`, rotated
    /// by `rotation` radians, spanning angles `a0` to `a1`, direction `ccw`.
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64, a0: f64, a1: f64, ccw: bool },
    /// An axis-aligned rectangle, expands to 4 lines + close.
    Rect { x: f64, y: f64, w: f64, h: f64 },
    /// Close the current sub-path back to its starting point.
    ClosePath,
}

/// An append-only, ordered sequence of path commands in user coordinates.
/// Device coordinates are derived later, at rasterization time, by the
/// flattener.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
    current: Point,
    start: Point,
    has_current: bool,
}

impl Path {
    /// An empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this path contains no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The raw command list.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// The current point, if any sub-path has been started.
    #[must_use]
    pub fn current_point(&self) -> Option<Point> {
        self.has_current.then_some(self.current)
    }

    /// Begin a new sub-path at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.commands.push(PathCommand::MoveTo(x, y));
        self.current = Point::new(x, y);
        self.start = self.current;
        self.has_current = true;
    }

    /// A straight line from the current point to `(x, y)`. Implicitly starts
    /// a sub-path at the origin if none is open, per Canvas semantics.
    pub fn line_to(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        if !self.has_current {
            self.move_to(x, y);
            return;
        }
        self.commands.push(PathCommand::LineTo(x, y));
        self.current = Point::new(x, y);
    }

    /// A quadratic Bézier curve to `(x, y)` via control point `(cx, cy)`.
    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        if ![cx, cy, x, y].iter().all(|v| v.is_finite()) {
            return;
        }
        if !self.has_current {
            self.move_to(cx, cy);
        }
        self.commands.push(PathCommand::QuadTo { cx, cy, x, y });
        self.current = Point::new(x, y);
    }

    /// A cubic Bézier curve to `(x, y)` via control points `(c1x, c1y)` and
    /// `(c2x, c2y)`.
    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        if ![c1x, c1y, c2x, c2y, x, y].iter().all(|v| v.is_finite()) {
            return;
        }
        if !self.has_current {
            self.move_to(c1x, c1y);
        }
        self.commands.push(PathCommand::CubicTo { c1x, c1y, c2x, c2y, x, y });
        self.current = Point::new(x, y);
    }

    /// A circular arc. Negative radius is rejected (no-op), matching Canvas
    /// 2D's `IndexSizeError` behavior lowered to a silent reject per the
    /// error-handling policy.
    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        if r < 0.0 || ![cx, cy, r, a0, a1].iter().all(|v| v.is_finite()) {
            return;
        }
        let end = Point::new(cx + r * a1.cos(), cy + r * a1.sin());
        if !self.has_current {
            let start = Point::new(cx + r * a0.cos(), cy + r * a0.sin());
            self.move_to(start.x, start.y);
        }
        self.commands.push(PathCommand::Arc { cx, cy, r, a0, a1, ccw });
        self.current = end;
    }

    /// An elliptical arc.
    pub fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        a0: f64,
        a1: f64,
        ccw: bool,
    ) {
        if rx < 0.0 || ry < 0.0 || ![cx, cy, rx, ry, rotation, a0, a1].iter().all(|v| v.is_finite())
        {
            return;
        }
        let (s, c) = rotation.sin_cos();
        let local = Point::new(rx * a1.cos(), ry * a1.sin());
        let end = Point::new(cx + local.x * c - local.y * s, cy + local.x * s + local.y * c);
        if !self.has_current {
            let local0 = Point::new(rx * a0.cos(), ry * a0.sin());
            let start =
                Point::new(cx + local0.x * c - local0.y * s, cy + local0.x * s + local0.y * c);
            self.move_to(start.x, start.y);
        }
        self.commands.push(PathCommand::Ellipse { cx, cy, rx, ry, rotation, a0, a1, ccw });
        self.current = end;
    }

    /// An axis-aligned rectangle sub-path: expands to 4 lines + close.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if ![x, y, w, h].iter().all(|v| v.is_finite()) {
            return;
        }
        self.commands.push(PathCommand::Rect { x, y, w, h });
        self.current = Point::new(x, y);
        self.start = self.current;
        self.has_current = true;
    }

    /// Close the current sub-path.
    pub fn close_path(&mut self) {
        if !self.has_current {
            return;
        }
        self.commands.push(PathCommand::ClosePath);
        self.current = self.start;
    }

    /// An arc tangent to the two lines `(current -> (x1,y1))` and
    /// `((x1,y1) -> (x2,y2))`, with the given radius. Degenerates to a
    /// straight line to `(x1, y1)` when the segments are collinear or the
    /// radius is (near) zero, matching the Canvas `arcTo` contract.
    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        if radius < 0.0 || ![x1, y1, x2, y2, radius].iter().all(|v| v.is_finite()) {
            return;
        }
        let Some(p0) = self.current_point() else {
            self.move_to(x1, y1);
            return;
        };
        let p1 = Point::new(x1, y1);
        let p2 = Point::new(x2, y2);
        let v0 = p0 - p1;
        let v1 = p2 - p1;
        let len0 = v0.hypot();
        let len1 = v1.hypot();
        if len0 < 1e-12 || len1 < 1e-12 || radius < 1e-12 {
            self.line_to(x1, y1);
            return;
        }
        let cos_theta = ((v0.x * v1.x + v0.y * v1.y) / (len0 * len1)).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        if theta.abs() < 1e-9 || (core::f64::consts::PI - theta).abs() < 1e-9 {
            self.line_to(x1, y1);
            return;
        }
        let dist_to_tangent = radius / (theta / 2.0).tan();
        let t0 = (dist_to_tangent / len0).min(1.0);
        let t1 = (dist_to_tangent / len1).min(1.0);
        let tangent0 = p1 + v0 * t0;
        let tangent1 = p1 + v1 * t1;
        // Center lies along the bisector, at distance radius / sin(theta/2).
        let bisector = Point::new(v0.x / len0 + v1.x / len1, v0.y / len0 + v1.y / len1);
        let bisector_len = bisector.hypot();
        if bisector_len < 1e-12 {
            self.line_to(x1, y1);
            return;
        }
        let dist_to_center = radius / (theta / 2.0).sin();
        let center = p1 + bisector * (dist_to_center / bisector_len);
        let cross = v0.x * v1.y - v0.y * v1.x;
        let ccw = cross > 0.0;
        let a0 = (tangent0.y - center.y).atan2(tangent0.x - center.x);
        let a1 = (tangent1.y - center.y).atan2(tangent1.x - center.x);
        self.line_to(tangent0.x, tangent0.y);
        self.arc(center.x, center.y, radius, a0, a1, ccw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_command_is_recorded_verbatim() {
        let mut p = Path::new();
        p.rect(1.0, 2.0, 3.0, 4.0);
        assert_eq!(p.commands(), &[PathCommand::Rect { x: 1.0, y: 2.0, w: 3.0, h: 4.0 }]);
    }

    #[test]
    fn negative_radius_arc_is_rejected() {
        let mut p = Path::new();
        p.arc(0.0, 0.0, -1.0, 0.0, 1.0, false);
        assert!(p.is_empty());
    }

    #[test]
    fn arc_to_degenerates_to_line_when_collinear() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.arc_to(10.0, 0.0, 20.0, 0.0, 5.0);
        assert!(matches!(p.commands()[1], PathCommand::LineTo(10.0, 0.0)));
    }

    #[test]
    fn line_to_without_move_implicitly_starts_subpath() {
        let mut p = Path::new();
        p.line_to(5.0, 5.0);
        assert_eq!(p.commands(), &[PathCommand::MoveTo(5.0, 5.0)]);
    }
}
