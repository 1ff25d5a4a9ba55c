// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point, rectangle and affine transform value types.

/// An immutable 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).hypot()
    }

    /// Vector length as if this point were an offset from the origin.
    #[must_use]
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl core::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// An immutable axis-aligned rectangle with non-negative extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width; always `>= 0`.
    pub width: f64,
    /// Height; always `>= 0`.
    pub height: f64,
}

impl Rect {
    /// Construct a rectangle, normalizing negative width/height by flipping
    /// the origin so extents are always non-negative.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self { x, y, width, height }
    }

    /// Left edge.
    #[must_use]
    pub fn left(self) -> f64 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub fn top(self) -> f64 {
        self.y
    }

    /// Right edge.
    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle has zero area.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether `p` lies within this rectangle (inclusive of edges).
    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Intersection of two rectangles; empty if they do not overlap.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            Self::new(x0, y0, 0.0, 0.0)
        } else {
            Self::new(x0, y0, x1 - x0, y1 - y0)
        }
    }

    /// Smallest rectangle containing both inputs.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Bounding box of a set of points; empty rect at origin if `points` is
    /// empty.
    #[must_use]
    pub fn bounding_box(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        };
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// A 2x3 affine transform `(a, b, c, d, e, f)`:
///
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal scale.
    pub a: f64,
    /// Horizontal skew.
    pub b: f64,
    /// Vertical skew.
    pub c: f64,
    /// Vertical scale.
    pub d: f64,
    /// Horizontal translation.
    pub e: f64,
    /// Vertical translation.
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Construct a transform from its six coefficients.
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// A pure (possibly non-uniform) scale.
    #[must_use]
    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// A pure rotation by `radians`.
    #[must_use]
    pub fn from_rotate(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Compose `self` followed by `other` (`other * self` in matrix terms):
    /// a point is first transformed by `self`, then by `other`. This matches
    /// Canvas 2D's `transform()` which post-multiplies the current matrix.
    #[must_use]
    pub fn then(self, other: Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Post-multiply by a translation.
    #[must_use]
    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.then(Self::from_translate(tx, ty))
    }

    /// Post-multiply by a scale.
    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        self.then(Self::from_scale(sx, sy))
    }

    /// Post-multiply by a rotation (radians).
    #[must_use]
    pub fn rotate(self, radians: f64) -> Self {
        self.then(Self::from_rotate(radians))
    }

    /// Determinant of the linear part.
    #[must_use]
    pub fn determinant(self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Invert this transform. Returns `None` if the determinant is zero
    /// (callers must treat a non-invertible transform as "paint transparent").
    #[must_use]
    pub fn invert(self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.d * inv_det;
        let b = -self.b * inv_det;
        let c = -self.c * inv_det;
        let d = self.a * inv_det;
        let e = -(self.e * a + self.f * c);
        let f = -(self.e * b + self.f * d);
        Some(Self { a, b, c, d, e, f })
    }

    /// Apply this transform to a point.
    #[must_use]
    pub fn transform_point(self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    /// Apply only the linear (non-translating) part to a vector.
    #[must_use]
    pub fn transform_vector(self, v: Point) -> Point {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// Whether this transform is axis-aligned (no rotation or skew): `b` and
    /// `c` are both (near) zero.
    #[must_use]
    pub fn is_axis_aligned(self) -> bool {
        self.b.abs() < 1e-10 && self.c.abs() < 1e-10
    }

    /// Whether this transform is a pure rotation + translation + uniform
    /// scale (no skew, and equal scale on both axes): preserves right angles.
    #[must_use]
    pub fn is_rigid_or_uniform_scale(self) -> bool {
        let sx2 = self.a * self.a + self.b * self.b;
        let sy2 = self.c * self.c + self.d * self.d;
        let orthogonal = (self.a * self.c + self.b * self.d).abs() < 1e-9;
        orthogonal && (sx2 - sy2).abs() < 1e-6 * sx2.max(sy2).max(1.0)
    }

    /// Whether all six coefficients are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.e.is_finite()
            && self.f.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_normalizes_negative_extents() {
        let r = Rect::new(10.0, 10.0, -5.0, -5.0);
        assert_eq!(r.x, 5.0);
        assert_eq!(r.y, 5.0);
        assert_eq!(r.width, 5.0);
        assert_eq!(r.height, 5.0);
    }

    #[test]
    fn rect_intersect_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert!(a.intersect(b).is_empty());
    }

    #[test]
    fn transform_invert_roundtrips() {
        let t = Transform::IDENTITY.translate(10.0, 5.0).rotate(0.3).scale(2.0, 3.0);
        let inv = t.invert().expect("invertible");
        let p = Point::new(7.0, -3.0);
        let roundtrip = inv.transform_point(t.transform_point(p));
        assert!((roundtrip.x - p.x).abs() < 1e-9);
        assert!((roundtrip.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let t = Transform::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.0);
        assert!(t.invert().is_none());
    }

    #[test]
    fn axis_aligned_detects_rotation() {
        assert!(Transform::IDENTITY.is_axis_aligned());
        assert!(!Transform::IDENTITY.rotate(0.1).is_axis_aligned());
    }
}
