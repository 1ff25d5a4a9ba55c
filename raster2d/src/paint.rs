// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint sources: solid colors, gradients, and tiled image patterns, each
//! sampled per device pixel.

use crate::color::Color;
use crate::geom::{Point, Transform};

const GRADIENT_LUT_SIZE: usize = 256;

/// One color stop in a gradient, `offset` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, clamped to `[0, 1]`.
    pub offset: f32,
    /// The stop's color.
    pub color: Color,
}

/// A precomputed gradient color ramp: stops are resolved once into a small
/// lookup table keyed by offset, avoiding a stop-search per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStops {
    stops: Vec<GradientStop>,
    lut: [Color; GRADIENT_LUT_SIZE],
}

impl GradientStops {
    /// Build a ramp from an unordered stop list. Stops are sorted by offset
    /// and clamped into `[0, 1]`. An empty stop list produces fully
    /// transparent output everywhere.
    #[must_use]
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        for s in &mut stops {
            s.offset = s.offset.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        let mut lut = [Color::TRANSPARENT; GRADIENT_LUT_SIZE];
        for (i, slot) in lut.iter_mut().enumerate() {
            let t = i as f32 / (GRADIENT_LUT_SIZE - 1) as f32;
            *slot = sample_stops(&stops, t);
        }
        Self { stops, lut }
    }

    /// Sample the precomputed ramp at `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn sample(&self, t: f32) -> Color {
        if self.stops.is_empty() {
            return Color::TRANSPARENT;
        }
        let t = t.clamp(0.0, 1.0);
        let idx = (t * (GRADIENT_LUT_SIZE - 1) as f32).round() as usize;
        self.lut[idx.min(GRADIENT_LUT_SIZE - 1)]
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Color {
    if stops.is_empty() {
        return Color::TRANSPARENT;
    }
    if t <= stops[0].offset {
        return stops[0].color;
    }
    let last = stops.len() - 1;
    if t >= stops[last].offset {
        return stops[last].color;
    }
    for w in stops.windows(2) {
        let (a, b) = (w[0], w[1]);
        if t >= a.offset && t <= b.offset {
            let span = b.offset - a.offset;
            let local_t = if span > 0.0 { (t - a.offset) / span } else { 0.0 };
            return a.color.lerp(b.color, local_t);
        }
    }
    stops[last].color
}

/// Repetition mode for an image [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Tile in both axes.
    Repeat,
    /// Tile horizontally only; vertical out-of-range is transparent.
    RepeatX,
    /// Tile vertically only; horizontal out-of-range is transparent.
    RepeatY,
    /// No tiling; any out-of-range sample is transparent.
    NoRepeat,
}

/// A simple in-memory straight-RGBA8 image buffer backing a [`Pattern`].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Image {
    /// Construct an image from a row-major straight-RGBA8 pixel buffer.
    /// Returns `None` if `pixels.len() != width * height` or either
    /// dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbor sample at integer pixel coordinates. Out-of-bounds
    /// returns `None`.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.pixels[(y as u32 * self.width + x as u32) as usize])
    }
}

/// A tiled image paint source, with its own local transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    image: Image,
    repetition: Repetition,
    transform: Transform,
}

impl Pattern {
    /// Construct a pattern from an image and repetition mode, with the
    /// identity local transform.
    #[must_use]
    pub fn new(image: Image, repetition: Repetition) -> Self {
        Self { image, repetition, transform: Transform::IDENTITY }
    }

    /// Replace the pattern's local transform (mirrors the Canvas
    /// `DOMMatrix`-settable pattern transform).
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Sample at local (pattern-space) coordinates, applying repetition.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> Color {
        let w = self.image.width() as i64;
        let h = self.image.height() as i64;
        let px = x.floor() as i64;
        let py = y.floor() as i64;
        let tile_x = match self.repetition {
            Repetition::Repeat | Repetition::RepeatX => px.rem_euclid(w),
            Repetition::RepeatY | Repetition::NoRepeat => {
                if px < 0 || px >= w {
                    return Color::TRANSPARENT;
                }
                px
            }
        };
        let tile_y = match self.repetition {
            Repetition::Repeat | Repetition::RepeatY => py.rem_euclid(h),
            Repetition::RepeatX | Repetition::NoRepeat => {
                if py < 0 || py >= h {
                    return Color::TRANSPARENT;
                }
                py
            }
        };
        self.image.get(tile_x as i32, tile_y as i32).unwrap_or(Color::TRANSPARENT)
    }
}

/// A paint source: anything that, per device pixel, yields a straight RGBA
/// color. Treated as infinite in the paint's own coordinate frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintSource {
    /// A single uniform color.
    SolidColor(Color),
    /// A gradient along the segment from `(x0, y0)` to `(x1, y1)`.
    LinearGradient { x0: f64, y0: f64, x1: f64, y1: f64, stops: GradientStops },
    /// A gradient between two circles (the "pencil" of circles).
    RadialGradient {
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
        stops: GradientStops,
    },
    /// A gradient sweeping around `(cx, cy)` starting at angle `start_angle`.
    ConicGradient { cx: f64, cy: f64, start_angle: f64, stops: GradientStops },
    /// A tiled image pattern.
    Pattern(Pattern),
}

impl PaintSource {
    /// Sample the paint source at device pixel center `(dev_x, dev_y)`,
    /// given the transform in effect when the paint was set (used to map
    /// device coordinates back into the paint's own local space). Returns
    /// straight RGBA; non-invertible transforms yield transparent.
    #[must_use]
    pub fn sample(&self, dev_x: f64, dev_y: f64, current_transform: Transform) -> Color {
        match self {
            Self::SolidColor(c) => *c,
            Self::LinearGradient { x0, y0, x1, y1, stops } => {
                let Some(local) = local_point(dev_x, dev_y, current_transform) else {
                    return Color::TRANSPARENT;
                };
                let axis = Point::new(x1 - x0, y1 - y0);
                let len2 = axis.x * axis.x + axis.y * axis.y;
                if len2 <= 1e-12 {
                    return Color::TRANSPARENT;
                }
                let rel = local - Point::new(*x0, *y0);
                let t = ((rel.x * axis.x + rel.y * axis.y) / len2) as f32;
                stops.sample(t)
            }
            Self::RadialGradient { x0, y0, r0, x1, y1, r1, stops } => {
                let Some(local) = local_point(dev_x, dev_y, current_transform) else {
                    return Color::TRANSPARENT;
                };
                match solve_radial_t(local, *x0, *y0, *r0, *x1, *y1, *r1) {
                    Some(t) => stops.sample(t as f32),
                    None => Color::TRANSPARENT,
                }
            }
            Self::ConicGradient { cx, cy, start_angle, stops } => {
                let Some(local) = local_point(dev_x, dev_y, current_transform) else {
                    return Color::TRANSPARENT;
                };
                let angle = (local.y - cy).atan2(local.x - cx);
                let two_pi = core::f64::consts::TAU;
                let t = ((angle - start_angle).rem_euclid(two_pi)) / two_pi;
                stops.sample(t as f32)
            }
            Self::Pattern(pattern) => {
                let combined = current_transform.then(pattern.transform);
                let Some(inv) = combined.invert() else {
                    return Color::TRANSPARENT;
                };
                let local = inv.transform_point(Point::new(dev_x, dev_y));
                pattern.sample(local.x, local.y)
            }
        }
    }
}

fn local_point(dev_x: f64, dev_y: f64, current_transform: Transform) -> Option<Point> {
    let inv = current_transform.invert()?;
    Some(inv.transform_point(Point::new(dev_x, dev_y)))
}

/// Solve for the gradient parameter `t` on the two-circle pencil: circles
/// interpolate center and radius linearly in `t` and we want the smallest
/// `t <= 1` (extended beyond `[0,1]` is then clamped by the caller via the
/// ramp) such that `p` lies on the circle of radius `r(t) = r0 + t*(r1-r0)`
/// centered at `c(t) = c0 + t*(c1-c0)`. Degenerates gracefully when the two
/// circles coincide (single-circle case).
fn solve_radial_t(p: Point, x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Option<f64> {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let dr = r1 - r0;
    let px = p.x - x0;
    let py = p.y - y0;

    let a = dx * dx + dy * dy - dr * dr;
    let b = -2.0 * (px * dx + py * dy + r0 * dr);
    let c = px * px + py * py - r0 * r0;

    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return None;
        }
        let t = -c / b;
        return valid_radial_t(t, r0, dr);
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b + sqrt_disc) / (2.0 * a);
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    // Prefer the larger valid t (matches the "take the circle that's in
    // front" convention used by Canvas radial gradients).
    let mut best: Option<f64> = None;
    for t in [t0, t1] {
        if let Some(v) = valid_radial_t(t, r0, dr) {
            best = Some(best.map_or(v, |cur: f64| cur.max(v)));
        }
    }
    best
}

fn valid_radial_t(t: f64, r0: f64, dr: f64) -> Option<f64> {
    if r0 + t * dr >= 0.0 { Some(t) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(a: Color, b: Color) -> GradientStops {
        GradientStops::new(vec![
            GradientStop { offset: 0.0, color: a },
            GradientStop { offset: 1.0, color: b },
        ])
    }

    #[test]
    fn linear_gradient_is_linear_at_midpoint() {
        let black = Color::new(0, 0, 0, 255);
        let white = Color::new(255, 255, 255, 255);
        let paint = PaintSource::LinearGradient {
            x0: 0.0,
            y0: 0.0,
            x1: 100.0,
            y1: 0.0,
            stops: stops(black, white),
        };
        let c = paint.sample(50.5, 50.0, Transform::IDENTITY);
        assert!((i16::from(c.r) - 128).abs() <= 1);
    }

    #[test]
    fn zero_length_linear_gradient_is_transparent() {
        let paint = PaintSource::LinearGradient {
            x0: 5.0,
            y0: 5.0,
            x1: 5.0,
            y1: 5.0,
            stops: stops(Color::BLACK, Color::WHITE),
        };
        let c = paint.sample(5.0, 5.0, Transform::IDENTITY);
        assert_eq!(c, Color::TRANSPARENT);
    }

    #[test]
    fn solid_color_ignores_position() {
        let paint = PaintSource::SolidColor(Color::new(1, 2, 3, 4));
        assert_eq!(paint.sample(0.0, 0.0, Transform::IDENTITY), Color::new(1, 2, 3, 4));
        assert_eq!(paint.sample(99.0, 99.0, Transform::IDENTITY), Color::new(1, 2, 3, 4));
    }

    #[test]
    fn non_invertible_transform_yields_transparent() {
        let paint = PaintSource::LinearGradient {
            x0: 0.0,
            y0: 0.0,
            x1: 10.0,
            y1: 0.0,
            stops: stops(Color::BLACK, Color::WHITE),
        };
        let singular = Transform::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(paint.sample(1.0, 1.0, singular), Color::TRANSPARENT);
    }

    #[test]
    fn pattern_no_repeat_out_of_bounds_is_transparent() {
        let img = Image::new(2, 2, vec![Color::BLACK; 4]).unwrap();
        let pattern = Pattern::new(img, Repetition::NoRepeat);
        assert_eq!(pattern.sample(5.0, 5.0), Color::TRANSPARENT);
        assert_eq!(pattern.sample(0.5, 0.5), Color::BLACK);
    }

    #[test]
    fn pattern_repeat_tiles() {
        let mut pixels = vec![Color::BLACK; 4];
        pixels[1] = Color::WHITE;
        let img = Image::new(2, 2, pixels).unwrap();
        let pattern = Pattern::new(img, Repetition::Repeat);
        assert_eq!(pattern.sample(1.5, 0.5), pattern.sample(3.5, 0.5));
    }
}
