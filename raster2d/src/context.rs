// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Context`: the public, Canvas-2D-shaped drawing API tying together the
//! state stack, flattener, scan converter, stroke expander, compositor, and
//! fast-path specializers around one owned [`Surface`].

use std::collections::HashSet;

use crate::color::Color;
use crate::composite::{composite_pixel, needs_full_region_compositing, box_blur_coverage};
use crate::fastpath;
use crate::flatten::{flatten_path, flatten_path_for_fill, Polygon};
use crate::geom::{Point, Rect, Transform};
use crate::paint::{GradientStop, GradientStops, Image, PaintSource, Pattern, Repetition};
use crate::path::Path;
pub use crate::scan::FillRule;
use crate::scan::scan_fill;
use crate::state::{
    CompositeOperator, DrawingState, LineCap, LineDash, LineJoin, Shadow, StateStack,
};
use crate::stencil::StencilBuffer;
use crate::stroke::{apply_dash, stroke_polyline};
use crate::surface::Surface;

fn uniform_scale_factor(t: Transform) -> f64 {
    (t.a * t.a + t.b * t.b).sqrt()
}

fn polygons_bbox(polys: &[Polygon], w: u32, h: u32) -> Option<(i32, i32, i32, i32)> {
    let mut pts = Vec::new();
    for p in polys {
        pts.extend_from_slice(&p.points);
    }
    if pts.is_empty() {
        return None;
    }
    let bbox = Rect::bounding_box(&pts);
    let x0 = bbox.left().floor().max(0.0) as i32;
    let y0 = bbox.top().floor().max(0.0) as i32;
    let x1 = (bbox.right().ceil() as i32).min(w as i32);
    let y1 = (bbox.bottom().ceil() as i32).min(h as i32);
    if x1 <= x0 || y1 <= y0 {
        None
    } else {
        Some((x0, y0, x1, y1))
    }
}

/// A straight-RGBA8 pixel buffer copy, as returned by
/// [`Context::get_image_data`] and consumed by [`Context::put_image_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major straight RGBA8 bytes, `data.len() == 4 * width * height`.
    pub data: Vec<u8>,
}

impl ImageData {
    /// A transparent-black buffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height, data: vec![0u8; 4 * width as usize * height as usize] })
    }
}

/// `createImageData(width, height)`: non-integer or non-positive sizes are
/// rejected.
#[must_use]
pub fn create_image_data(width: f64, height: f64) -> Option<ImageData> {
    if !width.is_finite() || !height.is_finite() {
        return None;
    }
    if width.fract() != 0.0 || height.fract() != 0.0 || width <= 0.0 || height <= 0.0 {
        return None;
    }
    ImageData::new(width as u32, height as u32)
}

/// A handle returned by [`Context::create_linear_gradient`], collecting
/// stops until [`LinearGradientHandle::finish`] freezes them into a
/// [`PaintSource`].
#[derive(Debug, Clone)]
pub struct LinearGradientHandle {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    stops: Vec<GradientStop>,
}

impl LinearGradientHandle {
    /// Add a color stop. Non-finite offsets are ignored.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        if offset.is_finite() {
            self.stops.push(GradientStop { offset, color });
        }
    }

    /// Freeze the accumulated stops into a usable paint source.
    #[must_use]
    pub fn finish(self) -> PaintSource {
        PaintSource::LinearGradient {
            x0: self.x0,
            y0: self.y0,
            x1: self.x1,
            y1: self.y1,
            stops: GradientStops::new(self.stops),
        }
    }
}

/// A handle returned by [`Context::create_radial_gradient`].
#[derive(Debug, Clone)]
pub struct RadialGradientHandle {
    x0: f64,
    y0: f64,
    r0: f64,
    x1: f64,
    y1: f64,
    r1: f64,
    stops: Vec<GradientStop>,
}

impl RadialGradientHandle {
    /// Add a color stop. Non-finite offsets are ignored.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        if offset.is_finite() {
            self.stops.push(GradientStop { offset, color });
        }
    }

    /// Freeze the accumulated stops into a usable paint source.
    #[must_use]
    pub fn finish(self) -> PaintSource {
        PaintSource::RadialGradient {
            x0: self.x0,
            y0: self.y0,
            r0: self.r0,
            x1: self.x1,
            y1: self.y1,
            r1: self.r1,
            stops: GradientStops::new(self.stops),
        }
    }
}

/// A handle returned by [`Context::create_conic_gradient`].
#[derive(Debug, Clone)]
pub struct ConicGradientHandle {
    cx: f64,
    cy: f64,
    start_angle: f64,
    stops: Vec<GradientStop>,
}

impl ConicGradientHandle {
    /// Add a color stop. Non-finite offsets are ignored.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        if offset.is_finite() {
            self.stops.push(GradientStop { offset, color });
        }
    }

    /// Freeze the accumulated stops into a usable paint source.
    #[must_use]
    pub fn finish(self) -> PaintSource {
        PaintSource::ConicGradient {
            cx: self.cx,
            cy: self.cy,
            start_angle: self.start_angle,
            stops: GradientStops::new(self.stops),
        }
    }
}

/// The drawing context: one instance is tied to one owned [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    surface: Surface,
    stack: StateStack,
    current_path: Path,
}

impl Context {
    /// Create a context over a freshly allocated surface, cleared to
    /// transparent black.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let surface = Surface::new(width, height)?;
        Some(Self { surface, stack: StateStack::new(), current_path: Path::new() })
    }

    /// Borrow the surface.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Borrow the current drawing state.
    #[must_use]
    pub fn state(&self) -> &DrawingState {
        self.stack.current()
    }

    // -- state stack ---------------------------------------------------

    /// Push a snapshot of the current state.
    pub fn save(&mut self) {
        self.stack.save();
    }

    /// Pop the most recent snapshot; a no-op on an empty stack.
    pub fn restore(&mut self) {
        self.stack.restore();
    }

    // -- transform family ------------------------------------------------

    /// Post-multiply the current transform by `(a, b, c, d, e, f)`.
    /// Non-finite inputs are rejected.
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        let t = Transform::new(a, b, c, d, e, f);
        if !t.is_finite() {
            return;
        }
        let cur = self.stack.current_mut();
        cur.transform = cur.transform.then(t);
    }

    /// Replace the current transform with `(a, b, c, d, e, f)`.
    pub fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        let t = Transform::new(a, b, c, d, e, f);
        if !t.is_finite() {
            return;
        }
        self.stack.current_mut().transform = t;
    }

    /// Reset the current transform to the identity.
    pub fn reset_transform(&mut self) {
        self.stack.current_mut().transform = Transform::IDENTITY;
    }

    /// Post-multiply by a translation.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        if tx.is_finite() && ty.is_finite() {
            let cur = self.stack.current_mut();
            cur.transform = cur.transform.translate(tx, ty);
        }
    }

    /// Post-multiply by a scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        if sx.is_finite() && sy.is_finite() {
            let cur = self.stack.current_mut();
            cur.transform = cur.transform.scale(sx, sy);
        }
    }

    /// Post-multiply by a rotation (radians).
    pub fn rotate(&mut self, radians: f64) {
        if radians.is_finite() {
            let cur = self.stack.current_mut();
            cur.transform = cur.transform.rotate(radians);
        }
    }

    // -- path builders (mutate the current path) --------------------------

    /// Discard the current path.
    pub fn begin_path(&mut self) {
        self.current_path = Path::new();
    }

    /// Begin a new sub-path at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.current_path.move_to(x, y);
    }

    /// A straight line to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.current_path.line_to(x, y);
    }

    /// A quadratic Bézier curve to `(x, y)` via `(cx, cy)`.
    pub fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.current_path.quad_to(cx, cy, x, y);
    }

    /// A cubic Bézier curve to `(x, y)` via two control points.
    pub fn bezier_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.current_path.cubic_to(c1x, c1y, c2x, c2y, x, y);
    }

    /// Append a rectangle sub-path.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.current_path.rect(x, y, w, h);
    }

    /// Append a circular arc.
    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        self.current_path.arc(cx, cy, r, a0, a1, ccw);
    }

    /// Append a tangent-circle arc between two line segments.
    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        self.current_path.arc_to(x1, y1, x2, y2, radius);
    }

    /// Append an elliptical arc.
    #[allow(clippy::too_many_arguments, reason = "mirrors the Canvas 2D ellipse() signature")]
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
        self.current_path.ellipse(cx, cy, rx, ry, rotation, a0, a1, ccw);
    }

    /// Close the current sub-path.
    pub fn close_path(&mut self) {
        self.current_path.close_path();
    }

    // -- styles ------------------------------------------------------------

    /// Set the fill paint source.
    pub fn set_fill_style(&mut self, paint: PaintSource) {
        self.stack.current_mut().fill_paint = paint;
    }

    /// Set the stroke paint source.
    pub fn set_stroke_style(&mut self, paint: PaintSource) {
        self.stack.current_mut().stroke_paint = paint;
    }

    /// Set the stroke width. Non-positive or non-finite values are silently
    /// ignored, keeping the previous value.
    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.stack.current_mut().line_width = width;
        }
    }

    /// Set the line join style.
    pub fn set_line_join(&mut self, join: LineJoin) {
        self.stack.current_mut().line_join = join;
    }

    /// Set the line cap style.
    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.stack.current_mut().line_cap = cap;
    }

    /// Set the miter limit. Non-positive or non-finite values are ignored.
    pub fn set_miter_limit(&mut self, limit: f64) {
        if limit.is_finite() && limit > 0.0 {
            self.stack.current_mut().miter_limit = limit;
        }
    }

    /// Set the global alpha, clamped to `[0, 1]`. Non-finite values are
    /// ignored.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.stack.current_mut().global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    /// Set the active Porter–Duff operator.
    pub fn set_global_composite_operation(&mut self, op: CompositeOperator) {
        self.stack.current_mut().composite_operator = op;
    }

    /// Set the dash pattern. Even-length patterns are kept as-is,
    /// odd-length patterns are doubled when walked. Negative segments
    /// reject the whole call (the previous pattern is kept).
    pub fn set_line_dash(&mut self, pattern: Vec<f64>) {
        if let Some(dash) = LineDash::try_set(pattern) {
            let offset = self.stack.current().line_dash.offset;
            self.stack.current_mut().line_dash = LineDash { offset, ..dash };
        }
    }

    /// The current dash pattern (before odd-length doubling).
    #[must_use]
    pub fn get_line_dash(&self) -> Vec<f64> {
        self.stack.current().line_dash.pattern.clone()
    }

    /// Set the dash offset.
    pub fn set_line_dash_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.stack.current_mut().line_dash.offset = offset;
        }
    }

    /// Set the shadow color.
    pub fn set_shadow_color(&mut self, color: Color) {
        self.stack.current_mut().shadow.color = color;
    }

    /// Set the shadow blur radius. Negative or non-finite values are
    /// ignored.
    pub fn set_shadow_blur(&mut self, blur: f64) {
        if blur.is_finite() && blur >= 0.0 {
            self.stack.current_mut().shadow.blur = blur;
        }
    }

    /// Set the shadow's horizontal offset.
    pub fn set_shadow_offset_x(&mut self, offset: f64) {
        if offset.is_finite() {
            self.stack.current_mut().shadow.offset_x = offset;
        }
    }

    /// Set the shadow's vertical offset.
    pub fn set_shadow_offset_y(&mut self, offset: f64) {
        if offset.is_finite() {
            self.stack.current_mut().shadow.offset_y = offset;
        }
    }

    // -- paint-source factories --------------------------------------------

    /// Begin building a linear gradient from `(x0, y0)` to `(x1, y1)`.
    #[must_use]
    pub fn create_linear_gradient(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> LinearGradientHandle {
        LinearGradientHandle { x0, y0, x1, y1, stops: Vec::new() }
    }

    /// Begin building a radial gradient between two circles.
    #[must_use]
    pub fn create_radial_gradient(
        &self,
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    ) -> RadialGradientHandle {
        RadialGradientHandle { x0, y0, r0, x1, y1, r1, stops: Vec::new() }
    }

    /// Begin building a conic (sweep) gradient around `(cx, cy)`.
    #[must_use]
    pub fn create_conic_gradient(&self, start_angle: f64, cx: f64, cy: f64) -> ConicGradientHandle {
        ConicGradientHandle { cx, cy, start_angle, stops: Vec::new() }
    }

    /// Build a tiled-image pattern paint source.
    #[must_use]
    pub fn create_pattern(image: Image, repetition: Repetition) -> PaintSource {
        PaintSource::Pattern(Pattern::new(image, repetition))
    }

    // -- general fill / stroke / clip --------------------------------------

    /// Fill an explicit path under `rule`.
    pub fn fill_path(&mut self, path: &Path, rule: FillRule) {
        let state = self.stack.current().clone();
        let polys = flatten_path_for_fill(path, state.transform);
        self.rasterize(&polys, rule, state.fill_paint.clone(), &state);
    }

    /// Fill the current path under `rule`.
    pub fn fill(&mut self, rule: FillRule) {
        let path = self.current_path.clone();
        self.fill_path(&path, rule);
    }

    /// Stroke an explicit path under the current stroke styles.
    pub fn stroke_path(&mut self, path: &Path) {
        let state = self.stack.current().clone();
        let sub_paths = flatten_path(path, state.transform);
        let mut fill_polys = Vec::new();
        for sub in &sub_paths {
            for (pts, closed) in apply_dash(&sub.points, sub.closed, &state.line_dash) {
                fill_polys.extend(stroke_polyline(
                    &pts,
                    closed,
                    state.line_width,
                    state.line_join,
                    state.line_cap,
                    state.miter_limit,
                ));
            }
        }
        self.rasterize(&fill_polys, FillRule::NonZero, state.stroke_paint.clone(), &state);
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) {
        let path = self.current_path.clone();
        self.stroke_path(&path);
    }

    /// Intersect the active clip with an explicit path under `rule`.
    pub fn clip_path(&mut self, path: &Path, rule: FillRule) {
        let state = self.stack.current().clone();
        let polys = flatten_path_for_fill(path, state.transform);
        let mut mask = StencilBuffer::new_all_clipped(self.surface.width(), self.surface.height());
        scan_fill(&polys, rule, self.surface.width(), self.surface.height(), |x, y| {
            mask.set(x as u32, y as u32, true);
        });
        let current = self.stack.current_mut();
        match &mut current.clip_mask {
            Some(existing) => existing.intersect_with(&mask),
            None => current.clip_mask = Some(mask),
        }
    }

    /// Intersect the active clip with the current path under `rule`.
    pub fn clip(&mut self, rule: FillRule) {
        let path = self.current_path.clone();
        self.clip_path(&path, rule);
    }

    fn rasterize(&mut self, polys: &[Polygon], rule: FillRule, paint: PaintSource, state: &DrawingState) {
        if state.shadow.is_enabled() {
            self.render_shadow_pass(polys, rule, state);
        }
        let transform = state.transform;
        let op = state.composite_operator;
        let global_alpha = state.global_alpha;
        let stencil = state.clip_mask.clone();
        let full_region = needs_full_region_compositing(op);
        let mut covered: Option<HashSet<(i32, i32)>> = full_region.then(HashSet::new);
        {
            let surface = &mut self.surface;
            scan_fill(polys, rule, surface.width(), surface.height(), |x, y| {
                if let Some(st) = &stencil {
                    if !st.is_visible(x, y) {
                        return;
                    }
                }
                let dst = surface.get_pixel(x, y);
                let src = paint.sample(f64::from(x) + 0.5, f64::from(y) + 0.5, transform);
                let out = composite_pixel(src, dst, op, global_alpha);
                surface.set_pixel(x, y, out);
                if let Some(c) = &mut covered {
                    c.insert((x, y));
                }
            });
        }
        if let Some(covered) = covered {
            if let Some((x0, y0, x1, y1)) = polygons_bbox(polys, self.surface.width(), self.surface.height()) {
                for y in y0..y1 {
                    for x in x0..x1 {
                        if covered.contains(&(x, y)) {
                            continue;
                        }
                        if let Some(st) = &stencil {
                            if !st.is_visible(x, y) {
                                continue;
                            }
                        }
                        let dst = self.surface.get_pixel(x, y);
                        let out = composite_pixel(Color::TRANSPARENT, dst, op, global_alpha);
                        self.surface.set_pixel(x, y, out);
                    }
                }
            }
        }
    }

    fn render_shadow_pass(&mut self, polys: &[Polygon], rule: FillRule, state: &DrawingState) {
        let shadow = state.shadow;
        let Some((x0, y0, x1, y1)) = polygons_bbox(polys, self.surface.width(), self.surface.height()) else {
            return;
        };
        let pad = shadow.blur.ceil() as i32 + 2;
        let bx0 = (x0 - pad).max(0);
        let by0 = (y0 - pad).max(0);
        let bx1 = (x1 + pad).min(self.surface.width() as i32);
        let by1 = (y1 + pad).min(self.surface.height() as i32);
        let bw = (bx1 - bx0).max(0) as u32;
        let bh = (by1 - by0).max(0) as u32;
        if bw == 0 || bh == 0 {
            return;
        }
        let mut coverage = vec![0.0f32; (bw * bh) as usize];
        scan_fill(polys, rule, self.surface.width(), self.surface.height(), |x, y| {
            if x >= bx0 && x < bx1 && y >= by0 && y < by1 {
                let idx = (y - by0) as u32 * bw + (x - bx0) as u32;
                coverage[idx as usize] = 1.0;
            }
        });
        if shadow.blur > 0.0 {
            box_blur_coverage(&mut coverage, bw, bh, shadow.blur);
        }
        let stencil = state.clip_mask.clone();
        let op = state.composite_operator;
        let global_alpha = state.global_alpha;
        let offset_x = shadow.offset_x.round() as i32;
        let offset_y = shadow.offset_y.round() as i32;
        for by in 0..bh as i32 {
            for bx in 0..bw as i32 {
                let cov = coverage[(by as u32 * bw + bx as u32) as usize];
                if cov <= 0.0 {
                    continue;
                }
                let dest_x = bx0 + bx + offset_x;
                let dest_y = by0 + by + offset_y;
                if !self.surface.in_bounds(i64::from(dest_x), i64::from(dest_y)) {
                    continue;
                }
                if let Some(st) = &stencil {
                    if !st.is_visible(dest_x, dest_y) {
                        continue;
                    }
                }
                let src = shadow.color.with_global_alpha(cov);
                let dst = self.surface.get_pixel(dest_x, dest_y);
                let out = composite_pixel(src, dst, op, global_alpha);
                self.surface.set_pixel(dest_x, dest_y, out);
            }
        }
    }

    // -- direct-rendering fast methods --------------------------------------

    fn basic_fast_path_ok(state: &DrawingState) -> bool {
        state.composite_operator == CompositeOperator::SrcOver && !state.shadow.is_enabled()
    }

    /// Fill an axis-aligned-or-rotated rectangle, bypassing the general
    /// pipeline when the current paint/operator/transform qualify.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) {
            if let PaintSource::SolidColor(color) = state.fill_paint {
                let stencil = state.clip_mask.clone();
                let rect = Rect::new(x, y, w, h);
                if state.transform.is_axis_aligned() {
                    let p0 = state.transform.transform_point(Point::new(rect.left(), rect.top()));
                    let p1 = state.transform.transform_point(Point::new(rect.right(), rect.bottom()));
                    let device_rect = Rect::new(p0.x, p0.y, p1.x - p0.x, p1.y - p0.y);
                    fastpath::rect::fill_axis_aligned(
                        &mut self.surface,
                        stencil.as_ref(),
                        device_rect,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                } else if state.transform.is_rigid_or_uniform_scale() {
                    fastpath::rect::fill_rotated(
                        &mut self.surface,
                        stencil.as_ref(),
                        rect,
                        state.transform,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        path.rect(x, y, w, h);
        self.fill_path(&path, FillRule::NonZero);
    }

    /// Stroke an axis-aligned-or-rotated rectangle outline.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) && state.line_dash.pattern.is_empty() {
            if let PaintSource::SolidColor(color) = state.stroke_paint {
                let stencil = state.clip_mask.clone();
                let rect = Rect::new(x, y, w, h);
                let scale = uniform_scale_factor(state.transform);
                if state.transform.is_axis_aligned() && state.transform.is_rigid_or_uniform_scale() {
                    let p0 = state.transform.transform_point(Point::new(rect.left(), rect.top()));
                    let p1 = state.transform.transform_point(Point::new(rect.right(), rect.bottom()));
                    let device_rect = Rect::new(p0.x, p0.y, p1.x - p0.x, p1.y - p0.y);
                    fastpath::rect::stroke_axis_aligned(
                        &mut self.surface,
                        stencil.as_ref(),
                        device_rect,
                        state.line_width * scale,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                } else if state.transform.is_rigid_or_uniform_scale() {
                    fastpath::rect::stroke_rotated(
                        &mut self.surface,
                        stencil.as_ref(),
                        rect,
                        state.transform,
                        state.line_width * scale,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        path.rect(x, y, w, h);
        self.stroke_path(&path);
    }

    /// Fill then stroke a rectangle.
    pub fn fill_and_stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.fill_rect(x, y, w, h);
        self.stroke_rect(x, y, w, h);
    }

    /// Fill a circle.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) {
            if let PaintSource::SolidColor(color) = state.fill_paint {
                if state.transform.is_rigid_or_uniform_scale() {
                    let scale = uniform_scale_factor(state.transform);
                    let center = state.transform.transform_point(Point::new(cx, cy));
                    let stencil = state.clip_mask.clone();
                    fastpath::circle::fill_circle(
                        &mut self.surface,
                        stencil.as_ref(),
                        center.x,
                        center.y,
                        r * scale,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        path.arc(cx, cy, r, 0.0, core::f64::consts::TAU, false);
        self.fill_path(&path, FillRule::NonZero);
    }

    /// Stroke a circle outline.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) && state.line_dash.pattern.is_empty() {
            if let PaintSource::SolidColor(color) = state.stroke_paint {
                if state.transform.is_rigid_or_uniform_scale() {
                    let scale = uniform_scale_factor(state.transform);
                    let center = state.transform.transform_point(Point::new(cx, cy));
                    let stencil = state.clip_mask.clone();
                    fastpath::circle::stroke_circle(
                        &mut self.surface,
                        stencil.as_ref(),
                        center.x,
                        center.y,
                        r * scale,
                        state.line_width * scale,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        path.arc(cx, cy, r, 0.0, core::f64::consts::TAU, false);
        self.stroke_path(&path);
    }

    /// Fill then stroke a circle.
    pub fn fill_and_stroke_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.fill_circle(cx, cy, r);
        self.stroke_circle(cx, cy, r);
    }

    /// Stroke a single line segment.
    pub fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let mut path = Path::new();
        path.move_to(x0, y0);
        path.line_to(x1, y1);
        self.stroke_path(&path);
    }

    /// Fill a rounded rectangle.
    pub fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) {
            if let PaintSource::SolidColor(color) = state.fill_paint {
                let rect = Rect::new(x, y, w, h);
                let stencil = state.clip_mask.clone();
                if state.transform.is_axis_aligned() {
                    let p0 = state.transform.transform_point(Point::new(rect.left(), rect.top()));
                    let p1 = state.transform.transform_point(Point::new(rect.right(), rect.bottom()));
                    let device_rect = Rect::new(p0.x, p0.y, p1.x - p0.x, p1.y - p0.y);
                    let scale = uniform_scale_factor(state.transform);
                    fastpath::roundrect::fill_axis_aligned(
                        &mut self.surface,
                        stencil.as_ref(),
                        device_rect,
                        radius * scale,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                } else if state.transform.is_rigid_or_uniform_scale() {
                    fastpath::roundrect::fill_rotated(
                        &mut self.surface,
                        stencil.as_ref(),
                        rect,
                        radius,
                        state.transform,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        build_round_rect_path(&mut path, x, y, w, h, radius);
        self.fill_path(&path, FillRule::NonZero);
    }

    /// Stroke a rounded rectangle outline.
    pub fn stroke_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) && state.line_dash.pattern.is_empty() {
            if let PaintSource::SolidColor(color) = state.stroke_paint {
                if state.transform.is_rigid_or_uniform_scale() {
                    let rect = Rect::new(x, y, w, h);
                    let stencil = state.clip_mask.clone();
                    fastpath::roundrect::stroke_rotated(
                        &mut self.surface,
                        stencil.as_ref(),
                        rect,
                        radius,
                        state.transform,
                        state.line_width,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        build_round_rect_path(&mut path, x, y, w, h, radius);
        self.stroke_path(&path);
    }

    /// Fill then stroke a rounded rectangle.
    pub fn fill_and_stroke_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        self.fill_round_rect(x, y, w, h, radius);
        self.stroke_round_rect(x, y, w, h, radius);
    }

    /// Fill a circular sector (pie slice).
    #[allow(clippy::too_many_arguments, reason = "sector fill needs the circle and angular range together")]
    pub fn fill_arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) {
            if let PaintSource::SolidColor(color) = state.fill_paint {
                if state.transform.is_rigid_or_uniform_scale() {
                    let scale = uniform_scale_factor(state.transform);
                    let center = state.transform.transform_point(Point::new(cx, cy));
                    let stencil = state.clip_mask.clone();
                    fastpath::circle::fill_arc(
                        &mut self.surface,
                        stencil.as_ref(),
                        center.x,
                        center.y,
                        r * scale,
                        a0,
                        a1,
                        ccw,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        path.move_to(cx, cy);
        path.arc(cx, cy, r, a0, a1, ccw);
        path.close_path();
        self.fill_path(&path, FillRule::NonZero);
    }

    /// Stroke only the curved perimeter of an arc sector.
    #[allow(clippy::too_many_arguments, reason = "outer-stroke needs the circle, angular range, and stroke width together")]
    pub fn outer_stroke_arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        let state = self.stack.current().clone();
        if Self::basic_fast_path_ok(&state) && state.line_dash.pattern.is_empty() {
            if let PaintSource::SolidColor(color) = state.stroke_paint {
                if state.transform.is_rigid_or_uniform_scale() {
                    let scale = uniform_scale_factor(state.transform);
                    let center = state.transform.transform_point(Point::new(cx, cy));
                    let stencil = state.clip_mask.clone();
                    fastpath::circle::outer_stroke_arc(
                        &mut self.surface,
                        stencil.as_ref(),
                        center.x,
                        center.y,
                        r * scale,
                        a0,
                        a1,
                        ccw,
                        state.line_width * scale,
                        color,
                        state.composite_operator,
                        state.global_alpha,
                    );
                    return;
                }
            }
        }
        let mut path = Path::new();
        path.arc(cx, cy, r, a0, a1, ccw);
        self.stroke_path(&path);
    }

    /// Fill then outer-stroke an arc sector.
    pub fn fill_and_outer_stroke_arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        self.fill_arc(cx, cy, r, a0, a1, ccw);
        self.outer_stroke_arc(cx, cy, r, a0, a1, ccw);
    }

    // -- image pipeline ------------------------------------------------------

    /// Draw an image at its natural size with its top-left corner at
    /// `(dx, dy)`.
    pub fn draw_image(&mut self, image: &Image, dx: f64, dy: f64) {
        self.draw_image_scaled(image, dx, dy, f64::from(image.width()), f64::from(image.height()));
    }

    /// Draw an image scaled to `dw x dh` with its top-left corner at
    /// `(dx, dy)`.
    pub fn draw_image_scaled(&mut self, image: &Image, dx: f64, dy: f64, dw: f64, dh: f64) {
        self.draw_image_sub(image, 0.0, 0.0, f64::from(image.width()), f64::from(image.height()), dx, dy, dw, dh);
    }

    /// Draw the `(sx, sy, sw, sh)` region of `image`, nearest-neighbor
    /// sampled under the current transform, into `(dx, dy, dw, dh)`.
    /// Pixels sampled outside the source rectangle contribute transparent.
    #[allow(clippy::too_many_arguments, reason = "mirrors the Canvas 2D drawImage(image, sx, sy, sw, sh, dx, dy, dw, dh) overload")]
    pub fn draw_image_sub(
        &mut self,
        image: &Image,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) {
        if dw == 0.0 || dh == 0.0 {
            return;
        }
        let state = self.stack.current().clone();
        let Some(inv) = state.transform.invert() else { return };
        let corners = [
            Point::new(dx, dy),
            Point::new(dx + dw, dy),
            Point::new(dx + dw, dy + dh),
            Point::new(dx, dy + dh),
        ];
        let device_corners: Vec<Point> =
            corners.iter().map(|p| state.transform.transform_point(*p)).collect();
        let bbox = Rect::bounding_box(&device_corners);
        let x0 = bbox.left().floor().max(0.0) as i32;
        let y0 = bbox.top().floor().max(0.0) as i32;
        let x1 = (bbox.right().ceil() as i32).min(self.surface.width() as i32);
        let y1 = (bbox.bottom().ceil() as i32).min(self.surface.height() as i32);
        let stencil = state.clip_mask.clone();
        let op = state.composite_operator;
        let global_alpha = state.global_alpha;
        let full_region = needs_full_region_compositing(op);
        for y in y0..y1 {
            for x in x0..x1 {
                if let Some(st) = &stencil {
                    if !st.is_visible(x, y) {
                        continue;
                    }
                }
                let device_p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let user_p = inv.transform_point(device_p);
                let u = (user_p.x - dx) / dw;
                let v = (user_p.y - dy) / dh;
                let in_dest = (0.0..1.0).contains(&u) && (0.0..1.0).contains(&v);
                let color = if in_dest {
                    let src_x = (sx + u * sw).floor() as i32;
                    let src_y = (sy + v * sh).floor() as i32;
                    image.get(src_x, src_y).unwrap_or(Color::TRANSPARENT)
                } else {
                    Color::TRANSPARENT
                };
                if color.a == 0 && !full_region {
                    continue;
                }
                let dst = self.surface.get_pixel(x, y);
                let out = composite_pixel(color, dst, op, global_alpha);
                self.surface.set_pixel(x, y, out);
            }
        }
    }

    /// Read back a straight-RGBA8 copy of `[x, x+w) x [y, y+h)`, clipped to
    /// the surface (out-of-surface reads return transparent black). A zero
    /// `w` or `h` returns an equally zero-sized buffer rather than the
    /// smallest valid one; unlike `createImageData`, this is a read of an
    /// already-given rectangle, not a request to allocate one.
    #[must_use]
    pub fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData {
        let mut out = ImageData { width: w, height: h, data: vec![0u8; 4 * w as usize * h as usize] };
        for row in 0..h as i32 {
            for col in 0..w as i32 {
                let color = self.surface.get_pixel(x + col, y + row);
                let idx = 4 * (row as u32 * w + col as u32) as usize;
                out.data[idx] = color.r;
                out.data[idx + 1] = color.g;
                out.data[idx + 2] = color.b;
                out.data[idx + 3] = color.a;
            }
        }
        out
    }

    /// Write `image` back verbatim with its top-left corner at `(dx, dy)`,
    /// bypassing compositing, global alpha, and clipping (a direct memory
    /// copy, matching Canvas `putImageData`).
    pub fn put_image_data(&mut self, image: &ImageData, dx: i32, dy: i32) {
        for row in 0..image.height as i32 {
            for col in 0..image.width as i32 {
                let idx = 4 * (row as u32 * image.width + col as u32) as usize;
                let color = Color::new(
                    image.data[idx],
                    image.data[idx + 1],
                    image.data[idx + 2],
                    image.data[idx + 3],
                );
                self.surface.set_pixel(dx + col, dy + row, color);
            }
        }
    }
}

fn build_round_rect_path(path: &mut Path, x: f64, y: f64, w: f64, h: f64, radius: f64) {
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
    let half_pi = core::f64::consts::FRAC_PI_2;
    path.move_to(x + r, y);
    path.line_to(x + w - r, y);
    path.arc(x + w - r, y + r, r, -half_pi, 0.0, false);
    path.line_to(x + w, y + h - r);
    path.arc(x + w - r, y + h - r, r, 0.0, half_pi, false);
    path.line_to(x + r, y + h);
    path.arc(x + r, y + h - r, r, half_pi, half_pi * 2.0, false);
    path.line_to(x, y + r);
    path.arc(x + r, y + r, r, half_pi * 2.0, half_pi * 3.0, false);
    path.close_path();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_fast_path_matches_white_clear_scenario() {
        let mut ctx = Context::new(200, 150).unwrap();
        ctx.set_fill_style(PaintSource::SolidColor(Color::WHITE));
        ctx.fill_rect(0.0, 0.0, 200.0, 150.0);
        ctx.set_global_alpha(0.5);
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(0, 128, 0, 255)));
        ctx.fill_rect(40.0, 40.0, 80.0, 60.0);
        let p = ctx.surface().get_pixel(50, 110);
        assert!((i16::from(p.r) - 127).abs() <= 1);
        assert!((i16::from(p.g) - 191).abs() <= 1);
        assert!((i16::from(p.b) - 127).abs() <= 1);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn destination_out_scenario() {
        let mut ctx = Context::new(100, 100).unwrap();
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(255, 0, 0, 255)));
        ctx.fill_rect(0.0, 0.0, 100.0, 100.0);
        ctx.set_global_composite_operation(CompositeOperator::DestOut);
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(0, 0, 255, 255)));
        ctx.fill_rect(25.0, 25.0, 50.0, 50.0);
        assert_eq!(ctx.surface().get_pixel(50, 50).a, 0);
        assert_eq!(ctx.surface().get_pixel(10, 10), Color::new(255, 0, 0, 255));
    }

    #[test]
    fn evenodd_donut_scenario() {
        let mut ctx = Context::new(100, 100).unwrap();
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(255, 0, 0, 255)));
        let mut path = Path::new();
        path.rect(20.0, 20.0, 60.0, 60.0);
        path.rect(30.0, 30.0, 40.0, 40.0);
        ctx.fill_path(&path, FillRule::EvenOdd);
        assert_eq!(ctx.surface().get_pixel(50, 50), Color::TRANSPARENT);
    }

    #[test]
    fn clip_circle_scenario() {
        let mut ctx = Context::new(100, 100).unwrap();
        let mut clip_path = Path::new();
        clip_path.arc(50.0, 50.0, 30.0, 0.0, core::f64::consts::TAU, false);
        ctx.clip_path(&clip_path, FillRule::NonZero);
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(255, 0, 0, 255)));
        ctx.fill_rect(0.0, 0.0, 100.0, 100.0);
        assert_eq!(ctx.surface().get_pixel(20, 20), Color::TRANSPARENT);
        assert_eq!(ctx.surface().get_pixel(50, 50), Color::new(255, 0, 0, 255));
    }

    #[test]
    fn save_restore_is_noop_on_every_field() {
        let mut ctx = Context::new(10, 10).unwrap();
        let before = ctx.state().clone();
        ctx.save();
        ctx.set_global_alpha(0.2);
        ctx.set_line_width(9.0);
        ctx.translate(5.0, 5.0);
        ctx.restore();
        assert_eq!(ctx.state(), &before);
    }

    #[test]
    fn put_get_image_data_roundtrips() {
        let mut ctx = Context::new(10, 10).unwrap();
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(9, 8, 7, 255)));
        ctx.fill_rect(0.0, 0.0, 10.0, 10.0);
        let data = ctx.get_image_data(2, 2, 4, 4);
        ctx.put_image_data(&data, 2, 2);
        let roundtrip = ctx.get_image_data(2, 2, 4, 4);
        assert_eq!(data, roundtrip);
    }

    #[test]
    fn create_image_data_rejects_non_integer_size() {
        assert!(create_image_data(4.5, 4.0).is_none());
        assert!(create_image_data(0.0, 4.0).is_none());
        assert!(create_image_data(4.0, 4.0).is_some());
    }

    #[test]
    fn gradient_handle_zero_length_is_transparent() {
        let ctx = Context::new(10, 10).unwrap();
        let mut handle = ctx.create_linear_gradient(5.0, 5.0, 5.0, 5.0);
        handle.add_color_stop(0.0, Color::BLACK);
        handle.add_color_stop(1.0, Color::WHITE);
        let paint = handle.finish();
        assert_eq!(paint.sample(5.0, 5.0, Transform::IDENTITY), Color::TRANSPARENT);
    }
}
