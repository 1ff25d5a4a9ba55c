// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A dependency-free, deterministic, software-only 2D rasterizer
//! implementing the core of HTML5 Canvas 2D semantics.
//!
//! This crate covers the rasterization pipeline that turns path
//! descriptions, paint sources, and a drawing-state stack into pixels on a
//! straight-RGBA8 [`Surface`]: path flattening, scanline polygon fill,
//! stroke-to-fill expansion, Porter–Duff compositing, clipping, and a set
//! of direct-rendering fast paths for common shapes.
//!
//! It deliberately excludes the pieces that sit above or beside a
//! rasterizer core: CSS/style parsing, image codecs, font shaping and
//! glyph rendering, a DOM façade, and GPU acceleration. Those are external
//! collaborators; this crate's public surface is [`Context`] plus the
//! value types it operates on.
//!
//! # Layout
//!
//! - [`color`] / [`geom`]: the value types every other module builds on
//!   (straight RGBA8 color, points/rects/affine transforms).
//! - [`path`]: user-space path construction.
//! - [`flatten`]: adaptive Bézier subdivision and arc sampling into
//!   device-space polygons.
//! - [`scan`]: nonzero/evenodd scanline polygon fill.
//! - [`stroke`]: stroke-to-fill expansion and dash pattern walking.
//! - [`composite`]: Porter–Duff blending and shadow coverage synthesis.
//! - [`stencil`]: the 1-bit-per-pixel clip mask.
//! - [`paint`]: solid colors, gradients, and tiled image patterns.
//! - [`state`]: the save/restore drawing-state stack.
//! - [`surface`]: the pixel buffer drawn into.
//! - [`fastpath`]: direct-rendering specializers for common shapes.
//! - [`context`]: [`Context`], the public API tying all of the above
//!   together.

pub mod color;
pub mod composite;
pub mod context;
pub mod fastpath;
pub mod flatten;
pub mod geom;
pub mod paint;
pub mod path;
pub mod scan;
pub mod state;
pub mod stencil;
pub mod stroke;
pub mod surface;

pub use color::Color;
pub use context::{
    create_image_data, Context, ConicGradientHandle, ImageData, LinearGradientHandle,
    RadialGradientHandle,
};
pub use geom::{Point, Rect, Transform};
pub use paint::{GradientStop, GradientStops, Image, PaintSource, Pattern, Repetition};
pub use path::{Path, PathCommand};
pub use scan::FillRule;
pub use state::{CompositeOperator, DrawingState, LineCap, LineDash, LineJoin, Shadow};
pub use stencil::StencilBuffer;
pub use surface::Surface;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_transparent_black() {
        let ctx = Context::new(4, 4).unwrap();
        assert_eq!(ctx.surface().get_pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn fill_rect_then_read_back() {
        let mut ctx = Context::new(4, 4).unwrap();
        ctx.set_fill_style(PaintSource::SolidColor(Color::new(10, 20, 30, 255)));
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0);
        assert_eq!(ctx.surface().get_pixel(2, 2), Color::new(10, 20, 30, 255));
    }
}
