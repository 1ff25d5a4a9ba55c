// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios exercising the public [`raster2d::Context`] API as a
//! whole, rather than one module in isolation.

use raster2d::{Color, CompositeOperator, Context, FillRule, Path, PaintSource, Transform};

#[test]
fn alpha_over_white() {
    let mut ctx = Context::new(200, 150).unwrap();
    ctx.set_fill_style(PaintSource::SolidColor(Color::new(255, 255, 255, 255)));
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
fn composite_destination_out() {
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
fn evenodd_donut() {
    let mut ctx = Context::new(100, 100).unwrap();
    ctx.set_fill_style(PaintSource::SolidColor(Color::new(255, 0, 0, 255)));
    let mut path = Path::new();
    path.rect(20.0, 20.0, 60.0, 60.0);
    path.rect(30.0, 30.0, 40.0, 40.0);
    ctx.fill_path(&path, FillRule::EvenOdd);
    assert_eq!(ctx.surface().get_pixel(50, 50), Color::new(0, 0, 0, 0));
    assert_eq!(ctx.surface().get_pixel(22, 22), Color::new(255, 0, 0, 255));
}

#[test]
fn clip_to_circle_then_fill_whole_surface() {
    let mut ctx = Context::new(100, 100).unwrap();
    let mut clip_path = Path::new();
    clip_path.arc(50.0, 50.0, 30.0, 0.0, std::f64::consts::TAU, false);
    ctx.clip_path(&clip_path, FillRule::NonZero);
    ctx.set_fill_style(PaintSource::SolidColor(Color::new(255, 0, 0, 255)));
    ctx.fill_rect(0.0, 0.0, 100.0, 100.0);
    assert_eq!(ctx.surface().get_pixel(20, 20), Color::new(0, 0, 0, 0));
    assert_eq!(ctx.surface().get_pixel(50, 50), Color::new(255, 0, 0, 255));
}

/// S5: for a handful of rotated/unrotated rectangle sizes, `fill_rect`'s
/// fast-path output must be byte-identical to filling the same rectangle
/// through the general path pipeline.
#[test]
fn rotated_rect_fast_path_matches_general_path() {
    for &(w, h) in &[(20.0, 20.0), (21.0, 20.0), (20.0, 21.0), (21.0, 21.0)] {
        for &degrees in &[0.0, 30.0, 90.0, 175.0] {
            let radians = degrees * std::f64::consts::PI / 180.0;
            let color = Color::new(10, 200, 40, 255);

            let mut fast = Context::new(80, 80).unwrap();
            fast.translate(40.0, 40.0);
            fast.rotate(radians);
            fast.set_fill_style(PaintSource::SolidColor(color));
            fast.fill_rect(-w / 2.0, -h / 2.0, w, h);

            let mut general = Context::new(80, 80).unwrap();
            general.translate(40.0, 40.0);
            general.rotate(radians);
            general.set_fill_style(PaintSource::SolidColor(color));
            let mut path = Path::new();
            path.rect(-w / 2.0, -h / 2.0, w, h);
            general.fill_path(&path, FillRule::NonZero);

            assert_eq!(
                fast.surface().data(),
                general.surface().data(),
                "mismatch at w={w} h={h} degrees={degrees}"
            );
        }
    }
}

/// Circle fill's fast path draws the boundary analytically
/// (`sqrt(r^2 - dy^2)` per row); the general pipeline instead flattens the
/// same circle to a polygon before scan-converting it. The two are
/// independent approximations of the same curve, so unlike the rect parity
/// test above this only checks that they agree almost everywhere and never
/// drift by more than a pixel near the silhouette — not byte-for-byte.
#[test]
fn circle_fast_path_is_within_a_pixel_of_general_path() {
    let r = 24.0;
    let color = Color::new(10, 200, 40, 255);

    let mut fast = Context::new(80, 80).unwrap();
    fast.set_fill_style(PaintSource::SolidColor(color));
    fast.fill_circle(40.0, 40.0, r);

    let mut general = Context::new(80, 80).unwrap();
    general.set_fill_style(PaintSource::SolidColor(color));
    let mut path = Path::new();
    path.arc(40.0, 40.0, r, 0.0, std::f64::consts::TAU, false);
    general.fill_path(&path, FillRule::NonZero);

    let mut mismatches = 0u32;
    for y in 0..80 {
        for x in 0..80 {
            if fast.surface().get_pixel(x, y) != general.surface().get_pixel(x, y) {
                mismatches += 1;
            }
        }
    }
    // Any mismatch can only sit within one row-extent of the boundary
    // (roughly the circle's circumference in pixels); a structural
    // regression (e.g. a flipped sign, an off-by-one in the sweep range)
    // would instead disagree over a large fraction of the disc's area.
    let circumference = (2.0 * std::f64::consts::PI * r).ceil() as u32;
    assert!(
        mismatches <= circumference * 2,
        "circle fast path diverges from the general path by {mismatches} pixels, \
         more than the expected boundary-only slack"
    );
}

/// S6: every pixel strictly inside a rotated rounded-rect stroke's outer
/// outline and outside its inner outline is touched exactly once, so
/// alpha-blending never double-darkens a seam between outer and inner spans.
#[test]
fn rotated_round_rect_alpha_stroke_has_no_overdraw_seam() {
    let mut ctx = Context::new(240, 180).unwrap();
    let color = Color::new(0, 180, 0, 153);
    ctx.set_stroke_style(PaintSource::SolidColor(color));
    ctx.set_line_width(6.0);
    ctx.translate(120.0, 90.0);
    ctx.rotate(27.0 * std::f64::consts::PI / 180.0);
    ctx.stroke_round_rect(-50.0, -35.0, 100.0, 70.0, 15.0);

    // A seam pixel hit twice by alpha compositing would be darker than any
    // pixel hit once: no painted pixel should be darker than the color laid
    // down by a single SrcOver blend over transparent black.
    for y in 0..180 {
        for x in 0..240 {
            let p = ctx.surface().get_pixel(x, y);
            if p.a > 0 {
                assert!(p.g <= color.g, "pixel ({x},{y}) g={} exceeds single-pass blend", p.g);
            }
        }
    }
}

/// S7: a linear gradient is a straight-line interpolation in the source
/// color space; the midpoint of a black-to-white gradient is mid-gray.
#[test]
fn gradient_linearity() {
    let mut ctx = Context::new(100, 100).unwrap();
    let mut gradient = ctx.create_linear_gradient(0.0, 0.0, 100.0, 0.0);
    gradient.add_color_stop(0.0, Color::new(0, 0, 0, 255));
    gradient.add_color_stop(1.0, Color::new(255, 255, 255, 255));
    ctx.set_fill_style(gradient.finish());
    ctx.fill_rect(0.0, 0.0, 100.0, 100.0);
    let p = ctx.surface().get_pixel(50, 50);
    assert!((i16::from(p.r) - 128).abs() <= 1);
    assert!((i16::from(p.g) - 128).abs() <= 1);
    assert!((i16::from(p.b) - 128).abs() <= 1);
    assert_eq!(p.a, 255);
}

#[test]
fn save_restore_nests_and_compositing_survives_state_churn() {
    let mut ctx = Context::new(50, 50).unwrap();
    ctx.save();
    ctx.set_fill_style(PaintSource::SolidColor(Color::new(1, 2, 3, 255)));
    ctx.save();
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.translate(10.0, 10.0);
    ctx.set_fill_style(PaintSource::SolidColor(Color::new(200, 0, 0, 255)));
    ctx.fill_rect(0.0, 0.0, 5.0, 5.0);
    ctx.restore();
    ctx.fill_rect(0.0, 0.0, 5.0, 5.0);
    assert_eq!(ctx.surface().get_pixel(12, 12), Color::new(200, 0, 0, 255));
    assert_eq!(ctx.surface().get_pixel(2, 2), Color::new(1, 2, 3, 255));
    assert_eq!(ctx.state().transform, Transform::IDENTITY);
}
