// Copyright 2026 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-state stack: transform, styles, and the lazily-allocated clip.

use crate::geom::Transform;
use crate::paint::PaintSource;
use crate::stencil::StencilBuffer;

/// Porter–Duff compositing operator. Re-exported from `peniko::Compose`,
/// which already enumerates exactly these ten modes.
pub use peniko::Compose as CompositeOperator;

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Intersect the offset lines; falls back to bevel past the miter limit.
    #[default]
    Miter,
    /// Connect the offset endpoints with a straight segment.
    Bevel,
    /// A fan of segments approximating a half-circle.
    Round,
}

/// Line cap style for open sub-paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// No extension past the endpoint.
    #[default]
    Butt,
    /// Extend by `lineWidth/2` along the tangent.
    Square,
    /// A half-disk of radius `lineWidth/2`.
    Round,
}

/// A dash pattern plus its starting offset along the path's arc length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineDash {
    /// Dash segment lengths. An odd-length pattern is conceptually doubled
    /// when walked (see [`LineDash::effective_pattern`]).
    pub pattern: Vec<f64>,
    /// Arc-length offset into the pattern at which dashing begins.
    pub offset: f64,
}

impl LineDash {
    /// Set the dash pattern. Negative segments are rejected (the whole call
    /// is a no-op, matching Canvas `setLineDash` validation).
    #[must_use]
    pub fn try_set(pattern: Vec<f64>) -> Option<Self> {
        if pattern.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return None;
        }
        Some(Self { pattern, offset: 0.0 })
    }

    /// The pattern actually walked: doubled if it has an odd length, as-is
    /// otherwise.
    #[must_use]
    pub fn effective_pattern(&self) -> Vec<f64> {
        if self.pattern.is_empty() {
            return Vec::new();
        }
        if self.pattern.len() % 2 == 1 {
            let mut doubled = self.pattern.clone();
            doubled.extend_from_slice(&self.pattern);
            doubled
        } else {
            self.pattern.clone()
        }
    }
}

/// Shadow configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Shadow color (straight RGBA, alpha modulated by the blurred coverage
    /// at render time).
    pub color: crate::color::Color,
    /// Gaussian-approximating blur radius; `0` disables blurring.
    pub blur: f64,
    /// Horizontal offset in device space.
    pub offset_x: f64,
    /// Vertical offset in device space.
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self { color: crate::color::Color::TRANSPARENT, blur: 0.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl Shadow {
    /// Whether this shadow configuration would actually paint anything:
    /// alpha > 0 and at least one of blur/offset is nonzero, or the color is
    /// visible at zero offset (a shadow directly beneath the shape).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.color.a > 0
    }
}

/// One mutable drawing-state record. `Context` holds the current state plus
/// a stack of saved snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState {
    /// Global alpha multiplier, in `[0, 1]`.
    pub global_alpha: f32,
    /// Active Porter–Duff operator.
    pub composite_operator: CompositeOperator,
    /// Current user-to-device transform.
    pub transform: Transform,
    /// Current fill paint source.
    pub fill_paint: PaintSource,
    /// Current stroke paint source.
    pub stroke_paint: PaintSource,
    /// Stroke width; always `> 0`.
    pub line_width: f64,
    /// Stroke join style.
    pub line_join: LineJoin,
    /// Stroke cap style.
    pub line_cap: LineCap,
    /// Miter length limit as a multiple of `line_width / 2`.
    pub miter_limit: f64,
    /// Dash pattern; empty means a solid stroke.
    pub line_dash: LineDash,
    /// Shadow configuration.
    pub shadow: Shadow,
    /// Lazily-allocated clip mask; `None` means "all visible".
    pub clip_mask: Option<StencilBuffer>,
}

impl DrawingState {
    /// The default state for a freshly constructed context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global_alpha: 1.0,
            composite_operator: CompositeOperator::SrcOver,
            transform: Transform::IDENTITY,
            fill_paint: PaintSource::SolidColor(crate::color::Color::BLACK),
            stroke_paint: PaintSource::SolidColor(crate::color::Color::BLACK),
            line_width: 1.0,
            line_join: LineJoin::Miter,
            line_cap: LineCap::Butt,
            miter_limit: 10.0,
            line_dash: LineDash::default(),
            shadow: Shadow::default(),
            clip_mask: None,
        }
    }
}

impl Default for DrawingState {
    fn default() -> Self {
        Self::new()
    }
}

/// The state stack: current state plus saved snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct StateStack {
    current: DrawingState,
    saved: Vec<DrawingState>,
}

impl StateStack {
    /// A fresh stack with one default state and no saved snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self { current: DrawingState::new(), saved: Vec::new() }
    }

    /// The current (top) state.
    #[must_use]
    pub fn current(&self) -> &DrawingState {
        &self.current
    }

    /// Mutable access to the current state.
    pub fn current_mut(&mut self) -> &mut DrawingState {
        &mut self.current
    }

    /// Push a deep copy of the current state, including a clone of the clip
    /// mask if one is allocated.
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Pop the most recent snapshot, replacing the current state. A no-op
    /// when the stack is empty (balanced-mismatch tolerance).
    pub fn restore(&mut self) {
        if let Some(prev) = self.saved.pop() {
            self.current = prev;
        }
    }

    /// Number of saved snapshots (not counting the current state).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_on_empty_stack_is_noop() {
        let mut stack = StateStack::new();
        stack.current_mut().global_alpha = 0.3;
        stack.restore();
        assert_eq!(stack.current().global_alpha, 0.3);
    }

    #[test]
    fn save_restore_roundtrips_all_fields() {
        let mut stack = StateStack::new();
        let before = stack.current().clone();
        stack.save();
        stack.current_mut().global_alpha = 0.1;
        stack.current_mut().line_width = 9.0;
        stack.restore();
        assert_eq!(stack.current(), &before);
    }

    #[test]
    fn dash_pattern_rejects_negative() {
        assert!(LineDash::try_set(vec![1.0, -1.0]).is_none());
    }

    #[test]
    fn odd_dash_pattern_is_doubled() {
        let d = LineDash { pattern: vec![5.0, 3.0, 2.0], offset: 0.0 };
        assert_eq!(d.effective_pattern(), vec![5.0, 3.0, 2.0, 5.0, 3.0, 2.0]);
    }
}
