// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element visual state.
//!
//! A [`VisualState`] is the only externally observable effect of the
//! sequencer: an opacity, a 2D offset, a uniform scale and the transition
//! timing used to move between states. Presenters translate it into the
//! platform's styling (CSS `opacity`, `transform`, `transition` on the web).
//!
//! A [`Flourish`] is a named one-shot animation that plays alongside the
//! base transition for emphasized elements.

use kurbo::Vec2;

use crate::time::Duration;

/// Timing function for a transition or flourish.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// The CSS `ease` curve.
    Ease,
    /// The CSS `ease-out` curve.
    EaseOut,
    /// A custom cubic Bézier with control points `(x1, y1)` and `(x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
}

/// How a presenter should interpolate into a new [`VisualState`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Length of the interpolation.
    pub duration: Duration,
    /// Timing function.
    pub easing: Easing,
}

/// Opacity, offset and scale of a single element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Translation from the element's laid-out position, in CSS pixels.
    pub offset: Vec2,
    /// Uniform scale factor.
    pub scale: f64,
    /// Transition used when this state is applied, if any.
    pub transition: Option<Transition>,
}

impl VisualState {
    /// Fully visible at the laid-out position, with no transition override.
    pub const REVEALED: Self = Self {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
        transition: None,
    };

    /// Invisible and pushed `dy` pixels down.
    #[must_use]
    pub const fn hidden(dy: f64) -> Self {
        Self {
            opacity: 0.0,
            offset: Vec2::new(0.0, dy),
            scale: 1.0,
            transition: None,
        }
    }

    /// Returns this state with the given scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Returns this state with the given transition.
    #[must_use]
    pub const fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Whether this state is fully visible at rest.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.opacity >= 1.0 && self.offset == Vec2::ZERO && self.scale == 1.0
    }
}

/// A named one-shot animation played concurrently with the reveal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flourish {
    /// Keyframes name understood by the presenter.
    pub name: &'static str,
    /// Animation length.
    pub duration: Duration,
    /// Timing function.
    pub easing: Easing,
}
