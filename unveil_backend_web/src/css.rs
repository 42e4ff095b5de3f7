// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS text for visual states.
//!
//! Pure string formatting, kept apart from the DOM calls so it can be tested
//! on native targets.

use alloc::format;
use alloc::string::String;

use kurbo::{Insets, Vec2};
use unveil_core::time::{Duration, Timebase};
use unveil_core::visual::{Easing, Flourish, Transition, VisualState};

/// Name of the bounce flourish used by the reveal preset.
pub const BOUNCE_IN: &str = "bounceIn";

/// Keyframes for [`BOUNCE_IN`]: fade in from a small, lowered card, overshoot
/// slightly, then settle.
pub const BOUNCE_IN_KEYFRAMES: &str = "@keyframes bounceIn {\
    0% { opacity: 0; transform: scale(0.3) translateY(30px); }\
    50% { transform: scale(1.05) translateY(-5px); }\
    100% { opacity: 1; transform: scale(1) translateY(0); }\
}";

/// `opacity` value.
#[must_use]
pub fn opacity(opacity: f32) -> String {
    format!("{opacity}")
}

/// `transform` value, `none` for the identity.
#[must_use]
pub fn transform(offset: Vec2, scale: f64) -> String {
    match (offset == Vec2::ZERO, scale == 1.0) {
        (true, true) => String::from("none"),
        (false, true) => format!("translate({}px, {}px)", offset.x, offset.y),
        (true, false) => format!("scale({scale})"),
        (false, false) => format!("translate({}px, {}px) scale({scale})", offset.x, offset.y),
    }
}

/// `transform` value of a visual state.
#[must_use]
pub fn state_transform(state: &VisualState) -> String {
    transform(state.offset, state.scale)
}

/// Timing function keyword or `cubic-bezier()` value.
#[must_use]
pub fn easing(easing: Easing) -> String {
    match easing {
        Easing::Linear => String::from("linear"),
        Easing::Ease => String::from("ease"),
        Easing::EaseOut => String::from("ease-out"),
        Easing::CubicBezier(x1, y1, x2, y2) => format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"),
    }
}

/// Duration in whole milliseconds, as `<n>ms`.
#[must_use]
pub fn millis(duration: Duration, timebase: Timebase) -> String {
    format!("{}ms", duration.as_millis(timebase))
}

/// `transition` value covering every property.
#[must_use]
pub fn transition(transition: &Transition, timebase: Timebase) -> String {
    format!(
        "all {} {}",
        millis(transition.duration, timebase),
        easing(transition.easing)
    )
}

/// `animation` value that plays a flourish once and keeps its final frame.
#[must_use]
pub fn animation(flourish: &Flourish, timebase: Timebase) -> String {
    format!(
        "{} {} {} forwards",
        flourish.name,
        millis(flourish.duration, timebase),
        easing(flourish.easing)
    )
}

/// `rootMargin` string (top, right, bottom, left).
#[must_use]
pub fn root_margin(margin: Insets) -> String {
    format!(
        "{}px {}px {}px {}px",
        margin.y0, margin.x1, margin.y1, margin.x0
    )
}
