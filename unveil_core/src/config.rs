// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequencer configuration and presets.

use kurbo::Insets;

use crate::time::{Duration, Timebase};
use crate::visual::{Easing, Flourish, Transition, VisualState};

/// How the stagger position of a newly visible element is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StaggerMode {
    /// Position within the visibility batch; every batch restarts at zero.
    ///
    /// Ordering holds inside a batch only.
    #[default]
    BatchRelative,
    /// Each reveal lands at least one stagger interval after the previously
    /// scheduled one, across batches.
    Global,
}

/// What happens to a pending reveal when its element leaves the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetachPolicy {
    /// Leave the timer in place; when it fires the reveal is dropped.
    #[default]
    Drop,
    /// Cancel the timer at detach time.
    Cancel,
}

/// Configuration for the [`Sequencer`](crate::sequencer::Sequencer).
#[derive(Clone, Copy, Debug)]
pub struct SequencerConfig {
    /// Fraction of an element's area that must be inside the trigger region.
    pub threshold: f64,
    /// Adjustment of the viewport used as the trigger region, with CSS
    /// `rootMargin` semantics: positive values grow the region, negative
    /// values shrink it.
    pub root_margin: Insets,
    /// Delay multiplier applied per stagger position.
    pub stagger: Duration,
    /// How stagger positions are assigned.
    pub stagger_mode: StaggerMode,
    /// Handling of pending reveals for detached elements.
    pub detach_policy: DetachPolicy,
    /// State applied at registration, unless the caller supplied one.
    pub hidden: VisualState,
    /// State applied when the reveal fires.
    pub revealed: VisualState,
    /// Extra animation for [`Emphasized`](crate::element::Category::Emphasized)
    /// elements, played concurrently with the reveal.
    pub flourish: Option<Flourish>,
}

impl SequencerConfig {
    /// Staggered scroll reveal: 5% threshold, trigger region pulled up 20px
    /// from the bottom edge, 30ms stagger, and a 300ms bounce for emphasized
    /// elements.
    #[must_use]
    pub const fn reveal(timebase: Timebase) -> Self {
        Self {
            threshold: 0.05,
            root_margin: Insets::new(0.0, 0.0, 0.0, -20.0),
            stagger: Duration::from_millis(30, timebase),
            stagger_mode: StaggerMode::BatchRelative,
            detach_policy: DetachPolicy::Drop,
            hidden: VisualState::hidden(30.0),
            revealed: VisualState::REVEALED,
            flourish: Some(Flourish {
                name: "bounceIn",
                duration: Duration::from_millis(300, timebase),
                easing: Easing::EaseOut,
            }),
        }
    }

    /// Immediate reveal for cards: lowered and slightly shrunk, 100ms
    /// transition, no stagger.
    #[must_use]
    pub const fn instant(timebase: Timebase) -> Self {
        let transition = Transition {
            duration: Duration::from_millis(100, timebase),
            easing: Easing::CubicBezier(0.4, 0.0, 0.2, 1.0),
        };
        Self {
            threshold: 0.05,
            root_margin: Insets::ZERO,
            stagger: Duration::ZERO,
            stagger_mode: StaggerMode::BatchRelative,
            detach_policy: DetachPolicy::Drop,
            hidden: VisualState::hidden(30.0)
                .with_scale(0.95)
                .with_transition(transition),
            revealed: VisualState::REVEALED.with_transition(transition),
            flourish: None,
        }
    }

    /// Immediate reveal for running text: pushed 20px down, 100ms `ease`
    /// transition, no stagger.
    #[must_use]
    pub const fn text(timebase: Timebase) -> Self {
        let transition = Transition {
            duration: Duration::from_millis(100, timebase),
            easing: Easing::Ease,
        };
        Self {
            hidden: VisualState::hidden(20.0).with_transition(transition),
            revealed: VisualState::REVEALED.with_transition(transition),
            ..Self::instant(timebase)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_preset_in_web_ticks() {
        let config = SequencerConfig::reveal(Timebase::new(1000, 1));
        assert_eq!(config.stagger, Duration(30_000));
        assert_eq!(config.root_margin.y1, -20.0);
        let flourish = config.flourish.unwrap();
        assert_eq!(flourish.duration, Duration(300_000));
    }

    #[test]
    fn instant_preset_has_no_stagger() {
        let config = SequencerConfig::instant(Timebase::MILLIS);
        assert_eq!(config.stagger, Duration::ZERO);
        assert!(config.flourish.is_none());
        assert_eq!(config.hidden.scale, 0.95);
        assert_eq!(
            config.revealed.transition.map(|t| t.duration),
            Some(Duration(100))
        );
    }

    #[test]
    fn text_preset_differs_only_in_visuals() {
        let text = SequencerConfig::text(Timebase::MILLIS);
        let instant = SequencerConfig::instant(Timebase::MILLIS);
        assert_eq!(text.hidden.offset.y, 20.0);
        assert_eq!(text.hidden.scale, 1.0);
        assert_eq!(text.stagger, instant.stagger);
        assert_eq!(text.root_margin, instant.root_margin);
        assert_eq!(
            text.revealed.transition.map(|t| t.easing),
            Some(Easing::Ease)
        );
    }
}
