// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot numeric count-up.
//!
//! A [`Counter`] climbs from zero to a target in a fixed number of equal
//! steps, one step per interval. Hosts start it the first time the watched
//! element becomes visible and drive [`step`](Counter::step) from a
//! repeating timer until it reports completion.

use alloc::string::String;

use crate::time::{Duration, Timebase};

/// Parameters of a count-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterConfig {
    /// Final value.
    pub target: f64,
    /// Number of increments to reach `target`.
    pub steps: u32,
    /// Time between increments.
    pub interval: Duration,
    /// Decimal places shown by [`Counter::text`].
    pub decimals: u8,
}

impl CounterConfig {
    /// The page's grade counter: 3.61 in 50 steps of 15ms, two decimals.
    #[must_use]
    pub const fn page(timebase: Timebase) -> Self {
        Self {
            target: 3.61,
            steps: 50,
            interval: Duration::from_millis(15, timebase),
            decimals: 2,
        }
    }

    /// Total time from the first to the last step.
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.interval.saturating_mul(self.steps as u64)
    }
}

/// A running (or finished) count-up.
#[derive(Clone, Copy, Debug)]
pub struct Counter {
    config: CounterConfig,
    step: u32,
}

impl Counter {
    /// Starts a count-up at zero.
    #[must_use]
    pub fn start(config: CounterConfig) -> Self {
        Self { config, step: 0 }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Advances one step and returns the new value, or `None` once the
    /// target has already been reached.
    pub fn step(&mut self) -> Option<f64> {
        if self.is_finished() {
            return None;
        }
        self.step += 1;
        Some(self.value())
    }

    /// Current value; exactly `target` once finished.
    #[must_use]
    pub fn value(&self) -> f64 {
        Self::value_for_step(&self.config, self.step)
    }

    /// Returns `true` once the target is reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.step >= self.config.steps
    }

    /// Value after `elapsed` since the start, for hosts that sample on their
    /// own clock instead of stepping.
    #[must_use]
    pub fn value_at(config: &CounterConfig, elapsed: Duration) -> f64 {
        let interval = config.interval.ticks();
        let step = if interval == 0 {
            config.steps
        } else {
            u32::try_from(elapsed.ticks() / interval).unwrap_or(u32::MAX)
        };
        Self::value_for_step(config, step)
    }

    /// Formats the current value with the configured number of decimals.
    #[must_use]
    pub fn text(&self) -> String {
        alloc::format!("{:.*}", usize::from(self.config.decimals), self.value())
    }

    fn value_for_step(config: &CounterConfig, step: u32) -> f64 {
        if step >= config.steps {
            config.target
        } else {
            config.target * f64::from(step) / f64::from(config.steps)
        }
    }
}
