// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for unveil.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RevealDriver`]: finds a page's targets and runs them through a
//!   [`Sequencer`](unveil_core::sequencer::Sequencer) using
//!   `IntersectionObserver` and `setTimeout`
//! - [`CounterDriver`]: visibility-triggered count-up on `setInterval`
//! - [`DomPresenter`]: inline-style presentation of element states
//! - [`VisibilityObserver`]: `IntersectionObserver` batches
//! - [`css`]: CSS text for visual states
//!
//! # Example
//!
//! ```rust,ignore
//! let document = web_sys::window().unwrap().document().unwrap();
//! let tb = unveil_backend_web::timebase();
//! let reveal = RevealDriver::start(
//!     &document,
//!     SequencerConfig::reveal(tb),
//!     DocumentContract::REVEAL,
//!     None,
//! )?;
//! let cards = RevealDriver::start(
//!     &document,
//!     SequencerConfig::instant(tb),
//!     DocumentContract::CARDS,
//!     None,
//! )?;
//! // Drivers stop when dropped; keep them for the page's lifetime.
//! core::mem::forget((reveal, cards));
//! ```

#![no_std]

extern crate alloc;

pub mod css;

mod counter;
mod driver;
mod observer;
mod presenter;
mod timers;

pub use counter::CounterDriver;
pub use driver::{DocumentContract, RevealDriver};
pub use observer::{VisibilityObserver, is_supported};
pub use presenter::DomPresenter;
pub use unveil_core::backend::Presenter;

use unveil_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    let ms = timers::performance_now();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
///
/// `Timebase { numer: 1000, denom: 1 }` means `nanoseconds = ticks × 1000`.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::new(1000, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::config::SequencerConfig;
    use unveil_core::time::Duration;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        // 1 tick = 1 µs = 1000 ns
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }

    #[test]
    fn stagger_becomes_whole_millisecond_delays() {
        let config = SequencerConfig::reveal(timebase());
        assert_eq!(timers::delay_ms(config.stagger), 30);
        assert_eq!(timers::delay_ms(config.stagger.saturating_mul(2)), 60);
        assert_eq!(timers::delay_ms(Duration(10_000_000_000_000)), i32::MAX);
    }
}
