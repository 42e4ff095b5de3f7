// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Unveil splits platform-specific work into *backend* crates. Each backend
//! provides the following pieces:
//!
//! - **Time**: `now() -> HostTime` and `timebase() -> Timebase` free
//!   functions that read the platform's monotonic clock.
//!
//! - **Visibility source**: turns platform visibility callbacks (e.g.
//!   `IntersectionObserver`) into [`VisibilityEntry`] batches. Setup and
//!   lifecycle differ too much across platforms for a trait, so this is
//!   backend-specific.
//!
//! - **Timers**: arms a one-shot platform timer for each
//!   [`ScheduledReveal`] and calls [`Sequencer::fire_due`] when it expires.
//!
//! - **Presenter**: implements the [`Presenter`] trait to apply style
//!   changes to platform-native elements.
//!
//! # Crate boundaries
//!
//! `unveil_core` owns the data model, the sequencer and this contract module.
//! Backend crates depend on `unveil_core` and provide platform glue.
//!
//! [`VisibilityEntry`]: crate::visibility::VisibilityEntry
//! [`ScheduledReveal`]: crate::sequencer::ScheduledReveal
//! [`Sequencer::fire_due`]: crate::sequencer::Sequencer::fire_due

use crate::element::{ElementStore, StyleChanges};

/// Applies style changes to a platform-native element tree.
///
/// DOM presenters and test doubles implement this trait.
///
/// # Event loop pseudocode
///
/// ```rust,ignore
/// fn on_visibility(entries: &[VisibilityEntry]) {
///     let outcome = sequencer.on_visibility(now(), entries);
///     for reveal in &outcome.scheduled {
///         observer.unobserve(reveal.element);
///         set_timeout(reveal.delay, on_timer);
///     }
/// }
///
/// fn on_timer() {
///     sequencer.fire_due(now());
///     let changes = sequencer.take_changes();
///     presenter.apply(sequencer.store(), &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`StyleChanges`] to the backing elements, reading
    /// current values from `store` as needed.
    fn apply(&mut self, store: &ElementStore, changes: &StyleChanges);
}
