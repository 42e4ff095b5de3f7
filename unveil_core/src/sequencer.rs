// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staggered, one-shot reveal sequencing.
//!
//! The [`Sequencer`] owns the registered elements, their lifecycle phase and
//! the pending reveal timers. Hosts drive it with three inputs:
//!
//! 1. [`register`](Sequencer::register) once the document's targets are
//!    known, then start observing each returned handle.
//! 2. [`on_visibility`](Sequencer::on_visibility) for every batch the
//!    visibility facility delivers. Each scheduled reveal in the returned
//!    [`BatchOutcome`] must be unobserved by the host and, on hosts with
//!    their own timer facility, armed as a platform timeout.
//! 3. [`fire_due`](Sequencer::fire_due) whenever a timer may have expired.
//!
//! After any of these, [`take_changes`](Sequencer::take_changes) yields the
//! style changes a [`Presenter`](crate::backend::Presenter) should apply.
//!
//! # Lifecycle
//!
//! ```text
//!   register        qualifying entry          deadline reached
//!  ──────────► Watching ──────────────► Scheduled ──────────────► Revealed
//!                 │                         │
//!                 │ reveal_all (fallback)   │ element detached
//!                 └────────► Revealed       └──► reveal dropped
//! ```
//!
//! Phases never move backwards, so an element is revealed at most once and
//! is never scheduled again after leaving `Watching`.

use alloc::vec::Vec;

use crate::config::{DetachPolicy, SequencerConfig, StaggerMode};
use crate::element::{Category, ElementId, ElementStore, Phase, StyleChanges};
use crate::time::{Duration, HostTime};
use crate::timer::{TimerId, TimerQueue};
use crate::visibility::VisibilityEntry;
use crate::visual::VisualState;

/// An element handed to [`Sequencer::register`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Target {
    /// Plain or emphasized.
    pub category: Category,
    /// The state the element already displays, if the caller set one.
    ///
    /// `None` means the sequencer applies the configured hidden state.
    pub visual: Option<VisualState>,
}

impl Target {
    /// A plain target that starts from the configured hidden state.
    pub const PLAIN: Self = Self {
        category: Category::Plain,
        visual: None,
    };

    /// An emphasized target that starts from the configured hidden state.
    pub const EMPHASIZED: Self = Self {
        category: Category::Emphasized,
        visual: None,
    };

    /// Marks the target as already displaying `visual`.
    #[must_use]
    pub const fn with_visual(mut self, visual: VisualState) -> Self {
        self.visual = Some(visual);
        self
    }
}

/// A reveal scheduled by [`Sequencer::on_visibility`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledReveal {
    /// Timer that will fire the reveal.
    pub timer: TimerId,
    /// Element to reveal. The host should stop observing it.
    pub element: ElementId,
    /// Stagger position within the batch.
    pub position: u32,
    /// Delay from the batch time to the deadline.
    pub delay: Duration,
    /// When the reveal is due.
    pub deadline: HostTime,
}

/// Result of handling one visibility batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Reveals scheduled by this batch, in stagger order.
    pub scheduled: Vec<ScheduledReveal>,
    /// Entries that did not lead to a reveal (not intersecting, stale
    /// handle, or element no longer watching).
    pub ignored: usize,
}

/// What happened when a reveal came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fired {
    /// The revealed state was applied.
    Revealed {
        /// The revealed element.
        element: ElementId,
        /// When the reveal was due.
        deadline: HostTime,
        /// Whether a flourish was attached as well.
        flourish: bool,
    },
    /// The element left the document; nothing was mutated.
    Dropped {
        /// The stale element handle.
        element: ElementId,
        /// When the reveal was due.
        deadline: HostTime,
    },
}

impl Fired {
    /// Returns the element the timer was for.
    #[must_use]
    pub const fn element(&self) -> ElementId {
        match *self {
            Self::Revealed { element, .. } | Self::Dropped { element, .. } => element,
        }
    }

    /// Returns `true` if the reveal was applied.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        matches!(self, Self::Revealed { .. })
    }
}

/// Watches registered elements and reveals each one, staggered, exactly
/// once.
#[derive(Debug)]
pub struct Sequencer {
    config: SequencerConfig,
    store: ElementStore,
    timers: TimerQueue,
    /// Pending timer per slot, for cancellation on detach.
    slot_timers: Vec<Option<TimerId>>,
    /// Deadline of the most recently scheduled reveal (global stagger).
    last_deadline: Option<HostTime>,
    batches: u64,
}

impl Sequencer {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            store: ElementStore::new(),
            timers: TimerQueue::new(),
            slot_timers: Vec::new(),
            last_deadline: None,
            batches: 0,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Returns the element store, for presenters.
    #[must_use]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Registers targets in document order and starts watching them.
    ///
    /// Targets without a caller-supplied state get the configured hidden
    /// state. Returns one handle per target, in order; an empty input does
    /// nothing.
    pub fn register(&mut self, targets: impl IntoIterator<Item = Target>) -> Vec<ElementId> {
        let mut ids = Vec::new();
        for target in targets {
            let id = match target.visual {
                Some(visual) => self.store.adopt(target.category, visual),
                None => self.store.insert(target.category, self.config.hidden),
            };
            self.store.advance_phase(id, Phase::Watching);
            let slot = id.index() as usize;
            if self.slot_timers.len() <= slot {
                self.slot_timers.resize(slot + 1, None);
            }
            self.slot_timers[slot] = None;
            ids.push(id);
        }
        ids
    }

    /// Handles one batch of visibility entries delivered at `now`.
    ///
    /// Intersecting entries for watching elements are ordered by enumeration
    /// index, regardless of their order in `batch`, and the k-th is scheduled
    /// `k * stagger` after `now` (see [`StaggerMode`] for the global variant).
    /// Every scheduled element is deregistered immediately.
    pub fn on_visibility(&mut self, now: HostTime, batch: &[VisibilityEntry]) -> BatchOutcome {
        self.batches += 1;

        let mut ready: Vec<(u32, ElementId)> = batch
            .iter()
            .filter(|entry| entry.is_intersecting)
            .filter(|entry| self.store.phase(entry.element) == Some(Phase::Watching))
            .filter_map(|entry| {
                self.store
                    .enumeration_index(entry.element)
                    .map(|n| (n, entry.element))
            })
            .collect();
        ready.sort_unstable_by_key(|(n, _)| *n);
        ready.dedup_by_key(|(n, _)| *n);

        let mut scheduled = Vec::with_capacity(ready.len());
        for (position, (_, element)) in (0_u32..).zip(ready) {
            let deadline = self.deadline_for(now, position);
            let timer = self.timers.schedule(deadline, element);
            self.store.advance_phase(element, Phase::Scheduled);
            self.slot_timers[element.index() as usize] = Some(timer);
            self.last_deadline = Some(deadline);
            scheduled.push(ScheduledReveal {
                timer,
                element,
                position,
                delay: deadline.saturating_duration_since(now),
                deadline,
            });
        }

        BatchOutcome {
            ignored: batch.len() - scheduled.len(),
            scheduled,
        }
    }

    fn deadline_for(&self, now: HostTime, position: u32) -> HostTime {
        let stagger = self.config.stagger;
        match self.config.stagger_mode {
            StaggerMode::BatchRelative => {
                now.saturating_add(stagger.saturating_mul(u64::from(position)))
            }
            StaggerMode::Global => match self.last_deadline {
                Some(last) => now.max(last.saturating_add(stagger)),
                None => now,
            },
        }
    }

    /// Fires every reveal due at or before `now`, in deadline order.
    pub fn fire_due(&mut self, now: HostTime) -> Vec<Fired> {
        let mut fired = Vec::new();
        while let Some(expired) = self.timers.pop_due(now) {
            let element = expired.element;
            if self.store.is_alive(element) {
                self.slot_timers[element.index() as usize] = None;
            }
            fired.push(self.reveal(element, expired.deadline));
        }
        fired
    }

    /// Applies the revealed state, and the flourish for emphasized elements.
    fn reveal(&mut self, element: ElementId, deadline: HostTime) -> Fired {
        if !self.store.advance_phase(element, Phase::Revealed) {
            return Fired::Dropped { element, deadline };
        }
        self.store.set_visual(element, self.config.revealed);
        let flourish = match (self.store.category(element), self.config.flourish) {
            (Some(Category::Emphasized), Some(flourish)) => {
                self.store.set_flourish(element, flourish)
            }
            _ => false,
        };
        Fired::Revealed {
            element,
            deadline,
            flourish,
        }
    }

    /// Records that an element left the document.
    ///
    /// Its handle goes stale. Under [`DetachPolicy::Cancel`] a pending reveal
    /// is cancelled; under [`DetachPolicy::Drop`] it stays queued and fires as
    /// [`Fired::Dropped`]. Returns `false` for an unknown or stale handle.
    pub fn detach(&mut self, element: ElementId) -> bool {
        if !self.store.is_alive(element) {
            return false;
        }
        let slot = element.index() as usize;
        if let Some(timer) = self.slot_timers[slot].take()
            && self.config.detach_policy == DetachPolicy::Cancel
        {
            self.timers.cancel(timer);
        }
        self.store.remove(element)
    }

    /// Reveals every still-watching element immediately.
    ///
    /// Used when the host has no visibility facility at all. Elements that
    /// are already scheduled keep their timers.
    pub fn reveal_all(&mut self, now: HostTime) -> Vec<Fired> {
        self.watching()
            .into_iter()
            .map(|element| self.reveal(element, now))
            .collect()
    }

    /// Returns the elements still waiting for visibility, in enumeration
    /// order.
    #[must_use]
    pub fn watching(&self) -> Vec<ElementId> {
        let mut ids: Vec<(u32, ElementId)> = self
            .store
            .ids()
            .filter(|&id| self.store.phase(id) == Some(Phase::Watching))
            .filter_map(|id| self.store.enumeration_index(id).map(|n| (n, id)))
            .collect();
        ids.sort_unstable_by_key(|(n, _)| *n);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Drains the style changes accumulated since the last call.
    pub fn take_changes(&mut self) -> StyleChanges {
        self.store.take_changes()
    }

    /// Returns the element's lifecycle phase.
    #[must_use]
    pub fn phase(&self, element: ElementId) -> Option<Phase> {
        self.store.phase(element)
    }

    /// Returns the element's current visual state.
    #[must_use]
    pub fn visual(&self, element: ElementId) -> Option<VisualState> {
        self.store.visual(element)
    }

    /// Returns the element's category.
    #[must_use]
    pub fn category(&self, element: ElementId) -> Option<Category> {
        self.store.category(element)
    }

    /// Returns the element's registration position.
    #[must_use]
    pub fn enumeration_index(&self, element: ElementId) -> Option<u32> {
        self.store.enumeration_index(element)
    }

    /// Returns when the next pending reveal is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.timers.next_deadline()
    }

    /// Returns the number of pending reveal timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Returns how many visibility batches have been handled.
    #[must_use]
    pub fn batches(&self) -> u64 {
        self.batches
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Insets, Rect};

    use super::*;
    use crate::time::Timebase;
    use crate::visibility::VisibilityWatcher;

    const T: HostTime = HostTime(1_000);

    fn config() -> SequencerConfig {
        SequencerConfig::reveal(Timebase::MILLIS)
    }

    fn visible(element: ElementId) -> VisibilityEntry {
        VisibilityEntry {
            element,
            ratio: 1.0,
            is_intersecting: true,
        }
    }

    fn revealed_at(fired: &[Fired]) -> Vec<ElementId> {
        fired
            .iter()
            .filter(|f| f.is_revealed())
            .map(Fired::element)
            .collect()
    }

    #[test]
    fn register_applies_hidden_state_unless_preset() {
        let mut seq = Sequencer::new(config());
        let preset = VisualState::hidden(10.0);
        let ids = seq.register([Target::PLAIN, Target::PLAIN.with_visual(preset)]);

        assert_eq!(seq.visual(ids[0]), Some(config().hidden));
        assert_eq!(seq.visual(ids[1]), Some(preset));
        assert_eq!(seq.phase(ids[0]), Some(Phase::Watching));

        let changes = seq.take_changes();
        assert_eq!(changes.added.len(), 2);
        assert_eq!(changes.opacities, [ids[0].index()], "preset left alone");
    }

    #[test]
    fn empty_register_is_noop() {
        let mut seq = Sequencer::new(config());
        assert!(seq.register([]).is_empty());
        assert!(seq.watching().is_empty());
        assert!(seq.take_changes().is_empty());
        assert!(seq.reveal_all(T).is_empty());
    }

    #[test]
    fn batch_of_three_is_staggered_by_thirty() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN; 3]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        let _ = seq.take_changes();

        // Delivered out of document order; stagger still follows it.
        let outcome = seq.on_visibility(T, &[visible(c), visible(a), visible(b)]);
        let deadlines: Vec<_> = outcome
            .scheduled
            .iter()
            .map(|s| (s.element, s.deadline))
            .collect();
        assert_eq!(
            deadlines,
            [(a, HostTime(1_000)), (b, HostTime(1_030)), (c, HostTime(1_060))]
        );
        assert_eq!(outcome.scheduled[2].delay, Duration(60));
        assert_eq!(outcome.scheduled[2].position, 2);

        assert_eq!(revealed_at(&seq.fire_due(HostTime(1_000))), [a]);
        assert_eq!(seq.phase(b), Some(Phase::Scheduled));
        assert!(seq.fire_due(HostTime(1_029)).is_empty());
        assert_eq!(revealed_at(&seq.fire_due(HostTime(1_030))), [b]);
        assert_eq!(revealed_at(&seq.fire_due(HostTime(1_060))), [c]);
        assert!(seq.fire_due(HostTime(10_000)).is_empty(), "each exactly once");

        for id in ids {
            assert_eq!(seq.phase(id), Some(Phase::Revealed));
            assert_eq!(seq.visual(id), Some(VisualState::REVEALED));
        }
    }

    #[test]
    fn revealed_elements_ignore_later_batches() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN; 2]);
        seq.on_visibility(T, &[visible(ids[0]), visible(ids[1])]);
        assert_eq!(seq.fire_due(HostTime(2_000)).len(), 2);
        let _ = seq.take_changes();

        let outcome = seq.on_visibility(HostTime(3_000), &[visible(ids[0]), visible(ids[1])]);
        assert!(outcome.scheduled.is_empty());
        assert_eq!(outcome.ignored, 2);
        assert!(seq.fire_due(HostTime(10_000)).is_empty());
        assert!(seq.take_changes().is_empty(), "no second mutation");
    }

    #[test]
    fn scroll_away_and_back_does_not_retrigger() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN]);
        let a = ids[0];
        let mut watcher = VisibilityWatcher::new(seq.config().threshold, seq.config().root_margin);
        watcher.observe(a);

        let viewport = |scroll: f64| Rect::new(0.0, scroll, 800.0, scroll + 600.0);
        let bounds = |_| Some(Rect::new(0.0, 900.0, 100.0, 1000.0));

        // Off screen at first.
        let batch = watcher.update(viewport(0.0), bounds);
        assert!(seq.on_visibility(T, &batch).scheduled.is_empty());

        // Scroll down: visible, scheduled, deregistered.
        let batch = watcher.update(viewport(500.0), bounds);
        let outcome = seq.on_visibility(HostTime(1_100), &batch);
        assert_eq!(outcome.scheduled.len(), 1);
        for s in &outcome.scheduled {
            watcher.unobserve(s.element);
        }
        seq.fire_due(HostTime(1_100));
        let _ = seq.take_changes();

        // Scroll away and back.
        for scroll in [0.0, 500.0, 0.0, 500.0] {
            let batch = watcher.update(viewport(scroll), bounds);
            assert!(batch.is_empty(), "no longer observed");
            seq.on_visibility(HostTime(1_200), &batch);
        }
        assert!(seq.fire_due(HostTime(5_000)).is_empty());
        assert!(seq.take_changes().is_empty());
        assert!(!watcher.is_observing(a));
    }

    #[test]
    fn emphasized_elements_get_flourish() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN, Target::EMPHASIZED]);
        let (plain, emphasized) = (ids[0], ids[1]);
        let _ = seq.take_changes();

        seq.on_visibility(T, &[visible(plain), visible(emphasized)]);
        let fired = seq.fire_due(HostTime(1_030));
        assert_eq!(
            fired,
            [
                Fired::Revealed {
                    element: plain,
                    deadline: HostTime(1_000),
                    flourish: false,
                },
                Fired::Revealed {
                    element: emphasized,
                    deadline: HostTime(1_030),
                    flourish: true,
                },
            ]
        );

        // Both get the base transition; only one gets the flourish, in the
        // same change set.
        let changes = seq.take_changes();
        assert_eq!(changes.opacities, [plain.index(), emphasized.index()]);
        assert_eq!(changes.flourishes, [emphasized.index()]);
        assert_eq!(seq.store().flourish(plain), None);
        assert_eq!(seq.store().flourish(emphasized), config().flourish);
    }

    #[test]
    fn detached_before_deadline_is_dropped_silently() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN; 2]);
        let (a, b) = (ids[0], ids[1]);
        seq.on_visibility(T, &[visible(a), visible(b)]);
        seq.fire_due(T);
        let _ = seq.take_changes();

        // b was due at T+30; it leaves the document at T+10.
        assert!(seq.detach(b));
        assert_eq!(seq.pending(), 1, "drop policy keeps the timer");

        let fired = seq.fire_due(HostTime(1_030));
        assert_eq!(
            fired,
            [Fired::Dropped {
                element: b,
                deadline: HostTime(1_030),
            }]
        );
        let changes = seq.take_changes();
        assert_eq!(changes.removed, [b.index()]);
        assert!(changes.opacities.is_empty(), "no visual mutation");
        assert_eq!(seq.visual(b), None);
    }

    #[test]
    fn cancel_policy_removes_pending_timer() {
        let mut config = config();
        config.detach_policy = DetachPolicy::Cancel;
        let mut seq = Sequencer::new(config);
        let ids = seq.register([Target::PLAIN; 2]);
        seq.on_visibility(T, &[visible(ids[0]), visible(ids[1])]);
        assert_eq!(seq.pending(), 2);

        seq.detach(ids[1]);
        assert_eq!(seq.pending(), 1);
        assert_eq!(seq.next_deadline(), Some(T));
        assert_eq!(revealed_at(&seq.fire_due(HostTime(1_030))), [ids[0]]);
        assert!(seq.fire_due(HostTime(5_000)).is_empty());
    }

    #[test]
    fn detach_is_absence_tolerant() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN]);
        assert!(seq.detach(ids[0]));
        assert!(!seq.detach(ids[0]));
        let outcome = seq.on_visibility(T, &[visible(ids[0])]);
        assert!(outcome.scheduled.is_empty());
        assert_eq!(outcome.ignored, 1);
    }

    #[test]
    fn slot_reuse_does_not_inherit_pending_reveal() {
        let mut seq = Sequencer::new(config());
        let old = seq.register([Target::PLAIN])[0];
        seq.on_visibility(T, &[visible(old)]);
        seq.detach(old);
        let new = seq.register([Target::PLAIN])[0];
        assert_eq!(old.index(), new.index());

        let fired = seq.fire_due(T);
        assert_eq!(fired.len(), 1);
        assert!(!fired[0].is_revealed());
        assert_eq!(seq.phase(new), Some(Phase::Watching));
    }

    #[test]
    fn batch_relative_stagger_restarts_per_batch() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN; 3]);
        seq.on_visibility(T, &[visible(ids[0]), visible(ids[1])]);
        let outcome = seq.on_visibility(HostTime(1_005), &[visible(ids[2])]);
        assert_eq!(outcome.scheduled[0].position, 0);
        assert_eq!(outcome.scheduled[0].deadline, HostTime(1_005));
        // Cross-batch order is not preserved: c fires before b.
        let order: Vec<_> = seq.fire_due(HostTime(2_000)).iter().map(Fired::element).collect();
        assert_eq!(order, [ids[0], ids[2], ids[1]]);
        assert_eq!(seq.batches(), 2);
    }

    #[test]
    fn global_stagger_keeps_order_across_batches() {
        let mut config = config();
        config.stagger_mode = StaggerMode::Global;
        let mut seq = Sequencer::new(config);
        let ids = seq.register([Target::PLAIN; 4]);

        let first = seq.on_visibility(T, &[visible(ids[0]), visible(ids[1])]);
        assert_eq!(first.scheduled[1].deadline, HostTime(1_030));
        let second = seq.on_visibility(HostTime(1_005), &[visible(ids[2])]);
        assert_eq!(second.scheduled[0].deadline, HostTime(1_060));
        assert_eq!(second.scheduled[0].delay, Duration(55));

        // Long idle: the next reveal is not delayed.
        seq.fire_due(HostTime(2_000));
        let third = seq.on_visibility(HostTime(5_000), &[visible(ids[3])]);
        assert_eq!(third.scheduled[0].deadline, HostTime(5_000));
    }

    #[test]
    fn non_intersecting_and_duplicate_entries() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN; 2]);
        let hidden = VisibilityEntry {
            element: ids[0],
            ratio: 0.01,
            is_intersecting: false,
        };
        let outcome = seq.on_visibility(T, &[hidden, visible(ids[1]), visible(ids[1])]);
        assert_eq!(outcome.scheduled.len(), 1);
        assert_eq!(outcome.scheduled[0].element, ids[1]);
        assert_eq!(outcome.scheduled[0].position, 0);
        assert_eq!(outcome.ignored, 2);
        assert_eq!(seq.phase(ids[0]), Some(Phase::Watching));
    }

    #[test]
    fn fallback_reveals_everything_still_watching() {
        let mut seq = Sequencer::new(config());
        let ids = seq.register([Target::PLAIN, Target::EMPHASIZED, Target::PLAIN]);
        seq.on_visibility(T, &[visible(ids[2])]);

        let fired = seq.reveal_all(HostTime(1_001));
        assert_eq!(revealed_at(&fired), [ids[0], ids[1]]);
        assert!(matches!(fired[1], Fired::Revealed { flourish: true, .. }));
        assert_eq!(seq.phase(ids[2]), Some(Phase::Scheduled), "keeps its timer");
        assert_eq!(revealed_at(&seq.fire_due(HostTime(1_001))), [ids[2]]);
        assert!(seq.watching().is_empty());
    }

    #[test]
    fn instant_preset_reveals_whole_batch_at_once() {
        let mut seq = Sequencer::new(SequencerConfig::instant(Timebase::MILLIS));
        let ids = seq.register([Target::PLAIN; 3]);
        let batch: Vec<_> = ids.iter().copied().map(visible).collect();
        let outcome = seq.on_visibility(T, &batch);
        assert!(outcome.scheduled.iter().all(|s| s.deadline == T));
        assert_eq!(seq.fire_due(T).len(), 3);
        let revealed = seq.visual(ids[0]).unwrap();
        assert!(revealed.is_revealed());
        assert!(revealed.transition.is_some());
        // Sanity: the root margin of the instant preset is zero.
        assert_eq!(seq.config().root_margin, Insets::ZERO);
    }
}
