// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the reveal pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! host drivers call as they register elements, feed visibility batches and
//! fire timers. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::element::ElementId;
use crate::sequencer::{BatchOutcome, Fired, ScheduledReveal};
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a group of targets is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterEvent {
    /// Host time of registration.
    pub now: HostTime,
    /// Enumeration index of the first registered target.
    pub first_enumeration: u32,
    /// Number of targets registered.
    pub count: u32,
}

/// Emitted after a visibility batch has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchEvent {
    /// Batch counter, starting at 1.
    pub batch_index: u64,
    /// Host time the batch was delivered.
    pub now: HostTime,
    /// Number of reveals scheduled.
    pub scheduled: u32,
    /// Number of entries that led nowhere.
    pub ignored: u32,
}

impl BatchEvent {
    /// Summarizes a [`BatchOutcome`].
    #[must_use]
    pub fn new(batch_index: u64, now: HostTime, outcome: &BatchOutcome) -> Self {
        Self {
            batch_index,
            now,
            scheduled: saturating_u32(outcome.scheduled.len()),
            ignored: saturating_u32(outcome.ignored),
        }
    }
}

/// Emitted for each reveal a batch schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleEvent {
    /// Batch counter of the scheduling batch.
    pub batch_index: u64,
    /// Element to reveal.
    pub element: ElementId,
    /// Stagger position within the batch.
    pub position: u32,
    /// Host time the reveal was scheduled.
    pub scheduled_at: HostTime,
    /// When the reveal is due.
    pub deadline: HostTime,
}

impl ScheduleEvent {
    /// Creates a `ScheduleEvent` from a [`ScheduledReveal`] plus the batch it
    /// came from (which the reveal itself does not carry).
    #[must_use]
    pub fn new(batch_index: u64, now: HostTime, reveal: &ScheduledReveal) -> Self {
        Self {
            batch_index,
            element: reveal.element,
            position: reveal.position,
            scheduled_at: now,
            deadline: reveal.deadline,
        }
    }
}

/// Emitted when a reveal is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealEvent {
    /// The revealed element.
    pub element: ElementId,
    /// When the reveal was due.
    pub deadline: HostTime,
    /// When the host actually fired it.
    pub fired_at: HostTime,
    /// Whether the flourish was attached.
    pub flourish: bool,
}

/// Emitted when a reveal fires for an element that left the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropEvent {
    /// The stale element handle.
    pub element: ElementId,
    /// When the reveal was due.
    pub deadline: HostTime,
    /// When the host fired it.
    pub fired_at: HostTime,
}

/// Emitted when the host has no visibility facility and reveals everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FallbackEvent {
    /// Host time of the fallback.
    pub now: HostTime,
    /// Number of elements revealed.
    pub revealed: u32,
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a reveal driver.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after targets are registered.
    fn on_register(&mut self, e: &RegisterEvent) {
        _ = e;
    }

    /// Called after a visibility batch is handled.
    fn on_batch(&mut self, e: &BatchEvent) {
        _ = e;
    }

    /// Called for every scheduled reveal.
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        _ = e;
    }

    /// Called when a reveal is applied.
    fn on_reveal(&mut self, e: &RevealEvent) {
        _ = e;
    }

    /// Called when a reveal is dropped.
    fn on_drop(&mut self, e: &DropEvent) {
        _ = e;
    }

    /// Called when everything is revealed without visibility tracking.
    fn on_fallback(&mut self, e: &FallbackEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RegisterEvent`].
    #[inline]
    pub fn register(&mut self, e: &RegisterEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_register(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BatchEvent`].
    #[inline]
    pub fn batch(&mut self, e: &BatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_batch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScheduleEvent`].
    #[inline]
    pub fn schedule(&mut self, e: &ScheduleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_schedule(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RevealEvent`].
    #[inline]
    pub fn reveal(&mut self, e: &RevealEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_reveal(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DropEvent`].
    #[inline]
    pub fn drop_reveal(&mut self, e: &DropEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_drop(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FallbackEvent`].
    #[inline]
    pub fn fallback(&mut self, e: &FallbackEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fallback(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BatchEvent`] plus one [`ScheduleEvent`] per scheduled reveal.
    #[inline]
    pub fn outcome(&mut self, batch_index: u64, now: HostTime, outcome: &BatchOutcome) {
        for reveal in &outcome.scheduled {
            self.schedule(&ScheduleEvent::new(batch_index, now, reveal));
        }
        self.batch(&BatchEvent::new(batch_index, now, outcome));
    }

    /// Emits a [`RevealEvent`] or [`DropEvent`] for each fired timer.
    #[inline]
    pub fn fired(&mut self, now: HostTime, fired: &[Fired]) {
        for f in fired {
            match *f {
                Fired::Revealed {
                    element,
                    deadline,
                    flourish,
                } => self.reveal(&RevealEvent {
                    element,
                    deadline,
                    fired_at: now,
                    flourish,
                }),
                Fired::Dropped { element, deadline } => self.drop_reveal(&DropEvent {
                    element,
                    deadline,
                    fired_at: now,
                }),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::time::Duration;
    use crate::timer::TimerId;

    fn sample_reveal() -> ScheduledReveal {
        ScheduledReveal {
            timer: TimerId(3),
            element: ElementId::from_raw(2, 0),
            position: 1,
            delay: Duration(30),
            deadline: HostTime(1_030),
        }
    }

    #[test]
    fn schedule_event_from_reveal() {
        let evt = ScheduleEvent::new(4, HostTime(1_000), &sample_reveal());
        assert_eq!(evt.batch_index, 4);
        assert_eq!(evt.element, ElementId::from_raw(2, 0));
        assert_eq!(evt.position, 1);
        assert_eq!(evt.scheduled_at, HostTime(1_000));
        assert_eq!(evt.deadline, HostTime(1_030));
    }

    #[test]
    fn batch_event_counts() {
        let outcome = BatchOutcome {
            scheduled: vec![sample_reveal()],
            ignored: 3,
        };
        let evt = BatchEvent::new(1, HostTime(5), &outcome);
        assert_eq!(evt.scheduled, 1);
        assert_eq!(evt.ignored, 3);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_register(&RegisterEvent {
            now: HostTime(0),
            first_enumeration: 0,
            count: 3,
        });
        sink.on_fallback(&FallbackEvent {
            now: HostTime(0),
            revealed: 3,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.fired(
            HostTime(0),
            &[Fired::Dropped {
                element: ElementId::from_raw(0, 1),
                deadline: HostTime(0),
            }],
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct RecordingSink {
            reveals: Vec<(u32, bool)>,
            drops: usize,
            schedules: Vec<u32>,
            batches: usize,
        }
        impl TraceSink for RecordingSink {
            fn on_reveal(&mut self, e: &RevealEvent) {
                self.reveals.push((e.element.index(), e.flourish));
            }
            fn on_drop(&mut self, _: &DropEvent) {
                self.drops += 1;
            }
            fn on_schedule(&mut self, e: &ScheduleEvent) {
                self.schedules.push(e.position);
            }
            fn on_batch(&mut self, _: &BatchEvent) {
                self.batches += 1;
            }
        }

        let mut sink = RecordingSink::default();
        let mut tracer = Tracer::new(&mut sink);
        let outcome = BatchOutcome {
            scheduled: vec![sample_reveal()],
            ignored: 0,
        };
        tracer.outcome(1, HostTime(1_000), &outcome);
        tracer.fired(
            HostTime(1_030),
            &[
                Fired::Revealed {
                    element: ElementId::from_raw(2, 0),
                    deadline: HostTime(1_030),
                    flourish: true,
                },
                Fired::Dropped {
                    element: ElementId::from_raw(5, 1),
                    deadline: HostTime(1_030),
                },
            ],
        );
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.reveals, [(2, true)]);
        assert_eq!(sink.drops, 1);
        assert_eq!(sink.schedules, [1]);
        assert_eq!(sink.batches, 1);
    }
}
