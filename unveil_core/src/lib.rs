// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types and state machine for scroll-triggered reveals.
//!
//! `unveil_core` watches registered document elements and, when each one
//! first becomes visible, reveals it exactly once after a staggered delay.
//! It is `no_std` compatible (with `alloc`), performs no I/O and reads no
//! clock: hosts pass the current time into every operation, which keeps
//! every schedule deterministic and testable.
//!
//! # Architecture
//!
//! ```text
//!   Backend (visibility source)
//!       │  batches of VisibilityEntry
//!       ▼
//!   Sequencer::on_visibility() ──► BatchOutcome ──► host arms timers,
//!       │                                             unobserves elements
//!       ▼
//!   TimerQueue ──► Sequencer::fire_due() ──► ElementStore (dirty channels)
//!                                                    │
//!                 ┌──────────────────────────────────┘
//!                 ▼
//!   Sequencer::take_changes() ──► StyleChanges ──► Presenter::apply()
//! ```
//!
//! **[`sequencer`]**: Per-element lifecycle (`Watching` → `Scheduled` →
//! `Revealed`), stagger computation, at-most-once reveal, stale-handle
//! tolerance and the no-visibility fallback.
//!
//! **[`element`]**: Struct-of-arrays element storage with generational
//! handles. Style mutations mark [`dirty`] channels.
//!
//! **[`visibility`]**: Intersection geometry plus a software watcher that
//! emulates batched visibility delivery for native hosts and tests.
//!
//! **[`timer`]**: Deadline-ordered one-shot timers with lazy cancellation.
//!
//! **[`visual`]**: Opacity/offset/scale states, transitions and flourishes.
//!
//! **[`config`]**: Sequencer configuration with page presets.
//!
//! **[`counter`]**: One-shot numeric count-up driven by a repeating timer.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait that
//! platform backends implement to apply style changes.
//!
//! **[`time`]**: Host ticks, timebases and durations.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! instrumentation, with zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Example
//!
//! ```
//! use unveil_core::config::SequencerConfig;
//! use unveil_core::sequencer::{Sequencer, Target};
//! use unveil_core::time::{HostTime, Timebase};
//! use unveil_core::visibility::VisibilityEntry;
//!
//! let mut seq = Sequencer::new(SequencerConfig::reveal(Timebase::MILLIS));
//! let ids = seq.register([Target::PLAIN, Target::EMPHASIZED]);
//!
//! let batch: Vec<_> = ids
//!     .iter()
//!     .map(|&element| VisibilityEntry { element, ratio: 1.0, is_intersecting: true })
//!     .collect();
//! let outcome = seq.on_visibility(HostTime(0), &batch);
//! assert_eq!(outcome.scheduled[1].deadline, HostTime(30));
//!
//! assert_eq!(seq.fire_due(HostTime(30)).len(), 2);
//! assert!(seq.visual(ids[1]).is_some_and(|v| v.is_revealed()));
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod counter;
pub mod dirty;
pub mod element;
pub mod sequencer;
pub mod time;
pub mod timer;
pub mod trace;
pub mod visibility;
pub mod visual;
