// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delay-then-run timers for pending reveals.
//!
//! [`TimerQueue`] is a min-heap keyed on `(deadline, sequence)`: timers fire
//! in deadline order, and timers sharing a deadline fire in the order they
//! were scheduled. Cancellation is lazy; cancelled entries are skipped (and
//! purged from the top of the heap) rather than searched for.

use alloc::collections::{BTreeSet, BinaryHeap};
use core::cmp::Reverse;
use core::fmt;

use crate::element::ElementId;
use crate::time::HostTime;

/// Handle to a scheduled timer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    /// Returns the scheduling sequence number.
    #[inline]
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

/// A timer whose deadline has passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired {
    /// The timer that expired.
    pub timer: TimerId,
    /// The element the timer was scheduled for.
    pub element: ElementId,
    /// When the timer was due.
    pub deadline: HostTime,
}

/// Pending reveal timers ordered by deadline.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(HostTime, u64, ElementId)>>,
    pending: BTreeSet<u64>,
    next_seq: u64,
}

impl TimerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a timer for `element` at `deadline`.
    pub fn schedule(&mut self, deadline: HostTime, element: ElementId) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline, seq, element)));
        self.pending.insert(seq);
        TimerId(seq)
    }

    /// Cancels a pending timer.
    ///
    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, timer: TimerId) -> bool {
        let removed = self.pending.remove(&timer.0);
        self.purge();
        removed
    }

    /// Pops the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: HostTime) -> Option<Expired> {
        self.purge();
        let Reverse((deadline, _, _)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }
        let Reverse((deadline, seq, element)) = self.heap.pop()?;
        self.pending.remove(&seq);
        self.purge();
        Some(Expired {
            timer: TimerId(seq),
            element,
            deadline,
        })
    }

    /// Returns the deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.heap.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Returns whether the timer is still pending.
    #[must_use]
    pub fn is_pending(&self, timer: TimerId) -> bool {
        self.pending.contains(&timer.0)
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops cancelled entries sitting at the top of the heap so `peek`
    /// always sees a pending timer.
    fn purge(&mut self) {
        while let Some(Reverse((_, seq, _))) = self.heap.peek() {
            if self.pending.contains(seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Category, ElementStore};
    use crate::visual::VisualState;

    fn elements(n: usize) -> alloc::vec::Vec<ElementId> {
        let mut store = ElementStore::new();
        (0..n)
            .map(|_| store.insert(Category::Plain, VisualState::hidden(30.0)))
            .collect()
    }

    #[test]
    fn fires_in_deadline_order() {
        let ids = elements(3);
        let mut q = TimerQueue::new();
        q.schedule(HostTime(60), ids[2]);
        q.schedule(HostTime(0), ids[0]);
        q.schedule(HostTime(30), ids[1]);

        assert_eq!(q.next_deadline(), Some(HostTime(0)));
        assert_eq!(q.pop_due(HostTime(0)).map(|e| e.element), Some(ids[0]));
        assert_eq!(q.pop_due(HostTime(29)), None, "not yet due");
        assert_eq!(q.pop_due(HostTime(100)).map(|e| e.element), Some(ids[1]));
        assert_eq!(q.pop_due(HostTime(100)).map(|e| e.element), Some(ids[2]));
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let ids = elements(2);
        let mut q = TimerQueue::new();
        let first = q.schedule(HostTime(10), ids[1]);
        let second = q.schedule(HostTime(10), ids[0]);
        assert_eq!(q.pop_due(HostTime(10)).map(|e| e.timer), Some(first));
        assert_eq!(q.pop_due(HostTime(10)).map(|e| e.timer), Some(second));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let ids = elements(2);
        let mut q = TimerQueue::new();
        let a = q.schedule(HostTime(10), ids[0]);
        q.schedule(HostTime(20), ids[1]);

        assert!(q.cancel(a));
        assert!(!q.cancel(a), "double cancel");
        assert!(!q.is_pending(a));
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_deadline(), Some(HostTime(20)), "top was purged");
        assert_eq!(q.pop_due(HostTime(100)).map(|e| e.element), Some(ids[1]));
        assert_eq!(q.pop_due(HostTime(100)), None);
    }
}
