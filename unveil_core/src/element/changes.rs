// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style change collection.
//!
//! [`ElementStore::take_changes`] drains every dirty channel and reports raw
//! slot indices, so presenters can read the new values through the `*_at()`
//! accessors without a generation check per access.

use alloc::vec::Vec;

use super::store::ElementStore;
use crate::dirty;

/// The style changes accumulated since the last
/// [`ElementStore::take_changes`] call.
#[derive(Clone, Debug, Default)]
pub struct StyleChanges {
    /// Elements whose opacity changed.
    pub opacities: Vec<u32>,
    /// Elements whose offset or scale changed.
    pub transforms: Vec<u32>,
    /// Elements whose transition timing changed.
    pub transitions: Vec<u32>,
    /// Elements that had a flourish attached.
    pub flourishes: Vec<u32>,
    /// Elements registered since the last drain.
    pub added: Vec<u32>,
    /// Elements removed since the last drain.
    pub removed: Vec<u32>,
}

impl StyleChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.opacities.clear();
        self.transforms.clear();
        self.transitions.clear();
        self.flourishes.clear();
        self.added.clear();
        self.removed.clear();
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opacities.is_empty()
            && self.transforms.is_empty()
            && self.transitions.is_empty()
            && self.flourishes.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
    }
}

impl ElementStore {
    /// Drains all dirty channels and returns the accumulated changes.
    pub fn take_changes(&mut self) -> StyleChanges {
        let mut changes = StyleChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a
    /// caller-provided buffer.
    pub fn take_changes_into(&mut self, changes: &mut StyleChanges) {
        changes.clear();

        changes.opacities = self
            .dirty
            .drain(dirty::OPACITY)
            .deterministic()
            .run()
            .collect();
        changes.transforms = self
            .dirty
            .drain(dirty::TRANSFORM)
            .deterministic()
            .run()
            .collect();
        changes.transitions = self
            .dirty
            .drain(dirty::TRANSITION)
            .deterministic()
            .run()
            .collect();
        changes.flourishes = self
            .dirty
            .drain(dirty::FLOURISH)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Category;
    use crate::time::Duration;
    use crate::visual::{Easing, Flourish, VisualState};

    #[test]
    fn insert_reports_full_style() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        let changes = store.take_changes();
        assert_eq!(changes.added, [a.index()]);
        assert_eq!(changes.opacities, [a.index()]);
        assert_eq!(changes.transforms, [a.index()]);
        assert_eq!(changes.transitions, [a.index()]);
        assert!(store.take_changes().is_empty(), "second drain is empty");
    }

    #[test]
    fn adopt_reports_only_addition() {
        let mut store = ElementStore::new();
        let a = store.adopt(Category::Plain, VisualState::hidden(30.0));
        let changes = store.take_changes();
        assert_eq!(changes.added, [a.index()]);
        assert!(changes.opacities.is_empty());
        assert!(changes.transforms.is_empty());
    }

    #[test]
    fn set_visual_marks_changed_channels_only() {
        let mut store = ElementStore::new();
        let a = store.adopt(Category::Plain, VisualState::hidden(30.0));
        let _ = store.take_changes();

        // Opacity only.
        let mut next = VisualState::hidden(30.0);
        next.opacity = 0.5;
        store.set_visual(a, next);
        let changes = store.take_changes();
        assert_eq!(changes.opacities, [a.index()]);
        assert!(changes.transforms.is_empty());
        assert!(changes.transitions.is_empty());

        store.set_flourish(
            a,
            Flourish {
                name: "bounceIn",
                duration: Duration(300),
                easing: Easing::EaseOut,
            },
        );
        let changes = store.take_changes();
        assert_eq!(changes.flourishes, [a.index()]);
    }

    #[test]
    fn removal_is_reported_and_clears_marks() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        store.remove(a);
        let changes = store.take_changes();
        assert_eq!(changes.removed, [a.index()]);
        assert!(changes.opacities.is_empty(), "removed element has no marks");
    }
}
