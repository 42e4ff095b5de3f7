// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays element storage with allocation and style management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::ElementId;
use crate::dirty;
use crate::visual::{Flourish, VisualState};

/// Whether an element gets the extra flourish on reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    /// Base transition only.
    #[default]
    Plain,
    /// Base transition plus the configured flourish.
    Emphasized,
}

/// Where an element is in its reveal lifecycle.
///
/// Phases only move forward; [`Revealed`](Self::Revealed) is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Known to the store but not yet handed to a visibility watcher.
    #[default]
    Unobserved,
    /// Waiting for its first qualifying visibility entry.
    Watching,
    /// Deregistered; a reveal timer is pending.
    Scheduled,
    /// The revealed state has been applied.
    Revealed,
}

/// Struct-of-arrays storage for all registered elements.
///
/// Elements are addressed by [`ElementId`] handles. Removed elements free
/// their slot for reuse and bump its generation.
#[derive(Debug)]
pub struct ElementStore {
    // -- Per-element properties --
    pub(crate) category: Vec<Category>,
    pub(crate) phase: Vec<Phase>,
    pub(crate) visual: Vec<VisualState>,
    pub(crate) flourish: Vec<Option<Flourish>>,
    pub(crate) enumeration: Vec<u32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) next_enumeration: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            category: Vec::new(),
            phase: Vec::new(),
            visual: Vec::new(),
            flourish: Vec::new(),
            enumeration: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            next_enumeration: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Adds an element whose style must be set to `visual` by the presenter.
    ///
    /// The element receives the next enumeration index and starts in
    /// [`Phase::Unobserved`].
    pub fn insert(&mut self, category: Category, visual: VisualState) -> ElementId {
        let id = self.allocate(category, visual);
        self.dirty.mark(id.idx, dirty::OPACITY);
        self.dirty.mark(id.idx, dirty::TRANSFORM);
        self.dirty.mark(id.idx, dirty::TRANSITION);
        id
    }

    /// Adds an element whose native style already reflects `visual`.
    ///
    /// Same as [`insert`](Self::insert) except no style channel is marked, so
    /// presenters leave the element's current styling alone.
    pub fn adopt(&mut self, category: Category, visual: VisualState) -> ElementId {
        self.allocate(category, visual)
    }

    fn allocate(&mut self, category: Category, visual: VisualState) -> ElementId {
        let enumeration = self.next_enumeration;
        self.next_enumeration += 1;

        let idx = if let Some(idx) = self.free_list.pop() {
            let slot = idx as usize;
            self.category[slot] = category;
            self.phase[slot] = Phase::Unobserved;
            self.visual[slot] = visual;
            self.flourish[slot] = None;
            self.enumeration[slot] = enumeration;
            self.live[slot] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.category.push(category);
            self.phase.push(Phase::Unobserved);
            self.visual.push(visual);
            self.flourish.push(None);
            self.enumeration.push(enumeration);
            self.generation.push(0);
            self.live.push(true);
            idx
        };

        self.pending_added.push(idx);
        ElementId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Removes an element that left the document.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = id.idx as usize;
        self.dirty.remove_key(id.idx);
        self.generation[slot] += 1;
        self.live[slot] = false;
        self.free_list.push(id.idx);
        self.pending_removed.push(id.idx);
        true
    }

    /// Returns whether the handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        let slot = id.idx as usize;
        id.idx < self.len && self.live[slot] && self.generation[slot] == id.generation
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }

    /// Returns `true` if no element is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.live.iter().any(|live| *live)
    }

    /// Iterates over the handles of all live elements, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.len)
            .filter(|&idx| self.live[idx as usize])
            .map(|idx| ElementId {
                idx,
                generation: self.generation[idx as usize],
            })
    }

    // -- Property API --

    /// Returns the element's category.
    #[must_use]
    pub fn category(&self, id: ElementId) -> Option<Category> {
        self.is_alive(id).then(|| self.category[id.idx as usize])
    }

    /// Returns the element's lifecycle phase.
    #[must_use]
    pub fn phase(&self, id: ElementId) -> Option<Phase> {
        self.is_alive(id).then(|| self.phase[id.idx as usize])
    }

    /// Returns the element's current visual state.
    #[must_use]
    pub fn visual(&self, id: ElementId) -> Option<VisualState> {
        self.is_alive(id).then(|| self.visual[id.idx as usize])
    }

    /// Returns the flourish attached to the element, if any.
    #[must_use]
    pub fn flourish(&self, id: ElementId) -> Option<Flourish> {
        if self.is_alive(id) {
            self.flourish[id.idx as usize]
        } else {
            None
        }
    }

    /// Returns the position the element was registered at.
    #[must_use]
    pub fn enumeration_index(&self, id: ElementId) -> Option<u32> {
        self.is_alive(id).then(|| self.enumeration[id.idx as usize])
    }

    /// Moves the element forward to `phase`.
    ///
    /// Returns `false` (and changes nothing) if the handle is stale or the
    /// element is already at or past `phase`.
    pub(crate) fn advance_phase(&mut self, id: ElementId, phase: Phase) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = &mut self.phase[id.idx as usize];
        if *slot >= phase {
            return false;
        }
        *slot = phase;
        true
    }

    /// Sets the element's visual state, marking only the channels that
    /// actually changed.
    ///
    /// Returns `false` if the handle is stale.
    pub fn set_visual(&mut self, id: ElementId, visual: VisualState) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.idx;
        let old = self.visual[idx as usize];
        if old.opacity != visual.opacity {
            self.dirty.mark(idx, dirty::OPACITY);
        }
        if old.offset != visual.offset || old.scale != visual.scale {
            self.dirty.mark(idx, dirty::TRANSFORM);
        }
        if old.transition != visual.transition {
            self.dirty.mark(idx, dirty::TRANSITION);
        }
        self.visual[idx as usize] = visual;
        true
    }

    /// Attaches a flourish animation to the element.
    ///
    /// Returns `false` if the handle is stale.
    pub fn set_flourish(&mut self, id: ElementId, flourish: Flourish) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.flourish[id.idx as usize] = Some(flourish);
        self.dirty.mark(id.idx, dirty::FLOURISH);
        true
    }

    // -- Raw slot accessors (for presenters) --

    /// Returns the visual state stored at a raw slot index.
    ///
    /// Intended for presenters walking [`StyleChanges`](super::StyleChanges).
    #[must_use]
    pub fn visual_at(&self, idx: u32) -> VisualState {
        self.visual[idx as usize]
    }

    /// Returns the flourish stored at a raw slot index.
    #[must_use]
    pub fn flourish_at(&self, idx: u32) -> Option<Flourish> {
        self.flourish[idx as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_enumeration() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        let b = store.insert(Category::Emphasized, VisualState::hidden(30.0));
        assert_eq!(store.enumeration_index(a), Some(0));
        assert_eq!(store.enumeration_index(b), Some(1));
        assert_eq!(store.category(b), Some(Category::Emphasized));
        assert_eq!(store.phase(a), Some(Phase::Unobserved));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        assert!(store.remove(a));
        assert!(!store.is_alive(a));
        assert!(!store.remove(a), "second removal is ignored");
        assert_eq!(store.visual(a), None);
        assert!(!store.set_visual(a, VisualState::REVEALED));
        assert!(store.is_empty());
    }

    #[test]
    fn reused_slot_does_not_resolve_old_handle() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        store.remove(a);
        let b = store.insert(Category::Plain, VisualState::hidden(30.0));
        assert_eq!(a.index(), b.index(), "slot reused");
        assert_ne!(a.generation(), b.generation());
        assert!(!store.is_alive(a));
        assert!(store.is_alive(b));
        // Enumeration keeps counting across reuse.
        assert_eq!(store.enumeration_index(b), Some(1));
    }

    #[test]
    fn phase_only_moves_forward() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        assert!(store.advance_phase(a, Phase::Watching));
        assert!(store.advance_phase(a, Phase::Revealed));
        assert!(!store.advance_phase(a, Phase::Scheduled));
        assert!(!store.advance_phase(a, Phase::Revealed));
        assert_eq!(store.phase(a), Some(Phase::Revealed));
    }

    #[test]
    fn ids_skip_removed_slots() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        let b = store.insert(Category::Plain, VisualState::hidden(30.0));
        let c = store.insert(Category::Plain, VisualState::hidden(30.0));
        store.remove(b);
        let ids: Vec<_> = store.ids().collect();
        assert_eq!(ids, [a, c]);
    }
}
