// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM style presentation.
//!
//! Writes [`ElementStore`] state onto the page's own elements as inline
//! styles, applying incremental updates from [`StyleChanges`].
//!
//! [`ElementStore`]: unveil_core::element::ElementStore
//! [`StyleChanges`]: unveil_core::element::StyleChanges

use alloc::vec::Vec;

use unveil_core::backend::Presenter;
use unveil_core::element::{ElementId, ElementStore, StyleChanges};
use unveil_core::time::Timebase;
use web_sys::HtmlElement;

use crate::css;

/// Maps element slots to live DOM elements.
///
/// Unlike a presenter that creates its own nodes, this one only styles
/// elements the page already has: the driver [`bind`](Self::bind)s each
/// registered element before the first [`apply`](Presenter::apply).
pub struct DomPresenter {
    timebase: Timebase,
    elements: Vec<Option<HtmlElement>>,
}

impl core::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("timebase", &self.timebase)
            .field("elements_len", &self.elements.len())
            .finish()
    }
}

impl DomPresenter {
    /// Creates a presenter that formats durations with `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            elements: Vec::new(),
        }
    }

    /// Associates a registered element with its DOM node.
    pub fn bind(&mut self, id: ElementId, el: HtmlElement) {
        let slot = id.index() as usize;
        if self.elements.len() <= slot {
            self.elements.resize_with(slot + 1, || None);
        }
        self.elements[slot] = Some(el);
    }

    /// Returns the DOM element for the given slot index, if bound.
    #[must_use]
    pub fn get_element(&self, idx: u32) -> Option<&HtmlElement> {
        self.elements
            .get(idx as usize)
            .and_then(|slot| slot.as_ref())
    }
}

impl Presenter for DomPresenter {
    /// Applies incremental changes from a [`StyleChanges`] to the DOM.
    fn apply(&mut self, store: &ElementStore, changes: &StyleChanges) {
        // 1. Removals: forget the node; it already left the document.
        for &idx in &changes.removed {
            if let Some(slot) = self.elements.get_mut(idx as usize) {
                *slot = None;
            }
        }

        // 2. Transitions first, so the property changes below animate.
        for &idx in &changes.transitions {
            if let Some(el) = self.get_element(idx) {
                let s = el.style();
                match store.visual_at(idx).transition {
                    Some(t) => {
                        let _ = s.set_property("transition", &css::transition(&t, self.timebase));
                    }
                    None => {
                        let _ = s.remove_property("transition");
                    }
                }
            }
        }

        // 3. Opacities
        for &idx in &changes.opacities {
            if let Some(el) = self.get_element(idx) {
                let opacity = store.visual_at(idx).opacity;
                let _ = el.style().set_property("opacity", &css::opacity(opacity));
            }
        }

        // 4. Transforms
        for &idx in &changes.transforms {
            if let Some(el) = self.get_element(idx) {
                let transform = css::state_transform(&store.visual_at(idx));
                let _ = el.style().set_property("transform", &transform);
            }
        }

        // 5. Flourishes
        for &idx in &changes.flourishes {
            if let (Some(el), Some(flourish)) = (self.get_element(idx), store.flourish_at(idx)) {
                let _ = el
                    .style()
                    .set_property("animation", &css::animation(&flourish, self.timebase));
            }
        }
    }
}
