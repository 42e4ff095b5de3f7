// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility geometry and a software visibility watcher.
//!
//! Browsers deliver visibility through `IntersectionObserver`; the web
//! backend converts those callbacks into [`VisibilityEntry`] batches.
//! [`VisibilityWatcher`] produces the same batches from plain rectangles so
//! native hosts and tests can drive the sequencer without a browser.
//!
//! # Batch semantics
//!
//! Each [`VisibilityWatcher::update`] call yields one batch containing:
//!
//! - an initial entry for every element observed since the previous update
//!   (whether or not it is visible), and
//! - an entry for every element whose "ratio ≥ threshold" status flipped.
//!
//! Entries appear in observation order.

use alloc::vec::Vec;

use kurbo::{Insets, Rect};

use crate::element::ElementId;

/// One element's visibility as reported in a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    /// The element the entry describes.
    pub element: ElementId,
    /// Fraction of the element's area inside the trigger region.
    pub ratio: f64,
    /// Whether the element meets the threshold.
    pub is_intersecting: bool,
}

/// Applies a CSS-style root margin to the viewport.
///
/// Positive insets grow the region, negative insets shrink it.
#[must_use]
pub fn trigger_region(viewport: Rect, margin: Insets) -> Rect {
    Rect::new(
        viewport.x0 - margin.x0,
        viewport.y0 - margin.y0,
        viewport.x1 + margin.x1,
        viewport.y1 + margin.y1,
    )
}

/// Fraction of `target`'s area that lies inside `root`.
///
/// A zero-area target reports `1.0` when it lies within `root` (edges
/// included) and `0.0` otherwise.
#[must_use]
pub fn visible_fraction(target: Rect, root: Rect) -> f64 {
    let target = target.abs();
    let root = root.abs();
    let w = target.x1.min(root.x1) - target.x0.max(root.x0);
    let h = target.y1.min(root.y1) - target.y0.max(root.y0);
    if w < 0.0 || h < 0.0 {
        return 0.0;
    }
    let area = target.area();
    if area <= 0.0 {
        return 1.0;
    }
    (w * h / area).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug)]
struct Watch {
    element: ElementId,
    /// Last reported threshold status; `None` until the first report.
    last: Option<bool>,
}

/// Emulates `IntersectionObserver` over caller-supplied element bounds.
#[derive(Clone, Debug)]
pub struct VisibilityWatcher {
    threshold: f64,
    root_margin: Insets,
    watches: Vec<Watch>,
}

impl VisibilityWatcher {
    /// Creates a watcher with the given threshold and root margin.
    #[must_use]
    pub fn new(threshold: f64, root_margin: Insets) -> Self {
        Self {
            threshold,
            root_margin,
            watches: Vec::new(),
        }
    }

    /// Starts watching `element`. Watching an element twice is a no-op.
    pub fn observe(&mut self, element: ElementId) {
        if !self.is_observing(element) {
            self.watches.push(Watch {
                element,
                last: None,
            });
        }
    }

    /// Stops watching `element`.
    pub fn unobserve(&mut self, element: ElementId) {
        self.watches.retain(|w| w.element != element);
    }

    /// Returns whether `element` is being watched.
    #[must_use]
    pub fn is_observing(&self, element: ElementId) -> bool {
        self.watches.iter().any(|w| w.element == element)
    }

    /// Returns the number of watched elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Returns `true` if nothing is watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Computes the next batch for the given viewport.
    ///
    /// `bounds` returns an element's layout rectangle in the viewport's
    /// coordinate space, or `None` if the element is no longer laid out;
    /// such elements are skipped.
    pub fn update(
        &mut self,
        viewport: Rect,
        mut bounds: impl FnMut(ElementId) -> Option<Rect>,
    ) -> Vec<VisibilityEntry> {
        let root = trigger_region(viewport, self.root_margin);
        let mut batch = Vec::new();
        for watch in &mut self.watches {
            let Some(rect) = bounds(watch.element) else {
                continue;
            };
            let ratio = visible_fraction(rect, root);
            let is_intersecting = ratio > 0.0 && ratio >= self.threshold;
            if watch.last != Some(is_intersecting) {
                watch.last = Some(is_intersecting);
                batch.push(VisibilityEntry {
                    element: watch.element,
                    ratio,
                    is_intersecting,
                });
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Category, ElementStore};
    use crate::visual::VisualState;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    #[test]
    fn fraction_of_partially_visible_target() {
        // Bottom half of a 100px-tall box sticks out of the viewport.
        let target = Rect::new(0.0, 550.0, 100.0, 650.0);
        let f = visible_fraction(target, VIEWPORT);
        assert!((f - 0.5).abs() < 1e-9, "expected 0.5, got {f}");
        assert_eq!(visible_fraction(Rect::new(0.0, 700.0, 10.0, 710.0), VIEWPORT), 0.0);
        assert_eq!(visible_fraction(Rect::new(10.0, 10.0, 20.0, 20.0), VIEWPORT), 1.0);
    }

    #[test]
    fn zero_area_target() {
        let line = Rect::new(10.0, 100.0, 10.0, 200.0);
        assert_eq!(visible_fraction(line, VIEWPORT), 1.0);
        let outside = Rect::new(10.0, 900.0, 10.0, 950.0);
        assert_eq!(visible_fraction(outside, VIEWPORT), 0.0);
    }

    #[test]
    fn negative_bottom_margin_shrinks_region() {
        let root = trigger_region(VIEWPORT, Insets::new(0.0, 0.0, 0.0, -20.0));
        assert_eq!(root, Rect::new(0.0, 0.0, 800.0, 580.0));
        // A box occupying the last 20px of the viewport is outside.
        let target = Rect::new(0.0, 580.0, 100.0, 600.0);
        assert_eq!(visible_fraction(target, root), 0.0);
    }

    #[test]
    fn first_update_reports_every_new_watch() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        let b = store.insert(Category::Plain, VisualState::hidden(30.0));
        let mut watcher = VisibilityWatcher::new(0.05, Insets::ZERO);
        watcher.observe(a);
        watcher.observe(b);
        watcher.observe(a);
        assert_eq!(watcher.len(), 2);

        let batch = watcher.update(VIEWPORT, |id| {
            Some(if id == a {
                Rect::new(0.0, 100.0, 100.0, 200.0)
            } else {
                Rect::new(0.0, 1000.0, 100.0, 1100.0)
            })
        });
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].element, a);
        assert!(batch[0].is_intersecting);
        assert_eq!(batch[1].element, b);
        assert!(!batch[1].is_intersecting);

        // b scrolls into view; a is unchanged and not reported again.
        let batch = watcher.update(VIEWPORT, |_| Some(Rect::new(0.0, 100.0, 100.0, 200.0)));
        assert_eq!(batch.len(), 1, "only b flipped");
        assert_eq!(batch[0].element, b);
    }

    #[test]
    fn below_threshold_is_not_intersecting() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        let mut watcher = VisibilityWatcher::new(0.05, Insets::ZERO);
        watcher.observe(a);
        // 2% of the box is on screen.
        let batch = watcher.update(VIEWPORT, |_| Some(Rect::new(0.0, 598.0, 100.0, 698.0)));
        assert_eq!(batch.len(), 1);
        assert!(!batch[0].is_intersecting);
        assert!((batch[0].ratio - 0.02).abs() < 1e-9);
    }

    #[test]
    fn unobserved_and_unlaid_elements_are_skipped() {
        let mut store = ElementStore::new();
        let a = store.insert(Category::Plain, VisualState::hidden(30.0));
        let b = store.insert(Category::Plain, VisualState::hidden(30.0));
        let mut watcher = VisibilityWatcher::new(0.05, Insets::ZERO);
        watcher.observe(a);
        watcher.observe(b);
        watcher.unobserve(a);
        assert!(!watcher.is_observing(a));

        let batch = watcher.update(VIEWPORT, |_| None);
        assert!(batch.is_empty());
    }
}
