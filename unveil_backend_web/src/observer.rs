// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `IntersectionObserver` visibility source.
//!
//! [`VisibilityObserver`] owns a browser `IntersectionObserver` and the JS
//! closure it calls. Every callback invocation is one batch; entries are
//! handed to the callback in delivery order.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Insets;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::css;

type BatchClosure = Closure<dyn FnMut(js_sys::Array)>;

/// Returns `true` if the browser provides `IntersectionObserver`.
#[must_use]
pub fn is_supported() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    js_sys::Reflect::has(&window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// A browser `IntersectionObserver` delivering batches of entries.
pub struct VisibilityObserver {
    observer: IntersectionObserver,
    /// Kept alive for as long as the observer may call it.
    _closure: BatchClosure,
}

impl core::fmt::Debug for VisibilityObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisibilityObserver").finish_non_exhaustive()
    }
}

impl VisibilityObserver {
    /// Creates an observer with the given threshold and root margin.
    ///
    /// # Errors
    ///
    /// Returns the JS exception if the browser rejects the options.
    pub fn new(
        threshold: f64,
        root_margin: Insets,
        mut on_batch: impl FnMut(&[IntersectionObserverEntry]) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let batch: Vec<IntersectionObserverEntry> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into().ok())
                .collect();
            on_batch(&batch);
        }) as Box<dyn FnMut(js_sys::Array)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        options.set_root_margin(&css::root_margin(root_margin));
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &options)?;
        Ok(Self {
            observer,
            _closure: closure,
        })
    }

    /// Starts observing `target`.
    pub fn observe(&self, target: &Element) {
        self.observer.observe(target);
    }

    /// Stops observing `target`.
    pub fn unobserve(&self, target: &Element) {
        self.observer.unobserve(target);
    }

    /// Stops observing everything.
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
