// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` / `setInterval` timers.
//!
//! Reveals are fire-and-forget: [`after`] hands a one-shot closure to the
//! browser and forgets about it. [`Interval`] owns its closure and clears the
//! interval when stopped or dropped.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use unveil_core::time::Duration;

// Direct global bindings instead of `web_sys::Window` methods; no Window
// lookup (and unwrap) per timer.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(handler: &JsValue, timeout_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "setInterval")]
    fn set_interval(handler: &JsValue, timeout_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(id: i32);
}

/// Converts a duration to a timer delay in whole milliseconds.
pub(crate) fn delay_ms(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis(crate::timebase())).unwrap_or(i32::MAX)
}

/// Runs `f` once after `delay`.
pub(crate) fn after(delay: Duration, f: impl FnOnce() + 'static) {
    let handler = Closure::once_into_js(f);
    set_timeout(&handler, delay_ms(delay));
}

type IntervalClosure = Closure<dyn FnMut()>;

struct IntervalInner {
    closure: RefCell<Option<IntervalClosure>>,
    /// Returns `false` to stop the interval.
    callback: RefCell<Box<dyn FnMut() -> bool>>,
    running: Cell<bool>,
    id: Cell<i32>,
}

/// A repeating timer that runs until its callback returns `false`.
pub(crate) struct Interval {
    inner: Rc<IntervalInner>,
}

impl Interval {
    /// Starts calling `callback` every `period`.
    pub(crate) fn start(period: Duration, callback: impl FnMut() -> bool + 'static) -> Self {
        let inner = Rc::new(IntervalInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            running: Cell::new(true),
            id: Cell::new(0),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.running.get() {
                return;
            }
            let keep_going = inner.callback.borrow_mut()();
            if !keep_going {
                inner.running.set(false);
                clear_interval(inner.id.get());
            }
        }) as Box<dyn FnMut()>);

        inner
            .id
            .set(set_interval(closure.as_ref().unchecked_ref(), delay_ms(period)));
        *inner.closure.borrow_mut() = Some(closure);
        Self { inner }
    }

    /// Stops the interval.
    pub(crate) fn stop(&self) {
        if self.inner.running.replace(false) {
            clear_interval(self.inner.id.get());
        }
    }

    /// Returns `true` while the interval is running.
    pub(crate) fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.stop();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interval")
            .field("running", &self.inner.running.get())
            .finish_non_exhaustive()
    }
}
