// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility-triggered count-up.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Insets;
use wasm_bindgen::JsValue;
use web_sys::Element;

use unveil_core::counter::{Counter, CounterConfig};

use crate::observer::{self, VisibilityObserver};
use crate::timers::Interval;

struct CounterInner {
    config: CounterConfig,
    render: RefCell<Box<dyn FnMut(&str)>>,
    observer: RefCell<Option<VisibilityObserver>>,
    interval: RefCell<Option<Interval>>,
}

impl CounterInner {
    /// Starts counting; a no-op if the count already started.
    fn run(inner: &Rc<Self>) {
        if inner.interval.borrow().is_some() {
            return;
        }
        let mut counter = Counter::start(inner.config);
        let weak = Rc::downgrade(inner);
        let interval = Interval::start(inner.config.interval, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            if counter.step().is_none() {
                return false;
            }
            inner.render.borrow_mut()(&counter.text());
            !counter.is_finished()
        });
        *inner.interval.borrow_mut() = Some(interval);
    }
}

/// Counts a number up the first time an element scrolls into view.
///
/// Each step hands the formatted value to the `render` callback, which
/// typically writes it into the page.
pub struct CounterDriver {
    inner: Rc<CounterInner>,
}

impl core::fmt::Debug for CounterDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CounterDriver")
            .field("config", &self.inner.config)
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

impl CounterDriver {
    /// Watches `target` and starts the count-up once it intersects.
    ///
    /// Without `IntersectionObserver` the count-up starts immediately.
    ///
    /// # Errors
    ///
    /// Returns the JS exception if the observer cannot be created.
    pub fn watch(
        target: &Element,
        config: CounterConfig,
        render: impl FnMut(&str) + 'static,
    ) -> Result<Self, JsValue> {
        let inner = Rc::new(CounterInner {
            config,
            render: RefCell::new(Box::new(render)),
            observer: RefCell::new(None),
            interval: RefCell::new(None),
        });

        if !observer::is_supported() {
            CounterInner::run(&inner);
            return Ok(Self { inner });
        }

        let weak = Rc::downgrade(&inner);
        let visibility = VisibilityObserver::new(0.0, Insets::ZERO, move |entries| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let Some(entry) = entries.iter().find(|e| e.is_intersecting()) else {
                return;
            };
            if let Some(observer) = inner.observer.borrow().as_ref() {
                observer.unobserve(&entry.target());
            }
            CounterInner::run(&inner);
        })?;
        visibility.observe(target);
        *inner.observer.borrow_mut() = Some(visibility);
        Ok(Self { inner })
    }

    /// Returns `true` once the count-up has started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner.interval.borrow().is_some()
    }

    /// Returns `true` while the count-up is still stepping.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner
            .interval
            .borrow()
            .as_ref()
            .is_some_and(Interval::is_running)
    }
}
