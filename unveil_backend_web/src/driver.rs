// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page driver wiring the sequencer to the DOM.
//!
//! [`RevealDriver`] finds the page's targets, registers them with a
//! [`Sequencer`], feeds it `IntersectionObserver` batches, arms one
//! `setTimeout` per scheduled reveal and presents the resulting style
//! changes. Elements removed from the document are detected lazily, at the
//! next batch or timer, and detached from the sequencer.
//!
//! Without `IntersectionObserver` every target is revealed at start.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, IntersectionObserverEntry};

use unveil_core::backend::Presenter as _;
use unveil_core::config::SequencerConfig;
use unveil_core::element::ElementId;
use unveil_core::sequencer::{Fired, Sequencer, Target};
use unveil_core::time::HostTime;
use unveil_core::trace::{FallbackEvent, RegisterEvent, TraceSink, Tracer};
use unveil_core::visibility::VisibilityEntry;

use crate::observer::{self, VisibilityObserver};
use crate::presenter::DomPresenter;
use crate::{css, timers};

const KEYFRAMES_ID: &str = "unveil-keyframes";

/// Which page elements a driver manages and how they are marked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentContract {
    /// CSS selector of the targets, in document order.
    pub reveal_selector: &'static str,
    /// Class marking emphasized targets.
    pub emphasized_class: Option<&'static str>,
    /// Class added to a target once it is revealed.
    pub revealed_class: Option<&'static str>,
}

impl DocumentContract {
    /// Staggered `.reveal` sections; `.card`s among them bounce.
    pub const REVEAL: Self = Self {
        reveal_selector: ".reveal",
        emphasized_class: Some("card"),
        revealed_class: Some("visible"),
    };

    /// Every `.card`, shown as soon as it scrolls in.
    pub const CARDS: Self = Self {
        reveal_selector: ".card",
        emphasized_class: None,
        revealed_class: None,
    };

    /// Paragraphs and minor headings, shown as soon as they scroll in.
    pub const TEXT: Self = Self {
        reveal_selector: "p, h3, h4",
        emphasized_class: None,
        revealed_class: None,
    };
}

impl Default for DocumentContract {
    fn default() -> Self {
        Self::REVEAL
    }
}

struct DriverState {
    sequencer: Sequencer,
    presenter: DomPresenter,
    contract: DocumentContract,
    /// Registered targets that are still in the document.
    targets: Vec<(ElementId, HtmlElement)>,
    sink: Option<Box<dyn TraceSink>>,
}

impl DriverState {
    fn tracer(&mut self) -> Tracer<'_> {
        match &mut self.sink {
            Some(sink) => Tracer::new(sink.as_mut()),
            None => Tracer::none(),
        }
    }

    fn element(&self, id: ElementId) -> Option<&HtmlElement> {
        self.targets
            .iter()
            .find(|(target, _)| *target == id)
            .map(|(_, el)| el)
    }

    fn lookup(&self, node: &web_sys::Element) -> Option<ElementId> {
        self.targets
            .iter()
            .find(|(_, el)| {
                let el: &web_sys::Element = el;
                el == node
            })
            .map(|(id, _)| *id)
    }

    /// Detaches targets that left the document.
    fn sweep_detached(&mut self) {
        let sequencer = &mut self.sequencer;
        self.targets.retain(|(id, el)| {
            let connected = el.is_connected();
            if !connected {
                sequencer.detach(*id);
            }
            connected
        });
        self.present();
    }

    fn present(&mut self) {
        let changes = self.sequencer.take_changes();
        if !changes.is_empty() {
            self.presenter.apply(self.sequencer.store(), &changes);
        }
    }

    /// Traces and presents fired reveals.
    fn finish_fired(&mut self, now: HostTime, fired: &[Fired]) {
        self.tracer().fired(now, fired);
        self.present();
        let Some(class) = self.contract.revealed_class else {
            return;
        };
        for f in fired {
            if let Fired::Revealed { element, .. } = *f
                && let Some(el) = self.element(element)
            {
                let _ = el.class_list().add_1(class);
            }
        }
    }
}

struct DriverInner {
    state: RefCell<DriverState>,
    observer: RefCell<Option<VisibilityObserver>>,
}

impl DriverInner {
    /// Runs when the platform timer for `deadline` expires.
    fn fire(&self, deadline: HostTime) {
        // The timer has expired, so its deadline has passed even if the clock
        // readings disagree by a fraction of a millisecond.
        let now = crate::now().max(deadline);
        let mut state = self.state.borrow_mut();
        state.sweep_detached();
        let fired = state.sequencer.fire_due(now);
        state.finish_fired(now, &fired);
    }
}

fn on_batch(inner: &Rc<DriverInner>, entries: &[IntersectionObserverEntry]) {
    let now = crate::now();
    let mut state = inner.state.borrow_mut();
    state.sweep_detached();

    let batch: Vec<VisibilityEntry> = entries
        .iter()
        .filter_map(|entry| {
            Some(VisibilityEntry {
                element: state.lookup(&entry.target())?,
                ratio: entry.intersection_ratio(),
                is_intersecting: entry.is_intersecting(),
            })
        })
        .collect();
    let outcome = state.sequencer.on_visibility(now, &batch);
    let batch_index = state.sequencer.batches();
    state.tracer().outcome(batch_index, now, &outcome);

    if let Some(observer) = inner.observer.borrow().as_ref() {
        for reveal in &outcome.scheduled {
            if let Some(el) = state.element(reveal.element) {
                observer.unobserve(el);
            }
        }
    }
    drop(state);

    for reveal in outcome.scheduled {
        let weak = Rc::downgrade(inner);
        let deadline = reveal.deadline;
        timers::after(reveal.delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.fire(deadline);
            }
        });
    }
}

/// Drives one group of page elements through scroll-triggered reveals.
///
/// Dropping the driver disconnects its observer; reveals already scheduled
/// then do nothing.
pub struct RevealDriver {
    inner: Rc<DriverInner>,
}

impl core::fmt::Debug for RevealDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("RevealDriver")
            .field("contract", &state.contract)
            .field("targets", &state.targets.len())
            .field("pending", &state.sequencer.pending())
            .finish_non_exhaustive()
    }
}

impl RevealDriver {
    /// Registers the document's targets and starts watching them.
    ///
    /// Targets that already carry an inline `opacity` keep their styling;
    /// all others get the configured hidden state right away.
    ///
    /// # Errors
    ///
    /// Returns the JS exception if the selector is invalid or the observer
    /// cannot be created.
    pub fn start(
        document: &Document,
        config: SequencerConfig,
        contract: DocumentContract,
        sink: Option<Box<dyn TraceSink>>,
    ) -> Result<Self, JsValue> {
        let nodes = document.query_selector_all(contract.reveal_selector)?;
        let elements: Vec<HtmlElement> = (0..nodes.length())
            .filter_map(|i| nodes.get(i)?.dyn_into::<HtmlElement>().ok())
            .collect();

        if config.flourish.is_some_and(|f| f.name == css::BOUNCE_IN) {
            inject_keyframes(document);
        }

        let mut sequencer = Sequencer::new(config);
        let ids = sequencer.register(
            elements
                .iter()
                .map(|el| target_for(el, &config, &contract)),
        );

        let now = crate::now();
        let mut state = DriverState {
            sequencer,
            presenter: DomPresenter::new(crate::timebase()),
            contract,
            targets: Vec::with_capacity(ids.len()),
            sink,
        };
        if let Some(&first) = ids.first() {
            let event = RegisterEvent {
                now,
                first_enumeration: state.sequencer.enumeration_index(first).unwrap_or(0),
                count: u32::try_from(ids.len()).unwrap_or(u32::MAX),
            };
            state.tracer().register(&event);
        }
        for (&id, el) in ids.iter().zip(elements) {
            state.presenter.bind(id, el.clone());
            state.targets.push((id, el));
        }
        state.present();

        let inner = Rc::new(DriverInner {
            state: RefCell::new(state),
            observer: RefCell::new(None),
        });

        if !observer::is_supported() {
            let mut state = inner.state.borrow_mut();
            let fired = state.sequencer.reveal_all(now);
            let event = FallbackEvent {
                now,
                revealed: u32::try_from(fired.len()).unwrap_or(u32::MAX),
            };
            state.tracer().fallback(&event);
            state.finish_fired(now, &fired);
            drop(state);
            return Ok(Self { inner });
        }

        let weak = Rc::downgrade(&inner);
        let visibility = VisibilityObserver::new(config.threshold, config.root_margin, move |entries| {
            if let Some(inner) = weak.upgrade() {
                on_batch(&inner, entries);
            }
        })?;
        for (_, el) in &inner.state.borrow().targets {
            visibility.observe(el);
        }
        *inner.observer.borrow_mut() = Some(visibility);
        Ok(Self { inner })
    }

    /// Returns the number of reveals waiting for their timer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.state.borrow().sequencer.pending()
    }

    /// Returns the number of targets not yet scheduled.
    #[must_use]
    pub fn watching(&self) -> usize {
        self.inner.state.borrow().sequencer.watching().len()
    }

    /// Stops observing; targets not yet scheduled stay hidden.
    pub fn stop(&self) {
        if let Some(observer) = self.inner.observer.borrow_mut().take() {
            observer.disconnect();
        }
    }
}

fn target_for(el: &HtmlElement, config: &SequencerConfig, contract: &DocumentContract) -> Target {
    let emphasized = contract
        .emphasized_class
        .is_some_and(|class| el.class_list().contains(class));
    let target = if emphasized {
        Target::EMPHASIZED
    } else {
        Target::PLAIN
    };
    let preset = el
        .style()
        .get_property_value("opacity")
        .is_ok_and(|v| !v.is_empty());
    if preset {
        target.with_visual(config.hidden)
    } else {
        target
    }
}

/// Adds the flourish keyframes to `<head>` once per document.
fn inject_keyframes(document: &Document) {
    if document.get_element_by_id(KEYFRAMES_ID).is_some() {
        return;
    }
    let (Some(head), Ok(style)) = (document.head(), document.create_element("style")) else {
        return;
    };
    style.set_id(KEYFRAMES_ID);
    style.set_text_content(Some(css::BOUNCE_IN_KEYFRAMES));
    let _ = head.append_child(&style);
}
