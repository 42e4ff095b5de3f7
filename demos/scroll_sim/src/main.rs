// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scrolling page that exercises the sequencer and the tracing
//! pipeline.
//!
//! A column of sections is scrolled past a fixed viewport. A
//! [`VisibilityWatcher`] produces the batches a browser would deliver, the
//! [`Sequencer`] staggers the reveals, and one section is removed from the
//! page while its reveal is in flight. Events go to both a
//! [`PrettyPrintSink`](unveil_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](unveil_debug::recorder::RecorderSink), and the recording
//! is exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use kurbo::Rect;

use unveil_core::backend::Presenter;
use unveil_core::config::SequencerConfig;
use unveil_core::element::{ElementId, ElementStore, StyleChanges};
use unveil_core::sequencer::{Sequencer, Target};
use unveil_core::time::{HostTime, Timebase};
use unveil_core::trace::{
    BatchEvent, DropEvent, FallbackEvent, RegisterEvent, RevealEvent, ScheduleEvent, TraceSink,
    Tracer,
};
use unveil_core::visibility::VisibilityWatcher;

use unveil_debug::pretty::PrettyPrintSink;
use unveil_debug::recorder::RecorderSink;

const SECTIONS: u32 = 12;
const SECTION_HEIGHT: f64 = 180.0;
const SECTION_GAP: f64 = 60.0;
const VIEWPORT_HEIGHT: f64 = 600.0;
const SCROLL_STEP: f64 = 240.0;
/// Milliseconds between scroll steps.
const SCROLL_INTERVAL: u64 = 120;
/// Milliseconds between timer polls.
const TICK: u64 = 5;
/// Section removed from the page while its reveal is pending.
const REMOVED_SECTION: usize = 2;

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_register(&mut self, e: &RegisterEvent) {
        self.a.on_register(e);
        self.b.on_register(e);
    }

    fn on_batch(&mut self, e: &BatchEvent) {
        self.a.on_batch(e);
        self.b.on_batch(e);
    }

    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.a.on_schedule(e);
        self.b.on_schedule(e);
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.a.on_reveal(e);
        self.b.on_reveal(e);
    }

    fn on_drop(&mut self, e: &DropEvent) {
        self.a.on_drop(e);
        self.b.on_drop(e);
    }

    fn on_fallback(&mut self, e: &FallbackEvent) {
        self.a.on_fallback(e);
        self.b.on_fallback(e);
    }
}

/// Tracks what a page would currently show for each slot.
#[derive(Default)]
struct PageModel {
    opacity: Vec<f32>,
    bounced: usize,
}

impl Presenter for PageModel {
    fn apply(&mut self, store: &ElementStore, changes: &StyleChanges) {
        for &idx in &changes.added {
            let slot = idx as usize;
            if self.opacity.len() <= slot {
                self.opacity.resize(slot + 1, 0.0);
            }
        }
        for &idx in &changes.opacities {
            self.opacity[idx as usize] = store.visual_at(idx).opacity;
        }
        for &idx in &changes.removed {
            self.opacity[idx as usize] = 0.0;
        }
        self.bounced += changes.flourishes.len();
    }
}

impl PageModel {
    fn shown(&self) -> usize {
        self.opacity.iter().filter(|&&o| o >= 1.0).count()
    }
}

fn section_rect(i: usize, scroll: f64) -> Rect {
    let top = i as f64 * (SECTION_HEIGHT + SECTION_GAP) + 40.0 - scroll;
    Rect::new(40.0, top, 760.0, top + SECTION_HEIGHT)
}

fn main() {
    let timebase = Timebase::MILLIS;

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), timebase);
    let mut recorder = RecorderSink::new();
    let mut sink = Tee {
        a: &mut pretty,
        b: &mut recorder,
    };

    // -- page --------------------------------------------------------------
    let config = SequencerConfig::reveal(timebase);
    let mut sequencer = Sequencer::new(config);
    let mut page = PageModel::default();

    // Every third section is a card.
    let ids = sequencer.register((0..SECTIONS).map(|i| {
        if i % 3 == 2 {
            Target::EMPHASIZED
        } else {
            Target::PLAIN
        }
    }));
    let mut attached = vec![true; ids.len()];
    let mut now = HostTime(0);
    Tracer::new(&mut sink).register(&RegisterEvent {
        now,
        first_enumeration: 0,
        count: SECTIONS,
    });
    let changes = sequencer.take_changes();
    page.apply(sequencer.store(), &changes);

    let mut watcher = VisibilityWatcher::new(config.threshold, config.root_margin);
    for &id in &ids {
        watcher.observe(id);
    }

    let slot_of = |id: ElementId| ids.iter().position(|&e| e == id);

    // -- simulated scroll --------------------------------------------------
    let max_scroll = f64::from(SECTIONS) * (SECTION_HEIGHT + SECTION_GAP) - VIEWPORT_HEIGHT;
    let mut scroll = 0.0;
    let mut next_scroll_at = HostTime(0);

    loop {
        if now >= next_scroll_at && scroll <= max_scroll {
            let viewport = Rect::new(0.0, 0.0, 800.0, VIEWPORT_HEIGHT);
            let batch = watcher.update(viewport, |id| {
                let slot = slot_of(id)?;
                attached[slot].then(|| section_rect(slot, scroll))
            });
            if !batch.is_empty() {
                let outcome = sequencer.on_visibility(now, &batch);
                Tracer::new(&mut sink).outcome(sequencer.batches(), now, &outcome);
                for reveal in &outcome.scheduled {
                    watcher.unobserve(reveal.element);
                }

                // Pull one section out of the page before its reveal fires.
                if let Some(reveal) = outcome
                    .scheduled
                    .iter()
                    .find(|r| slot_of(r.element) == Some(REMOVED_SECTION))
                {
                    attached[REMOVED_SECTION] = false;
                    sequencer.detach(reveal.element);
                }
            }
            scroll += SCROLL_STEP;
            next_scroll_at = HostTime(now.ticks() + SCROLL_INTERVAL);
        }

        let fired = sequencer.fire_due(now);
        if !fired.is_empty() {
            Tracer::new(&mut sink).fired(now, &fired);
        }
        let changes = sequencer.take_changes();
        if !changes.is_empty() {
            page.apply(sequencer.store(), &changes);
        }

        if scroll > max_scroll && sequencer.pending() == 0 {
            break;
        }
        now = HostTime(now.ticks() + TICK);
    }
    drop(sink);

    println!(
        "\n{} of {} sections shown, {} bounced, {} never scrolled into view",
        page.shown(),
        SECTIONS,
        page.bounced,
        sequencer.watching().len(),
    );

    // -- export ------------------------------------------------------------
    let bytes = recorder.into_bytes();
    let file = File::create("trace.json").expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    unveil_debug::chrome::export(&bytes, timebase, &mut writer).expect("failed to export trace");

    println!("Wrote trace.json ({} bytes recorded)", bytes.len());
}
