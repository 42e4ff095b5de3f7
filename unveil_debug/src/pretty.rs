// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to milliseconds using a [`Timebase`].

use std::io::Write;

use unveil_core::element::ElementId;
use unveil_core::time::{HostTime, Timebase};
use unveil_core::trace::{
    BatchEvent, DropEvent, FallbackEvent, RegisterEvent, RevealEvent, ScheduleEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ms(&self, t: HostTime) -> f64 {
        self.timebase.ticks_to_nanos(t.ticks()) as f64 / 1_000_000.0
    }
}

fn element(id: ElementId) -> String {
    format!("#{}.{}", id.index(), id.generation())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_register(&mut self, e: &RegisterEvent) {
        let _ = writeln!(
            self.writer,
            "[register] at {:.3}ms count={} first={}",
            self.ms(e.now),
            e.count,
            e.first_enumeration,
        );
    }

    fn on_batch(&mut self, e: &BatchEvent) {
        let _ = writeln!(
            self.writer,
            "[batch] #{} at {:.3}ms scheduled={} ignored={}",
            e.batch_index,
            self.ms(e.now),
            e.scheduled,
            e.ignored,
        );
    }

    fn on_schedule(&mut self, e: &ScheduleEvent) {
        let _ = writeln!(
            self.writer,
            "[schedule] batch={} {} pos={} due={:.3}ms",
            e.batch_index,
            element(e.element),
            e.position,
            self.ms(e.deadline),
        );
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        let flourish = if e.flourish { " +flourish" } else { "" };
        let _ = writeln!(
            self.writer,
            "[reveal] {} at {:.3}ms (due {:.3}ms){flourish}",
            element(e.element),
            self.ms(e.fired_at),
            self.ms(e.deadline),
        );
    }

    fn on_drop(&mut self, e: &DropEvent) {
        let _ = writeln!(
            self.writer,
            "[drop] {} at {:.3}ms detached",
            element(e.element),
            self.ms(e.fired_at),
        );
    }

    fn on_fallback(&mut self, e: &FallbackEvent) {
        let _ = writeln!(
            self.writer,
            "[fallback] at {:.3}ms revealed={}",
            self.ms(e.now),
            e.revealed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_reveal() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MILLIS);
        sink.on_reveal(&RevealEvent {
            element: ElementId::from_raw(3, 0),
            deadline: HostTime(1_030),
            fired_at: HostTime(1_031),
            flourish: true,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[reveal] #3.0"), "got: {output}");
        assert!(output.contains("at 1031.000ms"), "got: {output}");
        assert!(output.contains("+flourish"), "got: {output}");
    }

    #[test]
    fn pretty_print_batch() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MILLIS);
        sink.on_batch(&BatchEvent {
            batch_index: 2,
            now: HostTime(5),
            scheduled: 3,
            ignored: 1,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[batch] #2 at 5.000ms scheduled=3 ignored=1\n");
    }
}
