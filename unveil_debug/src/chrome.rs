// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each scheduled reveal becomes an async span from the batch that scheduled
//! it to its deadline, so the stagger shows up as a staircase in the viewer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use unveil_core::element::ElementId;
use unveil_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Register(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Register",
                    "cat": "Sequencer",
                    "ts": ticks_to_us(e.now.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "first_enumeration": e.first_enumeration,
                        "count": e.count,
                    }
                }));
            }
            RecordedEvent::Batch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Batch",
                    "cat": "Sequencer",
                    "ts": ticks_to_us(e.now.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "batch_index": e.batch_index,
                        "scheduled": e.scheduled,
                        "ignored": e.ignored,
                    }
                }));
            }
            RecordedEvent::Schedule(e) => {
                let name = span_name(e.element);
                let args = json!({
                    "batch_index": e.batch_index,
                    "position": e.position,
                });
                events.push(json!({
                    "ph": "b",
                    "name": name,
                    "cat": "Reveal",
                    "id": span_id(e.element),
                    "ts": ticks_to_us(e.scheduled_at.ticks(), timebase),
                    "pid": 0,
                    "tid": 1,
                    "args": args,
                }));
                events.push(json!({
                    "ph": "e",
                    "name": name,
                    "cat": "Reveal",
                    "id": span_id(e.element),
                    "ts": ticks_to_us(e.deadline.ticks(), timebase),
                    "pid": 0,
                    "tid": 1,
                }));
            }
            RecordedEvent::Reveal(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reveal",
                    "cat": "Element",
                    "ts": ticks_to_us(e.fired_at.ticks(), timebase),
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "element": span_name(e.element),
                        "late_us": ticks_to_us(e.fired_at.ticks().saturating_sub(e.deadline.ticks()), timebase),
                        "flourish": e.flourish,
                    }
                }));
            }
            RecordedEvent::Drop(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Drop",
                    "cat": "Element",
                    "ts": ticks_to_us(e.fired_at.ticks(), timebase),
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "element": span_name(e.element),
                    }
                }));
            }
            RecordedEvent::Fallback(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Fallback",
                    "cat": "Sequencer",
                    "ts": ticks_to_us(e.now.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "revealed": e.revealed,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn span_name(id: ElementId) -> String {
    format!("#{}.{}", id.index(), id.generation())
}

/// Async span ids must be unique among overlapping spans.
fn span_id(id: ElementId) -> u64 {
    (u64::from(id.generation()) << 32) | u64::from(id.index())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use unveil_core::time::HostTime;
    use unveil_core::trace::{BatchEvent, RevealEvent, ScheduleEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let element = ElementId::from_raw(2, 1);
        let mut rec = RecorderSink::new();
        rec.on_schedule(&ScheduleEvent {
            batch_index: 1,
            element,
            position: 1,
            scheduled_at: HostTime(1_000),
            deadline: HostTime(1_030),
        });
        rec.on_batch(&BatchEvent {
            batch_index: 1,
            now: HostTime(1_000),
            scheduled: 1,
            ignored: 0,
        });
        rec.on_reveal(&RevealEvent {
            element,
            deadline: HostTime(1_030),
            fired_at: HostTime(1_032),
            flourish: false,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::MILLIS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        // The schedule opens and closes an async span.
        assert_eq!(parsed[0]["ph"], "b");
        assert_eq!(parsed[0]["name"], "#2.1");
        assert_eq!(parsed[0]["ts"], 1_000_000.0);
        assert_eq!(parsed[1]["ph"], "e");
        assert_eq!(parsed[1]["ts"], 1_030_000.0);
        assert_eq!(parsed[0]["id"], parsed[1]["id"]);

        assert_eq!(parsed[2]["name"], "Batch");

        assert_eq!(parsed[3]["ph"], "i");
        assert_eq!(parsed[3]["name"], "Reveal");
        assert_eq!(parsed[3]["args"]["late_us"], 2_000.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
