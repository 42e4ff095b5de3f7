// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use unveil_core::element::ElementId;
use unveil_core::time::HostTime;
use unveil_core::trace::{
    BatchEvent, DropEvent, FallbackEvent, RegisterEvent, RevealEvent, ScheduleEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_REGISTER: u8 = 1;
const TAG_BATCH: u8 = 2;
const TAG_SCHEDULE: u8 = 3;
const TAG_REVEAL: u8 = 4;
const TAG_DROP: u8 = 5;
const TAG_FALLBACK: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.ticks());
    }

    fn write_element(&mut self, id: ElementId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }
}

impl TraceSink for RecorderSink {
    fn on_register(&mut self, e: &RegisterEvent) {
        self.write_u8(TAG_REGISTER);
        self.write_time(e.now);
        self.write_u32(e.first_enumeration);
        self.write_u32(e.count);
    }

    fn on_batch(&mut self, e: &BatchEvent) {
        self.write_u8(TAG_BATCH);
        self.write_u64(e.batch_index);
        self.write_time(e.now);
        self.write_u32(e.scheduled);
        self.write_u32(e.ignored);
    }

    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.write_u8(TAG_SCHEDULE);
        self.write_u64(e.batch_index);
        self.write_element(e.element);
        self.write_u32(e.position);
        self.write_time(e.scheduled_at);
        self.write_time(e.deadline);
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.write_u8(TAG_REVEAL);
        self.write_element(e.element);
        self.write_time(e.deadline);
        self.write_time(e.fired_at);
        self.write_u8(u8::from(e.flourish));
    }

    fn on_drop(&mut self, e: &DropEvent) {
        self.write_u8(TAG_DROP);
        self.write_element(e.element);
        self.write_time(e.deadline);
        self.write_time(e.fired_at);
    }

    fn on_fallback(&mut self, e: &FallbackEvent) {
        self.write_u8(TAG_FALLBACK);
        self.write_time(e.now);
        self.write_u32(e.revealed);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`RegisterEvent`].
    Register(RegisterEvent),
    /// A [`BatchEvent`].
    Batch(BatchEvent),
    /// A [`ScheduleEvent`].
    Schedule(ScheduleEvent),
    /// A [`RevealEvent`].
    Reveal(RevealEvent),
    /// A [`DropEvent`].
    Drop(DropEvent),
    /// A [`FallbackEvent`].
    Fallback(FallbackEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_element(&mut self) -> Option<ElementId> {
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(ElementId::from_raw(index, generation))
    }

    fn decode_register(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Register(RegisterEvent {
            now: self.read_time()?,
            first_enumeration: self.read_u32()?,
            count: self.read_u32()?,
        }))
    }

    fn decode_batch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Batch(BatchEvent {
            batch_index: self.read_u64()?,
            now: self.read_time()?,
            scheduled: self.read_u32()?,
            ignored: self.read_u32()?,
        }))
    }

    fn decode_schedule(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Schedule(ScheduleEvent {
            batch_index: self.read_u64()?,
            element: self.read_element()?,
            position: self.read_u32()?,
            scheduled_at: self.read_time()?,
            deadline: self.read_time()?,
        }))
    }

    fn decode_reveal(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reveal(RevealEvent {
            element: self.read_element()?,
            deadline: self.read_time()?,
            fired_at: self.read_time()?,
            flourish: self.read_u8()? != 0,
        }))
    }

    fn decode_drop(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Drop(DropEvent {
            element: self.read_element()?,
            deadline: self.read_time()?,
            fired_at: self.read_time()?,
        }))
    }

    fn decode_fallback(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Fallback(FallbackEvent {
            now: self.read_time()?,
            revealed: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_REGISTER => self.decode_register(),
            TAG_BATCH => self.decode_batch(),
            TAG_SCHEDULE => self.decode_schedule(),
            TAG_REVEAL => self.decode_reveal(),
            TAG_DROP => self.decode_drop(),
            TAG_FALLBACK => self.decode_fallback(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
