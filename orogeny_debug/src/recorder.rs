// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. Each record carries the
//! microseconds elapsed since the recorder was created, because the core
//! events themselves do not observe a clock. [`decode`] reads the records
//! back as an iterator of [`Record`].

use std::time::Instant;

use orogeny_core::compositor::RasterStatus;
use orogeny_core::time::HostTime;
use orogeny_core::trace::{
    CacheSweepEvent, DamageEvent, FrameBeginEvent, FrameEndEvent, PassBeginEvent, PassEndEvent,
    PassKind, RasterStatusEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PASS_BEGIN: u8 = 2;
const TAG_PASS_END: u8 = 3;
const TAG_CACHE_SWEEP: u8 = 4;
const TAG_RASTER_STATUS: u8 = 5;
const TAG_FRAME_END: u8 = 6;
const TAG_DAMAGE: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    epoch: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder whose timestamps start now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            epoch: Instant::now(),
        }
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

    fn write_header(&mut self, tag: u8) {
        let at_us = u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.buf.push(tag);
        self.buf.extend_from_slice(&at_us.to_le_bytes());
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_rect(&mut self, r: kurbo::Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_pass(&mut self, p: PassKind) {
        self.write_u8(match p {
            PassKind::Diff => 0,
            PassKind::Preroll => 1,
            PassKind::Paint => 2,
        });
    }

    fn write_status(&mut self, s: RasterStatus) {
        self.write_u8(match s {
            RasterStatus::Success => 0,
            RasterStatus::Resubmit => 1,
            RasterStatus::SkipAndRetry => 2,
            RasterStatus::EnqueuePipeline => 3,
            RasterStatus::Failed => 4,
            RasterStatus::Discarded => 5,
            RasterStatus::Yielded => 6,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_header(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.acquired_at.ticks());
        self.write_u8(u8::from(e.instrumentation_enabled));
    }

    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_header(TAG_PASS_BEGIN);
        self.write_u64(e.frame_index);
        self.write_pass(e.pass);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.write_header(TAG_PASS_END);
        self.write_u64(e.frame_index);
        self.write_pass(e.pass);
    }

    fn on_cache_sweep(&mut self, e: &CacheSweepEvent) {
        self.write_header(TAG_CACHE_SWEEP);
        self.write_u64(e.frame_index);
        self.write_u64(u64::try_from(e.evicted).unwrap_or(u64::MAX));
    }

    fn on_raster_status(&mut self, e: &RasterStatusEvent) {
        self.write_header(TAG_RASTER_STATUS);
        self.write_u64(e.frame_index);
        self.write_status(e.status);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.write_header(TAG_FRAME_END);
        self.write_u64(e.frame_index);
        self.write_u8(u8::from(e.rasterized));
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        self.write_header(TAG_DAMAGE);
        self.write_u64(e.frame_index);
        self.write_rect(e.frame_damage);
        self.write_rect(e.buffer_damage);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event payload.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
    /// A [`CacheSweepEvent`].
    CacheSweep(CacheSweepEvent),
    /// A [`RasterStatusEvent`].
    RasterStatus(RasterStatusEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`DamageEvent`].
    Damage(DamageEvent),
}

/// One decoded record: when it was recorded, and what happened.
#[derive(Clone, Debug)]
pub struct Record {
    /// Microseconds since the recorder was created.
    pub at_us: u64,
    /// The event payload.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_rect(&mut self) -> Option<kurbo::Rect> {
        Some(kurbo::Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_pass(&mut self) -> Option<PassKind> {
        Some(match self.read_u8()? {
            0 => PassKind::Diff,
            1 => PassKind::Preroll,
            _ => PassKind::Paint,
        })
    }

    fn read_status(&mut self) -> Option<RasterStatus> {
        Some(match self.read_u8()? {
            0 => RasterStatus::Success,
            1 => RasterStatus::Resubmit,
            2 => RasterStatus::SkipAndRetry,
            3 => RasterStatus::EnqueuePipeline,
            4 => RasterStatus::Failed,
            5 => RasterStatus::Discarded,
            _ => RasterStatus::Yielded,
        })
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        match tag {
            TAG_FRAME_BEGIN => Some(RecordedEvent::FrameBegin(FrameBeginEvent {
                frame_index: self.read_u64()?,
                acquired_at: HostTime(self.read_u64()?),
                instrumentation_enabled: self.read_u8()? != 0,
            })),
            TAG_PASS_BEGIN => Some(RecordedEvent::PassBegin(PassBeginEvent {
                frame_index: self.read_u64()?,
                pass: self.read_pass()?,
            })),
            TAG_PASS_END => Some(RecordedEvent::PassEnd(PassEndEvent {
                frame_index: self.read_u64()?,
                pass: self.read_pass()?,
            })),
            TAG_CACHE_SWEEP => Some(RecordedEvent::CacheSweep(CacheSweepEvent {
                frame_index: self.read_u64()?,
                evicted: usize::try_from(self.read_u64()?).ok()?,
            })),
            TAG_RASTER_STATUS => Some(RecordedEvent::RasterStatus(RasterStatusEvent {
                frame_index: self.read_u64()?,
                status: self.read_status()?,
            })),
            TAG_FRAME_END => Some(RecordedEvent::FrameEnd(FrameEndEvent {
                frame_index: self.read_u64()?,
                rasterized: self.read_u8()? != 0,
            })),
            TAG_DAMAGE => Some(RecordedEvent::Damage(DamageEvent {
                frame_index: self.read_u64()?,
                frame_damage: self.read_rect()?,
                buffer_damage: self.read_rect()?,
            })),
            _ => None, // unknown tag → stop iteration
        }
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at_us = self.read_u64()?;
        let event = self.decode_event(tag)?;
        Some(Record { at_us, event })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_frame_begin() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 7,
            acquired_at: HostTime(1_000_000),
            instrumentation_enabled: true,
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 1);
        match &records[0].event {
            RecordedEvent::FrameBegin(e) => {
                assert_eq!(e.frame_index, 7);
                assert_eq!(e.acquired_at, HostTime(1_000_000));
                assert!(e.instrumentation_enabled);
            }
            other => panic!("expected FrameBegin, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_pass_events() {
        let mut rec = RecorderSink::new();
        rec.on_pass_begin(&PassBeginEvent {
            frame_index: 5,
            pass: PassKind::Paint,
        });
        rec.on_pass_end(&PassEndEvent {
            frame_index: 5,
            pass: PassKind::Paint,
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 2);
        match &records[0].event {
            RecordedEvent::PassBegin(e) => {
                assert_eq!(e.frame_index, 5);
                assert_eq!(e.pass, PassKind::Paint);
            }
            other => panic!("expected PassBegin, got {other:?}"),
        }
        match &records[1].event {
            RecordedEvent::PassEnd(e) => {
                assert_eq!(e.frame_index, 5);
                assert_eq!(e.pass, PassKind::Paint);
            }
            other => panic!("expected PassEnd, got {other:?}"),
        }
        assert!(
            records[0].at_us <= records[1].at_us,
            "record stamps are monotonic"
        );
    }

    #[test]
    fn round_trip_raster_status_variants() {
        let statuses = [
            RasterStatus::Success,
            RasterStatus::Resubmit,
            RasterStatus::SkipAndRetry,
            RasterStatus::EnqueuePipeline,
            RasterStatus::Failed,
            RasterStatus::Discarded,
            RasterStatus::Yielded,
        ];
        let mut rec = RecorderSink::new();
        for status in statuses {
            rec.on_raster_status(&RasterStatusEvent {
                frame_index: 0,
                status,
            });
        }

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), statuses.len());
        for (record, expected) in records.iter().zip(statuses) {
            match &record.event {
                RecordedEvent::RasterStatus(e) => assert_eq!(e.status, expected),
                other => panic!("expected RasterStatus, got {other:?}"),
            }
        }
    }

    #[test]
    fn round_trip_damage() {
        let mut rec = RecorderSink::new();
        rec.on_damage(&DamageEvent {
            frame_index: 3,
            frame_damage: kurbo::Rect::new(1.5, 2.5, 30.0, 40.0),
            buffer_damage: kurbo::Rect::new(0.0, 0.0, 64.0, 64.0),
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 1);
        match &records[0].event {
            RecordedEvent::Damage(e) => {
                assert_eq!(e.frame_damage, kurbo::Rect::new(1.5, 2.5, 30.0, 40.0));
                assert_eq!(e.buffer_damage, kurbo::Rect::new(0.0, 0.0, 64.0, 64.0));
            }
            other => panic!("expected Damage, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_multiple_events() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            acquired_at: HostTime(10),
            instrumentation_enabled: false,
        });
        rec.on_cache_sweep(&CacheSweepEvent {
            frame_index: 0,
            evicted: 3,
        });
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 0,
            rasterized: true,
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0].event, RecordedEvent::FrameBegin(_)));
        assert!(matches!(records[1].event, RecordedEvent::CacheSweep(_)));
        assert!(matches!(records[2].event, RecordedEvent::FrameEnd(_)));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let records: Vec<_> = decode(&[]).collect();
        assert!(records.is_empty());
    }
}
