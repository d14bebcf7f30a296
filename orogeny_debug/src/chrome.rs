// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes
//! [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{Record, RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable
/// for loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are the recorder's microsecond stamps.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for Record { at_us, event } in decode(bytes) {
        match event {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "acquired_at_ticks": e.acquired_at.ticks(),
                        "instrumentation": e.instrumentation_enabled,
                    }
                }));
            }
            RecordedEvent::PassBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.pass),
                    "cat": "Pass",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PassEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.pass),
                    "cat": "Pass",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::CacheSweep(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CacheSweep",
                    "cat": "Cache",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "evicted": e.evicted,
                    }
                }));
            }
            RecordedEvent::RasterStatus(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RasterStatus",
                    "cat": "Frame",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "status": format!("{:?}", e.status),
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameEnd",
                    "cat": "Frame",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "rasterized": e.rasterized,
                    }
                }));
            }
            RecordedEvent::Damage(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Damage",
                    "cat": "Rich",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "frame_damage": [
                            e.frame_damage.x0,
                            e.frame_damage.y0,
                            e.frame_damage.x1,
                            e.frame_damage.y1,
                        ],
                        "buffer_damage": [
                            e.buffer_damage.x0,
                            e.buffer_damage.y0,
                            e.buffer_damage.x1,
                            e.buffer_damage.y1,
                        ],
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
