// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).
//! Host times are printed in raw ticks, since their unit is defined by
//! the host feeding the compositor.

use std::io::Write;

use orogeny_core::trace::{
    CacheSweepEvent, DamageEvent, FrameBeginEvent, FrameEndEvent, PassBeginEvent, PassEndEvent,
    PassKind, RasterStatusEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn pass_name(pass: PassKind) -> &'static str {
    match pass {
        PassKind::Diff => "diff",
        PassKind::Preroll => "preroll",
        PassKind::Paint => "paint",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let instrumented = if e.instrumentation_enabled { "on" } else { "off" };
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} at={}t instrumentation={instrumented}",
            e.frame_index,
            e.acquired_at.ticks(),
        );
    }

    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] frame={} {}",
            e.frame_index,
            pass_name(e.pass),
        );
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:end] frame={} {}",
            e.frame_index,
            pass_name(e.pass),
        );
    }

    fn on_cache_sweep(&mut self, e: &CacheSweepEvent) {
        let _ = writeln!(
            self.writer,
            "[cache] frame={} evicted={}",
            e.frame_index, e.evicted,
        );
    }

    fn on_raster_status(&mut self, e: &RasterStatusEvent) {
        let _ = writeln!(
            self.writer,
            "[status] frame={} {:?}",
            e.frame_index, e.status,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let rasterized = if e.rasterized { "rasterized" } else { "abandoned" };
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} {rasterized}",
            e.frame_index,
        );
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        let _ = writeln!(
            self.writer,
            "[damage] frame={} frame_damage={:?} buffer_damage={:?}",
            e.frame_index, e.frame_damage, e.buffer_damage,
        );
    }
}
