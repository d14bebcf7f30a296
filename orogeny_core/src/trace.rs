// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the raster pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the frame lifecycle calls at each stage. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates the [`DamageEvent`] carrying
//!   the computed damage rectangles.

use crate::compositor::RasterStatus;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which pass over the layer tree is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Damage diff against the previous frame's tree.
    Diff,
    /// Measuring pass settling paint bounds.
    Preroll,
    /// Drawing command emission.
    Paint,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame is acquired from the compositor.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time when the frame was acquired.
    pub acquired_at: HostTime,
    /// Whether per-frame stopwatches run for this frame.
    pub instrumentation_enabled: bool,
}

/// Marks the beginning of a pass over the tree.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which pass is starting.
    pub pass: PassKind,
}

/// Marks the end of a pass over the tree.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which pass is ending.
    pub pass: PassKind,
}

/// Emitted after the frame-start raster cache sweep.
#[derive(Clone, Copy, Debug)]
pub struct CacheSweepEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Entries evicted by the sweep.
    pub evicted: usize,
}

/// Emitted once per rasterization attempt with its outcome.
#[derive(Clone, Copy, Debug)]
pub struct RasterStatusEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// How the attempt ended.
    pub status: RasterStatus,
}

/// Emitted when the frame's lifetime ends, whether or not it rasterized.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Whether `raster` ran for this frame.
    pub rasterized: bool,
}

/// The damage pair computed for a frame (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Minimal repaint area, in logical coordinates.
    pub frame_damage: kurbo::Rect,
    /// Repaint area adjusted for the buffering strategy.
    pub buffer_damage: kurbo::Rect,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the raster pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame is acquired.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a pass over the tree.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pass over the tree.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called after the frame-start raster cache sweep.
    fn on_cache_sweep(&mut self, e: &CacheSweepEvent) {
        _ = e;
    }

    /// Called once per rasterization attempt with its outcome.
    fn on_raster_status(&mut self, e: &RasterStatusEvent) {
        _ = e;
    }

    /// Called when the frame's lifetime ends.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called with the computed damage (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_damage(&mut self, e: &DamageEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CacheSweepEvent`].
    #[inline]
    pub fn cache_sweep(&mut self, e: &CacheSweepEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cache_sweep(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RasterStatusEvent`].
    #[inline]
    pub fn raster_status(&mut self, e: &RasterStatusEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_raster_status(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEndEvent`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DamageEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage(&mut self, e: &DamageEvent) {
        if let Some(s) = &mut self.sink {
            s.on_damage(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
