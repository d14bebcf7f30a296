// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage-tracked layer tree rasterization pipeline.
//!
//! `orogeny_core` provides the per-frame core of a retained-mode compositor:
//! it decides how much of the previous frame's pixels can be reused versus
//! repainted, runs a bounded sequence of passes over the layer tree, and
//! reports a terminal frame outcome that host scheduling acts on. It is
//! `no_std` compatible (with `alloc`); platform concerns (the drawing
//! surface, the GPU context, windowing and threading) stay behind the traits
//! in [`backend`].
//!
//! # Architecture
//!
//! Each frame flows through the controller and the three passes:
//!
//! ```text
//!   Host
//!     │ acquire_frame()
//!     ▼
//!   CompositorContext ──► ScopedFrame::raster(tree, damage)
//!                              │
//!            ┌─────────────────┼──────────────────┐
//!            ▼                 ▼                  ▼
//!       Diff (DiffContext) Preroll (bounds)   Paint (Canvas)
//!            │
//!            ▼
//!       Damage{frame, buffer} ──► host restricts repaint/present
//!                              │
//!                              ▼
//!                         RasterStatus ──► host retry/advance logic
//! ```
//!
//! **[`layer`]** — The three-pass visitor protocol ([`layer::Layer`]) every
//! tree node implements, the representative [`layer::ShapeLayer`], and the
//! per-frame [`layer::LayerTree`].
//!
//! **[`diff`]** — Old-vs-new tree comparison producing the minimal repaint
//! rectangle, with scoped dirty/cull state and per-layer paint regions.
//!
//! **[`damage`]** — The damage calculator: previous-tree baseline,
//! additional-damage accumulation, and the clip rectangle for the paint pass.
//!
//! **[`compositor`]** — The frame lifecycle controller: scoped one-shot
//! frames, begin/end hooks, and the [`compositor::RasterStatus`] outcome.
//!
//! **[`cache`]** / **[`texture`]** — Auxiliary registries scoped to the
//! controller: a bounded raster cache keyed by (picture, transform) and an
//! external-texture registry, both reset on GPU context loss.
//!
//! **[`backend`]** — Traits the platform side implements: the drawing
//! [`backend::Canvas`], the GPU context, the external-view embedder, and the
//! thread-merge cooperation token.
//!
//! **[`instrument`]** / **[`time`]** — Frame counter and host-time-fed
//! stopwatches; core never reads a clock, hosts pass [`time::HostTime`] in.
//!
//! **[`trace`]** — [`trace::TraceSink`] trait and event types for
//! frame-pipeline instrumentation, with zero-overhead [`trace::Tracer`]
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-frame
//!   damage-rect events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod cache;
pub mod color;
pub mod compositor;
pub mod damage;
pub mod diff;
pub mod instrument;
pub mod layer;
pub mod texture;
pub mod time;
pub mod trace;
