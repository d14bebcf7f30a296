// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Orogeny splits platform-specific work out behind traits. A platform
//! integration provides the following pieces:
//!
//! - **Canvas** — The 2D drawing surface the paint pass draws into
//!   (path fills, clips, shadows, offscreen save layers). The controller
//!   borrows it for the lifetime of one [`ScopedFrame`].
//!
//! - **GPU context** — A handle to the backend graphics context. The
//!   controller only queries validity and access; allocation and loss
//!   recovery belong to the platform. Context loss between frames is
//!   reported through
//!   [`CompositorContext::on_gpu_context_destroyed`].
//!
//! - **View embedder** — Composites platform views (native overlays)
//!   interleaved with the layer tree. Its
//!   [`post_preroll`](ViewEmbedder::post_preroll) answer can force a frame
//!   to be resubmitted or retried.
//!
//! - **Thread merger** — The cooperation token coordinating temporary
//!   shared execution between the tree-producing thread and the
//!   rasterizing thread. Its answers surface as the
//!   [`RasterStatus`](crate::compositor::RasterStatus) retry variants.
//!
//! # Crate boundaries
//!
//! `orogeny_core` owns the data model, the diff/preroll/paint passes, and
//! this contract module. Platform crates implement these traits and drive
//! the frame loop; application code wires the two together.
//!
//! [`ScopedFrame`]: crate::compositor::ScopedFrame
//! [`CompositorContext::on_gpu_context_destroyed`]: crate::compositor::CompositorContext::on_gpu_context_destroyed

use kurbo::{Affine, BezPath, Rect, Size};

use crate::color::Color;

/// A save/restore depth returned by [`Canvas::save`].
pub type SaveCount = usize;

/// The 2D drawing surface the paint pass draws into.
///
/// The contract mirrors an immediate-mode vector canvas with a
/// save/restore stack: `save` pushes drawing state (transform and clip),
/// `restore_to_count` pops back to a previously returned depth. All
/// geometry is in the coordinate space established by
/// [`set_transform`](Self::set_transform) at frame start.
pub trait Canvas {
    /// Pushes the current drawing state and returns the depth to restore to.
    fn save(&mut self) -> SaveCount;

    /// Pushes an offscreen compositing layer bounded by `bounds`.
    ///
    /// Subsequent drawing is composited into a separate buffer which is
    /// blended back when the state stack pops past this entry.
    fn save_layer(&mut self, bounds: Rect);

    /// Pops drawing state until the stack depth equals `count`.
    fn restore_to_count(&mut self, count: SaveCount);

    /// Replaces the base transform for the frame.
    fn set_transform(&mut self, transform: Affine);

    /// Intersects the current clip with `rect`.
    fn clip_rect(&mut self, rect: Rect);

    /// Intersects the current clip with `path`, optionally anti-aliased.
    fn clip_path(&mut self, path: &BezPath, anti_alias: bool);

    /// Fills `path` with `color`.
    fn draw_path(&mut self, path: &BezPath, color: Color, anti_alias: bool);

    /// Fills the entire current clip with `color`.
    fn draw_paint(&mut self, color: Color);

    /// Fills `rect` with `color`.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Draws a directional-light shadow beneath `path`.
    ///
    /// `ambient` and `spot` are the pre-derived tonal shadow colors;
    /// `occluder_z` is the occluder height in device pixels
    /// (elevation × device pixel ratio); `transparent_occluder` hints that
    /// the occluding fill is itself non-opaque so the shadow must also be
    /// drawn where the fill will cover it.
    fn draw_shadow(
        &mut self,
        path: &BezPath,
        ambient: Color,
        spot: Color,
        occluder_z: f64,
        transparent_occluder: bool,
    );
}

/// A borrowed handle to the backend GPU context.
///
/// The controller never owns the context; creation and destruction
/// notifications arrive through
/// [`CompositorContext::on_gpu_context_created`] /
/// [`on_gpu_context_destroyed`], strictly outside any active frame.
///
/// [`CompositorContext::on_gpu_context_created`]: crate::compositor::CompositorContext::on_gpu_context_created
/// [`on_gpu_context_destroyed`]: crate::compositor::CompositorContext::on_gpu_context_destroyed
pub trait GpuContext {
    /// Returns `true` if the backend context has been lost.
    fn is_lost(&self) -> bool;

    /// Binds the context for rendering; `false` means GPU access was denied
    /// and the frame must be discarded.
    fn make_current(&mut self) -> bool;
}

/// What the embedder wants done with the frame after preroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PostPrerollAction {
    /// Proceed to paint.
    #[default]
    Success,
    /// Submit this frame, then submit the identical tree again; the first
    /// submission does not make output visible on this platform.
    ResubmitFrame,
    /// Drop the frame and retry the identical tree once the producing and
    /// rasterizing threads have merged.
    SkipAndRetryFrame,
}

/// Composites embedded platform views interleaved with the layer tree.
///
/// All methods default to no-ops so that hosts without platform views can
/// pass a trivial implementation (or none at all).
pub trait ViewEmbedder {
    /// Called before preroll with the frame dimensions.
    fn begin_frame(&mut self, frame_size: Size, device_pixel_ratio: f64) {
        _ = (frame_size, device_pixel_ratio);
    }

    /// Called after preroll; may redirect the frame.
    fn post_preroll(&mut self, merger: Option<&dyn ThreadMerger>) -> PostPrerollAction {
        _ = merger;
        PostPrerollAction::Success
    }

    /// Called after the paint pass completes.
    fn submit_frame(&mut self) {}
}

/// The thread-merge cooperation token.
///
/// Coordinates temporary shared execution between the tree-producing
/// thread and the rasterizing thread. The controller only reads it; merge
/// and split transitions are driven by the windowing layer.
pub trait ThreadMerger {
    /// Returns `true` once both roles share one execution context.
    fn is_merged(&self) -> bool;

    /// Returns `true` if rasterization should cede to let the other thread
    /// proceed; the frame ends with
    /// [`RasterStatus::Yielded`](crate::compositor::RasterStatus::Yielded).
    fn should_yield(&self) -> bool {
        false
    }

    /// Returns the number of trees queued behind a thread-configuration
    /// change; nonzero turns a successful frame into
    /// [`RasterStatus::EnqueuePipeline`](crate::compositor::RasterStatus::EnqueuePipeline).
    fn queued_trees(&self) -> usize {
        0
    }
}

/// Cell size of the diagnostic checkerboard, in logical pixels.
const CHECKERBOARD_CELL: f64 = 8.0;

/// Overlay colors for alternating checkerboard cells.
const CHECKERBOARD_LIGHT: Color = Color(0x4064_C864);
const CHECKERBOARD_DARK: Color = Color(0x4000_8000);

/// Draws the diagnostic checkerboard overlay used to visualize offscreen
/// save layers.
pub fn draw_checkerboard(canvas: &mut dyn Canvas, rect: Rect) {
    if rect.is_zero_area() {
        return;
    }
    let mut y = rect.y0;
    let mut row = 0_u32;
    while y < rect.y1 {
        let mut x = rect.x0;
        let mut col = 0_u32;
        while x < rect.x1 {
            let cell = Rect::new(
                x,
                y,
                (x + CHECKERBOARD_CELL).min(rect.x1),
                (y + CHECKERBOARD_CELL).min(rect.y1),
            );
            let color = if (row + col) % 2 == 0 {
                CHECKERBOARD_LIGHT
            } else {
                CHECKERBOARD_DARK
            };
            canvas.draw_rect(cell, color);
            x += CHECKERBOARD_CELL;
            col += 1;
        }
        y += CHECKERBOARD_CELL;
        row += 1;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    struct CellCounter {
        rects: Vec<Rect>,
    }

    impl Canvas for CellCounter {
        fn save(&mut self) -> SaveCount {
            0
        }
        fn save_layer(&mut self, _bounds: Rect) {}
        fn restore_to_count(&mut self, _count: SaveCount) {}
        fn set_transform(&mut self, _transform: Affine) {}
        fn clip_rect(&mut self, _rect: Rect) {}
        fn clip_path(&mut self, _path: &BezPath, _anti_alias: bool) {}
        fn draw_path(&mut self, _path: &BezPath, _color: Color, _anti_alias: bool) {}
        fn draw_paint(&mut self, _color: Color) {}
        fn draw_rect(&mut self, rect: Rect, _color: Color) {
            self.rects.push(rect);
        }
        fn draw_shadow(
            &mut self,
            _path: &BezPath,
            _ambient: Color,
            _spot: Color,
            _occluder_z: f64,
            _transparent_occluder: bool,
        ) {
        }
    }

    #[test]
    fn checkerboard_covers_bounds() {
        let mut canvas = CellCounter { rects: Vec::new() };
        draw_checkerboard(&mut canvas, Rect::new(0.0, 0.0, 20.0, 10.0));
        // 3 columns (8 + 8 + 4) by 2 rows (8 + 2).
        assert_eq!(canvas.rects.len(), 6);
        assert!(
            canvas
                .rects
                .iter()
                .all(|r| r.x1 <= 20.0 + f64::EPSILON && r.y1 <= 10.0 + f64::EPSILON),
            "cells must stay inside the bounds"
        );
    }

    #[test]
    fn checkerboard_skips_empty_rect() {
        let mut canvas = CellCounter { rects: Vec::new() };
        draw_checkerboard(&mut canvas, Rect::ZERO);
        assert!(canvas.rects.is_empty());
    }
}
