// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame lifecycle: acquire a frame, rasterize a tree, report how
//! it went.
//!
//! [`CompositorContext`] owns the state that outlives any single frame
//! (the raster cache, the texture registry, the instrumentation). A
//! frame is acquired as a [`ScopedFrame`], which borrows the context
//! exclusively so only one frame can be in flight at a time. Frame
//! begin work runs at acquisition; frame end work runs when the scoped
//! frame is consumed by [`ScopedFrame::raster`] or dropped without
//! rasterizing.
//!
//! The compositor never reads a clock. Hosts pass [`HostTime`] at the
//! acquire and raster boundaries, and the stopwatches account against
//! those timestamps.

use kurbo::Affine;

use crate::backend::{Canvas, GpuContext, PostPrerollAction, ThreadMerger, ViewEmbedder};
use crate::cache::RasterCache;
use crate::damage::FrameDamage;
use crate::instrument::{Counter, Stopwatch};
use crate::layer::{LayerTree, PaintContext, PrerollContext};
use crate::texture::TextureRegistry;
use crate::time::HostTime;
use crate::trace::{
    CacheSweepEvent, FrameBeginEvent, FrameEndEvent, PassBeginEvent, PassEndEvent, PassKind,
    RasterStatusEvent, Tracer,
};

/// How a rasterization attempt ended.
///
/// Anything other than [`RasterStatus::Failed`] leaves the pipeline in a
/// defined state; the variants tell the host what to do with the tree it
/// submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterStatus {
    /// The tree rasterized and was submitted.
    Success,
    /// The tree was not consumed; submit the same tree again next frame.
    Resubmit,
    /// The tree was discarded; skip it and build a fresh one.
    SkipAndRetry,
    /// The tree rasterized, and more trees are already queued; keep the
    /// pipeline draining without waiting for a vsync.
    EnqueuePipeline,
    /// The GPU context is unusable; nothing was drawn.
    Failed,
    /// The GPU context refused activation; the frame is abandoned
    /// without drawing, but the context itself is still healthy.
    Discarded,
    /// The raster thread yielded to higher-priority platform work
    /// before touching the tree.
    Yielded,
}

/// State that persists across frames.
#[derive(Debug)]
pub struct CompositorContext {
    raster_cache: RasterCache,
    texture_registry: TextureRegistry,
    frame_count: Counter,
    raster_time: Stopwatch,
    ui_time: Stopwatch,
}

impl CompositorContext {
    /// Creates a context whose raster cache holds at most
    /// `raster_cache_capacity` entries.
    #[must_use]
    pub const fn new(raster_cache_capacity: usize) -> Self {
        Self {
            raster_cache: RasterCache::new(raster_cache_capacity),
            texture_registry: TextureRegistry::new(),
            frame_count: Counter::new(),
            raster_time: Stopwatch::new(),
            ui_time: Stopwatch::new(),
        }
    }

    /// Acquires the next frame. The returned [`ScopedFrame`] borrows
    /// this context exclusively, so a second frame cannot be acquired
    /// until the first ends.
    ///
    /// Frame begin work happens here: the raster cache is swept, and
    /// when `instrumentation_enabled` the raster stopwatch starts at
    /// `now`.
    pub fn acquire_frame<'a>(
        &'a mut self,
        gpu_context: Option<&'a mut dyn GpuContext>,
        canvas: &'a mut dyn Canvas,
        view_embedder: Option<&'a mut dyn ViewEmbedder>,
        root_surface_transformation: Affine,
        instrumentation_enabled: bool,
        surface_supports_readback: bool,
        raster_thread_merger: Option<&'a dyn ThreadMerger>,
        tracer: &mut Tracer<'_>,
        now: HostTime,
    ) -> ScopedFrame<'a> {
        let frame_index = self.frame_count.count();
        let evicted = self.raster_cache.sweep();
        if instrumentation_enabled {
            self.raster_time.start(now);
        }
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            acquired_at: now,
            instrumentation_enabled,
        });
        tracer.cache_sweep(&CacheSweepEvent {
            frame_index,
            evicted,
        });
        ScopedFrame {
            context: self,
            gpu_context,
            canvas,
            view_embedder,
            root_surface_transformation,
            instrumentation_enabled,
            surface_supports_readback,
            raster_thread_merger,
            frame_index,
            ended: false,
        }
    }

    /// A new GPU context became available.
    pub fn on_gpu_context_created(&mut self) {
        self.texture_registry.on_context_created();
    }

    /// The GPU context was lost; cached rasterizations are gone with it.
    pub fn on_gpu_context_destroyed(&mut self) {
        self.raster_cache.clear();
        self.texture_registry.on_context_destroyed();
    }

    /// Frames acquired so far.
    #[must_use]
    pub const fn frame_count(&self) -> &Counter {
        &self.frame_count
    }

    /// Time spent between frame acquisition and the end of raster.
    #[must_use]
    pub const fn raster_time(&self) -> &Stopwatch {
        &self.raster_time
    }

    /// Stopwatch for the host's tree-building side, accounted by the
    /// host itself.
    pub fn ui_time_mut(&mut self) -> &mut Stopwatch {
        &mut self.ui_time
    }

    /// The shared raster cache.
    #[must_use]
    pub const fn raster_cache(&self) -> &RasterCache {
        &self.raster_cache
    }

    /// Mutable access to the raster cache.
    pub fn raster_cache_mut(&mut self) -> &mut RasterCache {
        &mut self.raster_cache
    }

    /// Mutable access to the external texture registry.
    pub fn texture_registry_mut(&mut self) -> &mut TextureRegistry {
        &mut self.texture_registry
    }
}

/// One acquired frame. Consumed by [`Self::raster`]; dropping it
/// without rasterizing still runs the frame end work.
pub struct ScopedFrame<'a> {
    context: &'a mut CompositorContext,
    gpu_context: Option<&'a mut dyn GpuContext>,
    canvas: &'a mut dyn Canvas,
    view_embedder: Option<&'a mut dyn ViewEmbedder>,
    root_surface_transformation: Affine,
    instrumentation_enabled: bool,
    surface_supports_readback: bool,
    raster_thread_merger: Option<&'a dyn ThreadMerger>,
    frame_index: u64,
    ended: bool,
}

impl core::fmt::Debug for ScopedFrame<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScopedFrame")
            .field("frame_index", &self.frame_index)
            .field("instrumentation_enabled", &self.instrumentation_enabled)
            .field("surface_supports_readback", &self.surface_supports_readback)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl ScopedFrame<'_> {
    /// The transform mapping the tree's logical space onto the surface.
    #[must_use]
    pub const fn root_surface_transformation(&self) -> Affine {
        self.root_surface_transformation
    }

    /// Whether the target surface can be read back into memory.
    #[must_use]
    pub const fn surface_supports_readback(&self) -> bool {
        self.surface_supports_readback
    }

    /// Rasterizes `layer_tree` into this frame's canvas.
    ///
    /// `frame_damage`, when provided, is consulted for a partial-repaint
    /// clip and updated with the damage this tree produced. `now` is the
    /// host time at the end of the attempt, used to settle the raster
    /// stopwatch.
    pub fn raster(
        mut self,
        layer_tree: &mut LayerTree,
        ignore_raster_cache: bool,
        frame_damage: Option<&mut FrameDamage<'_>>,
        tracer: &mut Tracer<'_>,
        now: HostTime,
    ) -> RasterStatus {
        let status = self.try_raster(layer_tree, ignore_raster_cache, frame_damage, tracer);
        tracer.raster_status(&RasterStatusEvent {
            frame_index: self.frame_index,
            status,
        });
        self.end(true, now, tracer);
        status
    }

    fn try_raster(
        &mut self,
        layer_tree: &mut LayerTree,
        ignore_raster_cache: bool,
        frame_damage: Option<&mut FrameDamage<'_>>,
        tracer: &mut Tracer<'_>,
    ) -> RasterStatus {
        // Platform work queued behind the raster thread takes priority
        // over drawing this tree.
        if self
            .raster_thread_merger
            .is_some_and(ThreadMerger::should_yield)
        {
            return RasterStatus::Yielded;
        }

        match &mut self.gpu_context {
            None => return RasterStatus::Failed,
            Some(gpu) => {
                if gpu.is_lost() {
                    return RasterStatus::Failed;
                }
                if !gpu.make_current() {
                    return RasterStatus::Discarded;
                }
            }
        }

        tracer.pass_begin(&PassBeginEvent {
            frame_index: self.frame_index,
            pass: PassKind::Diff,
        });
        let clip_rect = frame_damage.map(|damage| {
            let clip = damage.compute_clip_rect(layer_tree);
            #[cfg(feature = "trace-rich")]
            if let (Some(frame), Some(buffer)) = (damage.frame_damage(), damage.buffer_damage()) {
                tracer.damage(&crate::trace::DamageEvent {
                    frame_index: self.frame_index,
                    frame_damage: frame,
                    buffer_damage: buffer,
                });
            }
            clip
        });
        tracer.pass_end(&PassEndEvent {
            frame_index: self.frame_index,
            pass: PassKind::Diff,
        });

        // Some(Some(empty)) means the diff proved nothing changed.
        if let Some(Some(clip)) = clip_rect
            && clip.is_zero_area()
        {
            return RasterStatus::Success;
        }

        if let Some(embedder) = &mut self.view_embedder {
            embedder.begin_frame(layer_tree.frame_size(), layer_tree.device_pixel_ratio());
        }

        tracer.pass_begin(&PassBeginEvent {
            frame_index: self.frame_index,
            pass: PassKind::Preroll,
        });
        let cull_rect = match clip_rect {
            Some(Some(clip)) => clip,
            _ => layer_tree.frame_bounds(),
        };
        let mut preroll_context = PrerollContext {
            raster_cache: (!ignore_raster_cache).then_some(&self.context.raster_cache),
            device_pixel_ratio: layer_tree.device_pixel_ratio(),
            cull_rect,
        };
        layer_tree.preroll(&mut preroll_context, self.root_surface_transformation);
        tracer.pass_end(&PassEndEvent {
            frame_index: self.frame_index,
            pass: PassKind::Preroll,
        });

        if let Some(embedder) = &mut self.view_embedder {
            match embedder.post_preroll(self.raster_thread_merger) {
                PostPrerollAction::Success => {}
                PostPrerollAction::ResubmitFrame => return RasterStatus::Resubmit,
                PostPrerollAction::SkipAndRetryFrame => return RasterStatus::SkipAndRetry,
            }
        }

        tracer.pass_begin(&PassBeginEvent {
            frame_index: self.frame_index,
            pass: PassKind::Paint,
        });
        self.canvas.set_transform(self.root_surface_transformation);
        if let Some(Some(clip)) = clip_rect {
            self.canvas.clip_rect(clip);
        }
        let mut paint_context = PaintContext {
            canvas: &mut *self.canvas,
            raster_cache: (!ignore_raster_cache).then_some(&self.context.raster_cache),
            device_pixel_ratio: layer_tree.device_pixel_ratio(),
            cull_rect,
            checkerboard_offscreen_layers: layer_tree.checkerboard_offscreen_layers(),
        };
        layer_tree.paint(&mut paint_context);
        tracer.pass_end(&PassEndEvent {
            frame_index: self.frame_index,
            pass: PassKind::Paint,
        });

        if let Some(embedder) = &mut self.view_embedder {
            embedder.submit_frame();
        }

        if self
            .raster_thread_merger
            .is_some_and(|merger| merger.queued_trees() > 0)
        {
            return RasterStatus::EnqueuePipeline;
        }
        RasterStatus::Success
    }

    fn end(&mut self, rasterized: bool, now: HostTime, tracer: &mut Tracer<'_>) {
        debug_assert!(!self.ended, "frame ended twice");
        self.ended = true;
        self.context.frame_count.increment();
        if self.instrumentation_enabled {
            if rasterized {
                let _ = self.context.raster_time.stop(now);
            } else {
                self.context.raster_time.cancel();
            }
        }
        tracer.frame_end(&FrameEndEvent {
            frame_index: self.frame_index,
            rasterized,
        });
    }
}

impl Drop for ScopedFrame<'_> {
    fn drop(&mut self) {
        if !self.ended {
            self.ended = true;
            self.context.frame_count.increment();
            if self.instrumentation_enabled {
                self.context.raster_time.cancel();
            }
        }
    }
}
