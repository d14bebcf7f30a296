// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained layer tree and the three passes that run over it.
//!
//! A [`Layer`] participates in:
//!
//! - **diff** against its counterpart in the previous frame's tree,
//!   accumulating damage into a [`DiffContext`],
//! - **preroll**, a read-mostly measuring pass that settles paint bounds
//!   before any drawing happens,
//! - **paint**, which emits drawing commands to a [`Canvas`] and must be
//!   free of side effects on the tree itself.
//!
//! Layers are compared across frames by position among their siblings,
//! never by identity, so a layer must be able to diff against a
//! counterpart of a different concrete type (treated as fully changed).

mod clip;
mod shape;
mod tree;

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use kurbo::{Affine, Rect};

pub use clip::Clip;
pub use shape::{
    AMBIENT_ALPHA, LIGHT_HEIGHT, LIGHT_RADIUS, SPOT_ALPHA, ShapeLayer, compute_shadow_bounds,
};
pub use tree::LayerTree;

use crate::backend::Canvas;
use crate::cache::RasterCache;
use crate::damage::join;
use crate::diff::DiffContext;

/// State shared with every layer during the preroll pass.
#[derive(Debug)]
pub struct PrerollContext<'a> {
    /// Cache consulted for previously rasterized subtrees, when enabled.
    pub raster_cache: Option<&'a RasterCache>,
    /// Physical pixels per logical unit.
    pub device_pixel_ratio: f64,
    /// The region the frame will actually present; layers wholly outside
    /// it may skip expensive preparation.
    pub cull_rect: Rect,
}

/// State shared with every layer during the paint pass.
pub struct PaintContext<'a> {
    /// Drawing command sink.
    pub canvas: &'a mut dyn Canvas,
    /// Cache consulted for previously rasterized subtrees, when enabled.
    pub raster_cache: Option<&'a RasterCache>,
    /// Physical pixels per logical unit.
    pub device_pixel_ratio: f64,
    /// Pixels outside this rectangle will not be presented this frame.
    pub cull_rect: Rect,
    /// Overlay a checkerboard on offscreen buffers, for debugging
    /// unexpected `save_layer` usage.
    pub checkerboard_offscreen_layers: bool,
}

impl fmt::Debug for PaintContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaintContext")
            .field("raster_cache", &self.raster_cache)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("cull_rect", &self.cull_rect)
            .field(
                "checkerboard_offscreen_layers",
                &self.checkerboard_offscreen_layers,
            )
            .finish_non_exhaustive()
    }
}

/// A node in the retained layer tree.
///
/// The `Any` supertrait lets `diff` implementations downcast the previous
/// frame's counterpart to their own concrete type.
pub trait Layer: Any {
    /// Compares this layer against its positional counterpart from the
    /// previous frame, recording damage and this frame's paint regions.
    ///
    /// `old_layer` is `None` when no counterpart exists (the layer was
    /// added this frame, or there is no previous tree at all).
    fn diff(&self, context: &mut DiffContext<'_>, old_layer: Option<&dyn Layer>);

    /// Measures the layer, settling [`Layer::paint_bounds`] before paint.
    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine);

    /// Emits drawing commands. Must not mutate the tree; painting the
    /// same tree twice must produce identical command streams.
    fn paint(&self, context: &mut PaintContext<'_>);

    /// The region this layer (with its subtree) may draw into, valid
    /// after preroll.
    fn paint_bounds(&self) -> Rect;

    /// Child layers, in paint order.
    fn children(&self) -> &[Box<dyn Layer>];

    /// Whether the paint pass should visit this layer at all: it has
    /// non-empty bounds intersecting the frame's cull rectangle.
    fn needs_painting(&self, context: &PaintContext<'_>) -> bool {
        let bounds = self.paint_bounds();
        !bounds.is_zero_area() && !bounds.intersect(context.cull_rect).is_zero_area()
    }
}

impl fmt::Debug for dyn Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("paint_bounds", &self.paint_bounds())
            .field("children", &self.children().len())
            .finish_non_exhaustive()
    }
}

/// Prerolls `children` in order and returns the union of their bounds.
pub fn preroll_children(
    children: &mut [Box<dyn Layer>],
    context: &mut PrerollContext<'_>,
    matrix: Affine,
) -> Rect {
    let mut bounds = Rect::ZERO;
    for child in children {
        child.preroll(context, matrix);
        bounds = join(bounds, child.paint_bounds());
    }
    bounds
}

/// Paints each of `children` that [`Layer::needs_painting`].
pub fn paint_children(children: &[Box<dyn Layer>], context: &mut PaintContext<'_>) {
    for child in children {
        if child.needs_painting(context) {
            child.paint(context);
        }
    }
}
