// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A fully built frame description, ready to preroll and paint.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Affine, Rect, Size};

use super::{Layer, PaintContext, PrerollContext};
use crate::diff::PaintRegionMap;

/// The retained tree for one frame, plus the surface metrics it was
/// built against.
///
/// After a diff pass the tree also carries the paint regions recorded
/// for its layers, which the next frame's diff reads as its baseline.
pub struct LayerTree {
    root_layer: Option<Box<dyn Layer>>,
    frame_size: Size,
    device_pixel_ratio: f64,
    checkerboard_offscreen_layers: bool,
    paint_regions: PaintRegionMap,
}

impl LayerTree {
    /// Creates a tree for a surface of `frame_size` logical units at
    /// `device_pixel_ratio` physical pixels per unit.
    #[must_use]
    pub fn new(root_layer: Option<Box<dyn Layer>>, frame_size: Size, device_pixel_ratio: f64) -> Self {
        Self {
            root_layer,
            frame_size,
            device_pixel_ratio,
            checkerboard_offscreen_layers: false,
            paint_regions: PaintRegionMap::new(),
        }
    }

    /// The root layer, if the tree is non-empty.
    #[must_use]
    pub fn root_layer(&self) -> Option<&dyn Layer> {
        self.root_layer.as_deref()
    }

    /// Logical size of the surface this tree was built for.
    #[must_use]
    pub const fn frame_size(&self) -> Size {
        self.frame_size
    }

    /// Physical pixels per logical unit.
    #[must_use]
    pub const fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// The frame as a rectangle at the origin.
    #[must_use]
    pub fn frame_bounds(&self) -> Rect {
        self.frame_size.to_rect()
    }

    /// Enables the debugging checkerboard over offscreen buffers.
    pub fn set_checkerboard_offscreen_layers(&mut self, enabled: bool) {
        self.checkerboard_offscreen_layers = enabled;
    }

    /// See [`Self::set_checkerboard_offscreen_layers`].
    #[must_use]
    pub const fn checkerboard_offscreen_layers(&self) -> bool {
        self.checkerboard_offscreen_layers
    }

    /// Paint regions recorded by the most recent diff over this tree.
    #[must_use]
    pub const fn paint_regions(&self) -> &PaintRegionMap {
        &self.paint_regions
    }

    /// Installs the paint regions recorded by a diff pass.
    pub fn set_paint_regions(&mut self, regions: PaintRegionMap) {
        self.paint_regions = regions;
    }

    /// Runs the measuring pass and returns the root's settled bounds.
    pub fn preroll(&mut self, context: &mut PrerollContext<'_>, root_transform: Affine) -> Rect {
        match &mut self.root_layer {
            Some(root) => {
                root.preroll(context, root_transform);
                root.paint_bounds()
            }
            None => Rect::ZERO,
        }
    }

    /// Runs the paint pass. An empty or fully culled tree paints nothing.
    pub fn paint(&self, context: &mut PaintContext<'_>) {
        if let Some(root) = &self.root_layer
            && root.needs_painting(context)
        {
            root.paint(context);
        }
    }
}

impl fmt::Debug for LayerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerTree")
            .field("root_layer", &self.root_layer.is_some())
            .field("frame_size", &self.frame_size)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("paint_regions", &self.paint_regions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Shape as _;

    use super::*;
    use crate::color::Color;
    use crate::layer::{Clip, ShapeLayer};

    fn square_layer(rect: Rect) -> Box<dyn Layer> {
        Box::new(ShapeLayer::new(
            Color::BLACK,
            Color::BLACK,
            0.0,
            rect.to_path(1e-9),
            Clip::None,
        ))
    }

    #[test]
    fn preroll_settles_root_bounds() {
        let mut tree = LayerTree::new(
            Some(square_layer(Rect::new(5.0, 5.0, 25.0, 25.0))),
            Size::new(100.0, 100.0),
            1.0,
        );
        let mut context = PrerollContext {
            raster_cache: None,
            device_pixel_ratio: tree.device_pixel_ratio(),
            cull_rect: tree.frame_bounds(),
        };
        let bounds = tree.preroll(&mut context, Affine::IDENTITY);
        assert_eq!(bounds, Rect::new(5.0, 5.0, 25.0, 25.0));
    }

    #[test]
    fn empty_tree_prerolls_to_empty_bounds() {
        let mut tree = LayerTree::new(None, Size::new(100.0, 100.0), 1.0);
        let mut context = PrerollContext {
            raster_cache: None,
            device_pixel_ratio: 1.0,
            cull_rect: tree.frame_bounds(),
        };
        assert_eq!(tree.preroll(&mut context, Affine::IDENTITY), Rect::ZERO);
    }

    #[test]
    fn frame_bounds_sit_at_the_origin() {
        let tree = LayerTree::new(None, Size::new(640.0, 480.0), 2.0);
        assert_eq!(tree.frame_bounds(), Rect::new(0.0, 0.0, 640.0, 480.0));
    }
}
