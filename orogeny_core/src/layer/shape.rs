// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A filled path with optional elevation shadow and clipping.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use kurbo::{Affine, BezPath, Rect, Shape as _, Vec2};

use super::{Clip, Layer, PaintContext, PrerollContext, paint_children, preroll_children};
use crate::backend::draw_checkerboard;
use crate::color::Color;
use crate::damage::join;
use crate::diff::DiffContext;

/// Height of the virtual light source above the canvas plane, in
/// logical units.
pub const LIGHT_HEIGHT: f64 = 600.0;

/// Radius of the virtual light source, in logical units.
pub const LIGHT_RADIUS: f64 = 800.0;

/// Alpha scale applied to the shadow color for the ambient component.
pub const AMBIENT_ALPHA: f64 = 0.039;

/// Alpha scale applied to the shadow color for the spot component.
pub const SPOT_ALPHA: f64 = 0.25;

/// Conservative bounds of a shape together with the shadow it casts.
///
/// Flat shapes (`elevation <= 0`) cast no shadow. Elevated shapes cast a
/// penumbra that grows linearly with elevation and is displaced toward
/// positive y, matching an overhead light slightly behind the viewer.
/// The result is independent of where the shape sits on screen.
#[must_use]
pub fn compute_shadow_bounds(path: &BezPath, elevation: f64, device_pixel_ratio: f64) -> Rect {
    let bounds = path.bounding_box();
    if bounds.is_zero_area() {
        return Rect::ZERO;
    }
    if elevation <= 0.0 {
        return bounds;
    }
    let occluder_z = elevation * device_pixel_ratio;
    let penumbra = occluder_z * LIGHT_RADIUS / LIGHT_HEIGHT;
    let shadow = bounds.inflate(penumbra, penumbra) + Vec2::new(0.0, occluder_z);
    bounds.union(shadow)
}

/// A layer that fills a path, optionally clips its children to it, and
/// optionally casts an elevation shadow beneath it.
pub struct ShapeLayer {
    color: Color,
    shadow_color: Color,
    elevation: f64,
    path: BezPath,
    clip_behavior: Clip,
    children: Vec<Box<dyn Layer>>,
    paint_bounds: Rect,
}

impl ShapeLayer {
    /// Creates a childless shape layer. Paint bounds stay empty until
    /// the first preroll.
    #[must_use]
    pub fn new(
        color: Color,
        shadow_color: Color,
        elevation: f64,
        path: BezPath,
        clip_behavior: Clip,
    ) -> Self {
        Self {
            color,
            shadow_color,
            elevation,
            path,
            clip_behavior,
            children: Vec::new(),
            paint_bounds: Rect::ZERO,
        }
    }

    /// Appends a child, painted after this layer's own fill and clipped
    /// by [`Self::clip_behavior`].
    pub fn add_child(&mut self, child: Box<dyn Layer>) {
        self.children.push(child);
    }

    /// The fill color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Distance above the canvas plane, in logical units.
    #[must_use]
    pub const fn elevation(&self) -> f64 {
        self.elevation
    }

    /// The filled and clipped path.
    #[must_use]
    pub const fn path(&self) -> &BezPath {
        &self.path
    }

    /// How children are clipped to the path.
    #[must_use]
    pub const fn clip_behavior(&self) -> Clip {
        self.clip_behavior
    }

    fn same_appearance(&self, other: &Self) -> bool {
        self.color == other.color
            && self.shadow_color == other.shadow_color
            && self.elevation == other.elevation
            && self.clip_behavior == other.clip_behavior
            && self.path == other.path
    }

    /// Bounds this layer itself occupies, before children are considered.
    fn own_bounds(&self, device_pixel_ratio: f64) -> Rect {
        if self.elevation > 0.0 {
            compute_shadow_bounds(&self.path, self.elevation, device_pixel_ratio)
        } else {
            self.path.bounding_box()
        }
    }
}

impl fmt::Debug for ShapeLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeLayer")
            .field("color", &self.color)
            .field("elevation", &self.elevation)
            .field("clip_behavior", &self.clip_behavior)
            .field("children", &self.children.len())
            .field("paint_bounds", &self.paint_bounds)
            .finish_non_exhaustive()
    }
}

impl Layer for ShapeLayer {
    fn diff(&self, context: &mut DiffContext<'_>, old_layer: Option<&dyn Layer>) {
        let mut subtree = context.begin_subtree();
        if !subtree.is_subtree_dirty() {
            let counterpart = old_layer.and_then(|old| (old as &dyn Any).downcast_ref::<Self>());
            match counterpart {
                Some(prev) if self.same_appearance(prev) => {}
                _ => {
                    let vacated = subtree.old_layer_region(old_layer);
                    subtree.mark_subtree_dirty(vacated);
                }
            }
        }
        let dpr = subtree.device_pixel_ratio();
        subtree.add_layer_bounds(self.own_bounds(dpr));
        let descend =
            !self.clip_behavior.clips() || subtree.push_cull_rect(self.path.bounding_box());
        if descend {
            let old_children = old_layer.map_or(&[][..], Layer::children);
            subtree.diff_children(&self.children, old_children);
        }
        let region = subtree.current_subtree_region();
        subtree.set_layer_paint_region(self, region);
    }

    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine) {
        let child_bounds = preroll_children(&mut self.children, context, matrix);
        self.paint_bounds = if self.elevation > 0.0 {
            // The shadow penumbra already dominates anything the clipped
            // children could add.
            compute_shadow_bounds(&self.path, self.elevation, context.device_pixel_ratio)
        } else {
            join(self.path.bounding_box(), child_bounds)
        };
    }

    fn paint(&self, context: &mut PaintContext<'_>) {
        debug_assert!(self.needs_painting(context), "painting a culled layer");

        if self.elevation > 0.0 {
            context.canvas.draw_shadow(
                &self.path,
                self.shadow_color.scale_alpha(AMBIENT_ALPHA),
                self.shadow_color.scale_alpha(SPOT_ALPHA),
                self.elevation * context.device_pixel_ratio,
                !self.color.is_opaque(),
            );
        }

        // In save-layer mode the fill happens inside the offscreen
        // buffer instead, via draw_paint below.
        if self.clip_behavior != Clip::AntiAliasWithSaveLayer {
            context.canvas.draw_path(&self.path, self.color, true);
        }

        let save_count = context.canvas.save();
        match self.clip_behavior {
            Clip::None => {}
            Clip::HardEdge => context.canvas.clip_path(&self.path, false),
            Clip::AntiAlias => context.canvas.clip_path(&self.path, true),
            Clip::AntiAliasWithSaveLayer => {
                context.canvas.clip_path(&self.path, true);
                context.canvas.save_layer(self.paint_bounds);
            }
        }
        if self.clip_behavior == Clip::AntiAliasWithSaveLayer {
            context.canvas.draw_paint(self.color);
        }
        paint_children(&self.children, context);
        context.canvas.restore_to_count(save_count);

        if self.clip_behavior.uses_save_layer() && context.checkerboard_offscreen_layers {
            draw_checkerboard(context.canvas, self.paint_bounds);
        }
    }

    fn paint_bounds(&self) -> Rect {
        self.paint_bounds
    }

    fn children(&self) -> &[Box<dyn Layer>] {
        &self.children
    }
}
