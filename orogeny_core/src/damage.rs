// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial repainting.
//!
//! [`FrameDamage`] is the per-frame damage calculator: the host points it
//! at the previous frame's tree, feeds it any damage known from outside
//! the tree diff (platform overlay updates, buffer-age history), and asks
//! for the clip rectangle the paint pass should be restricted to.
//!
//! Absence of a previous tree is not an error — it is the defined
//! "repaint everything" baseline, reported as `None`. An *empty* clip
//! rectangle is the opposite extreme: nothing changed, nothing to paint.
//! Callers must keep the two apart.

use kurbo::Rect;

use crate::diff::{DiffContext, PaintRegionMap};
use crate::layer::LayerTree;

/// Joins two rectangles, treating zero-area rectangles as the identity.
///
/// `Rect::union` alone would pull an accumulator that starts at
/// [`Rect::ZERO`] toward the origin; damage accumulation must ignore
/// empty contributions instead.
pub(crate) fn join(a: Rect, b: Rect) -> Rect {
    if b.is_zero_area() {
        a
    } else if a.is_zero_area() {
        b
    } else {
        a.union(b)
    }
}

/// The damage pair computed for one frame.
///
/// `buffer_damage ⊇ frame_damage ⊇ actual pixel differences`. Both are
/// only ever widened by additional-damage contributions, never narrowed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Damage {
    /// The minimal area that must be repainted this frame, in the tree's
    /// logical coordinate space.
    pub frame_damage: Rect,
    /// The same area adjusted for the buffering strategy (accumulated
    /// across double/triple buffered surfaces).
    pub buffer_damage: Rect,
}

/// Damage calculator for a single rasterization attempt.
#[derive(Debug, Default)]
pub struct FrameDamage<'a> {
    prev_layer_tree: Option<&'a LayerTree>,
    additional_damage: Rect,
    damage: Option<Damage>,
}

impl<'a> FrameDamage<'a> {
    /// Creates a calculator with no previous tree and no additional damage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the previous frame's tree to diff against. Without one, the
    /// entire frame is repainted.
    pub fn set_previous_layer_tree(&mut self, prev: &'a LayerTree) {
        self.prev_layer_tree = Some(prev);
    }

    /// Adds damage known from outside the tree diff (e.g. a platform
    /// overlay update, or areas accumulated for double/triple buffering).
    ///
    /// Contributions only ever widen the computed damage; two calls with
    /// rectangles A then B are equivalent to one call with their union.
    pub fn add_additional_damage(&mut self, rect: Rect) {
        self.additional_damage = join(self.additional_damage, rect);
    }

    /// Computes the clip rectangle for this frame's paint pass.
    ///
    /// With no previous tree there is nothing to diff against: returns
    /// `None` (repaint everything), but the walk still records
    /// `layer_tree`'s paint regions so the *next* frame has a baseline.
    /// With a previous tree, returns the diff damage unioned with all
    /// additional damage, clamped to the frame bounds; an empty tree or a
    /// zero-bounds root yields the empty rectangle, not `None`.
    pub fn compute_clip_rect(&mut self, layer_tree: &mut LayerTree) -> Option<Rect> {
        let frame_bounds = layer_tree.frame_bounds();
        let dpr = layer_tree.device_pixel_ratio();
        let empty_baseline = PaintRegionMap::new();
        let mut new_regions = PaintRegionMap::new();

        let clip = match self.prev_layer_tree {
            None => {
                let mut context =
                    DiffContext::new(frame_bounds, dpr, &empty_baseline, &mut new_regions);
                context.mark_subtree_dirty(Rect::ZERO);
                if let Some(root) = layer_tree.root_layer() {
                    root.diff(&mut context, None);
                }
                None
            }
            Some(prev) => {
                let mut context =
                    DiffContext::new(frame_bounds, dpr, prev.paint_regions(), &mut new_regions);
                // A resized or rescaled surface invalidates every pixel.
                if prev.frame_size() != layer_tree.frame_size()
                    || prev.device_pixel_ratio() != dpr
                {
                    context.mark_subtree_dirty(frame_bounds);
                }
                match (layer_tree.root_layer(), prev.root_layer()) {
                    (Some(root), old_root) => root.diff(&mut context, old_root),
                    (None, Some(old_root)) => {
                        if !context.is_subtree_dirty() {
                            let vacated = context.old_layer_region(Some(old_root));
                            context.mark_subtree_dirty(vacated);
                        }
                    }
                    (None, None) => {}
                }
                let damage = context.compute_damage(self.additional_damage);
                self.damage = Some(damage);
                Some(damage.buffer_damage)
            }
        };

        layer_tree.set_paint_regions(new_regions);
        clip
    }

    /// See [`Damage::frame_damage`]; `None` until a diff has run.
    #[must_use]
    pub fn frame_damage(&self) -> Option<Rect> {
        self.damage.map(|d| d.frame_damage)
    }

    /// See [`Damage::buffer_damage`]; `None` until a diff has run.
    #[must_use]
    pub fn buffer_damage(&self) -> Option<Rect> {
        self.damage.map(|d| d.buffer_damage)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use kurbo::Shape;

    use super::*;
    use crate::color::Color;
    use crate::layer::{Clip, Layer, ShapeLayer};

    const FRAME: kurbo::Size = kurbo::Size::new(100.0, 100.0);

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> kurbo::BezPath {
        Rect::new(x0, y0, x1, y1).to_path(1e-9)
    }

    fn flat_layer(rect: Rect) -> Box<dyn Layer> {
        Box::new(ShapeLayer::new(
            Color::BLACK,
            Color::BLACK,
            0.0,
            rect.to_path(1e-9),
            Clip::None,
        ))
    }

    fn tree_with_root(root: Box<dyn Layer>) -> LayerTree {
        LayerTree::new(Some(root), FRAME, 1.0)
    }

    #[test]
    fn join_ignores_empty_rects() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(join(Rect::ZERO, r), r);
        assert_eq!(join(r, Rect::ZERO), r);
        assert_eq!(join(Rect::ZERO, Rect::ZERO), Rect::ZERO);
        assert_eq!(
            join(r, Rect::new(30.0, 30.0, 40.0, 40.0)),
            Rect::new(10.0, 10.0, 40.0, 40.0)
        );
    }

    #[test]
    fn no_previous_tree_means_full_repaint() {
        let mut tree = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut damage = FrameDamage::new();

        assert_eq!(damage.compute_clip_rect(&mut tree), None);
        assert!(
            !tree.paint_regions().is_empty(),
            "paint regions must be recorded for the next frame's baseline"
        );
        assert_eq!(damage.frame_damage(), None);
    }

    #[test]
    fn identical_trees_yield_empty_clip() {
        let mut frame1 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 10.0, 10.0)));
        FrameDamage::new().compute_clip_rect(&mut frame1);

        let mut frame2 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut damage = FrameDamage::new();
        damage.set_previous_layer_tree(&frame1);

        let clip = damage.compute_clip_rect(&mut frame2);
        assert_eq!(clip, Some(Rect::ZERO), "unchanged tree has nothing dirty");
        assert_eq!(damage.frame_damage(), Some(Rect::ZERO));
    }

    #[test]
    fn changed_fill_color_damages_old_and_new_bounds() {
        let mut frame1 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 10.0, 10.0)));
        FrameDamage::new().compute_clip_rect(&mut frame1);

        let mut frame2 = tree_with_root(Box::new(ShapeLayer::new(
            Color::WHITE,
            Color::BLACK,
            0.0,
            square(0.0, 0.0, 10.0, 10.0),
            Clip::None,
        )));
        let mut damage = FrameDamage::new();
        damage.set_previous_layer_tree(&frame1);

        let clip = damage.compute_clip_rect(&mut frame2).expect("diff ran");
        assert_eq!(clip, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn moved_shape_damages_vacated_pixels_too() {
        let mut frame1 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 10.0, 10.0)));
        FrameDamage::new().compute_clip_rect(&mut frame1);

        let mut frame2 = tree_with_root(flat_layer(Rect::new(50.0, 50.0, 60.0, 60.0)));
        let mut damage = FrameDamage::new();
        damage.set_previous_layer_tree(&frame1);

        let clip = damage.compute_clip_rect(&mut frame2).expect("diff ran");
        assert_eq!(
            clip,
            Rect::new(0.0, 0.0, 60.0, 60.0),
            "old pixels are vacated, new pixels are drawn; both repaint"
        );
    }

    #[test]
    fn removed_child_damages_its_last_region() {
        let mut parent = ShapeLayer::new(
            Color::BLACK,
            Color::BLACK,
            0.0,
            square(0.0, 0.0, 90.0, 90.0),
            Clip::None,
        );
        parent.add_child(flat_layer(Rect::new(30.0, 30.0, 40.0, 40.0)));
        let mut frame1 = tree_with_root(Box::new(parent));
        FrameDamage::new().compute_clip_rect(&mut frame1);

        // Same parent, child removed.
        let mut frame2 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 90.0, 90.0)));
        let mut damage = FrameDamage::new();
        damage.set_previous_layer_tree(&frame1);

        let clip = damage.compute_clip_rect(&mut frame2).expect("diff ran");
        assert!(
            clip.contains(kurbo::Point::new(35.0, 35.0)),
            "damage must cover the removed child's last recorded region"
        );
    }

    #[test]
    fn additional_damage_is_monotonic_and_union_equivalent() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 30.0, 30.0);

        let run = |rects: &[Rect]| {
            let mut frame1 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 5.0, 5.0)));
            FrameDamage::new().compute_clip_rect(&mut frame1);
            let mut frame2 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 5.0, 5.0)));
            let mut damage = FrameDamage::new();
            damage.set_previous_layer_tree(&frame1);
            for r in rects {
                damage.add_additional_damage(*r);
            }
            damage.compute_clip_rect(&mut frame2);
            (damage.frame_damage().unwrap(), damage.buffer_damage().unwrap())
        };

        let (frame_a, _) = run(&[a]);
        let (frame_ab, buffer_ab) = run(&[a, b]);
        let (frame_union, _) = run(&[join(a, b)]);

        assert_eq!(frame_ab, frame_union, "A then B equals union(A, B)");
        assert_eq!(join(frame_a, frame_ab), frame_ab, "damage only grows");
        assert_eq!(
            join(frame_ab, buffer_ab),
            buffer_ab,
            "buffer damage contains frame damage"
        );
    }

    #[test]
    fn empty_tree_with_previous_tree_yields_empty_clip_not_none() {
        let mut frame1 = LayerTree::new(None, FRAME, 1.0);
        FrameDamage::new().compute_clip_rect(&mut frame1);

        let mut frame2 = LayerTree::new(None, FRAME, 1.0);
        let mut damage = FrameDamage::new();
        damage.set_previous_layer_tree(&frame1);
        assert_eq!(damage.compute_clip_rect(&mut frame2), Some(Rect::ZERO));
    }

    #[test]
    fn frame_size_change_forces_full_damage() {
        let mut frame1 = tree_with_root(flat_layer(Rect::new(0.0, 0.0, 5.0, 5.0)));
        FrameDamage::new().compute_clip_rect(&mut frame1);

        let mut frame2 = LayerTree::new(
            Some(flat_layer(Rect::new(0.0, 0.0, 5.0, 5.0))),
            kurbo::Size::new(200.0, 200.0),
            1.0,
        );
        let mut damage = FrameDamage::new();
        damage.set_previous_layer_tree(&frame1);

        let clip = damage.compute_clip_rect(&mut frame2).expect("diff ran");
        assert_eq!(clip, frame2.frame_bounds());
    }
}
