// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Old-vs-new tree comparison producing the minimal repaint rectangle.
//!
//! A [`DiffContext`] lives for one diff pass. It walks the current frame's
//! tree alongside the previous frame's tree, pairing nodes by position
//! (there are no stable layer IDs), and accumulates:
//!
//! - the **damage rectangle** — every area whose pixels changed, including
//!   the *old* pixels vacated by removed or moved content;
//! - the current tree's **paint regions** — one rectangle per layer,
//!   recorded into a [`PaintRegionMap`] keyed by node address, which
//!   becomes the baseline the *next* frame diffs against.
//!
//! # Scoped state
//!
//! Each layer's `diff` opens a subtree scope via
//! [`DiffContext::begin_subtree`]; the returned [`AutoSubtreeRestore`]
//! guard restores the dirty flag and cull rectangle when it drops, even on
//! early return. Once [`mark_subtree_dirty`](DiffContext::mark_subtree_dirty)
//! has been called, descendant comparisons are skipped — their bounds are
//! accumulated as damage directly.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::damage::{Damage, join};
use crate::layer::Layer;

/// Identity of a layer node within one frame's tree: its address.
///
/// Valid as a cross-frame lookup key only because the host retains the
/// previous tree, unmoved, until the next diff completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey(usize);

impl LayerKey {
    /// Returns the key for `layer`.
    #[must_use]
    pub fn of(layer: &dyn Layer) -> Self {
        Self(core::ptr::from_ref(layer).cast::<u8>().addr())
    }
}

/// Per-layer paint regions recorded by a diff pass.
///
/// Owned by the [`LayerTree`](crate::layer::LayerTree) it describes; read
/// as the "old" side of the next frame's diff.
#[derive(Clone, Debug, Default)]
pub struct PaintRegionMap {
    regions: BTreeMap<LayerKey, Rect>,
}

impl PaintRegionMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }

    /// Returns the recorded region for `key`, if any.
    #[must_use]
    pub fn get(&self, key: LayerKey) -> Option<Rect> {
        self.regions.get(&key).copied()
    }

    /// Records `region` for `key`, replacing any previous record.
    pub fn set(&mut self, key: LayerKey, region: Rect) {
        self.regions.insert(key, region);
    }

    /// Returns the number of recorded regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if no regions are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Dirty flag, cull rectangle, and region accumulator for one subtree scope.
#[derive(Clone, Copy, Debug)]
struct State {
    dirty: bool,
    cull_rect: Rect,
    region: Rect,
}

/// Context for one diff pass over an old and a new layer tree.
pub struct DiffContext<'a> {
    frame_bounds: Rect,
    device_pixel_ratio: f64,
    state: State,
    stack: Vec<State>,
    accumulated_damage: Rect,
    old_regions: &'a PaintRegionMap,
    new_regions: &'a mut PaintRegionMap,
}

impl core::fmt::Debug for DiffContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DiffContext")
            .field("frame_bounds", &self.frame_bounds)
            .field("accumulated_damage", &self.accumulated_damage)
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl<'a> DiffContext<'a> {
    /// Creates a context diffing against `old_regions`, recording this
    /// frame's regions into `new_regions`.
    ///
    /// `frame_bounds` doubles as the initial cull rectangle and as the
    /// clamp applied to the final damage.
    #[must_use]
    pub fn new(
        frame_bounds: Rect,
        device_pixel_ratio: f64,
        old_regions: &'a PaintRegionMap,
        new_regions: &'a mut PaintRegionMap,
    ) -> Self {
        Self {
            frame_bounds,
            device_pixel_ratio,
            state: State {
                dirty: false,
                cull_rect: frame_bounds,
                region: Rect::ZERO,
            },
            stack: Vec::new(),
            accumulated_damage: Rect::ZERO,
            old_regions,
            new_regions,
        }
    }

    /// Returns the device pixel ratio of the frame being diffed.
    #[must_use]
    pub const fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Opens a subtree scope; dirty flag and cull rectangle are restored
    /// when the returned guard drops.
    pub fn begin_subtree<'s>(&'s mut self) -> AutoSubtreeRestore<'s, 'a> {
        self.stack.push(self.state);
        self.state.region = Rect::ZERO;
        AutoSubtreeRestore { context: self }
    }

    fn end_subtree(&mut self) {
        let child = self.state;
        self.state = self
            .stack
            .pop()
            .expect("subtree scope closed without matching begin_subtree");
        // Descendant regions roll up into the parent's.
        self.state.region = join(self.state.region, child.region);
    }

    /// Returns `true` once any ancestor in the current walk was marked
    /// dirty.
    #[must_use]
    pub const fn is_subtree_dirty(&self) -> bool {
        self.state.dirty
    }

    /// Marks the current subtree fully dirty.
    ///
    /// `previous_region` — typically the old layer's recorded paint region
    /// — is folded into the damage so the pixels being *vacated* are
    /// repainted, not just the pixels being drawn. Descendant comparisons
    /// are skipped from here on; their bounds feed damage directly.
    pub fn mark_subtree_dirty(&mut self, previous_region: Rect) {
        debug_assert!(!self.state.dirty, "subtree is already dirty");
        self.state.dirty = true;
        self.add_damage(previous_region);
    }

    /// Narrows the cull rectangle to `bounds` for the rest of this scope.
    ///
    /// Returns `false` if the intersection is empty, signaling the caller
    /// to skip descending into children. Pruning only: out-of-view
    /// children cannot contribute visible damage.
    pub fn push_cull_rect(&mut self, bounds: Rect) -> bool {
        self.state.cull_rect = self.state.cull_rect.intersect(bounds);
        !self.state.cull_rect.is_zero_area()
    }

    /// Accumulates a layer's own bounds into the current subtree region.
    ///
    /// When the subtree is dirty the bounds also feed the damage
    /// accumulator (they are newly drawn pixels).
    pub fn add_layer_bounds(&mut self, bounds: Rect) {
        let clipped = bounds.intersect(self.state.cull_rect);
        if clipped.is_zero_area() {
            return;
        }
        self.state.region = join(self.state.region, clipped);
        if self.state.dirty {
            self.add_damage(clipped);
        }
    }

    /// Returns the union of all bounds recorded in the current scope,
    /// descendants included.
    #[must_use]
    pub const fn current_subtree_region(&self) -> Rect {
        self.state.region
    }

    /// Records `region` as `layer`'s paint region in the current tree.
    pub fn set_layer_paint_region(&mut self, layer: &dyn Layer, region: Rect) {
        self.new_regions.set(LayerKey::of(layer), region);
    }

    /// Returns the paint region recorded for `old_layer` by the previous
    /// frame's diff, or the empty rectangle if there is no record.
    #[must_use]
    pub fn old_layer_region(&self, old_layer: Option<&dyn Layer>) -> Rect {
        old_layer
            .and_then(|old| self.old_regions.get(LayerKey::of(old)))
            .unwrap_or(Rect::ZERO)
    }

    /// Pairs `new_children` with `old_children` strictly by index and
    /// recurses.
    ///
    /// A length mismatch (child added or removed) marks the subtree dirty
    /// with the union of the old children's recorded regions, so vacated
    /// pixels are repainted. Reordered-but-identical children are
    /// indistinguishable from changed children and are over-reported on
    /// purpose: positional pairing never under-reports damage.
    pub fn diff_children(
        &mut self,
        new_children: &[Box<dyn Layer>],
        old_children: &[Box<dyn Layer>],
    ) {
        if new_children.len() != old_children.len() && !self.is_subtree_dirty() {
            let mut vacated = Rect::ZERO;
            for old in old_children {
                vacated = join(vacated, self.old_layer_region(Some(&**old)));
            }
            self.mark_subtree_dirty(vacated);
        }
        for (index, child) in new_children.iter().enumerate() {
            child.diff(self, old_children.get(index).map(|old| &**old));
        }
    }

    /// Produces the final damage pair: accumulated diff damage unioned
    /// with `additional_damage`, clamped to the frame bounds.
    #[must_use]
    pub fn compute_damage(&self, additional_damage: Rect) -> Damage {
        let joined = join(self.accumulated_damage, additional_damage);
        let frame_damage = if joined.is_zero_area() {
            Rect::ZERO
        } else {
            joined.intersect(self.frame_bounds)
        };
        Damage {
            frame_damage,
            buffer_damage: frame_damage,
        }
    }

    fn add_damage(&mut self, rect: Rect) {
        self.accumulated_damage = join(self.accumulated_damage, rect);
    }
}

/// Guard restoring a [`DiffContext`]'s subtree state on drop.
///
/// Created by [`DiffContext::begin_subtree`]; dereferences to the context
/// so the scoped walk reads naturally.
pub struct AutoSubtreeRestore<'s, 'a> {
    context: &'s mut DiffContext<'a>,
}

impl core::fmt::Debug for AutoSubtreeRestore<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AutoSubtreeRestore").finish_non_exhaustive()
    }
}

impl<'a> core::ops::Deref for AutoSubtreeRestore<'_, 'a> {
    type Target = DiffContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl core::ops::DerefMut for AutoSubtreeRestore<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for AutoSubtreeRestore<'_, '_> {
    fn drop(&mut self) {
        self.context.end_subtree();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    fn context<'a>(
        old: &'a PaintRegionMap,
        new: &'a mut PaintRegionMap,
    ) -> DiffContext<'a> {
        DiffContext::new(FRAME, 1.0, old, new)
    }

    #[test]
    fn scope_restores_dirty_flag_and_cull() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let mut ctx = context(&old, &mut new);

        {
            let mut scope = ctx.begin_subtree();
            assert!(scope.push_cull_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
            scope.mark_subtree_dirty(Rect::ZERO);
            assert!(scope.is_subtree_dirty());
        }

        assert!(!ctx.is_subtree_dirty(), "dirty flag must restore on drop");
        assert!(
            ctx.push_cull_rect(Rect::new(50.0, 50.0, 60.0, 60.0)),
            "cull rect must restore on drop"
        );
    }

    #[test]
    fn cull_rect_prunes_disjoint_bounds() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let mut ctx = context(&old, &mut new);

        assert!(ctx.push_cull_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(
            !ctx.push_cull_rect(Rect::new(20.0, 20.0, 30.0, 30.0)),
            "disjoint cull must signal skip"
        );
    }

    #[test]
    fn dirty_subtree_bounds_become_damage() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let mut ctx = context(&old, &mut new);

        ctx.mark_subtree_dirty(Rect::new(0.0, 0.0, 5.0, 5.0));
        ctx.add_layer_bounds(Rect::new(10.0, 10.0, 20.0, 20.0));

        let damage = ctx.compute_damage(Rect::ZERO);
        assert_eq!(damage.frame_damage, Rect::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn clean_subtree_bounds_are_not_damage() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let mut ctx = context(&old, &mut new);

        ctx.add_layer_bounds(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(ctx.compute_damage(Rect::ZERO).frame_damage, Rect::ZERO);
        assert_eq!(
            ctx.current_subtree_region(),
            Rect::new(10.0, 10.0, 20.0, 20.0)
        );
    }

    #[test]
    fn damage_is_clamped_to_frame_bounds() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let mut ctx = context(&old, &mut new);

        ctx.mark_subtree_dirty(Rect::new(-50.0, -50.0, 300.0, 300.0));
        assert_eq!(ctx.compute_damage(Rect::ZERO).frame_damage, FRAME);
    }

    #[test]
    fn additional_damage_joins_the_pair() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let ctx = context(&old, &mut new);

        let damage = ctx.compute_damage(Rect::new(0.0, 0.0, 30.0, 30.0));
        assert_eq!(damage.frame_damage, Rect::new(0.0, 0.0, 30.0, 30.0));
        assert_eq!(damage.buffer_damage, damage.frame_damage);
    }

    #[test]
    fn child_regions_roll_up_to_parent() {
        let old = PaintRegionMap::new();
        let mut new = PaintRegionMap::new();
        let mut ctx = context(&old, &mut new);

        ctx.add_layer_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        {
            let mut scope = ctx.begin_subtree();
            scope.add_layer_bounds(Rect::new(40.0, 40.0, 50.0, 50.0));
        }
        assert_eq!(
            ctx.current_subtree_region(),
            Rect::new(0.0, 0.0, 50.0, 50.0)
        );
    }
}
