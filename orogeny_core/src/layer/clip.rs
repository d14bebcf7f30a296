// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip behavior selection for layer content.

/// How a layer clips its own content and its descendants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clip {
    /// No clipping at all.
    #[default]
    None,
    /// Clip to the shape with hard (aliased) edges.
    HardEdge,
    /// Clip to the shape with anti-aliased edges.
    AntiAlias,
    /// Anti-aliased clipping with the content rendered into an offscreen
    /// buffer first, avoiding edge bleed between the clip boundary and
    /// the content drawn against it.
    AntiAliasWithSaveLayer,
}

impl Clip {
    /// Whether this behavior routes content through an offscreen buffer.
    #[must_use]
    pub const fn uses_save_layer(self) -> bool {
        matches!(self, Self::AntiAliasWithSaveLayer)
    }

    /// Whether this behavior clips at all.
    #[must_use]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_save_layer_variant_uses_save_layer() {
        assert!(!Clip::None.uses_save_layer());
        assert!(!Clip::HardEdge.uses_save_layer());
        assert!(!Clip::AntiAlias.uses_save_layer());
        assert!(Clip::AntiAliasWithSaveLayer.uses_save_layer());
    }

    #[test]
    fn all_variants_but_none_clip() {
        assert!(!Clip::None.clips());
        assert!(Clip::HardEdge.clips());
        assert!(Clip::AntiAlias.clips());
        assert!(Clip::AntiAliasWithSaveLayer.clips());
    }
}
