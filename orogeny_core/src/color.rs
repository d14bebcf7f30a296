// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 32-bit ARGB color.
//!
//! Layers carry fill and shadow colors as packed `0xAARRGGBB` values; the
//! shadow pass derives its tonal ambient/spot colors by scaling the alpha
//! channel (see [`crate::layer::ShapeLayer`]).

use core::fmt;

/// A packed `0xAARRGGBB` color value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);

    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);

    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Creates a color from alpha, red, green, and blue components.
    #[inline]
    #[must_use]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from_be_bytes([a, r, g, b]))
    }

    /// Returns the alpha component.
    #[inline]
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Returns `true` if the alpha component is 255.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Returns this color with the alpha component replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let [_, r, g, b] = self.0.to_be_bytes();
        Self::argb(alpha, r, g, b)
    }

    /// Returns this color with its alpha multiplied by `factor`.
    ///
    /// `factor` is clamped to `0.0..=1.0` before scaling.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "product is clamped to the u8 range before the cast"
    )]
    pub fn scale_alpha(self, factor: f64) -> Self {
        let scaled = f64::from(self.alpha()) * factor.clamp(0.0, 1.0);
        self.with_alpha(scaled.clamp(0.0, 255.0) as u8)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08X})", self.0)
    }
}
