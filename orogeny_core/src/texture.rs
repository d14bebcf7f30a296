// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry for externally produced textures.
//!
//! Platform video frames, camera previews, and similar content arrive
//! as textures owned outside the tree. The registry keeps them
//! addressable by id and relays GPU context lifecycle events so they
//! can drop and rebuild their device resources.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::fmt;

/// Identifies an external texture. Allocated by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

/// A texture produced outside the compositor.
pub trait ExternalTexture {
    /// The id this texture registers under.
    fn id(&self) -> TextureId;

    /// A new GPU context is available; device resources may be created.
    fn on_context_created(&mut self) {}

    /// The GPU context is gone; device resources must be dropped.
    fn on_context_destroyed(&mut self) {}

    /// The texture was removed from the registry.
    fn on_unregistered(&mut self) {}
}

/// Owns the live set of [`ExternalTexture`]s.
#[derive(Default)]
pub struct TextureRegistry {
    textures: BTreeMap<TextureId, Box<dyn ExternalTexture>>,
}

impl TextureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            textures: BTreeMap::new(),
        }
    }

    /// Registers `texture` under its own id, replacing any texture
    /// previously registered there.
    pub fn register(&mut self, texture: Box<dyn ExternalTexture>) {
        self.textures.insert(texture.id(), texture);
    }

    /// Removes the texture registered under `id`, notifying it.
    pub fn unregister(&mut self, id: TextureId) {
        if let Some(mut texture) = self.textures.remove(&id) {
            texture.on_unregistered();
        }
    }

    /// The texture registered under `id`, if any.
    #[must_use]
    pub fn get(&self, id: TextureId) -> Option<&dyn ExternalTexture> {
        self.textures.get(&id).map(|texture| &**texture)
    }

    /// Relays GPU context creation to every registered texture.
    pub fn on_context_created(&mut self) {
        for texture in self.textures.values_mut() {
            texture.on_context_created();
        }
    }

    /// Relays GPU context destruction to every registered texture.
    pub fn on_context_destroyed(&mut self) {
        for texture in self.textures.values_mut() {
            texture.on_context_destroyed();
        }
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether no textures are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl fmt::Debug for TextureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureRegistry")
            .field("textures", &self.textures.len())
            .finish_non_exhaustive()
    }
}
