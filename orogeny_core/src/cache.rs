// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bounded cache of rasterized subtree results.
//!
//! Entries are keyed by the recorded picture and the exact transform it
//! was rasterized under; a subtree painted at a new transform is a cache
//! miss, never an approximate hit. The compositor sweeps the cache at
//! frame start, evicting entries not used since the previous sweep.

use alloc::collections::BTreeMap;
use core::fmt;

use kurbo::Affine;

/// Identifies a recorded picture (a replayable list of drawing
/// commands). Allocated by the host.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PictureId(pub u64);

impl fmt::Debug for PictureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PictureId({})", self.0)
    }
}

/// Handle to a backend resource holding rasterized pixels.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ResourceKey(pub u64);

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}

/// Cache key: a picture plus the transform it was rasterized under.
///
/// Coefficients are compared bit-for-bit. Two transforms that differ in
/// the last ulp are different keys; fuzzy matching would reuse pixels
/// rasterized for a subtly different placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RasterCacheKey {
    picture: PictureId,
    transform: [u64; 6],
}

impl RasterCacheKey {
    /// Builds the key for `picture` rasterized under `transform`.
    #[must_use]
    pub fn new(picture: PictureId, transform: Affine) -> Self {
        Self {
            picture,
            transform: transform.as_coeffs().map(f64::to_bits),
        }
    }
}

#[derive(Debug)]
struct Entry {
    resource: ResourceKey,
    used_since_sweep: bool,
}

/// Bounded map from [`RasterCacheKey`] to rasterized pixels.
#[derive(Debug)]
pub struct RasterCache {
    capacity: usize,
    entries: BTreeMap<RasterCacheKey, Entry>,
}

impl RasterCache {
    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts a rasterized result. Returns `false` without inserting
    /// when the cache is full and `key` is not already present.
    pub fn insert(&mut self, key: RasterCacheKey, resource: ResourceKey) -> bool {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(
            key,
            Entry {
                resource,
                used_since_sweep: true,
            },
        );
        true
    }

    /// Looks up a cached result and marks it as used this sweep period.
    pub fn get(&mut self, key: RasterCacheKey) -> Option<ResourceKey> {
        self.entries.get_mut(&key).map(|entry| {
            entry.used_since_sweep = true;
            entry.resource
        })
    }

    /// Whether `key` is cached, without touching its usage mark.
    #[must_use]
    pub fn contains(&self, key: RasterCacheKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Evicts entries not used since the previous sweep and clears the
    /// usage marks. Returns the number of entries evicted.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.used_since_sweep);
        for entry in self.entries.values_mut() {
            entry.used_since_sweep = false;
        }
        before - self.entries.len()
    }

    /// Drops every entry, for use when the GPU context is lost.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(picture: u64) -> RasterCacheKey {
        RasterCacheKey::new(PictureId(picture), Affine::IDENTITY)
    }

    #[test]
    fn insert_and_get_round_trip() {
        let mut cache = RasterCache::new(4);
        assert!(cache.insert(key(1), ResourceKey(10)));
        assert_eq!(cache.get(key(1)), Some(ResourceKey(10)));
        assert_eq!(cache.get(key(2)), None);
    }

    #[test]
    fn transform_is_part_of_the_key() {
        let mut cache = RasterCache::new(4);
        cache.insert(key(1), ResourceKey(10));
        let scaled = RasterCacheKey::new(PictureId(1), Affine::scale(2.0));
        assert_eq!(cache.get(scaled), None, "different transform, different key");
    }

    #[test]
    fn insert_refuses_past_capacity() {
        let mut cache = RasterCache::new(1);
        assert!(cache.insert(key(1), ResourceKey(10)));
        assert!(!cache.insert(key(2), ResourceKey(20)));
        assert_eq!(cache.len(), 1);
        // Overwriting an existing key is never refused.
        assert!(cache.insert(key(1), ResourceKey(11)));
    }

    #[test]
    fn sweep_evicts_untouched_entries() {
        let mut cache = RasterCache::new(4);
        cache.insert(key(1), ResourceKey(10));
        cache.insert(key(2), ResourceKey(20));
        assert_eq!(cache.sweep(), 0, "everything used since insertion");

        let _ = cache.get(key(1));
        assert_eq!(cache.sweep(), 1, "picture 2 was never touched");
        assert!(cache.contains(key(1)));
        assert!(!cache.contains(key(2)));
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = RasterCache::new(4);
        cache.insert(key(1), ResourceKey(10));
        cache.clear();
        assert!(cache.is_empty());
    }
}
