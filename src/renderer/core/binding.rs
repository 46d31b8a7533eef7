//! Bind group reuse across frames.
//!
//! Frame passes rebuild a bind group only when one of the resources it
//! references changed identity (resize, environment swap, material swap).
//! Identity comes from [`Tracked::id`](super::Tracked::id), so a recreated
//! target always produces a new key even if wgpu hands back the same memory.

use smallvec::SmallVec;

/// Identity of a bind group: a layout tag plus the IDs of every bound resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindGroupKey {
    layout: &'static str,
    resources: SmallVec<[u64; 6]>,
}

impl BindGroupKey {
    #[must_use]
    pub fn new(layout: &'static str) -> Self {
        Self {
            layout,
            resources: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_resource(mut self, id: u64) -> Self {
        self.resources.push(id);
        self
    }
}

/// One cached bind group, replaced whenever its key changes.
#[derive(Debug)]
pub struct CachedBindGroup<G = wgpu::BindGroup> {
    key: Option<BindGroupKey>,
    group: Option<G>,
}

impl<G> Default for CachedBindGroup<G> {
    fn default() -> Self {
        Self {
            key: None,
            group: None,
        }
    }
}

impl<G> CachedBindGroup<G> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached group for `key`, building it when the key differs.
    pub fn get_or_create(&mut self, key: BindGroupKey, create: impl FnOnce() -> G) -> &G {
        if self.key.as_ref() != Some(&key) {
            // Old group goes first.
            self.group = None;
            self.key = Some(key);
        }
        self.group.get_or_insert_with(create)
    }

    /// Drops the cached group.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.group = None;
    }

    #[must_use]
    pub fn get(&self) -> Option<&G> {
        self.group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_reuses_group() {
        let mut cache: CachedBindGroup<u32> = CachedBindGroup::new();
        let mut builds = 0;
        for _ in 0..3 {
            cache.get_or_create(BindGroupKey::new("lighting").with_resource(4), || {
                builds += 1;
                builds
            });
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.get(), Some(&1));
    }

    #[test]
    fn changed_resource_rebuilds() {
        let mut cache: CachedBindGroup<u64> = CachedBindGroup::new();
        cache.get_or_create(BindGroupKey::new("ssao").with_resource(1), || 1);
        let value = *cache.get_or_create(BindGroupKey::new("ssao").with_resource(2), || 2);
        assert_eq!(value, 2);

        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
