//! Owning GPU Handles
//!
//! Every GPU resource the renderer creates is wrapped in a [`Tracked<T>`]: an owning
//! handle with a process-unique ID that registers itself in a [`ResourceLedger`] on
//! creation and deregisters on drop. Releasing a resource is therefore just dropping
//! its handle, and the ledger can answer "how many live X are there" at any time.
//!
//! [`Slot<T>`] models one logical binding slot (the current model, the current
//! environment, ...) and enforces the swap discipline: the old occupant is released
//! before the new one is created, and a failed preparation leaves the old occupant
//! bound.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::renderer::precompute::cubemap::CubemapKind;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Logical category of a GPU resource, used for leak accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    /// Off-screen attachment owned by the render-target manager.
    RenderTarget,
    /// SSAO rotation noise texture.
    NoiseTexture,
    /// One of the cubemap variants.
    Cubemap(CubemapKind),
    /// Split-sum BRDF integration table.
    BrdfLut,
    /// One of the five PBR material textures.
    MaterialTexture,
    /// Vertex/index buffers of the active model.
    MeshBuffer,
    /// Per-submesh texture of the active model.
    MeshTexture,
    /// Cached quad/cube/sphere buffers.
    PrimitiveBuffer,
    /// Fallback 1×1 textures.
    DefaultTexture,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CategoryCounts {
    live: usize,
    allocated: u64,
}

/// Live/total allocation counters, shared by every handle created against it.
///
/// Cloning a ledger is cheap and yields a view of the same counters.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    counts: Arc<Mutex<FxHashMap<ResourceCategory, CategoryCounts>>>,
}

impl ResourceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, category: ResourceCategory) {
        let mut counts = self.counts.lock();
        let entry = counts.entry(category).or_default();
        entry.live += 1;
        entry.allocated += 1;
    }

    fn release(&self, category: ResourceCategory) {
        let mut counts = self.counts.lock();
        if let Some(entry) = counts.get_mut(&category) {
            entry.live = entry.live.saturating_sub(1);
        }
    }

    /// Number of handles of `category` currently alive.
    #[must_use]
    pub fn live(&self, category: ResourceCategory) -> usize {
        self.counts.lock().get(&category).map_or(0, |c| c.live)
    }

    /// Number of handles of `category` ever created.
    #[must_use]
    pub fn allocations(&self, category: ResourceCategory) -> u64 {
        self.counts.lock().get(&category).map_or(0, |c| c.allocated)
    }

    /// Total number of live handles across all categories.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.counts.lock().values().map(|c| c.live).sum()
    }
}

/// Owning handle around a GPU resource.
///
/// The wrapped resource is released when the handle is dropped; the ledger entry
/// is released at the same moment.
#[derive(Debug)]
pub struct Tracked<T> {
    inner: T,
    id: u64,
    category: ResourceCategory,
    ledger: ResourceLedger,
}

impl<T> Tracked<T> {
    /// Wraps a resource, assigns a new ID and registers it in `ledger`.
    pub fn new(inner: T, category: ResourceCategory, ledger: &ResourceLedger) -> Self {
        ledger.register(category);
        Self {
            inner,
            id: next_id(),
            category,
            ledger: ledger.clone(),
        }
    }

    /// Unique identity of this handle. Two handles never share an ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> ResourceCategory {
        self.category
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.ledger.release(self.category);
    }
}

/// A single logical binding slot.
#[derive(Debug)]
pub struct Slot<T> {
    current: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> Slot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn occupied(value: T) -> Self {
        Self {
            current: Some(value),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.current.is_some()
    }

    /// Replaces the occupant.
    ///
    /// `prepare` runs first and does all fallible CPU-side work (decoding, validation).
    /// If it fails the current occupant stays bound and the error is returned. On success
    /// the old occupant is dropped before `create` builds the new one, so the two never
    /// coexist. A failing `create` leaves the slot empty.
    pub fn swap<P>(
        &mut self,
        prepare: impl FnOnce() -> Result<P>,
        create: impl FnOnce(P) -> Result<T>,
    ) -> Result<&T> {
        let prepared = prepare()?;
        self.current = None;
        let value = self.current.insert(create(prepared)?);
        Ok(&*value)
    }

    /// Releases the occupant, if any.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PrismError;

    #[test]
    fn handles_register_and_release() {
        let ledger = ResourceLedger::new();
        let a = Tracked::new(1u32, ResourceCategory::MeshBuffer, &ledger);
        let b = Tracked::new(2u32, ResourceCategory::MeshBuffer, &ledger);
        assert_ne!(a.id(), b.id());
        assert_eq!(ledger.live(ResourceCategory::MeshBuffer), 2);

        drop(a);
        assert_eq!(ledger.live(ResourceCategory::MeshBuffer), 1);
        assert_eq!(ledger.allocations(ResourceCategory::MeshBuffer), 2);
        assert_eq!(*b, 2);
    }

    #[test]
    fn slot_swap_releases_old_before_creating_new() {
        let ledger = ResourceLedger::new();
        let mut slot = Slot::occupied(Tracked::new(
            "a",
            ResourceCategory::MaterialTexture,
            &ledger,
        ));

        let ledger_in_create = ledger.clone();
        slot.swap(
            || Ok("b"),
            |name| {
                // The previous occupant is already gone at creation time.
                assert_eq!(ledger_in_create.live(ResourceCategory::MaterialTexture), 0);
                Ok(Tracked::new(name, ResourceCategory::MaterialTexture, &ledger_in_create))
            },
        )
        .unwrap();

        assert_eq!(ledger.live(ResourceCategory::MaterialTexture), 1);
        assert_eq!(slot.get().map(|t| **t), Some("b"));
    }

    #[test]
    fn failed_prepare_keeps_previous_occupant() {
        let ledger = ResourceLedger::new();
        let mut slot = Slot::occupied(Tracked::new("a", ResourceCategory::MeshBuffer, &ledger));

        let result = slot.swap(
            || -> Result<&str> { Err(PrismError::AssetNotFound("missing.obj".into())) },
            |name| Ok(Tracked::new(name, ResourceCategory::MeshBuffer, &ledger)),
        );

        assert!(result.is_err());
        assert_eq!(slot.get().map(|t| **t), Some("a"));
        assert_eq!(ledger.live(ResourceCategory::MeshBuffer), 1);
    }

    #[test]
    fn failed_create_leaves_slot_empty() {
        let ledger = ResourceLedger::new();
        let mut slot = Slot::occupied(Tracked::new(1u8, ResourceCategory::BrdfLut, &ledger));

        let result = slot.swap(
            || Ok(2u8),
            |_| -> Result<Tracked<u8>> { Err(PrismError::Readback("device lost".into())) },
        );

        assert!(result.is_err());
        assert!(!slot.is_bound());
        assert_eq!(ledger.live(ResourceCategory::BrdfLut), 0);
    }
}
