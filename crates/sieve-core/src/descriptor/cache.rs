use crate::{
    descriptor::{TypeDescriptor, compile_fresh},
    error::Error,
    obs::sink::{self, MetricsEvent},
    shape::StructRef,
};
use dashmap::DashMap;
use std::{
    any::TypeId,
    sync::{Arc, LazyLock},
};

static GLOBAL_CACHE: LazyLock<DescriptorCache> = LazyLock::new(DescriptorCache::new);

///
/// DescriptorCache
///
/// Memoizes compiled descriptors by type identity.
///
/// Compilation runs outside any shard lock, so concurrent first calls for
/// the same type may each compile. Publication keeps the first descriptor
/// stored and every caller receives that one.
///

#[derive(Debug)]
pub struct DescriptorCache {
    entries: DashMap<TypeId, Arc<TypeDescriptor>>,
    enabled: bool,
}

impl DescriptorCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: true,
        }
    }

    /// A cache that never stores anything; every lookup compiles fresh.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: false,
        }
    }

    /// Process-wide cache used by the top-level entry points.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_CACHE
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the descriptor for `ty`, compiling and publishing it on first
    /// use.
    pub fn resolve(&self, ty: &StructRef) -> Result<Arc<TypeDescriptor>, Error> {
        if !self.enabled {
            return compile_fresh(ty).map(Arc::new);
        }

        if let Some(hit) = self.entries.get(&ty.id()) {
            sink::record(MetricsEvent::CacheHit {
                type_name: ty.name(),
            });
            return Ok(Arc::clone(hit.value()));
        }

        let compiled = Arc::new(compile_fresh(ty)?);
        let winner = Arc::clone(self.entries.entry(ty.id()).or_insert(compiled).value());
        tracing::debug!(type_name = ty.name(), "published type descriptor");

        Ok(winner)
    }

    #[must_use]
    pub fn contains(&self, ty: &StructRef) -> bool {
        self.entries.contains_key(&ty.id())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every published descriptor.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}
