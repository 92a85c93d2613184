use crate::{
    boundary,
    config::SieveConfig,
    descriptor::{DescriptorCache, TypeDescriptor},
    error::Error,
    filter::{Filter, build_filter},
    obs::sink::{self, MetricsEvent},
    shape::StructRef,
    traits::{Descriptor, FieldValue},
    update::{UpdateMap, build_update},
    value::Value,
};
use std::sync::Arc;

///
/// CacheSlot
///

#[derive(Debug)]
enum CacheSlot {
    Global,
    Shared(Arc<DescriptorCache>),
}

///
/// Sieve
///
/// Entry point bundling a descriptor cache with the update configuration.
/// Every call runs behind the panic boundary and reports to the metrics
/// sink.
///

#[derive(Debug)]
pub struct Sieve {
    cache: CacheSlot,
    config: SieveConfig,
}

impl Sieve {
    /// Session over the process-wide cache, or over a private non-caching
    /// resolver when `config.cache.enabled` is false.
    #[must_use]
    pub fn new(config: SieveConfig) -> Self {
        let cache = if config.cache.enabled {
            CacheSlot::Global
        } else {
            CacheSlot::Shared(Arc::new(DescriptorCache::disabled()))
        };

        Self { cache, config }
    }

    /// Session over a caller-owned cache.
    #[must_use]
    pub const fn with_cache(config: SieveConfig, cache: Arc<DescriptorCache>) -> Self {
        Self {
            cache: CacheSlot::Shared(cache),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SieveConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &DescriptorCache {
        match &self.cache {
            CacheSlot::Global => DescriptorCache::global(),
            CacheSlot::Shared(cache) => cache,
        }
    }

    /// Descriptor for `T`.
    pub fn descriptor<T: Descriptor>(&self) -> Result<Arc<TypeDescriptor>, Error> {
        let ty = StructRef::of::<T>();

        Self::run(|| self.cache().resolve(&ty))
    }

    /// WHERE expression for `input`; `None` when every field is empty.
    pub fn filter<T: FieldValue + ?Sized>(&self, input: &T) -> Result<Option<Filter>, Error> {
        Self::run(|| self.filter_inner(&input.to_value()))
    }

    /// Same as [`filter`](Self::filter), over an existing snapshot.
    pub fn filter_value(&self, value: &Value) -> Result<Option<Filter>, Error> {
        Self::run(|| self.filter_inner(value))
    }

    /// Assignment set for `input`.
    pub fn update<T: FieldValue + ?Sized>(&self, input: &T) -> Result<UpdateMap, Error> {
        Self::run(|| self.update_inner(&input.to_value()))
    }

    /// Same as [`update`](Self::update), over an existing snapshot.
    pub fn update_value(&self, value: &Value) -> Result<UpdateMap, Error> {
        Self::run(|| self.update_inner(value))
    }

    fn filter_inner(&self, value: &Value) -> Result<Option<Filter>, Error> {
        let filter = build_filter(value, self.cache())?;
        sink::record(MetricsEvent::FilterBuilt {
            type_name: type_name_of(value),
            empty: filter.is_none(),
        });

        Ok(filter)
    }

    fn update_inner(&self, value: &Value) -> Result<UpdateMap, Error> {
        let map = build_update(value, self.cache(), &self.config.update)?;
        sink::record(MetricsEvent::UpdateBuilt {
            type_name: type_name_of(value),
            columns: map.len() as u64,
        });

        Ok(map)
    }

    // panic boundary plus failure accounting
    fn run<T>(f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
        boundary::guard(f).inspect_err(|err| {
            sink::record(MetricsEvent::BuildFailed { class: err.class() });
            tracing::debug!(error = %err, "sieve call failed");
        })
    }
}

impl Default for Sieve {
    fn default() -> Self {
        Self::new(SieveConfig::default())
    }
}

fn type_name_of(value: &Value) -> &'static str {
    value
        .deref_present()
        .as_record()
        .map_or("<unknown>", |record| record.ty().name())
}
