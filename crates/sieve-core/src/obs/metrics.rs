use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

///
/// EventState
/// Ephemeral, in-memory counters for descriptor and builder activity.
/// One instance per process, shared by every thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Descriptor cache
    pub descriptors_compiled: u64,
    pub descriptor_fields: u64,
    pub cache_hits: u64,

    // Builders
    pub filters_built: u64,
    pub filters_empty: u64,
    pub updates_built: u64,
    pub update_columns: u64,

    // Failures
    pub input_errors: u64,
    pub schema_errors: u64,
    pub value_errors: u64,
    pub panics_recovered: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeCounters {
    pub compiled: u64,
    pub cache_hits: u64,
    pub filters_built: u64,
    pub filters_empty: u64,
    pub updates_built: u64,
    pub update_columns: u64,
}

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

// counters stay usable after a panic while the lock was held
fn lock() -> MutexGuard<'static, EventState> {
    EVENT_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    f(&lock())
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut lock())
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub type_counters: Vec<TypeSummary>,
}

///
/// TypeSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub compiled: u64,
    pub cache_hits: u64,
    pub filters_built: u64,
    pub filters_empty: u64,
    pub updates_built: u64,
    pub avg_columns_per_update: f64,
}

/// Build a metrics report from the in-memory counters.
#[must_use]
pub(crate) fn report() -> EventReport {
    summarize(with_state(Clone::clone))
}

/// Build a report from a counter snapshot.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn summarize(snap: EventState) -> EventReport {
    let mut type_counters: Vec<TypeSummary> = snap
        .types
        .iter()
        .map(|(name, ops)| {
            let avg_columns = if ops.updates_built > 0 {
                ops.update_columns as f64 / ops.updates_built as f64
            } else {
                0.0
            };

            TypeSummary {
                name: name.clone(),
                compiled: ops.compiled,
                cache_hits: ops.cache_hits,
                filters_built: ops.filters_built,
                filters_empty: ops.filters_empty,
                updates_built: ops.updates_built,
                avg_columns_per_update: avg_columns,
            }
        })
        .collect();

    // busiest types first, then by name for a stable order
    type_counters.sort_by(|a, b| {
        let a_total = a.filters_built + a.updates_built;
        let b_total = b.filters_built + b.updates_built;
        b_total.cmp(&a_total).then_with(|| a.name.cmp(&b.name))
    });

    EventReport {
        counters: snap,
        type_counters,
    }
}
