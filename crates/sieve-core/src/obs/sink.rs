//! Metrics sink boundary.
//!
//! Compiler and builder code never touches `obs::metrics` directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::{
    error::ErrorClass,
    obs::metrics::{self, EventState},
};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    DescriptorCompiled {
        type_name: &'static str,
        fields: u64,
    },
    CacheHit {
        type_name: &'static str,
    },
    FilterBuilt {
        type_name: &'static str,
        empty: bool,
    },
    UpdateBuilt {
        type_name: &'static str,
        columns: u64,
    },
    BuildFailed {
        class: ErrorClass,
    },
    PanicRecovered,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the process-wide metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| apply(m, event));
    }
}

/// Fold one event into a counter set.
pub(crate) fn apply(m: &mut EventState, event: MetricsEvent) {
    match event {
        MetricsEvent::DescriptorCompiled { type_name, fields } => {
            m.ops.descriptors_compiled = m.ops.descriptors_compiled.saturating_add(1);
            m.ops.descriptor_fields = m.ops.descriptor_fields.saturating_add(fields);

            let entry = m.types.entry(type_name.to_string()).or_default();
            entry.compiled = entry.compiled.saturating_add(1);
        }

        MetricsEvent::CacheHit { type_name } => {
            m.ops.cache_hits = m.ops.cache_hits.saturating_add(1);

            let entry = m.types.entry(type_name.to_string()).or_default();
            entry.cache_hits = entry.cache_hits.saturating_add(1);
        }

        MetricsEvent::FilterBuilt { type_name, empty } => {
            m.ops.filters_built = m.ops.filters_built.saturating_add(1);
            if empty {
                m.ops.filters_empty = m.ops.filters_empty.saturating_add(1);
            }

            let entry = m.types.entry(type_name.to_string()).or_default();
            entry.filters_built = entry.filters_built.saturating_add(1);
            if empty {
                entry.filters_empty = entry.filters_empty.saturating_add(1);
            }
        }

        MetricsEvent::UpdateBuilt { type_name, columns } => {
            m.ops.updates_built = m.ops.updates_built.saturating_add(1);
            m.ops.update_columns = m.ops.update_columns.saturating_add(columns);

            let entry = m.types.entry(type_name.to_string()).or_default();
            entry.updates_built = entry.updates_built.saturating_add(1);
            entry.update_columns = entry.update_columns.saturating_add(columns);
        }

        MetricsEvent::BuildFailed { class } => match class {
            ErrorClass::Input => m.ops.input_errors = m.ops.input_errors.saturating_add(1),
            ErrorClass::Schema => m.ops.schema_errors = m.ops.schema_errors.saturating_add(1),
            ErrorClass::Value => m.ops.value_errors = m.ops.value_errors.saturating_add(1),
            // counted by `PanicRecovered`
            ErrorClass::Internal => {}
        },

        MetricsEvent::PanicRecovered => {
            m.ops.panics_recovered = m.ops.panics_recovered.saturating_add(1);
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`,
        //   which restores the previous slot on every exit, unwinding included.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        // - Only a shared reference is materialized, matching the borrow used to
        //   install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state, for every thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope and `Guard`
    //   restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    // - The lifetime is erased, but access stays shared.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    const HIT: MetricsEvent = MetricsEvent::CacheHit {
        type_name: "obs::tests::Filter",
    };

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        // No override installed yet.
        record(HIT);
        assert_eq!(outer_calls.load(Ordering::SeqCst), 0);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 0);

        with_metrics_sink(&outer, || {
            record(HIT);
            assert_eq!(outer_calls.load(Ordering::SeqCst), 1);
            assert_eq!(inner_calls.load(Ordering::SeqCst), 0);

            with_metrics_sink(&inner, || {
                record(HIT);
            });

            // Inner override was restored to outer override.
            record(HIT);
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);

        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(HIT);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Guard restored TLS slot after unwind.
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });

        record(HIT);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn fold(events: &[MetricsEvent]) -> metrics::EventReport {
        let mut state = EventState::default();
        for event in events {
            apply(&mut state, *event);
        }

        metrics::summarize(state)
    }

    #[test]
    fn builder_events_accumulate_globally_and_per_type() {
        let report = fold(&[
            MetricsEvent::DescriptorCompiled {
                type_name: "obs::tests::Filter",
                fields: 4,
            },
            HIT,
            MetricsEvent::FilterBuilt {
                type_name: "obs::tests::Filter",
                empty: true,
            },
            MetricsEvent::UpdateBuilt {
                type_name: "obs::tests::Filter",
                columns: 3,
            },
            MetricsEvent::UpdateBuilt {
                type_name: "obs::tests::Filter",
                columns: 1,
            },
        ]);

        let ops = &report.counters.ops;
        assert_eq!(ops.descriptors_compiled, 1);
        assert_eq!(ops.descriptor_fields, 4);
        assert_eq!(ops.cache_hits, 1);
        assert_eq!(ops.filters_built, 1);
        assert_eq!(ops.filters_empty, 1);
        assert_eq!(ops.updates_built, 2);
        assert_eq!(ops.update_columns, 4);

        let summary = &report.type_counters[0];
        assert_eq!(summary.name, "obs::tests::Filter");
        assert_eq!(summary.compiled, 1);
        assert!((summary.avg_columns_per_update - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failures_are_counted_by_class() {
        let ops = fold(&[
            MetricsEvent::BuildFailed {
                class: ErrorClass::Schema,
            },
            MetricsEvent::BuildFailed {
                class: ErrorClass::Input,
            },
            MetricsEvent::BuildFailed {
                class: ErrorClass::Internal,
            },
            MetricsEvent::PanicRecovered,
        ])
        .counters
        .ops;

        assert_eq!(ops.schema_errors, 1);
        assert_eq!(ops.input_errors, 1);
        assert_eq!(ops.value_errors, 0);
        assert_eq!(ops.panics_recovered, 1);
    }

    #[test]
    fn type_summaries_sort_busiest_first() {
        let mut events = vec![MetricsEvent::FilterBuilt {
            type_name: "a::Quiet",
            empty: false,
        }];
        events.extend([MetricsEvent::FilterBuilt {
            type_name: "b::Busy",
            empty: false,
        }; 3]);

        let names: Vec<_> = fold(&events)
            .type_counters
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["b::Busy", "a::Quiet"]);
    }

    #[test]
    fn events_from_other_threads_reach_the_report() {
        const SPAWNED: &str = "obs::tests::Spawned";

        std::thread::spawn(|| {
            record(MetricsEvent::FilterBuilt {
                type_name: SPAWNED,
                empty: false,
            });
            record(MetricsEvent::UpdateBuilt {
                type_name: SPAWNED,
                columns: 2,
            });
        })
        .join()
        .unwrap();

        let report = metrics_report();
        let summary = report
            .type_counters
            .iter()
            .find(|t| t.name == SPAWNED)
            .unwrap();

        assert_eq!(summary.filters_built, 1);
        assert_eq!(summary.updates_built, 1);
        assert!(report.counters.ops.filters_built >= 1);
    }

    #[test]
    fn sink_override_stays_on_its_thread() {
        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        with_metrics_sink(&sink, || {
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
                    record(HIT);
                });
            });
            record(HIT);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
