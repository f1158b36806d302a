//! Observability infrastructure - metric counters

mod metrics;

pub use self::metrics::{
    record_comparison, record_generation_request, record_skipped_replicate,
    GenerationMetricParams,
};
