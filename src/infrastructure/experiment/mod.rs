//! Statistical comparison engine and run persistence

mod bootstrap;
mod correction;
mod engine;
mod result_store;
mod statistical;

pub use bootstrap::{percentile, Bootstrap, BOOTSTRAP_LEVEL, BOOTSTRAP_RESAMPLES, BOOTSTRAP_SEED};
pub use correction::{Bonferroni, CorrectedPValue};
pub use engine::{StatisticalEngine, DEFAULT_ALPHA, MIN_SAMPLES_PER_CONDITION};
pub use result_store::{ResultStore, RunArtifact};
pub use statistical::{
    cohens_d, mean, mean_confidence_interval, one_way_anova, pooled_std_dev,
    required_sample_size, std_dev, student_t_test, two_tailed_p_value, variance, welch_t_test,
    TStatistic,
};
