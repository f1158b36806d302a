//! Infrastructure services

mod analysis_service;
mod comparative_service;
mod experiment_service;
mod validation_service;

pub use analysis_service::AnalysisService;
pub use comparative_service::{ComparativeAnalysis, DEFAULT_PHASE_THRESHOLD};
pub use experiment_service::{ExperimentService, RunPlan};
pub use validation_service::{
    AttractorRanking, AttractorValidationService, ModelSummary, ValidationOutcome,
    ValidationReport,
};
