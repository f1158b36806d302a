//! Experiment orchestration
//!
//! Runs every attractor × action × model combination for a number of
//! replicates, generating a control and a modified continuation per
//! replicate and scoring each against the attractor's canonical text.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::experiment::{Condition, ExperimentKey, MetricRecordId, MetricResult};
use crate::domain::metrics::MetricName;
use crate::domain::{
    Action, Attractor, DivergenceSuite, DomainError, GenerationProvider, GenerationSample,
    SamplingConfig,
};
use crate::infrastructure::experiment::RunArtifact;
use crate::infrastructure::observability::{
    record_generation_request, record_skipped_replicate, GenerationMetricParams,
};

// ============================================================================
// Run Plan
// ============================================================================

/// What one run executes
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub attractors: Vec<Attractor>,
    pub actions: Vec<Action>,
    pub models: Vec<String>,
    pub replicates: u32,
    pub sampling: SamplingConfig,
}

impl RunPlan {
    pub fn new(sampling: SamplingConfig, replicates: u32) -> Self {
        Self {
            attractors: Vec::new(),
            actions: Vec::new(),
            models: Vec::new(),
            replicates,
            sampling,
        }
    }

    pub fn with_attractor(mut self, attractor: Attractor) -> Self {
        self.attractors.push(attractor);
        self
    }

    pub fn with_attractors(mut self, attractors: impl IntoIterator<Item = Attractor>) -> Self {
        self.attractors.extend(attractors);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.models.push(model.into());
        self
    }

    pub fn with_models<S: Into<String>>(mut self, models: impl IntoIterator<Item = S>) -> Self {
        self.models.extend(models.into_iter().map(Into::into));
        self
    }

    /// Number of (attractor, action, model) experiments
    pub fn experiment_count(&self) -> usize {
        self.attractors.len() * self.actions.len() * self.models.len()
    }

    /// Reject plans that cannot produce a single comparison
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.replicates == 0 {
            return Err(DomainError::configuration(
                "replicates must be at least 1",
            ));
        }

        if self.attractors.is_empty() {
            return Err(DomainError::configuration("no attractors selected"));
        }

        if self.actions.is_empty() {
            return Err(DomainError::configuration("no actions selected"));
        }

        if self.models.is_empty() {
            return Err(DomainError::configuration("no models selected"));
        }

        self.sampling.validate()?;

        for action in &self.actions {
            action.validate()?;
        }

        Ok(())
    }
}

// ============================================================================
// Service
// ============================================================================

/// Drives generation for a [`RunPlan`] and collects per-replicate records
#[derive(Debug, Clone)]
pub struct ExperimentService {
    provider: Arc<dyn GenerationProvider>,
    suite: DivergenceSuite,
}

/// Both outputs of one replicate
struct ReplicateOutput {
    control: GenerationSample,
    modified: GenerationSample,
}

impl ExperimentService {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            suite: DivergenceSuite::new(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Execute the plan. Failed replicates are skipped and counted; only an
    /// invalid plan aborts the run.
    pub async fn run(&self, plan: &RunPlan) -> Result<RunArtifact, DomainError> {
        plan.validate()?;

        let mut artifact =
            RunArtifact::new(self.provider_name(), plan.sampling, plan.replicates);
        artifact.models = plan.models.clone();
        artifact.attractors = plan.attractors.iter().map(|a| a.id.clone()).collect();
        artifact.actions = plan.actions.clone();
        artifact.references = plan
            .attractors
            .iter()
            .map(|a| (a.id.clone(), a.continuation().to_string()))
            .collect();

        info!(
            run_id = %artifact.run_id,
            provider = self.provider_name(),
            experiments = plan.experiment_count(),
            replicates = plan.replicates,
            "Starting experiment run"
        );

        for attractor in &plan.attractors {
            let reference = GenerationSample::from_text(attractor.continuation());

            for action in &plan.actions {
                let perturbation = action.apply(&attractor.prompt, &plan.sampling)?;
                if !perturbation.applied {
                    warn!(
                        attractor = %attractor.id,
                        action = %action.id(),
                        "Action is a no-op for this prompt"
                    );
                }

                for model in &plan.models {
                    let key = ExperimentKey::new(&attractor.id, action.id(), model);

                    for replicate in 0..plan.replicates {
                        let output = match self
                            .run_replicate(
                                model,
                                &attractor.prompt,
                                &plan.sampling,
                                &perturbation.prompt,
                                &perturbation.config,
                            )
                            .await
                        {
                            Ok(output) => output,
                            Err(err) => {
                                warn!(
                                    experiment = %key,
                                    replicate,
                                    error = %err,
                                    "Skipping replicate"
                                );
                                record_skipped_replicate(model, "generation_failed");
                                artifact.skipped_replicates += 1;
                                continue;
                            }
                        };

                        let pairwise = self.suite.compare(&output.control, &output.modified, None);
                        debug!(
                            experiment = %key,
                            replicate,
                            exact_match = pairwise.get(MetricName::ExactMatch),
                            js_divergence = pairwise.get(MetricName::JsDivergence),
                            divergence_point = pairwise.get(MetricName::DivergencePoint),
                            "Replicate scored"
                        );

                        let reference_text = Some(attractor.continuation());
                        let control = MetricResult::new(
                            MetricRecordId::generate(),
                            &key,
                            Condition::Control,
                            replicate,
                            self.suite.compare(&reference, &output.control, reference_text),
                        )
                        .with_output(output.control.text);

                        let modified = MetricResult::new(
                            MetricRecordId::generate(),
                            &key,
                            Condition::Modified,
                            replicate,
                            self.suite
                                .compare(&reference, &output.modified, reference_text),
                        )
                        .with_output(output.modified.text)
                        .with_action_applied(perturbation.applied);

                        artifact.records.push(control);
                        artifact.records.push(modified);
                    }
                }
            }
        }

        artifact.finish();

        info!(
            run_id = %artifact.run_id,
            records = artifact.records.len(),
            skipped = artifact.skipped_replicates,
            "Experiment run finished"
        );

        Ok(artifact)
    }

    async fn run_replicate(
        &self,
        model: &str,
        control_prompt: &str,
        control_config: &SamplingConfig,
        modified_prompt: &str,
        modified_config: &SamplingConfig,
    ) -> Result<ReplicateOutput, DomainError> {
        let (control, modified) = futures::join!(
            self.generate(model, control_prompt, control_config),
            self.generate(model, modified_prompt, modified_config),
        );

        Ok(ReplicateOutput {
            control: control?,
            modified: modified?,
        })
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<GenerationSample, DomainError> {
        let start = Instant::now();
        let result = self.provider.generate(model, prompt, config).await;

        record_generation_request(GenerationMetricParams {
            provider: self.provider_name(),
            model,
            duration: start.elapsed(),
            success: result.is_ok(),
            total_tokens: result.as_ref().ok().map(|s| u64::from(s.total_tokens)),
        });

        result
    }
}
