//! JSON persistence of experiment runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::action::Action;
use crate::domain::experiment::{MetricResult, RunAnalysis};
use crate::domain::generation::SamplingConfig;
use crate::domain::DomainError;

const ARTIFACT_PREFIX: &str = "run_";
const ARTIFACT_EXTENSION: &str = "json";

/// Everything one experiment run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub provider: String,
    pub models: Vec<String>,
    pub attractors: Vec<String>,
    pub actions: Vec<Action>,
    pub sampling: SamplingConfig,
    pub replicates: u32,
    /// Per-replicate metric records in execution order
    pub records: Vec<MetricResult>,
    /// Replicates dropped because generation failed
    pub skipped_replicates: usize,
    /// Attractor id to the continuation outputs are scored against
    #[serde(default)]
    pub references: BTreeMap<String, String>,
    #[serde(default)]
    pub analysis: RunAnalysis,
}

impl RunArtifact {
    pub fn new(provider: impl Into<String>, sampling: SamplingConfig, replicates: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            provider: provider.into(),
            models: Vec::new(),
            attractors: Vec::new(),
            actions: Vec::new(),
            sampling,
            replicates,
            records: Vec::new(),
            skipped_replicates: 0,
            references: BTreeMap::new(),
            analysis: RunAnalysis::default(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// File name derived from the start time and run id
    pub fn file_name(&self) -> String {
        let short_id: String = self.run_id.simple().to_string().chars().take(8).collect();
        format!(
            "{}{}_{}.{}",
            ARTIFACT_PREFIX,
            self.started_at.format("%Y%m%d_%H%M%S"),
            short_id,
            ARTIFACT_EXTENSION
        )
    }
}

/// Directory of run artifacts, one pretty-printed JSON file per run
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, artifact: &RunArtifact) -> Result<PathBuf, DomainError> {
        let path = self.write_json(&artifact.file_name(), artifact).await?;
        info!(path = %path.display(), records = artifact.records.len(), "Run artifact saved");
        Ok(path)
    }

    /// Pretty-print any serializable value to `file_name` in the directory.
    /// Files not named `run_*.json` are ignored by [`ResultStore::latest`].
    pub async fn write_json<T: Serialize>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, DomainError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to create results directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            DomainError::serialization(format!("Failed to encode {}: {}", file_name, e))
        })?;

        tokio::fs::write(&path, json).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "JSON written");
        Ok(path)
    }

    pub async fn load(&self, path: impl AsRef<Path>) -> Result<RunArtifact, DomainError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::storage(format!("Failed to read {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Run artifact loaded");
        serde_json::from_str(&content).map_err(|e| {
            DomainError::serialization(format!("Invalid run artifact {}: {}", path.display(), e))
        })
    }

    /// Most recent artifact in the directory, by file name
    pub async fn latest(&self) -> Result<Option<PathBuf>, DomainError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to list {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut latest: Option<PathBuf> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list results: {}", e)))?
        {
            let path = entry.path();
            if !is_artifact(&path) {
                continue;
            }
            if latest.as_ref().map_or(true, |current| path.file_name() > current.file_name()) {
                latest = Some(path);
            }
        }

        Ok(latest)
    }
}

fn is_artifact(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ARTIFACT_PREFIX));
    let extension_matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == ARTIFACT_EXTENSION);
    name_matches && extension_matches
}
