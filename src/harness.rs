use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::Accession;
use crate::error::AtlasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub accession: Accession,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub items: Vec<BatchItemResult>,
}

impl BatchOutcome {
    /// Failed accessions in input order.
    pub fn failed_accessions(&self) -> Vec<Accession> {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Failure)
            .map(|item| item.accession.clone())
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Failure)
            .count()
    }

    pub fn exit_code(&self) -> u8 {
        if self.failure_count() == 0 { 0 } else { 1 }
    }

    /// Writes the failed accessions one per line, atomically, so the file
    /// can be fed back as the next run's accession argument. No failures,
    /// no file. Returns whether a file was written.
    pub fn persist_failures(&self, path: &Utf8Path) -> Result<bool, AtlasError> {
        let failed = self.failed_accessions();
        if failed.is_empty() {
            return Ok(false);
        }
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| AtlasError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("sc-atlas-retry")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| AtlasError::Filesystem(err.to_string()))?;
        for accession in &failed {
            writeln!(temp, "{accession}").map_err(|err| AtlasError::Filesystem(err.to_string()))?;
        }
        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| AtlasError::Filesystem(err.to_string()))?;
        }
        temp.persist(path.as_std_path())
            .map_err(|err| AtlasError::Filesystem(err.to_string()))?;
        Ok(true)
    }
}

/// Runs one unit of work per accession, in order, isolating failures at
/// the per-item boundary. A bad accession is logged and recorded; it never
/// aborts the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchIngestionHarness {
    retry_file: Option<Utf8PathBuf>,
}

impl BatchIngestionHarness {
    pub fn new() -> Self {
        Self { retry_file: None }
    }

    pub fn with_retry_file(path: Utf8PathBuf) -> Self {
        Self {
            retry_file: Some(path),
        }
    }

    pub fn run<F>(
        &self,
        accessions: &[Accession],
        mut unit_of_work: F,
    ) -> Result<BatchOutcome, AtlasError>
    where
        F: FnMut(&Accession) -> Result<(), AtlasError>,
    {
        let started_at = Utc::now();
        let mut items = Vec::with_capacity(accessions.len());

        for accession in accessions {
            match unit_of_work(accession) {
                Ok(()) => {
                    info!(accession = %accession, "batch item done");
                    items.push(BatchItemResult {
                        accession: accession.clone(),
                        status: ItemStatus::Success,
                        message: None,
                    });
                }
                Err(err) => {
                    warn!(accession = %accession, error = %err, "batch item failed");
                    items.push(BatchItemResult {
                        accession: accession.clone(),
                        status: ItemStatus::Failure,
                        message: Some(err.to_string()),
                    });
                }
            }
        }

        let outcome = BatchOutcome {
            started_at,
            finished_at: Utc::now(),
            items,
        };
        if let Some(path) = &self.retry_file {
            outcome.persist_failures(path)?;
        }
        Ok(outcome)
    }
}

/// Splits a flag value or retry-file body into accessions. Accepts comma
/// and newline delimited lists so a persisted retry file round-trips.
pub fn parse_accession_list(raw: &str) -> Result<Vec<Accession>, AtlasError> {
    raw.split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}
