//! Outcome reports of a load run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ConversionError;
use crate::models::DatasetKind;

/// Result of converting a batch of source records
#[derive(Debug)]
pub struct BatchReport<C> {
    /// Successfully converted records, in source order
    pub converted: Vec<C>,
    /// Records that failed, with their position in the batch
    pub failures: Vec<RecordFailure>,
}

/// A source record that could not be converted
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub index: usize,
    pub error: ConversionError,
}

impl<C> BatchReport<C> {
    pub fn new() -> Self {
        Self {
            converted: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Check if every record converted
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} successful, {} failures",
            self.converted.len(),
            self.failures.len()
        )
    }
}

impl<C> Default for BatchReport<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Loaded,
    Disabled,
    Failed,
}

/// Per-dataset statistics of a load run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub dataset: DatasetKind,
    pub status: DatasetStatus,
    /// Records extracted from XML
    pub extracted: usize,
    /// Matched nodes that did not extract
    pub skipped: usize,
    pub converted: usize,
    pub failed: usize,
    /// Records written by this run
    pub persisted: usize,
    /// Records in the store afterwards
    pub stored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatasetStats {
    pub fn new(dataset: DatasetKind) -> Self {
        Self {
            dataset,
            status: DatasetStatus::Loaded,
            extracted: 0,
            skipped: 0,
            converted: 0,
            failed: 0,
            persisted: 0,
            stored: 0,
            error: None,
        }
    }

    pub fn disabled(dataset: DatasetKind) -> Self {
        Self {
            status: DatasetStatus::Disabled,
            ..Self::new(dataset)
        }
    }

    pub fn failed(dataset: DatasetKind, error: impl ToString) -> Self {
        Self {
            status: DatasetStatus::Failed,
            error: Some(error.to_string()),
            ..Self::new(dataset)
        }
    }
}

/// Summary of a complete load run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub datasets: Vec<DatasetStats>,
}

impl LoadSummary {
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            datasets: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn failed_datasets(&self) -> Vec<DatasetKind> {
        self.datasets
            .iter()
            .filter(|s| s.status == DatasetStatus::Failed)
            .map(|s| s.dataset)
            .collect()
    }

    pub fn total_persisted(&self) -> usize {
        self.datasets.iter().map(|s| s.persisted).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.datasets.iter().map(|s| s.failed).sum()
    }

    pub fn stats(&self, dataset: DatasetKind) -> Option<&DatasetStats> {
        self.datasets.iter().find(|s| s.dataset == dataset)
    }
}
