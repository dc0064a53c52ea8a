//! JSON file store.
//!
//! One pretty-printed file per dataset, `<dir>/<dataset>.json`, holding an envelope:
//!
//! ```json
//! { "dataset": "units", "updated_at": "2024-01-01T00:00:00Z", "records": [ ... ] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::{check_dataset_name, DatasetTable, Datasets, RecordStore};
use crate::api::logs::log_warning;
use crate::error::StoreResult;

/// On-disk form of one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub dataset: String,
    pub updated_at: String,
    pub records: Vec<Value>,
}

/// Store persisting each dataset to its own JSON file
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    data: Datasets,
}

impl JsonStore {
    /// Open a store, loading every dataset file already in `dir`
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut data = Datasets::default();
        for entry in fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match Self::read_file(&path) {
                Ok(file) => data.replace(&file.dataset, file.records),
                Err(e) => log_warning(format!("Ignoring unreadable store file {}: {}", path.display(), e)),
            }
        }

        Ok(Self { dir, data })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_file(path: &Path) -> StoreResult<DatasetFile> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_dataset(&self, dataset: &str, table: &DatasetTable) -> StoreResult<()> {
        let file = DatasetFile {
            dataset: dataset.to_string(),
            updated_at: chrono::Utc::now().to_rfc3339(),
            records: table.records().to_vec(),
        };
        let path = self.dir.join(format!("{}.json", dataset));
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

impl RecordStore for JsonStore {
    fn persist(&mut self, dataset: &str, records: Vec<Value>) -> StoreResult<usize> {
        check_dataset_name(dataset)?;
        // Memory only changes once the file is written.
        let mut table = self.data.table(dataset).cloned().unwrap_or_default();
        let written = table.upsert(records);
        self.write_dataset(dataset, &table)?;
        self.data.insert_table(dataset, table);
        Ok(written)
    }

    fn count(&self, dataset: &str) -> usize {
        self.data.count(dataset)
    }

    fn page(&self, dataset: &str, offset: usize, limit: usize) -> Vec<Value> {
        self.data.page(dataset, offset, limit)
    }

    fn find(&self, dataset: &str, id: &str) -> Option<Value> {
        self.data.find(dataset, id)
    }

    fn datasets(&self) -> Vec<String> {
        self.data.names()
    }
}
