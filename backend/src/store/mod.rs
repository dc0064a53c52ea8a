//! Persistence of canonical records.
//!
//! Records are stored as JSON values grouped by dataset name. Persisting a batch upserts by
//! the record's `id` field: a record whose id is already stored replaces it, anything else is
//! appended.

pub mod json;

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{StoreError, StoreResult};

pub use json::JsonStore;

/// Storage backend for canonical records.
pub trait RecordStore: Send + Sync {
    /// Upsert a batch of records. Returns how many were written.
    fn persist(&mut self, dataset: &str, records: Vec<Value>) -> StoreResult<usize>;

    /// Number of records stored for a dataset.
    fn count(&self, dataset: &str) -> usize;

    /// A window of records, in insertion order.
    fn page(&self, dataset: &str, offset: usize, limit: usize) -> Vec<Value>;

    /// A record by id.
    fn find(&self, dataset: &str, id: &str) -> Option<Value>;

    /// Names of all non-empty datasets, sorted.
    fn datasets(&self) -> Vec<String>;
}

/// Records of one dataset, in insertion order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct DatasetTable {
    records: Vec<Value>,
    index: HashMap<String, usize>,
}

impl DatasetTable {
    /// Table holding `records`, later duplicates of an id replacing earlier ones.
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut table = Self::default();
        table.upsert(records);
        table
    }

    /// Replace records whose id is already stored, append the rest. Returns how many were written.
    pub fn upsert(&mut self, records: Vec<Value>) -> usize {
        let written = records.len();
        for record in records {
            match record_id(&record) {
                Some(id) => match self.index.get(&id) {
                    Some(&position) => self.records[position] = record,
                    None => {
                        self.index.insert(id, self.records.len());
                        self.records.push(record);
                    }
                },
                None => self.records.push(record),
            }
        }
        written
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&Value> {
        self.index.get(id).map(|&position| &self.records[position])
    }
}

/// In-memory dataset tables shared by the store implementations.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    tables: BTreeMap<String, DatasetTable>,
}

impl Datasets {
    pub fn upsert(&mut self, dataset: &str, records: Vec<Value>) -> usize {
        self.tables.entry(dataset.to_string()).or_default().upsert(records)
    }

    pub fn replace(&mut self, dataset: &str, records: Vec<Value>) {
        self.insert_table(dataset, DatasetTable::from_records(records));
    }

    pub fn table(&self, dataset: &str) -> Option<&DatasetTable> {
        self.tables.get(dataset)
    }

    pub fn insert_table(&mut self, dataset: &str, table: DatasetTable) {
        self.tables.insert(dataset.to_string(), table);
    }

    pub fn records(&self, dataset: &str) -> &[Value] {
        self.table(dataset).map(DatasetTable::records).unwrap_or_default()
    }

    pub fn count(&self, dataset: &str) -> usize {
        self.records(dataset).len()
    }

    pub fn page(&self, dataset: &str, offset: usize, limit: usize) -> Vec<Value> {
        self.records(dataset).iter().skip(offset).take(limit).cloned().collect()
    }

    pub fn find(&self, dataset: &str, id: &str) -> Option<Value> {
        self.table(dataset)?.find(id).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tables
            .iter()
            .filter(|(_, table)| !table.records.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// String form of a record's `id`, if it has a scalar one.
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reject dataset names that are not plain identifiers.
pub fn check_dataset_name(dataset: &str) -> StoreResult<()> {
    let valid = !dataset.is_empty()
        && dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidDataset(dataset.to_string()))
    }
}

/// Store keeping everything in memory. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Datasets,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn persist(&mut self, dataset: &str, records: Vec<Value>) -> StoreResult<usize> {
        check_dataset_name(dataset)?;
        Ok(self.data.upsert(dataset, records))
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upsert_by_id() {
        let mut store = MemoryStore::new();
        store
            .persist("units", vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})])
            .unwrap();
        store
            .persist("units", vec![json!({"id": 1, "name": "A"}), json!({"id": 3, "name": "c"})])
            .unwrap();

        assert_eq!(store.count("units"), 3);
        assert_eq!(store.find("units", "1").unwrap()["name"], "A");
        assert_eq!(store.page("units", 0, 10)[2]["id"], 3);
    }

    #[test]
    fn test_duplicate_ids_in_one_batch() {
        let mut store = MemoryStore::new();
        store
            .persist("units", vec![json!({"id": 1, "name": "a"}), json!({"id": 1, "name": "b"})])
            .unwrap();
        assert_eq!(store.count("units"), 1);
        assert_eq!(store.find("units", "1").unwrap()["name"], "b");
    }

    #[test]
    fn test_large_batches_upsert_by_id() {
        let mut store = MemoryStore::new();
        let book = |suffix: &str| -> Vec<Value> {
            (0..50_000)
                .map(|i| json!({ "id": format!("UNIT_NAME_{}", i), "text": format!("unit {}{}", i, suffix) }))
                .collect()
        };

        assert_eq!(store.persist("translations", book("")).unwrap(), 50_000);
        assert_eq!(store.persist("translations", book(" v2")).unwrap(), 50_000);

        assert_eq!(store.count("translations"), 50_000);
        assert_eq!(store.find("translations", "UNIT_NAME_49999").unwrap()["text"], "unit 49999 v2");
        assert_eq!(store.page("translations", 0, 1)[0]["id"], "UNIT_NAME_0");
    }

    #[test]
    fn test_records_without_id_are_appended() {
        let mut store = MemoryStore::new();
        store.persist("notes", vec![json!({"text": "x"}), json!({"text": "x"})]).unwrap();
        assert_eq!(store.count("notes"), 2);
    }

    #[test]
    fn test_string_and_numeric_ids_match() {
        let mut store = MemoryStore::new();
        store.persist("skills", vec![json!({"id": "skill_1"}), json!({"id": 7})]).unwrap();
        assert!(store.find("skills", "skill_1").is_some());
        assert!(store.find("skills", "7").is_some());
        assert!(store.find("skills", "8").is_none());
    }

    #[test]
    fn test_paging() {
        let mut store = MemoryStore::new();
        let records = (0..10).map(|i| json!({ "id": i })).collect();
        store.persist("pets", records).unwrap();

        let page = store.page("pets", 8, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0]["id"], 8);
        assert!(store.page("pets", 20, 5).is_empty());
        assert!(store.page("missing", 0, 5).is_empty());
    }

    #[test]
    fn test_dataset_names() {
        let mut store = MemoryStore::new();
        store.persist("units", vec![json!({"id": 1})]).unwrap();
        store.persist("empty", vec![]).unwrap();
        assert_eq!(store.datasets(), vec!["units".to_string()]);
        assert!(matches!(
            store.persist("../etc", vec![]),
            Err(StoreError::InvalidDataset(_))
        ));
    }
}
