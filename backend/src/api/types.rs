//! REST API types.
//!
//! Records are returned exactly as stored, in their canonical camelCase JSON form.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::store::RecordStore;

/// Default page size of dataset listings.
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: usize = 500;

/// A stored dataset and its size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub name: String,
    pub count: usize,
}

/// Response of `GET /api/datasets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetListResponse {
    pub datasets: Vec<DatasetInfo>,
}

impl DatasetListResponse {
    pub fn from_store(store: &dyn RecordStore) -> Self {
        let datasets = store
            .datasets()
            .into_iter()
            .map(|name| DatasetInfo {
                count: store.count(&name),
                name,
            })
            .collect();
        Self { datasets }
    }
}

/// Query string of a paged listing
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    /// Offset and limit, with the limit defaulted and capped.
    pub fn window(&self) -> (usize, usize) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
        (self.offset.unwrap_or(0), limit)
    }
}

/// Response of `GET /api/datasets/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPage {
    pub dataset: String,
    pub offset: usize,
    pub limit: usize,
    /// Records in the whole dataset
    pub total: usize,
    pub records: Vec<Value>,
}

impl DatasetPage {
    pub fn from_store(store: &dyn RecordStore, dataset: &str, query: PageQuery) -> Self {
        let (offset, limit) = query.window();
        Self {
            dataset: dataset.to_string(),
            offset,
            limit,
            total: store.count(dataset),
            records: store.page(dataset, offset, limit),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
