//! HTTP server for the efload API.
//!
//! Exposes the record store read-only, triggers load runs and streams logs.
//!
//! # API Endpoints
//!
//! | Method | Path                        | Description                       |
//! |--------|-----------------------------|-----------------------------------|
//! | GET    | `/health`                   | Health check                      |
//! | GET    | `/api/datasets`             | Stored datasets and their counts  |
//! | GET    | `/api/datasets/{name}`      | Page of records (`offset`, `limit`) |
//! | GET    | `/api/datasets/{name}/{id}` | One record by id                  |
//! | POST   | `/api/load`                 | Run a full load, returns summary  |
//! | GET    | `/api/logs`                 | SSE stream for real-time logs     |

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock, RwLockReadGuard};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, DatasetListResponse, DatasetPage, PageQuery};
use crate::error::ServerResult;
use crate::loader::{LoadSummary, Loader};
use crate::models::DatasetKind;

type ApiError = (StatusCode, Json<Value>);

/// Shared server state
///
/// A load run holds the write lock for its whole duration. Requests never wait for it:
/// reads answer 503 and a second load answers 409 until the run is over.
#[derive(Clone)]
pub struct AppState {
    loader: Arc<RwLock<Loader>>,
}

impl AppState {
    pub fn new(loader: Loader) -> Self {
        Self {
            loader: Arc::new(RwLock::new(loader)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Loader>, ApiError> {
        self.loader.try_read().map_err(|_| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(error_response("A load is in progress, try again later")),
            )
        })
    }

    fn write(&self) -> Result<OwnedRwLockWriteGuard<Loader>, ApiError> {
        self.loader
            .clone()
            .try_write_owned()
            .map_err(|_| (StatusCode::CONFLICT, Json(error_response("A load is already running"))))
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/datasets", get(list_datasets))
        .route("/api/datasets/{name}", get(dataset_page))
        .route("/api/datasets/{name}/{id}", get(dataset_record))
        .route("/api/load", post(run_load))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(loader: Loader, port: u16) -> ServerResult<()> {
    let app = router(AppState::new(loader));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("efload server running on http://localhost:{}", port);
    println!("   GET  /api/datasets              - Stored datasets");
    println!("   GET  /api/datasets/{{name}}       - Paged records");
    println!("   GET  /api/datasets/{{name}}/{{id}}  - One record");
    println!("   POST /api/load                  - Run a full load");
    println!("   GET  /api/logs                  - SSE log stream");
    println!("   GET  /health                    - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "efload",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_datasets(State(state): State<AppState>) -> Result<Json<DatasetListResponse>, ApiError> {
    let loader = state.read()?;
    Ok(Json(DatasetListResponse::from_store(loader.store())))
}

async fn dataset_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<DatasetPage>, ApiError> {
    let kind = dataset_kind(&name)?;
    let loader = state.read()?;
    Ok(Json(DatasetPage::from_store(loader.store(), kind.name(), query)))
}

async fn dataset_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = dataset_kind(&name)?;
    let loader = state.read()?;
    loader.store().find(kind.name(), &id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(error_response(&format!("No {} record with id {}", kind, id))),
        )
    })
}

/// Run every enabled dataset on a blocking thread
async fn run_load(State(state): State<AppState>) -> Result<Json<LoadSummary>, ApiError> {
    let mut loader = state.write()?;
    let summary = tokio::task::spawn_blocking(move || loader.load_all())
        .await
        .map_err(|e| {
            log_error(format!("Load task failed: {}", e));
            internal(&e.to_string())
        })?;

    Ok(Json(summary))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn dataset_kind(name: &str) -> Result<DatasetKind, ApiError> {
    DatasetKind::from_str(name).map_err(|e| (StatusCode::NOT_FOUND, Json(error_response(&e.to_string()))))
}

fn internal(message: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::store::{MemoryStore, RecordStore};

    fn state() -> AppState {
        let mut store = MemoryStore::new();
        store
            .persist("units", vec![json!({ "id": 1, "name": "Knight" }), json!({ "id": 2, "name": "Archer" })])
            .unwrap();
        AppState::new(Loader::new(LoaderConfig::default(), Box::new(store)))
    }

    #[tokio::test]
    async fn test_list_datasets() {
        let Json(list) = list_datasets(State(state())).await.unwrap();
        assert_eq!(list.datasets.len(), 1);
        assert_eq!(list.datasets[0].count, 2);
    }

    #[tokio::test]
    async fn test_dataset_page_and_record() {
        let state = state();
        let query = PageQuery {
            offset: None,
            limit: Some(1),
        };
        let Json(page) = dataset_page(State(state.clone()), Path("units".into()), Query(query))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records.len(), 1);

        let Json(record) = dataset_record(State(state.clone()), Path(("units".into(), "2".into())))
            .await
            .unwrap();
        assert_eq!(record["name"], "Archer");

        let (status, _) = dataset_record(State(state), Path(("units".into(), "9".into())))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requests_during_a_load_do_not_wait() {
        let state = state();
        let running = state.loader.clone().write_owned().await;

        let (status, _) = list_datasets(State(state.clone())).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _) = dataset_record(State(state.clone()), Path(("units".into(), "1".into())))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _) = run_load(State(state.clone())).await.unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);

        drop(running);
        let Json(list) = list_datasets(State(state)).await.unwrap();
        assert_eq!(list.datasets.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_dataset() {
        let (status, Json(body)) = dataset_page(State(state()), Path("heroes".into()), Query(PageQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("heroes"));
    }
}
