//! # efload - Endless Frontier game data loader
//!
//! efload reads the game's XML books, converts every record into a typed canonical model
//! following a declarative mapping descriptor, and persists the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  XML books  │────▶│   Extract   │────▶│   Convert   │────▶│    Store    │
//! │ (auto-enc)  │     │  (*Xml)     │     │ (mappings)  │     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use efload::{Loader, LoaderConfig};
//!
//! let mut loader = Loader::open(LoaderConfig::load(None)?)?;
//! let summary = loader.load_all();
//! println!("Persisted {} records", summary.total_persisted());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`convert`] - Coercion, key templates, translation and the model converter
//! - [`models`] - Source and canonical game models
//! - [`extract`] - XML extraction with encoding detection
//! - [`store`] - Record persistence
//! - [`loader`] - Load orchestration
//! - [`config`] - Layered configuration
//! - [`validation`] - JSON schema validation
//! - [`api`] - HTTP API server and log broadcasting

// Core modules
pub mod error;
pub mod convert;
pub mod models;

// Pipeline
pub mod extract;
pub mod store;
pub mod loader;

// Configuration
pub mod config;
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::{
    CoercionError, ConfigError, ConversionError, ExtractError, FieldError, LoadError, ResolutionError,
    ServerError, StoreError, TranslationError,
};

pub use convert::{
    CanonicalRecord, ConversionTables, FieldCoercer, FieldMapping, FieldValue, KeyTemplate, MappedSource,
    MappingDescriptor, ModelConverter, NoTranslations, ScalarKind, SourceRecord, TranslationBook, Translator,
    TypeHint,
};

pub use models::{all_mappings, DatasetKind};

pub use extract::{extract_file, extract_records, Extraction, NodePath};

pub use store::{JsonStore, MemoryStore, RecordStore};

pub use loader::{LoadSummary, Loader};

pub use config::{DatasetSpec, LoaderConfig};

pub use validation::{is_valid, validate, validate_config};

pub use api::logs::{LogEntry, LogLevel, LOG_BROADCASTER};

/// HTTP server (re-export for convenience)
pub mod server {
    pub use crate::api::server::start_server;
}
