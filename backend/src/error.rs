//! Error types for the efload pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`CoercionError`] - a single value could not be coerced
//! - [`ResolutionError`] - a translation key template could not be resolved
//! - [`TranslationError`] - the translator failed a lookup
//! - [`FieldError`] - a single mapped field failed fatally
//! - [`ConversionError`] - a whole record failed to convert
//! - [`ExtractError`] - XML extraction errors
//! - [`StoreError`] - persistence errors
//! - [`ConfigError`] - configuration loading errors
//! - [`LoadError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::convert::TypeHint;

// =============================================================================
// Conversion core
// =============================================================================

/// A non-empty value that cannot be coerced to its target type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Could not convert '{value}' to hinted type {target}")]
pub struct CoercionError {
    pub value: String,
    pub target: TypeHint,
}

impl CoercionError {
    pub fn new(value: impl Into<String>, target: TypeHint) -> Self {
        Self {
            value: value.into(),
            target,
        }
    }
}

/// A key template referencing a field that cannot supply a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    /// The template names a field the source record does not have.
    #[error("Invalid field reference in key '{template}': unknown field '{field}'")]
    UnknownField { template: String, field: String },

    /// The referenced field exists but holds no value.
    #[error("Field '{field}' referenced by key '{template}' is null")]
    NullField { template: String, field: String },
}

/// The translator could not answer a lookup.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Translation lookup for '{key}' failed: {message}")]
pub struct TranslationError {
    pub key: String,
    pub message: String,
}

/// A fatal failure on one mapped field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// Raw value could not be coerced.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// The destination slot does not exist on the canonical model.
    #[error("Fatal error trying to find field '{slot}' in canonical model")]
    MissingSlot { slot: String },

    /// The source model exposes no such field.
    #[error("Fatal error reading field '{field}' from source model")]
    UnreadableField { field: String },

    /// The converted value does not fit the destination slot.
    #[error("Cannot write {found} into field '{slot}' declared as {expected}")]
    SlotMismatch {
        slot: String,
        expected: TypeHint,
        found: String,
    },
}

/// A source record could not be converted into its canonical model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The mapping descriptor targets another canonical type.
    #[error("Mapping for {source_type} targets {declared}, cannot build {destination_type}")]
    DestinationMismatch {
        source_type: String,
        declared: String,
        destination_type: String,
    },

    /// A field failed fatally; the record is discarded.
    #[error("Error converting field '{field}' of {source_type} to {destination_type}: {cause}")]
    Field {
        field: String,
        source_type: String,
        destination_type: String,
        #[source]
        cause: FieldError,
    },
}

impl ConversionError {
    /// Name of the failing field, if the error is field-level.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConversionError::Field { field, .. } => Some(field),
            ConversionError::DestinationMismatch { .. } => None,
        }
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Errors while extracting source records from XML.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Failed to read the document.
    #[error("Error loading file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Document is not well-formed XML.
    #[error("Error parsing document, make sure it is well formed xml: {0}")]
    Xml(String),

    /// Node path could not be compiled.
    #[error("Invalid node path '{0}'")]
    InvalidPath(String),

    /// A matched node could not be turned into a record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Persistence
// =============================================================================

/// Errors from a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dataset name cannot be used as a file name.
    #[error("Invalid dataset name: {0}")]
    InvalidDataset(String),
}

// =============================================================================
// Configuration
// =============================================================================

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file does not match the schema.
    #[error("Config validation failed: {}", .errors.join("; "))]
    Schema { errors: Vec<String> },

    /// Invalid value from the environment.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Load orchestration (top-level)
// =============================================================================

/// Top-level load errors.
///
/// Record-level [`ConversionError`]s never appear here: the loader counts and skips them.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Extraction error.
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Config error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Dataset name not known to the loader.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// Dataset has no XML file or node path configured.
    #[error("Dataset {0} has no XML source")]
    MissingSource(String),

    /// Serializing a canonical record failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Load error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for coercion.
pub type CoercionResult<T> = Result<T, CoercionError>;

/// Result type for record conversion.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ScalarKind;

    #[test]
    fn test_error_conversion_chain() {
        // ExtractError -> LoadError
        let extract_err = ExtractError::InvalidPath(String::new());
        let load_err: LoadError = extract_err.into();
        assert!(load_err.to_string().contains("Invalid node path"));

        // StoreError -> LoadError -> ServerError
        let store_err = StoreError::InvalidDataset("../etc".into());
        let server_err: ServerError = LoadError::from(store_err).into();
        assert!(server_err.to_string().contains("../etc"));
    }

    #[test]
    fn test_conversion_error_format() {
        let err = ConversionError::Field {
            field: "id".into(),
            source_type: "UnitXml".into(),
            destination_type: "Unit".into(),
            cause: CoercionError::new("abc", TypeHint::Scalar(ScalarKind::Integer)).into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'id'"));
        assert!(msg.contains("UnitXml"));
        assert!(msg.contains("Unit"));
        assert!(msg.contains("'abc'"));
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_schema_error_joins_messages() {
        let err = ConfigError::Schema {
            errors: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Config validation failed: a; b");
    }
}
