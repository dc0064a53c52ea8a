//! JSON Schema validation (Draft 7).
//!
//! Schemas are embedded at compile time from the `schemas/` directory:
//! - `efload-config.json` - loader configuration file

use once_cell::sync::Lazy;
use serde_json::Value;

static CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/efload-config.json")).expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// Returns every validation error, not just the first.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check, true when valid.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a loader configuration file.
pub fn validate_config(data: &Value) -> Result<(), Vec<String>> {
    validate(&CONFIG_SCHEMA, data)
}
