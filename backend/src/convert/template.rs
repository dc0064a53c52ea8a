//! Translation key templates.
//!
//! A template such as `UNIT_NAME_{id}` names fields of the source record between braces.
//! Resolving it substitutes every placeholder with the field's current value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::mapping::SourceRecord;
use crate::error::ResolutionError;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(.*?)\}").expect("placeholder pattern is valid"));

/// A key template with `{field}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyTemplate(String);

impl KeyTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Field names referenced by the template, left to right, duplicates included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        PLACEHOLDER
            .captures_iter(&self.0)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
    }

    /// Substitute every placeholder with the string form of the referenced field.
    ///
    /// Every referenced field is read before any substitution, so the result does not
    /// depend on placeholder order and a value containing braces is never re-expanded.
    pub fn resolve(&self, record: &dyn SourceRecord) -> Result<String, ResolutionError> {
        let mut values: HashMap<&str, String> = HashMap::new();

        for field in self.placeholders() {
            if values.contains_key(field) {
                continue;
            }
            let value = record
                .read_field(field)
                .ok_or_else(|| ResolutionError::UnknownField {
                    template: self.0.clone(),
                    field: field.to_string(),
                })?;
            let text = value.as_text().ok_or_else(|| ResolutionError::NullField {
                template: self.0.clone(),
                field: field.to_string(),
            })?;
            values.insert(field, text);
        }

        let resolved = PLACEHOLDER.replace_all(&self.0, |caps: &regex::Captures| {
            let field = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            values.get(field).cloned().unwrap_or_default()
        });

        Ok(resolved.into_owned())
    }
}

impl fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyTemplate {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
