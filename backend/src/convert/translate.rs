//! Localized field translation.
//!
//! A localized field resolves its key template against the source record and asks a
//! [`Translator`] for text. The outcome is one of three values, in order of precedence:
//!
//! 1. [`Translation::Translated`] - the lookup returned non-blank text
//! 2. [`Translation::Fallback`] - the field's own raw value, as text
//! 3. [`Translation::Null`] - no lookup result and no raw value
//!
//! Key resolution and lookup failures are logged and fall through to the raw value. Only a
//! field missing from the source type is fatal.

use std::collections::HashMap;

use super::mapping::{FieldMapping, SourceRecord};
use super::value::FieldValue;
use crate::api::logs::{log_debug, log_warning};
use crate::error::{FieldError, TranslationError};

/// External text lookup.
///
/// Not found is `Ok(None)`. Implementations must be safe to share across threads.
pub trait Translator: Send + Sync {
    fn lookup(&self, key: &str) -> Result<Option<String>, TranslationError>;
}

/// Translator that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslations;

impl Translator for NoTranslations {
    fn lookup(&self, _key: &str) -> Result<Option<String>, TranslationError> {
        Ok(None)
    }
}

impl Translator for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Result<Option<String>, TranslationError> {
        Ok(self.get(key).cloned())
    }
}

impl<F> Translator for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup(&self, key: &str) -> Result<Option<String>, TranslationError> {
        Ok(self(key))
    }
}

/// Key to text map built from the translation dataset.
///
/// Blank texts are kept so a lookup can report "found but blank".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationBook {
    entries: HashMap<String, String>,
}

impl TranslationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Later entries replace earlier ones with the same key.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationBook {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut book = TranslationBook::new();
        for (key, text) in iter {
            book.insert(key, text);
        }
        book
    }
}

impl Translator for TranslationBook {
    fn lookup(&self, key: &str) -> Result<Option<String>, TranslationError> {
        Ok(self.entries.get(key).cloned())
    }
}

/// Outcome of translating one localized field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    Fallback(String),
    Null,
}

impl Translation {
    pub fn into_value(self) -> FieldValue {
        match self {
            Translation::Translated(text) | Translation::Fallback(text) => FieldValue::Text(text),
            Translation::Null => FieldValue::Null,
        }
    }
}

/// Applies a [`Translator`] to localized fields of a source record.
#[derive(Clone, Copy)]
pub struct FieldTranslator<'t> {
    translator: &'t dyn Translator,
}

impl<'t> FieldTranslator<'t> {
    pub fn new(translator: &'t dyn Translator) -> Self {
        Self { translator }
    }

    /// Translate `mapping.field` of `record`.
    ///
    /// A mapping without a key template goes straight to the raw value.
    pub fn translate(
        &self,
        record: &dyn SourceRecord,
        mapping: &FieldMapping,
        tag: &str,
    ) -> Result<Translation, FieldError> {
        let prefix = format!("[{} {}]", record.type_name(), tag);
        log_debug(format!("{} - beginning translation of field {}", prefix, mapping.field));

        if let Some(template) = &mapping.translate {
            match template.resolve(record) {
                Ok(key) => {
                    log_debug(format!(
                        "{} - translation key for field {}: raw {} processed {}",
                        prefix, mapping.field, template, key
                    ));
                    match self.translator.lookup(&key) {
                        Ok(Some(text)) if !text.trim().is_empty() => {
                            log_debug(format!("{} - successful translation", prefix));
                            return Ok(Translation::Translated(text));
                        }
                        Ok(Some(_)) => log_warning(format!(
                            "{} - translation for {} found but blank, not overriding",
                            prefix, key
                        )),
                        Ok(None) => log_debug(format!("{} - no translation for {}", prefix, key)),
                        Err(e) => log_warning(format!("{} - translation error: {}", prefix, e)),
                    }
                }
                Err(e) => log_warning(format!("{} - translation error: {}", prefix, e)),
            }
        }

        let raw = record
            .read_field(&mapping.field)
            .ok_or_else(|| FieldError::UnreadableField {
                field: mapping.field.clone(),
            })?;

        Ok(match raw.as_text() {
            Some(text) => Translation::Fallback(text),
            None => Translation::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::value::IntoFieldValue;

    struct LabelXml {
        id: Option<String>,
        name: Option<String>,
    }

    impl SourceRecord for LabelXml {
        fn type_name(&self) -> &'static str {
            "LabelXml"
        }

        fn read_field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "id" => Some(self.id.to_field_value()),
                "name" => Some(self.name.to_field_value()),
                _ => None,
            }
        }
    }

    struct FailingTranslator;

    impl Translator for FailingTranslator {
        fn lookup(&self, key: &str) -> Result<Option<String>, TranslationError> {
            Err(TranslationError {
                key: key.to_string(),
                message: "book unavailable".into(),
            })
        }
    }

    fn label(name: Option<&str>) -> LabelXml {
        LabelXml {
            id: Some("1".into()),
            name: name.map(str::to_string),
        }
    }

    fn name_mapping() -> FieldMapping {
        FieldMapping::new("name").translate("NAME_{id}")
    }

    #[test]
    fn test_lookup_wins() {
        let book: TranslationBook = [("NAME_1", "Knight")].into_iter().collect();
        let translator = FieldTranslator::new(&book);
        let result = translator.translate(&label(Some("raw")), &name_mapping(), "t").unwrap();
        assert_eq!(result, Translation::Translated("Knight".into()));
    }

    #[test]
    fn test_missing_lookup_falls_back_to_raw() {
        let translator = FieldTranslator::new(&NoTranslations);
        let result = translator.translate(&label(Some("raw")), &name_mapping(), "t").unwrap();
        assert_eq!(result, Translation::Fallback("raw".into()));
    }

    #[test]
    fn test_blank_lookup_does_not_override() {
        let book: TranslationBook = [("NAME_1", "   ")].into_iter().collect();
        let translator = FieldTranslator::new(&book);
        let result = translator.translate(&label(Some("raw")), &name_mapping(), "t").unwrap();
        assert_eq!(result, Translation::Fallback("raw".into()));
    }

    #[test]
    fn test_failed_lookup_falls_back() {
        let translator = FieldTranslator::new(&FailingTranslator);
        let result = translator.translate(&label(Some("raw")), &name_mapping(), "t").unwrap();
        assert_eq!(result, Translation::Fallback("raw".into()));
    }

    #[test]
    fn test_unresolvable_key_falls_back() {
        let lookup = |_: &str| Some("never".to_string());
        let translator = FieldTranslator::new(&lookup);
        let mapping = FieldMapping::new("name").translate("NAME_{missing}");
        let result = translator.translate(&label(Some("raw")), &mapping, "t").unwrap();
        assert_eq!(result, Translation::Fallback("raw".into()));
    }

    #[test]
    fn test_null_raw_value_is_null() {
        let translator = FieldTranslator::new(&NoTranslations);
        let result = translator.translate(&label(None), &name_mapping(), "t").unwrap();
        assert_eq!(result, Translation::Null);
        assert_eq!(result.into_value(), FieldValue::Null);
    }

    #[test]
    fn test_empty_raw_value_stays_empty() {
        let translator = FieldTranslator::new(&NoTranslations);
        let result = translator.translate(&label(Some("")), &name_mapping(), "t").unwrap();
        assert_eq!(result, Translation::Fallback(String::new()));
    }

    #[test]
    fn test_unreadable_field_is_fatal() {
        let translator = FieldTranslator::new(&NoTranslations);
        let mapping = FieldMapping::new("ghost").translate("KEY");
        let err = translator.translate(&label(Some("raw")), &mapping, "t").unwrap_err();
        assert_eq!(err, FieldError::UnreadableField { field: "ghost".into() });
    }

    #[test]
    fn test_hash_map_translator() {
        let mut map = HashMap::new();
        map.insert("NAME_1".to_string(), "Archer".to_string());
        let translator = FieldTranslator::new(&map);
        let result = translator.translate(&label(None), &name_mapping(), "t").unwrap();
        assert_eq!(result.into_value(), FieldValue::Text("Archer".into()));
    }
}
