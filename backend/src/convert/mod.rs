//! Conversion of source records into canonical records.
//!
//! - `value`: field values and type hints
//! - `tables`: boolean tokens and collection delimiters
//! - `coercer`: single-value coercion
//! - `template`: translation key templates
//! - `translate`: localized field translation
//! - `mapping`: mapping descriptors and record traits
//! - `engine`: the model converter
//!
//! ## Usage Flow
//!
//! ```text
//! SourceRecord + MappingDescriptor → ModelConverter::convert → CanonicalRecord
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use efload::convert::{ConversionTables, ModelConverter, NoTranslations};
//! use efload::models::UnitXml;
//!
//! let tables = ConversionTables::new();
//! let converter = ModelConverter::new(&tables, &NoTranslations);
//! let unit = converter.convert(&unit_xml)?;
//! ```

pub mod coercer;
pub mod engine;
pub mod mapping;
pub mod tables;
pub mod template;
pub mod translate;
pub mod value;

// Re-exports for convenience
pub use coercer::FieldCoercer;
pub use engine::ModelConverter;
pub use mapping::{CanonicalRecord, FieldMapping, MappedSource, MappingDescriptor, SourceRecord};
pub use tables::ConversionTables;
pub use template::KeyTemplate;
pub use translate::{FieldTranslator, NoTranslations, Translation, TranslationBook, Translator};
pub use value::{hint_of, FieldValue, IntoFieldValue, ScalarKind, SlotType, TypeHint};
