//! Model mapping engine.
//!
//! Converts one source record into its canonical record, field by field, following the
//! source type's [`MappingDescriptor`].

use super::coercer::FieldCoercer;
use super::mapping::{CanonicalRecord, FieldMapping, MappedSource, MappingDescriptor, SourceRecord};
use super::tables::ConversionTables;
use super::translate::{FieldTranslator, Translator};
use crate::api::logs::log_debug;
use crate::error::{ConversionError, ConversionResult, FieldError};

/// Converts source records to canonical records.
///
/// Holds only shared references, so one converter can serve many threads as long as the
/// translator is thread-safe.
#[derive(Clone, Copy)]
pub struct ModelConverter<'a> {
    coercer: FieldCoercer<'a>,
    translator: FieldTranslator<'a>,
}

impl<'a> ModelConverter<'a> {
    pub fn new(tables: &'a ConversionTables, translator: &'a dyn Translator) -> Self {
        Self {
            coercer: FieldCoercer::new(tables),
            translator: FieldTranslator::new(translator),
        }
    }

    /// Convert a source record using its own static mapping.
    pub fn convert<S: MappedSource>(&self, source: &S) -> ConversionResult<S::Canonical> {
        self.convert_tagged(source, "-")
    }

    /// Like [`convert`](Self::convert), with a caller-supplied correlation tag for logs.
    pub fn convert_tagged<S: MappedSource>(&self, source: &S, tag: &str) -> ConversionResult<S::Canonical> {
        self.convert_with::<S::Canonical>(source, S::mapping(), tag)
    }

    /// Convert any source record into `C` following an explicit descriptor.
    ///
    /// The first fatal field error aborts the record; no partially populated record is
    /// returned.
    pub fn convert_with<C: CanonicalRecord>(
        &self,
        source: &dyn SourceRecord,
        mapping: &MappingDescriptor,
        tag: &str,
    ) -> ConversionResult<C> {
        let source_type = source.type_name();
        let prefix = format!("[{} {}]", source_type, tag);
        log_debug(format!("{} - beginning conversion to canonical model", prefix));

        if mapping.destination != C::TYPE_NAME {
            return Err(ConversionError::DestinationMismatch {
                source_type: source_type.to_string(),
                declared: mapping.destination.clone(),
                destination_type: C::TYPE_NAME.to_string(),
            });
        }

        log_debug(format!("{} - instantiating {}", prefix, C::TYPE_NAME));
        let mut dest = C::default();

        for field in &mapping.fields {
            self.convert_field(source, field, &mut dest, &prefix, tag)
                .map_err(|cause| ConversionError::Field {
                    field: field.field.clone(),
                    source_type: source_type.to_string(),
                    destination_type: C::TYPE_NAME.to_string(),
                    cause,
                })?;
        }

        log_debug(format!("{} - finished conversion to canonical model", prefix));
        Ok(dest)
    }

    fn convert_field<C: CanonicalRecord>(
        &self,
        source: &dyn SourceRecord,
        field: &FieldMapping,
        dest: &mut C,
        prefix: &str,
        tag: &str,
    ) -> Result<(), FieldError> {
        let slot = field.destination();
        let declared = dest.slot_hint(slot).ok_or_else(|| FieldError::MissingSlot {
            slot: slot.to_string(),
        })?;
        log_debug(format!(
            "{} - source field {} maps to canonical field {}",
            prefix, field.field, slot
        ));

        let hint = field.hint.unwrap_or(declared);
        log_debug(format!("{} - determined conversion hint to be {}", prefix, hint));

        let value = if field.is_localized() {
            self.translator.translate(source, field, tag)?.into_value()
        } else {
            let raw = source
                .read_field(&field.field)
                .ok_or_else(|| FieldError::UnreadableField {
                    field: field.field.clone(),
                })?;
            self.coercer.coerce_hint(&raw, hint)?
        };

        dest.write_slot(slot, value)
    }
}
