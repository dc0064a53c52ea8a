//! Mapping metadata between source and canonical records.
//!
//! Every source type carries a static [`MappingDescriptor`] naming the fields that take part
//! in conversion. Field access on both sides goes through [`SourceRecord`] and
//! [`CanonicalRecord`], usually generated with [`source_record!`](crate::source_record) and
//! [`canonical_record!`](crate::canonical_record).

use serde::{Deserialize, Serialize};

use super::template::KeyTemplate;
use super::value::{FieldValue, TypeHint};
use crate::error::FieldError;

/// Read-only field access on a loosely-typed source record.
pub trait SourceRecord {
    /// Type name used in logs and errors.
    fn type_name(&self) -> &'static str;

    /// Current value of a field, `None` when the type has no such field.
    ///
    /// Every field is readable, mapped or not, so key templates can reference it.
    fn read_field(&self, name: &str) -> Option<FieldValue>;
}

/// A canonical record built by the mapping engine.
pub trait CanonicalRecord: Default + Serialize + Send + 'static {
    const TYPE_NAME: &'static str;

    /// All writable slots, in declaration order.
    fn slot_names() -> &'static [&'static str];

    /// Declared type of a slot, `None` when the slot does not exist.
    fn slot_hint(&self, slot: &str) -> Option<TypeHint>;

    /// Store a coerced value in a slot.
    fn write_slot(&mut self, slot: &str, value: FieldValue) -> Result<(), FieldError>;
}

/// A source record type with a static mapping to its canonical type.
pub trait MappedSource: SourceRecord {
    type Canonical: CanonicalRecord;

    fn mapping() -> &'static MappingDescriptor;
}

/// How one source field maps into the canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Source field name.
    pub field: String,

    /// Destination slot when it differs from `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_to: Option<String>,

    /// Conversion type overriding the slot's declared type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<TypeHint>,

    /// Key template for localized fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<KeyTemplate>,
}

impl FieldMapping {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            maps_to: None,
            hint: None,
            translate: None,
        }
    }

    pub fn maps_to(mut self, slot: impl Into<String>) -> Self {
        self.maps_to = Some(slot.into());
        self
    }

    pub fn hint(mut self, hint: TypeHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn translate(mut self, template: impl Into<String>) -> Self {
        self.translate = Some(KeyTemplate::new(template));
        self
    }

    /// Destination slot name.
    pub fn destination(&self) -> &str {
        self.maps_to.as_deref().unwrap_or(&self.field)
    }

    pub fn is_localized(&self) -> bool {
        self.translate.is_some()
    }
}

/// Static mapping table for one source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDescriptor {
    /// Source type name.
    pub source: String,
    /// Canonical type name.
    pub destination: String,
    /// Mapped fields, in declaration order.
    pub fields: Vec<FieldMapping>,
}

impl MappingDescriptor {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, mapping: FieldMapping) -> Self {
        self.fields.push(mapping);
        self
    }

    /// Destination slots that do not exist on `C`.
    pub fn unresolved_slots<C: CanonicalRecord>(&self) -> Vec<String> {
        let probe = C::default();
        self.fields
            .iter()
            .map(FieldMapping::destination)
            .filter(|slot| probe.slot_hint(slot).is_none())
            .map(str::to_string)
            .collect()
    }
}

/// Implement [`SourceRecord`] by listing the readable fields.
///
/// ```ignore
/// source_record!(UnitXml, [id, tribe, grade]);
/// ```
#[macro_export]
macro_rules! source_record {
    ($ty:ident, [$($field:ident),* $(,)?]) => {
        impl $crate::convert::SourceRecord for $ty {
            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }

            fn read_field(&self, name: &str) -> Option<$crate::convert::FieldValue> {
                #[allow(unused_imports)]
                use $crate::convert::IntoFieldValue;
                $(
                    if name == stringify!($field) {
                        return Some(self.$field.to_field_value());
                    }
                )*
                None
            }
        }
    };
}

/// Implement [`CanonicalRecord`] by listing the writable slots.
///
/// Slots must be `Option<T>` or `Option<Vec<T>>` of a supported scalar.
#[macro_export]
macro_rules! canonical_record {
    ($ty:ident, [$($slot:ident),* $(,)?]) => {
        impl $crate::convert::CanonicalRecord for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            fn slot_names() -> &'static [&'static str] {
                &[$(stringify!($slot)),*]
            }

            fn slot_hint(&self, slot: &str) -> Option<$crate::convert::TypeHint> {
                $(
                    if slot == stringify!($slot) {
                        return Some($crate::convert::hint_of(&self.$slot));
                    }
                )*
                None
            }

            fn write_slot(
                &mut self,
                slot: &str,
                value: $crate::convert::FieldValue,
            ) -> Result<(), $crate::error::FieldError> {
                $(
                    if slot == stringify!($slot) {
                        let expected = $crate::convert::hint_of(&self.$slot);
                        self.$slot = $crate::convert::SlotType::from_field_value(value).map_err(
                            |found| $crate::error::FieldError::SlotMismatch {
                                slot: slot.to_string(),
                                expected,
                                found: found.describe(),
                            },
                        )?;
                        return Ok(());
                    }
                )*
                Err($crate::error::FieldError::MissingSlot {
                    slot: slot.to_string(),
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ScalarKind;

    #[derive(Debug, Default, Serialize)]
    struct Probe {
        id: Option<i32>,
        tags: Option<Vec<String>>,
    }

    crate::canonical_record!(Probe, [id, tags]);

    struct ProbeXml {
        id: Option<String>,
        secret: Option<String>,
    }

    crate::source_record!(ProbeXml, [id, secret]);

    #[test]
    fn test_destination_defaults_to_field_name() {
        assert_eq!(FieldMapping::new("id").destination(), "id");
        assert_eq!(FieldMapping::new("name").maps_to("title").destination(), "title");
    }

    #[test]
    fn test_generated_canonical_slots() {
        let mut probe = Probe::default();
        assert_eq!(Probe::TYPE_NAME, "Probe");
        assert_eq!(Probe::slot_names(), &["id", "tags"]);
        assert_eq!(probe.slot_hint("id"), Some(TypeHint::Scalar(ScalarKind::Integer)));
        assert_eq!(probe.slot_hint("tags"), Some(TypeHint::List(ScalarKind::String)));
        assert_eq!(probe.slot_hint("nope"), None);

        probe.write_slot("id", FieldValue::Int(4)).unwrap();
        assert_eq!(probe.id, Some(4));
        probe.write_slot("id", FieldValue::Null).unwrap();
        assert_eq!(probe.id, None);
    }

    #[test]
    fn test_write_slot_errors() {
        let mut probe = Probe::default();
        let err = probe.write_slot("missing", FieldValue::Null).unwrap_err();
        assert_eq!(err, FieldError::MissingSlot { slot: "missing".into() });

        let err = probe.write_slot("id", FieldValue::Bool(true)).unwrap_err();
        assert!(matches!(err, FieldError::SlotMismatch { ref slot, .. } if slot == "id"));
    }

    #[test]
    fn test_generated_source_fields() {
        let xml = ProbeXml {
            id: Some("7".into()),
            secret: None,
        };
        assert_eq!(xml.type_name(), "ProbeXml");
        assert_eq!(xml.read_field("id"), Some(FieldValue::Text("7".into())));
        assert_eq!(xml.read_field("secret"), Some(FieldValue::Null));
        assert_eq!(xml.read_field("other"), None);
    }

    #[test]
    fn test_unresolved_slots() {
        let descriptor = MappingDescriptor::new("ProbeXml", "Probe")
            .field(FieldMapping::new("id"))
            .field(FieldMapping::new("label").maps_to("title"));
        assert_eq!(descriptor.unresolved_slots::<Probe>(), vec!["title".to_string()]);
    }

    #[test]
    fn test_descriptor_serializes_without_empty_options() {
        let descriptor = MappingDescriptor::new("ProbeXml", "Probe")
            .field(FieldMapping::new("id").translate("KEY_{id}"));
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["fields"][0]["translate"], "KEY_{id}");
        assert!(json["fields"][0].get("maps_to").is_none());
    }
}
