//! Field values and type hints shared by the coercer and the mapping engine.
//!
//! A [`FieldValue`] is the loosely-typed currency of a conversion: source records hand them
//! out, the coercer produces them, and canonical records accept them through [`SlotType`].

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Type hints
// =============================================================================

/// Scalar types a value can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Boolean,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
}

impl ScalarKind {
    /// Every supported scalar kind, in declaration order.
    pub const ALL: [ScalarKind; 7] = [
        ScalarKind::Boolean,
        ScalarKind::Short,
        ScalarKind::Integer,
        ScalarKind::Long,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Short => "Short",
            ScalarKind::Integer => "Integer",
            ScalarKind::Long => "Long",
            ScalarKind::Float => "Float",
            ScalarKind::Double => "Double",
            ScalarKind::String => "String",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target type of a single field conversion.
///
/// Either declared by the canonical slot itself or overridden per field in a
/// [`FieldMapping`](super::mapping::FieldMapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeHint {
    Scalar(ScalarKind),
    List(ScalarKind),
}

impl TypeHint {
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeHint::List(_))
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHint::Scalar(kind) => write!(f, "{}", kind),
            TypeHint::List(kind) => write!(f, "List<{}>", kind),
        }
    }
}

// =============================================================================
// Values
// =============================================================================

/// A single field value, before or after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// String form used for key substitution and translation fallback.
    ///
    /// Lists are joined with `,`. Returns `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Short(n) => Some(n.to_string()),
            FieldValue::Int(n) => Some(n.to_string()),
            FieldValue::Long(n) => Some(n.to_string()),
            FieldValue::Float(n) => Some(n.to_string()),
            FieldValue::Double(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(FieldValue::as_text)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }

    /// Short description for error messages, e.g. `Text("abc")`.
    pub fn describe(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::List(items) => format!("List[{}]", items.len()),
            other => format!("{:?}", other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

// =============================================================================
// Reading from source fields
// =============================================================================

/// Types that can be read out of a source record field.
pub trait IntoFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

macro_rules! impl_into_field_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoFieldValue for $ty {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::$variant(self.clone())
                }
            }

            impl IntoFieldValue for Option<$ty> {
                fn to_field_value(&self) -> FieldValue {
                    match self {
                        Some(v) => FieldValue::$variant(v.clone()),
                        None => FieldValue::Null,
                    }
                }
            }
        )*
    };
}

impl_into_field_value! {
    bool => Bool,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => Text,
}

// =============================================================================
// Writing into canonical slots
// =============================================================================

/// Types a canonical record slot may have.
///
/// `HINT` is the slot's declared conversion type. `from_field_value` accepts a coerced
/// value, handing it back unchanged when it does not fit the slot.
pub trait SlotType: Sized {
    const HINT: TypeHint;

    fn from_field_value(value: FieldValue) -> Result<Self, FieldValue>;
}

/// Declared hint of a slot, taken from its value.
pub fn hint_of<T: SlotType>(_slot: &T) -> TypeHint {
    T::HINT
}

fn element<T>(value: FieldValue, pick: fn(FieldValue) -> Result<Option<T>, FieldValue>) -> Result<T, FieldValue> {
    match pick(value) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Err(FieldValue::Null),
        Err(other) => Err(other),
    }
}

macro_rules! impl_slot_type {
    ($($ty:ty => $kind:ident, $pick:ident);* $(;)?) => {
        $(
            impl SlotType for Option<$ty> {
                const HINT: TypeHint = TypeHint::Scalar(ScalarKind::$kind);

                fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
                    $pick(value)
                }
            }

            impl SlotType for Option<Vec<$ty>> {
                const HINT: TypeHint = TypeHint::List(ScalarKind::$kind);

                fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
                    match value {
                        FieldValue::Null => Ok(None),
                        FieldValue::List(items) => {
                            let original = items.clone();
                            items
                                .into_iter()
                                .map(|item| element(item, $pick))
                                .collect::<Result<Vec<_>, _>>()
                                .map(Some)
                                .map_err(|_| FieldValue::List(original))
                        }
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

fn pick_bool(value: FieldValue) -> Result<Option<bool>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Bool(b) => Ok(Some(b)),
        other => Err(other),
    }
}

fn pick_short(value: FieldValue) -> Result<Option<i16>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Short(n) => Ok(Some(n)),
        other => Err(other),
    }
}

fn pick_int(value: FieldValue) -> Result<Option<i32>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Int(n) => Ok(Some(n)),
        FieldValue::Short(n) => Ok(Some(n.into())),
        other => Err(other),
    }
}

fn pick_long(value: FieldValue) -> Result<Option<i64>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Long(n) => Ok(Some(n)),
        FieldValue::Int(n) => Ok(Some(n.into())),
        FieldValue::Short(n) => Ok(Some(n.into())),
        other => Err(other),
    }
}

fn pick_float(value: FieldValue) -> Result<Option<f32>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Float(n) => Ok(Some(n)),
        FieldValue::Short(n) => Ok(Some(n.into())),
        other => Err(other),
    }
}

fn pick_double(value: FieldValue) -> Result<Option<f64>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Double(n) => Ok(Some(n)),
        FieldValue::Float(n) => Ok(Some(n.into())),
        FieldValue::Int(n) => Ok(Some(n.into())),
        FieldValue::Short(n) => Ok(Some(n.into())),
        other => Err(other),
    }
}

fn pick_string(value: FieldValue) -> Result<Option<String>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Text(s) => Ok(Some(s)),
        FieldValue::List(items) => Err(FieldValue::List(items)),
        other => Ok(other.as_text()),
    }
}

impl_slot_type! {
    bool => Boolean, pick_bool;
    i16 => Short, pick_short;
    i32 => Integer, pick_int;
    i64 => Long, pick_long;
    f32 => Float, pick_float;
    f64 => Double, pick_double;
    String => String, pick_string;
}
