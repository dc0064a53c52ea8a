//! Field type coercion.
//!
//! Converts a single raw value (usually XML text) into a typed [`FieldValue`].
//!
//! | Target     | Accepted input                                  | Empty input |
//! |------------|-------------------------------------------------|-------------|
//! | Boolean    | truthy / falsy tokens, case-insensitive         | null        |
//! | Short..Long| integer literal                                 | null        |
//! | Float/Double | floating point literal                        | null        |
//! | String     | anything, passed through                        | null        |
//! | List<T>    | elements split on `,` `#` `|`, each coerced as T | empty list  |

use super::tables::ConversionTables;
use super::value::{FieldValue, ScalarKind, TypeHint};
use crate::error::{CoercionError, CoercionResult};

/// Pure coercion functions over a fixed set of [`ConversionTables`].
#[derive(Debug, Clone, Copy)]
pub struct FieldCoercer<'t> {
    tables: &'t ConversionTables,
}

impl<'t> FieldCoercer<'t> {
    pub fn new(tables: &'t ConversionTables) -> Self {
        Self { tables }
    }

    /// Coerce according to a hint, dispatching to [`coerce`](Self::coerce) or
    /// [`coerce_collection`](Self::coerce_collection).
    pub fn coerce_hint(&self, value: &FieldValue, hint: TypeHint) -> CoercionResult<FieldValue> {
        match hint {
            TypeHint::Scalar(kind) => self.coerce(value, kind),
            TypeHint::List(kind) => self.coerce_collection(value, kind),
        }
    }

    /// Coerce a value into a scalar.
    pub fn coerce(&self, value: &FieldValue, kind: ScalarKind) -> CoercionResult<FieldValue> {
        match value {
            FieldValue::Null => Ok(FieldValue::Null),
            FieldValue::Text(s) => self.coerce_str(s, kind),
            FieldValue::List(_) => Err(CoercionError::new(
                value.describe(),
                TypeHint::Scalar(kind),
            )),
            other if scalar_kind_of(other) == Some(kind) => Ok(other.clone()),
            other => {
                let text = other.as_text().unwrap_or_default();
                self.coerce_str(&text, kind)
            }
        }
    }

    /// Coerce a value into a list of `kind`.
    ///
    /// Text is split on any configured delimiter and every element is coerced as `kind`.
    /// Elements that coerce to null are left out. A single failing element fails the whole
    /// collection.
    pub fn coerce_collection(&self, value: &FieldValue, kind: ScalarKind) -> CoercionResult<FieldValue> {
        let hint = TypeHint::List(kind);
        match value {
            FieldValue::Null => Ok(FieldValue::Null),
            FieldValue::Text(s) => {
                let items = self
                    .split_elements(s, kind)?
                    .iter()
                    .map(|element| self.coerce_str(element, kind))
                    .filter(|item| !matches!(item, Ok(FieldValue::Null)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| CoercionError::new(s.as_str(), hint))?;
                Ok(FieldValue::List(items))
            }
            FieldValue::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.coerce(item, kind))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| CoercionError::new(value.describe(), hint))?;
                Ok(FieldValue::List(items))
            }
            scalar => {
                let item = self
                    .coerce(scalar, kind)
                    .map_err(|_| CoercionError::new(scalar.describe(), hint))?;
                Ok(FieldValue::List(vec![item]))
            }
        }
    }

    /// Split a raw collection string on the configured delimiters.
    ///
    /// Elements are returned untouched, whitespace included. An element starting with a
    /// double quote runs to the closing quote and may carry delimiters; only whitespace may
    /// follow the closing quote. A quote anywhere else is an ordinary character.
    pub fn split_elements(&self, raw: &str, kind: ScalarKind) -> CoercionResult<Vec<String>> {
        let fail = || CoercionError::new(raw, TypeHint::List(kind));

        let mut elements = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            if self.tables.is_delimiter(c) {
                elements.push(std::mem::take(&mut current));
                quoted = false;
            } else if quoted {
                if !c.is_whitespace() {
                    return Err(fail());
                }
            } else if c == '"' && current.is_empty() {
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(q) => current.push(q),
                        None => return Err(fail()),
                    }
                }
                quoted = true;
            } else {
                current.push(c);
            }
        }
        elements.push(current);

        Ok(elements)
    }

    fn coerce_str(&self, raw: &str, kind: ScalarKind) -> CoercionResult<FieldValue> {
        let fail = || CoercionError::new(raw, TypeHint::Scalar(kind));
        let trimmed = raw.trim();

        if kind != ScalarKind::String && trimmed.is_empty() {
            return Ok(FieldValue::Null);
        }

        match kind {
            ScalarKind::String if raw.is_empty() => Ok(FieldValue::Null),
            ScalarKind::String => Ok(FieldValue::Text(raw.to_string())),
            ScalarKind::Boolean => self
                .tables
                .boolean_token(trimmed)
                .map(FieldValue::Bool)
                .ok_or_else(fail),
            ScalarKind::Short => trimmed.parse().map(FieldValue::Short).map_err(|_| fail()),
            ScalarKind::Integer => trimmed.parse().map(FieldValue::Int).map_err(|_| fail()),
            ScalarKind::Long => trimmed.parse().map(FieldValue::Long).map_err(|_| fail()),
            ScalarKind::Float => trimmed.parse().map(FieldValue::Float).map_err(|_| fail()),
            ScalarKind::Double => trimmed.parse().map(FieldValue::Double).map_err(|_| fail()),
        }
    }
}

fn scalar_kind_of(value: &FieldValue) -> Option<ScalarKind> {
    match value {
        FieldValue::Bool(_) => Some(ScalarKind::Boolean),
        FieldValue::Short(_) => Some(ScalarKind::Short),
        FieldValue::Int(_) => Some(ScalarKind::Integer),
        FieldValue::Long(_) => Some(ScalarKind::Long),
        FieldValue::Float(_) => Some(ScalarKind::Float),
        FieldValue::Double(_) => Some(ScalarKind::Double),
        FieldValue::Text(_) => Some(ScalarKind::String),
        FieldValue::Null | FieldValue::List(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tables::{FALSE_TOKENS, LIST_DELIMITERS, TRUE_TOKENS};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_integer_conversion() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert_eq!(coercer.coerce(&text("1"), ScalarKind::Integer).unwrap(), FieldValue::Int(1));
        assert_eq!(coercer.coerce(&text(" 42 "), ScalarKind::Long).unwrap(), FieldValue::Long(42));
        assert_eq!(coercer.coerce(&text("-3"), ScalarKind::Short).unwrap(), FieldValue::Short(-3));
    }

    #[test]
    fn test_empty_string_is_null_for_every_scalar() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        for kind in ScalarKind::ALL {
            assert_eq!(coercer.coerce(&text(""), kind).unwrap(), FieldValue::Null, "{}", kind);
            assert_eq!(coercer.coerce(&FieldValue::Null, kind).unwrap(), FieldValue::Null);
        }
    }

    #[test]
    fn test_empty_string_is_empty_collection() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        for kind in ScalarKind::ALL {
            assert_eq!(
                coercer.coerce_collection(&text(""), kind).unwrap(),
                FieldValue::List(vec![])
            );
        }
    }

    #[test]
    fn test_null_collection_stays_null() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert_eq!(
            coercer.coerce_collection(&FieldValue::Null, ScalarKind::String).unwrap(),
            FieldValue::Null
        );
    }

    #[test]
    fn test_boolean_tokens() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        for token in TRUE_TOKENS {
            assert_eq!(coercer.coerce(&text(token), ScalarKind::Boolean).unwrap(), FieldValue::Bool(true));
            let upper = token.to_uppercase();
            assert_eq!(coercer.coerce(&text(&upper), ScalarKind::Boolean).unwrap(), FieldValue::Bool(true));
        }
        for token in FALSE_TOKENS {
            assert_eq!(coercer.coerce(&text(token), ScalarKind::Boolean).unwrap(), FieldValue::Bool(false));
        }
    }

    #[test]
    fn test_unknown_boolean_token_is_error() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let err = coercer.coerce(&text("maybe"), ScalarKind::Boolean).unwrap_err();
        assert_eq!(err.value, "maybe");
        assert_eq!(err.target, TypeHint::Scalar(ScalarKind::Boolean));
    }

    #[test]
    fn test_malformed_number_is_error() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert!(coercer.coerce(&text("12abc"), ScalarKind::Integer).is_err());
        assert!(coercer.coerce(&text("1.5"), ScalarKind::Integer).is_err());
        assert!(coercer.coerce(&text("70000"), ScalarKind::Short).is_err());
        assert!(coercer.coerce(&text("x"), ScalarKind::Double).is_err());
    }

    #[test]
    fn test_string_pass_through() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert_eq!(coercer.coerce(&text(" a b "), ScalarKind::String).unwrap(), text(" a b "));
        assert_eq!(coercer.coerce(&FieldValue::Int(5), ScalarKind::String).unwrap(), text("5"));
    }

    #[test]
    fn test_typed_value_to_other_kind() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert_eq!(coercer.coerce(&FieldValue::Int(1), ScalarKind::Integer).unwrap(), FieldValue::Int(1));
        assert_eq!(coercer.coerce(&FieldValue::Int(1), ScalarKind::Long).unwrap(), FieldValue::Long(1));
        assert_eq!(coercer.coerce(&FieldValue::Int(1), ScalarKind::Boolean).unwrap(), FieldValue::Bool(true));
    }

    #[test]
    fn test_integer_list_every_delimiter() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let expected = FieldValue::List(vec![FieldValue::Int(1), FieldValue::Int(2), FieldValue::Int(3)]);
        for d in LIST_DELIMITERS {
            let raw = format!("1{d}2{d}3");
            assert_eq!(coercer.coerce_collection(&text(&raw), ScalarKind::Integer).unwrap(), expected);
        }
    }

    #[test]
    fn test_mixed_delimiters_in_one_value() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let result = coercer.coerce_collection(&text("1,2#3|4"), ScalarKind::Integer).unwrap();
        assert_eq!(
            result,
            FieldValue::List(vec![
                FieldValue::Int(1),
                FieldValue::Int(2),
                FieldValue::Int(3),
                FieldValue::Int(4)
            ])
        );
    }

    #[test]
    fn test_string_lists_only_split_on_delimiters() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let result = coercer
            .coerce_collection(&text("questGoldGain_A#attackSpeed_A"), ScalarKind::String)
            .unwrap();
        assert_eq!(result, FieldValue::List(vec![text("questGoldGain_A"), text("attackSpeed_A")]));
    }

    #[test]
    fn test_boolean_list() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let result = coercer.coerce_collection(&text("true|no|Y"), ScalarKind::Boolean).unwrap();
        assert_eq!(
            result,
            FieldValue::List(vec![FieldValue::Bool(true), FieldValue::Bool(false), FieldValue::Bool(true)])
        );
    }

    #[test]
    fn test_one_bad_element_fails_collection() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let err = coercer.coerce_collection(&text("1,two,3"), ScalarKind::Integer).unwrap_err();
        assert_eq!(err.value, "1,two,3");
        assert_eq!(err.target, TypeHint::List(ScalarKind::Integer));
    }

    #[test]
    fn test_quoted_elements_keep_delimiters() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let elements = coercer.split_elements(r#""a,b"  , c d ,"#, ScalarKind::String).unwrap();
        assert_eq!(elements, vec!["a,b".to_string(), " c d ".to_string(), String::new()]);
    }

    #[test]
    fn test_unterminated_or_trailing_quote_is_error() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert!(coercer.coerce_collection(&text("\"open"), ScalarKind::String).is_err());
        assert!(coercer.coerce_collection(&text("\"a\"b,c"), ScalarKind::String).is_err());
    }

    #[test]
    fn test_punctuation_stays_in_string_elements() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let cases = [
            ("50%,10%", vec!["50%", "10%"]),
            ("Dragon's Fang#Sword", vec!["Dragon's Fang", "Sword"]),
            ("fire:breath|ice", vec!["fire:breath", "ice"]),
            ("a/b,c", vec!["a/b", "c"]),
            ("say \"hi\",$5", vec!["say \"hi\"", "$5"]),
        ];
        for (raw, expected) in cases {
            let expected = FieldValue::List(expected.into_iter().map(text).collect());
            assert_eq!(coercer.coerce_collection(&text(raw), ScalarKind::String).unwrap(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_collection_elements_match_scalar_coercion() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let list = coercer.coerce_collection(&text(" a ,b"), ScalarKind::String).unwrap();
        let scalar = coercer.coerce(&text(" a "), ScalarKind::String).unwrap();
        assert_eq!(list, FieldValue::List(vec![scalar, text("b")]));
    }

    #[test]
    fn test_empty_elements_are_dropped() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        assert_eq!(
            coercer.coerce_collection(&text("1,, 2 ,"), ScalarKind::Integer).unwrap(),
            FieldValue::List(vec![FieldValue::Int(1), FieldValue::Int(2)])
        );
        assert_eq!(
            coercer.coerce_collection(&text("a||b"), ScalarKind::String).unwrap(),
            FieldValue::List(vec![text("a"), text("b")])
        );
    }

    #[test]
    fn test_decimal_list() {
        let tables = ConversionTables::new();
        let coercer = FieldCoercer::new(&tables);
        let result = coercer.coerce_collection(&text("1.5|-2.25"), ScalarKind::Double).unwrap();
        assert_eq!(result, FieldValue::List(vec![FieldValue::Double(1.5), FieldValue::Double(-2.25)]));
    }
}
