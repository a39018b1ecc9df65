//! Canonical signal value representation
//!
//! Signals are stored in a loosely-typed backing store: enumeration signals
//! keep their validated string form, numeric signals are normalized to
//! integers or floats by the transformation pipeline, and the distance
//! sensors use `NaN` as the legal "no object detected" sentinel. `Null` is
//! the integer transformer's parse-failure sentinel.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical, already-transformed signal value.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Validated raw string (enumeration signals, geo coordinates).
    Str(String),
    /// Integer-transformed value.
    Int(i64),
    /// Float-transformed value. `NaN` is legal for the distance sensors.
    Float(f64),
    /// Parse-failure sentinel of the integer transformer.
    Null,
}

impl SignalValue {
    /// Whether this is a float `NaN`.
    pub fn is_nan(&self) -> bool {
        matches!(self, SignalValue::Float(f) if f.is_nan())
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Int(i) => Some(*i as f64),
            SignalValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SignalValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Equality used by change-event gating.
    ///
    /// Unlike IEEE `==` (and the derived `PartialEq`), `NaN` compares equal
    /// to `NaN` here: rewriting a distance sensor with the same `NaN`
    /// sentinel is not a change and must not emit a change event.
    pub fn canonical_eq(&self, other: &SignalValue) -> bool {
        match (self, other) {
            (SignalValue::Float(a), SignalValue::Float(b)) => {
                (a.is_nan() && b.is_nan()) || a == b
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Str(s) => f.write_str(s),
            SignalValue::Int(i) => write!(f, "{}", i),
            SignalValue::Float(v) if v.is_nan() => f.write_str("NaN"),
            SignalValue::Float(v) => write!(f, "{}", v),
            SignalValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for SignalValue {
    fn from(s: &str) -> Self {
        SignalValue::Str(s.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(s: String) -> Self {
        SignalValue::Str(s)
    }
}

impl From<i64> for SignalValue {
    fn from(i: i64) -> Self {
        SignalValue::Int(i)
    }
}

impl From<f64> for SignalValue {
    fn from(f: f64) -> Self {
        SignalValue::Float(f)
    }
}

// Read responses render NaN as the literal string "NaN" instead of JSON
// null, so API consumers can distinguish "no object detected" from an
// unset integer sentinel.
impl Serialize for SignalValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SignalValue::Str(s) => serializer.serialize_str(s),
            SignalValue::Int(i) => serializer.serialize_i64(*i),
            SignalValue::Float(f) if f.is_nan() => serializer.serialize_str("NaN"),
            SignalValue::Float(f) => serializer.serialize_f64(*f),
            SignalValue::Null => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for SignalValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = SignalValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SignalValue, E> {
                if v == "NaN" {
                    Ok(SignalValue::Float(f64::NAN))
                } else {
                    Ok(SignalValue::Str(v.to_string()))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<SignalValue, E> {
                Ok(SignalValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SignalValue, E> {
                Ok(SignalValue::Int(v as i64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<SignalValue, E> {
                Ok(SignalValue::Float(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<SignalValue, E> {
                Ok(SignalValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<SignalValue, E> {
                Ok(SignalValue::Null)
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_serializes_as_string() {
        let json = serde_json::to_string(&SignalValue::Float(f64::NAN)).unwrap();
        assert_eq!(json, r#""NaN""#);
    }

    #[test]
    fn null_sentinel_serializes_as_null() {
        let json = serde_json::to_string(&SignalValue::Null).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn canonical_eq_treats_nan_as_equal() {
        let a = SignalValue::Float(f64::NAN);
        let b = SignalValue::Float(f64::NAN);
        assert_ne!(a, b); // IEEE semantics for the derived impl
        assert!(a.canonical_eq(&b));
    }

    #[test]
    fn canonical_eq_distinguishes_types() {
        assert!(!SignalValue::Int(3).canonical_eq(&SignalValue::Float(3.0)));
        assert!(SignalValue::from("on").canonical_eq(&SignalValue::from("on")));
        assert!(!SignalValue::from("on").canonical_eq(&SignalValue::from("off")));
    }

    #[test]
    fn nan_round_trips_through_json() {
        let json = serde_json::to_string(&SignalValue::Float(f64::NAN)).unwrap();
        let back: SignalValue = serde_json::from_str(&json).unwrap();
        assert!(back.is_nan());
    }
}
