//! Validation and transformation pipeline
//!
//! Validators are pure functions over (raw value, signal name) returning an
//! error message or nothing. Numeric rules coerce through locale-invariant
//! lenient float parsing first (non-numeric input becomes NaN), then apply
//! the NaN policy and bound checks. Enumeration rules are exact membership
//! tests. The geo rule parses `LATITUDE,LONGITUDE` structurally and fails
//! with a stage-specific message.

use once_cell::sync::Lazy;
use regex::Regex;
use vehicle_types::SignalValue;

// Longest numeric prefix of the trimmed input, matching the lenient parse
// the backing store's callers have always relied on: "50.78 " and "12abc"
// both yield a number, "" and "abc" yield NaN.
static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("float prefix regex is valid")
});

/// Lenient locale-invariant float parse. Returns NaN when no numeric prefix
/// exists.
pub fn parse_float_lenient(raw: &str) -> f64 {
    let trimmed = raw.trim();
    match FLOAT_PREFIX.find(trimmed) {
        Some(m) => m.as_str().parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Accept/reject rule for a signal's candidate values.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// Exact membership in a fixed literal set.
    OneOf(&'static [&'static str]),
    /// Numeric with optional bounds; `allow_nan` admits the "no object
    /// detected" sentinel of the distance sensors.
    Number {
        allow_nan: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// `"<lat>,<lng>"` with latitude in [-90,90] and longitude in
    /// [-180,180].
    GeoCoordinates,
}

impl ValidationRule {
    /// Bounded non-NaN number, the common case.
    pub const fn number(min: f64, max: f64) -> Self {
        ValidationRule::Number {
            allow_nan: false,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Non-negative non-NaN number without an upper bound.
    pub const fn non_negative() -> Self {
        ValidationRule::Number {
            allow_nan: false,
            min: Some(0.0),
            max: None,
        }
    }

    /// Percentage in [0,100].
    pub const fn percentage() -> Self {
        Self::number(0.0, 100.0)
    }

    /// Check a candidate value; `None` means accepted, `Some` carries the
    /// rejection message surfaced to the caller.
    pub fn check(&self, raw: &str, name: &str) -> Option<String> {
        match self {
            ValidationRule::OneOf(values) => {
                if values.contains(&raw) {
                    None
                } else {
                    Some(format!(
                        "You can only use the following value(s) for '{}': {}",
                        name,
                        values.join(", ")
                    ))
                }
            }
            ValidationRule::Number {
                allow_nan,
                min,
                max,
            } => check_number(raw, name, *allow_nan, *min, *max),
            ValidationRule::GeoCoordinates => check_geo(raw),
        }
    }
}

fn check_number(
    raw: &str,
    name: &str,
    allow_nan: bool,
    min: Option<f64>,
    max: Option<f64>,
) -> Option<String> {
    let num = parse_float_lenient(raw);

    if num.is_nan() {
        if allow_nan {
            return None;
        }
        return Some(format!("'{}' is not a number", name));
    }

    if let Some(min) = min {
        if min > num {
            return Some(format!("The minimum value of '{}' must be {}", name, min));
        }
    }

    if let Some(max) = max {
        if max < num {
            return Some(format!("The maximum value of '{}' must be {}", name, max));
        }
    }

    None
}

fn check_geo(raw: &str) -> Option<String> {
    let value = raw.trim();

    if !value.contains(',') {
        return Some("Value must be in following format: LATITUDE,LONGITUDE".to_string());
    }

    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 2 {
        return Some("Value must be in following format: LATITUDE,LONGITUDE".to_string());
    }

    let lat = parse_float_lenient(parts[0]);
    if lat.is_nan() {
        return Some(
            "Latitude value must be a valid float value in english number format".to_string(),
        );
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Some("Latitude value must be between -90 and 90".to_string());
    }

    let lng = parse_float_lenient(parts[1]);
    if lng.is_nan() {
        return Some(
            "Longitude value must be a valid float value in english number format".to_string(),
        );
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Some("Longitude value must be between -180 and 180".to_string());
    }

    None
}

/// Normalization applied to a validated raw value before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Parse and truncate toward zero; parse failure yields the `Null`
    /// sentinel.
    ToInt,
    /// Parse to float; parse failure yields NaN.
    ToFloat,
}

impl Transform {
    pub fn apply(self, raw: &str) -> SignalValue {
        let num = parse_float_lenient(raw);
        match self {
            Transform::ToInt => {
                if num.is_nan() {
                    SignalValue::Null
                } else {
                    SignalValue::Int(num.trunc() as i64)
                }
            }
            Transform::ToFloat => SignalValue::Float(num),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_accepts_prefixes_and_whitespace() {
        assert_eq!(parse_float_lenient(" 50.78 "), 50.78);
        assert_eq!(parse_float_lenient("12abc"), 12.0);
        assert_eq!(parse_float_lenient("-3.5"), -3.5);
        assert!(parse_float_lenient("abc").is_nan());
        assert!(parse_float_lenient("").is_nan());
    }

    #[test]
    fn one_of_is_exact() {
        let rule = ValidationRule::OneOf(&["on", "off"]);
        assert_eq!(rule.check("on", "flash"), None);
        assert_eq!(
            rule.check("On", "flash"),
            Some("You can only use the following value(s) for 'flash': on, off".to_string())
        );
    }

    #[test]
    fn number_bounds_report_min_before_max() {
        let rule = ValidationRule::number(0.0, 200.0);
        assert_eq!(rule.check("120", "speed"), None);
        assert_eq!(
            rule.check("500", "speed"),
            Some("The maximum value of 'speed' must be 200".to_string())
        );
        assert_eq!(
            rule.check("-1", "speed"),
            Some("The minimum value of 'speed' must be 0".to_string())
        );
        assert_eq!(
            rule.check("fast", "speed"),
            Some("'speed' is not a number".to_string())
        );
    }

    #[test]
    fn nan_allowed_rule_accepts_non_numeric() {
        let rule = ValidationRule::Number {
            allow_nan: true,
            min: Some(0.0),
            max: None,
        };
        assert_eq!(rule.check("NaN", "distance_to_object_back"), None);
        assert_eq!(rule.check("", "distance_to_object_back"), None);
        assert_eq!(rule.check("1.5", "distance_to_object_back"), None);
        assert_eq!(
            rule.check("-1", "distance_to_object_back"),
            Some("The minimum value of 'distance_to_object_back' must be 0".to_string())
        );
    }

    #[test]
    fn geo_rule_reports_stage_specific_messages() {
        let rule = ValidationRule::GeoCoordinates;
        assert_eq!(rule.check("50.78,6.04", "location"), None);
        assert_eq!(
            rule.check("bad", "location"),
            Some("Value must be in following format: LATITUDE,LONGITUDE".to_string())
        );
        assert_eq!(
            rule.check("1,2,3", "location"),
            Some("Value must be in following format: LATITUDE,LONGITUDE".to_string())
        );
        assert_eq!(
            rule.check("91,7", "location"),
            Some("Latitude value must be between -90 and 90".to_string())
        );
        assert_eq!(
            rule.check("50,181", "location"),
            Some("Longitude value must be between -180 and 180".to_string())
        );
        assert_eq!(
            rule.check("x,7", "location"),
            Some("Latitude value must be a valid float value in english number format".to_string())
        );
    }

    #[test]
    fn int_transform_truncates_toward_zero() {
        assert_eq!(Transform::ToInt.apply("7.9"), SignalValue::Int(7));
        assert_eq!(Transform::ToInt.apply("-3.9"), SignalValue::Int(-3));
        assert_eq!(Transform::ToInt.apply("junk"), SignalValue::Null);
    }

    #[test]
    fn float_transform_yields_nan_on_failure() {
        assert_eq!(Transform::ToFloat.apply("2.5"), SignalValue::Float(2.5));
        assert!(Transform::ToFloat.apply("junk").is_nan());
    }

    #[test]
    fn transforms_are_idempotent() {
        let once = Transform::ToInt.apply("7.9");
        let twice = Transform::ToInt.apply(&once.to_string());
        assert_eq!(once, twice);
    }
}
