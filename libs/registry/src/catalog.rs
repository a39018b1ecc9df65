//! The signal catalog
//!
//! Canonical ordered table of every known vehicle signal. Built once at
//! process start; lookup is a plain map probe guarded by the identifier
//! pattern, so the "is this name a real signal" question never touches any
//! dynamic dispatch.

use crate::definition::SignalDefinition;
use crate::validate::{Transform, ValidationRule};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use vehicle_types::SignalValue;

const ON_OFF: &[&str] = &["on", "off"];
const OPEN_CLOSED: &[&str] = &["open", "closed"];
const YES_NO: &[&str] = &["yes", "no"];
const DRIVE_MODES: &[&str] = &["comfort", "eco", "sport"];
const RAIN_STATES: &[&str] = &["no_rain", "rain"];

const DEFAULT_ON_OFF: &str = "off";
const DEFAULT_OPEN_CLOSED: &str = "closed";
const DEFAULT_PERCENTAGE: i64 = 100;

// Safety gate against sneaking arbitrary keys into the backing store:
// anything outside this pattern is treated as not-a-signal, even if a
// definition with that literal name existed.
static SIGNAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("signal name regex is valid"));

static REGISTRY: Lazy<SignalRegistry> = Lazy::new(SignalRegistry::build);

/// Lowercase trimmed form callers must apply before lookup.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether a normalized name matches the `[a-z0-9_]+` identifier pattern.
pub fn is_valid_name(name: &str) -> bool {
    SIGNAL_NAME.is_match(name)
}

/// The ordered, immutable catalog of signal definitions.
pub struct SignalRegistry {
    defs: Vec<SignalDefinition>,
    index: HashMap<&'static str, usize>,
}

impl SignalRegistry {
    /// The process-wide registry instance.
    pub fn global() -> &'static SignalRegistry {
        &REGISTRY
    }

    /// Look up a definition by normalized name. Fails closed on names that
    /// do not match the identifier pattern.
    pub fn lookup(&self, name: &str) -> Option<&SignalDefinition> {
        if !is_valid_name(name) {
            return None;
        }
        self.index.get(name).map(|&i| &self.defs[i])
    }

    /// Every definition, in declaration order. The order is stable across
    /// runs so that get-all snapshots and their serialized form are
    /// deterministic.
    pub fn all(&self) -> impl Iterator<Item = &SignalDefinition> {
        self.defs.iter()
    }

    /// Every defined signal name, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.iter().map(|d| d.name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    fn build() -> Self {
        let defs = catalog();
        let index = defs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name, i))
            .collect();
        SignalRegistry { defs, index }
    }
}

fn signal(
    name: &'static str,
    default: SignalValue,
    rule: ValidationRule,
    transform: Option<Transform>,
) -> SignalDefinition {
    SignalDefinition {
        name,
        default,
        writable: true,
        rule,
        transform,
        on_access: None,
    }
}

fn on_off(name: &'static str) -> SignalDefinition {
    signal(
        name,
        SignalValue::from(DEFAULT_ON_OFF),
        ValidationRule::OneOf(ON_OFF),
        None,
    )
}

fn open_closed(name: &'static str) -> SignalDefinition {
    signal(
        name,
        SignalValue::from(DEFAULT_OPEN_CLOSED),
        ValidationRule::OneOf(OPEN_CLOSED),
        None,
    )
}

fn percentage(name: &'static str) -> SignalDefinition {
    signal(
        name,
        SignalValue::Int(DEFAULT_PERCENTAGE),
        ValidationRule::percentage(),
        Some(Transform::ToFloat),
    )
}

fn distance_sensor(name: &'static str) -> SignalDefinition {
    signal(
        name,
        SignalValue::Float(f64::NAN),
        ValidationRule::Number {
            allow_nan: true,
            min: Some(0.0),
            max: None,
        },
        Some(Transform::ToFloat),
    )
}

fn tire_pressure(name: &'static str) -> SignalDefinition {
    signal(
        name,
        SignalValue::Int(3),
        ValidationRule::number(0.0, 5.0),
        Some(Transform::ToFloat),
    )
}

fn catalog() -> Vec<SignalDefinition> {
    vec![
        signal(
            "battery_charging",
            SignalValue::from("no"),
            ValidationRule::OneOf(YES_NO),
            None,
        ),
        signal(
            "battery_charging_current",
            SignalValue::Int(16),
            ValidationRule::non_negative(),
            Some(Transform::ToFloat),
        ),
        percentage("battery_health"),
        signal(
            "battery_loading_capacity",
            SignalValue::Int(11),
            ValidationRule::non_negative(),
            Some(Transform::ToFloat),
        ),
        percentage("battery_state_of_charge"),
        signal(
            "battery_total_kwh_capacity",
            SignalValue::Float(17.5),
            ValidationRule::number(14.0, 24.0),
            Some(Transform::ToFloat),
        ),
        percentage("brake_fluid_level"),
        signal(
            "calculated_remaining_distance",
            SignalValue::Int(150),
            ValidationRule::non_negative(),
            Some(Transform::ToFloat),
        ),
        open_closed("central_locking_system"),
        distance_sensor("distance_to_object_back"),
        signal(
            "distance_to_object_bottom",
            SignalValue::Int(20),
            ValidationRule::number(0.0, 30.0),
            Some(Transform::ToFloat),
        ),
        distance_sensor("distance_to_object_front"),
        distance_sensor("distance_to_object_left"),
        distance_sensor("distance_to_object_right"),
        signal(
            "distance_trip",
            SignalValue::Int(0),
            ValidationRule::non_negative(),
            Some(Transform::ToFloat),
        ),
        open_closed("door_disc_front_left"),
        open_closed("door_disc_front_right"),
        open_closed("door_front_left"),
        open_closed("door_front_right"),
        signal(
            "drive_mode",
            SignalValue::from("eco"),
            ValidationRule::OneOf(DRIVE_MODES),
            None,
        ),
        on_off("flash"),
        on_off("heated_seats"),
        on_off("high_beam"),
        on_off("infotainment"),
        signal(
            "infotainment_volume",
            SignalValue::Int(5),
            ValidationRule::number(0.0, 10.0),
            Some(Transform::ToInt),
        ),
        signal(
            "location",
            SignalValue::from("50.782117,6.047171"),
            ValidationRule::GeoCoordinates,
            None,
        ),
        signal(
            "mileage",
            SignalValue::Int(0),
            ValidationRule::non_negative(),
            Some(Transform::ToInt),
        ),
        on_off("motor_control_lamp"),
        signal(
            "person_count",
            SignalValue::Int(0),
            ValidationRule::number(0.0, 4.0),
            Some(Transform::ToInt),
        ),
        signal(
            "pulse_sensor_steering_wheel",
            SignalValue::Float(f64::NAN),
            ValidationRule::Number {
                allow_nan: true,
                min: Some(0.0),
                max: Some(300.0),
            },
            Some(Transform::ToFloat),
        ),
        signal(
            "power_consumption",
            SignalValue::Int(0),
            ValidationRule::number(0.0, 40.0),
            Some(Transform::ToFloat),
        ),
        signal(
            "rain_sensor",
            SignalValue::from("no_rain"),
            ValidationRule::OneOf(RAIN_STATES),
            None,
        ),
        on_off("rear_running_lights"),
        on_off("side_lights"),
        signal(
            "speed",
            SignalValue::Int(0),
            ValidationRule::number(0.0, 200.0),
            Some(Transform::ToInt),
        ),
        on_off("stop_lights"),
        signal(
            "temperature_inside",
            SignalValue::Int(20),
            ValidationRule::number(-100.0, 100.0),
            Some(Transform::ToInt),
        ),
        signal(
            "temperature_outside",
            SignalValue::Int(10),
            ValidationRule::number(-100.0, 100.0),
            Some(Transform::ToInt),
        ),
        tire_pressure("tire_pressure_back_left"),
        tire_pressure("tire_pressure_back_right"),
        tire_pressure("tire_pressure_front_left"),
        tire_pressure("tire_pressure_front_right"),
        open_closed("trunk"),
        on_off("turn_signal_left"),
        on_off("turn_signal_right"),
        on_off("warning_blinker"),
        signal(
            "weight",
            SignalValue::Int(1200),
            ValidationRule::number(1200.0, 3500.0),
            Some(Transform::ToInt),
        ),
        on_off("windshield_wipers"),
        // No transformer: the validated raw string is stored as-is.
        signal(
            "wiping_water_level",
            SignalValue::Int(DEFAULT_PERCENTAGE),
            ValidationRule::percentage(),
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_every_signal() {
        assert_eq!(SignalRegistry::global().len(), 49);
    }

    #[test]
    fn lookup_finds_known_signals() {
        let reg = SignalRegistry::global();
        assert!(reg.lookup("speed").is_some());
        assert!(reg.lookup("wiping_water_level").is_some());
        assert!(reg.lookup("no_such_signal").is_none());
    }

    #[test]
    fn lookup_fails_closed_on_invalid_identifiers() {
        let reg = SignalRegistry::global();
        assert!(reg.lookup("Speed").is_none());
        assert!(reg.lookup("speed ").is_none());
        assert!(reg.lookup("speed;drop").is_none());
        assert!(reg.lookup("").is_none());
    }

    #[test]
    fn declaration_order_is_preserved() {
        let names: Vec<_> = SignalRegistry::global().names().collect();
        assert_eq!(names.first(), Some(&"battery_charging"));
        assert_eq!(names.last(), Some(&"wiping_water_level"));

        // The catalog keeps its historical ordering, which is not fully
        // alphabetical.
        let pulse = names
            .iter()
            .position(|n| *n == "pulse_sensor_steering_wheel")
            .unwrap();
        let power = names.iter().position(|n| *n == "power_consumption").unwrap();
        assert!(pulse < power);
    }

    #[test]
    fn distance_sensors_default_to_nan() {
        let reg = SignalRegistry::global();
        for name in [
            "distance_to_object_back",
            "distance_to_object_front",
            "distance_to_object_left",
            "distance_to_object_right",
            "pulse_sensor_steering_wheel",
        ] {
            assert!(reg.lookup(name).unwrap().default.is_nan(), "{}", name);
        }
    }

    #[test]
    fn every_signal_is_currently_writable() {
        assert!(SignalRegistry::global().all().all(|d| d.writable));
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_name("  SPEED "), "speed");
    }
}
