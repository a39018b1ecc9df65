//! Persisted record shapes
//!
//! Three record families leave the signal core: the live override per
//! (vehicle, signal), the append-only change log, and the consumable
//! change-event queue. The storage layer owns how they are persisted; these
//! structs fix what they contain.

use crate::identifiers::VehicleId;
use crate::value::SignalValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name prefix of change events: `signal_change::<signal name>`.
pub const SIGNAL_CHANGE_PREFIX: &str = "signal_change::";

/// Direction of a signal access, handed to the definition's access hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDirection {
    Read,
    Write,
    /// Write that created the override.
    New,
    /// Write that replaced an existing override's data.
    Update,
}

/// The live persisted value of one signal for one vehicle.
///
/// At most one override exists per (vehicle, name); writes after the first
/// replace `data` and `last_update` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOverride {
    pub id: Uuid,
    pub vehicle_id: VehicleId,
    pub name: String,
    pub data: SignalValue,
    pub creation_time: DateTime<Utc>,
    pub last_update: Option<DateTime<Utc>>,
}

/// One append-only audit record per validated write attempt.
///
/// Written even when old and new data are equal; immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalChangeLogEntry {
    pub id: Uuid,
    pub vehicle_id: VehicleId,
    /// Id of the override the write landed on.
    pub signal_id: Uuid,
    pub name: String,
    /// Absent when the write created the override.
    pub old_data: Option<SignalValue>,
    pub new_data: SignalValue,
    pub creation_time: DateTime<Utc>,
}

/// Old/new payload of a change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalChangeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_data: Option<SignalValue>,
    pub new_data: SignalValue,
}

/// Consumable notification, emitted only when a write actually changed the
/// stored data. External pollers flag it handled; it is never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalChangeEvent {
    pub id: Uuid,
    pub vehicle_id: VehicleId,
    /// `signal_change::<signal name>`.
    pub name: String,
    pub data: SignalChangeData,
    pub is_handled: bool,
    pub creation_time: DateTime<Utc>,
}

impl SignalChangeEvent {
    /// Event name for a signal: `signal_change::speed` for `speed`.
    pub fn event_name(signal: &str) -> String {
        format!("{}{}", SIGNAL_CHANGE_PREFIX, signal)
    }
}

/// Change-log insert payload; the store assigns id and creation time.
#[derive(Debug, Clone)]
pub struct NewChangeLogEntry {
    pub vehicle_id: VehicleId,
    pub signal_id: Uuid,
    pub name: String,
    pub old_data: Option<SignalValue>,
    pub new_data: SignalValue,
}

/// Change-event insert payload; the store assigns id and creation time and
/// initializes `is_handled` to false.
#[derive(Debug, Clone)]
pub struct NewChangeEvent {
    pub vehicle_id: VehicleId,
    pub name: String,
    pub data: SignalChangeData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_is_prefixed() {
        assert_eq!(
            SignalChangeEvent::event_name("speed"),
            "signal_change::speed"
        );
    }

    #[test]
    fn change_data_omits_absent_old_value() {
        let data = SignalChangeData {
            old_data: None,
            new_data: SignalValue::from("on"),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"new_data":"on"}"#);
    }
}
