//! Materialized "all signals" snapshot
//!
//! The get-all result keyed by every declared signal name, in registry
//! declaration order. Kept as an ordered sequence rather than a map so the
//! serialized form is byte-stable across runs.

use serde::ser::{Serialize, SerializeMap, Serializer};
use vehicle_types::SignalValue;

/// One full read of every defined signal for a single vehicle.
#[derive(Debug, Clone, Default)]
pub struct SignalSnapshot {
    entries: Vec<(&'static str, SignalValue)>,
}

// Snapshot equality is canonical equality per entry, so two snapshots that
// both carry the NaN "no object detected" sentinel compare equal.
impl PartialEq for SignalSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((an, av), (bn, bv))| an == bn && av.canonical_eq(bv))
    }
}

impl SignalSnapshot {
    pub fn new(entries: Vec<(&'static str, SignalValue)>) -> Self {
        SignalSnapshot { entries }
    }

    /// Value of one signal within the snapshot.
    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Entries in registry declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SignalValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SignalSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_entry_order() {
        let snapshot = SignalSnapshot::new(vec![
            ("speed", SignalValue::Int(0)),
            ("flash", SignalValue::from("off")),
        ]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"speed":0,"flash":"off"}"#);
    }

    #[test]
    fn snapshots_with_nan_entries_compare_equal() {
        let a = SignalSnapshot::new(vec![("distance_to_object_back", SignalValue::Float(f64::NAN))]);
        let b = SignalSnapshot::new(vec![("distance_to_object_back", SignalValue::Float(f64::NAN))]);
        assert_eq!(a, b);
    }

    #[test]
    fn get_finds_entries_by_name() {
        let snapshot = SignalSnapshot::new(vec![("speed", SignalValue::Int(7))]);
        assert_eq!(snapshot.get("speed"), Some(&SignalValue::Int(7)));
        assert_eq!(snapshot.get("flash"), None);
    }
}
