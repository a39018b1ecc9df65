//! Vehicle signal access manager
//!
//! The per-vehicle facade over registry, storage and cache. Reads resolve
//! the persisted override or fall back to the registry default; writes run
//! the validate → transform → upsert → log → event pipeline inside one
//! storage transaction and then overwrite the cached snapshot.
//!
//! Unknown signal names are a normal control-flow outcome (`Ok(None)` /
//! `Ok(false)`), never an error. Read-only signals, validation rejections
//! and storage failures are typed errors.

use crate::cache::{CacheError, VehicleCache, KEY_SIGNALS};
use crate::snapshot::SignalSnapshot;
use signal_registry::{
    normalize_name, AccessContext, SignalDefinition, SignalRegistry, ValidationError,
};
use signal_store::{SignalStore, SignalTransaction, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use vehicle_types::{
    AccessDirection, NewChangeEvent, NewChangeLogEntry, SignalChangeData, SignalChangeEvent,
    SignalValue, VehicleId,
};

/// Failures of signal reads and writes.
#[derive(Debug, Error)]
pub enum SignalError {
    /// The signal exists but is not externally writable.
    #[error("Signal is read-only")]
    ReadOnly { name: String },

    /// The candidate value was rejected; the message is the validator's
    /// text, verbatim.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Manages the signals of one vehicle.
pub struct VehicleSignalManager {
    vehicle: VehicleId,
    store: Arc<dyn SignalStore>,
    cache: VehicleCache,
}

impl VehicleSignalManager {
    /// Bind a manager to one vehicle identity. The cache is injected so
    /// callers control its lifetime and tests get per-test isolation.
    pub fn new(vehicle: VehicleId, store: Arc<dyn SignalStore>, cache: VehicleCache) -> Self {
        VehicleSignalManager {
            vehicle,
            store,
            cache,
        }
    }

    pub fn vehicle(&self) -> &VehicleId {
        &self.vehicle
    }

    /// Current value of a signal: the persisted override if one exists,
    /// otherwise the registry default. `Ok(None)` means the name is not a
    /// signal.
    pub async fn get(&self, name: &str) -> Result<Option<SignalValue>, SignalError> {
        let name = normalize_name(name);
        let def = match SignalRegistry::global().lookup(&name) {
            Some(def) => def,
            None => return Ok(None),
        };

        let doc = self.store.find_override(&self.vehicle, &name).await?;
        let value = match &doc {
            Some(doc) => doc.data.clone(),
            None => def.default.clone(),
        };

        def.notify_access(&AccessContext {
            direction: AccessDirection::Read,
            doc: doc.as_ref(),
            old_doc: None,
            value: &value,
        });

        Ok(Some(value))
    }

    /// Write a signal. `Ok(false)` means the name is not a signal; the
    /// write pipeline is validate → transform → upsert override → append
    /// change log → append change event (only when the stored data actually
    /// changed) → commit → refresh cached snapshot.
    pub async fn set(&self, name: &str, raw: &str) -> Result<bool, SignalError> {
        let name = normalize_name(name);
        let def = match SignalRegistry::global().lookup(&name) {
            Some(def) => def,
            None => return Ok(false),
        };

        self.set_with_definition(def, &name, raw).await?;
        Ok(true)
    }

    /// Every defined signal and its current value, in registry declaration
    /// order. This is the cold path the cache exists to avoid.
    pub async fn get_all(&self) -> Result<SignalSnapshot, SignalError> {
        let registry = SignalRegistry::global();
        let mut entries = Vec::with_capacity(registry.len());
        for def in registry.all() {
            // Unknown names cannot happen when iterating the registry, but
            // get() keeps its skip-on-unknown contract either way.
            if let Some(value) = self.get(def.name).await? {
                entries.push((def.name, value));
            }
        }
        Ok(SignalSnapshot::new(entries))
    }

    /// Cache-first read of the full snapshot, computing and repopulating on
    /// a miss.
    pub async fn snapshot(&self) -> Result<SignalSnapshot, SignalError> {
        if let Some(snapshot) = self.cache.get(&self.vehicle, KEY_SIGNALS).await? {
            debug!(vehicle = %self.vehicle, "signal snapshot cache hit");
            return Ok(snapshot);
        }

        debug!(vehicle = %self.vehicle, "signal snapshot cache miss");
        self.refresh_cache().await
    }

    /// Drop every override of this vehicle and re-cache the default
    /// snapshot.
    pub async fn reset(&self) -> Result<SignalSnapshot, SignalError> {
        let removed = self.store.delete_overrides(&self.vehicle).await?;
        info!(vehicle = %self.vehicle, removed, "vehicle signals reset");
        self.refresh_cache().await
    }

    async fn set_with_definition(
        &self,
        def: &SignalDefinition,
        name: &str,
        raw: &str,
    ) -> Result<(), SignalError> {
        if !def.writable {
            return Err(SignalError::ReadOnly {
                name: name.to_string(),
            });
        }

        def.validate(raw)?;
        let new_data = def.transform(raw);

        let mut txn = self.store.begin().await?;

        let old_doc = txn.find_override(&self.vehicle, name).await?;
        let (direction, doc) = match &old_doc {
            None => {
                let doc = txn
                    .insert_override(&self.vehicle, name, new_data.clone())
                    .await?;
                (AccessDirection::New, doc)
            }
            Some(old) => {
                let doc = txn.update_override(old.id, new_data.clone()).await?;
                (AccessDirection::Update, doc)
            }
        };

        let old_data = old_doc.as_ref().map(|d| d.data.clone());

        // Best-effort: a lost audit record must not abort an otherwise
        // successful override write.
        let log_entry = NewChangeLogEntry {
            vehicle_id: self.vehicle.clone(),
            signal_id: doc.id,
            name: name.to_string(),
            old_data: old_data.clone(),
            new_data: doc.data.clone(),
        };
        if let Err(e) = txn.insert_change_log(log_entry).await {
            error!(vehicle = %self.vehicle, signal = name, error = %e,
                "failed to append signal change log entry");
        }

        // Best-effort, and only when the stored data actually changed.
        let changed = match &old_data {
            None => true,
            Some(old) => !old.canonical_eq(&doc.data),
        };
        if changed {
            let event = NewChangeEvent {
                vehicle_id: self.vehicle.clone(),
                name: SignalChangeEvent::event_name(name),
                data: SignalChangeData {
                    old_data: old_data.clone(),
                    new_data: doc.data.clone(),
                },
            };
            if let Err(e) = txn.insert_change_event(event).await {
                error!(vehicle = %self.vehicle, signal = name, error = %e,
                    "failed to append signal change event");
            }
        }

        txn.commit().await?;

        def.notify_access(&AccessContext {
            direction,
            doc: Some(&doc),
            old_doc: old_doc.as_ref(),
            value: &doc.data,
        });

        self.refresh_cache().await?;
        Ok(())
    }

    async fn refresh_cache(&self) -> Result<SignalSnapshot, SignalError> {
        let snapshot = self.get_all().await?;
        self.cache
            .set(&self.vehicle, KEY_SIGNALS, Some(snapshot.clone()))
            .await?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_registry::{Transform, ValidationRule};
    use signal_store::MemorySignalStore;

    fn manager(store: Arc<MemorySignalStore>) -> VehicleSignalManager {
        VehicleSignalManager::new(VehicleId::new("vh-test"), store, VehicleCache::new())
    }

    #[tokio::test]
    async fn read_only_definition_is_rejected_before_any_write() {
        let store = Arc::new(MemorySignalStore::new());
        let mgr = manager(store.clone());

        let def = SignalDefinition {
            name: "vin_checksum",
            default: SignalValue::Int(0),
            writable: false,
            rule: ValidationRule::non_negative(),
            transform: Some(Transform::ToInt),
            on_access: None,
        };

        let err = mgr
            .set_with_definition(&def, "vin_checksum", "5")
            .await
            .unwrap_err();
        assert!(matches!(err, SignalError::ReadOnly { .. }));
        assert_eq!(err.to_string(), "Signal is read-only");
        assert_eq!(store.override_count(), 0);
    }

    #[tokio::test]
    async fn name_is_normalized_before_lookup() {
        let store = Arc::new(MemorySignalStore::new());
        let mgr = manager(store);

        assert!(mgr.set("  SPEED ", "50").await.unwrap());
        assert_eq!(
            mgr.get("Speed").await.unwrap(),
            Some(SignalValue::Int(50))
        );
    }

    #[tokio::test]
    async fn write_direction_tracks_new_versus_update() {
        let store = Arc::new(MemorySignalStore::new());
        let mgr = manager(store.clone());
        let vh = mgr.vehicle().clone();

        mgr.set("speed", "10").await.unwrap();
        let first = store.find_override(&vh, "speed").await.unwrap().unwrap();
        assert!(first.last_update.is_none());

        mgr.set("speed", "20").await.unwrap();
        let second = store.find_override(&vh, "speed").await.unwrap().unwrap();
        assert_eq!(second.id, first.id);
        assert!(second.last_update.is_some());
    }
}
