//! In-memory store
//!
//! Reference [`SignalStore`] backed by process memory. Tests and demos use
//! it as the persistence collaborator; the induced-failure hooks exist so
//! callers can exercise the must-succeed / best-effort split of the write
//! path without a real backend.

use crate::{SignalStore, SignalTransaction, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use uuid::Uuid;
use vehicle_types::{
    NewChangeEvent, NewChangeLogEntry, SignalChangeEvent, SignalChangeLogEntry, SignalOverride,
    SignalValue, VehicleId,
};

type OverrideKey = (VehicleId, String);

/// In-memory signal store.
#[derive(Debug, Default)]
pub struct MemorySignalStore {
    overrides: DashMap<OverrideKey, SignalOverride>,
    log: Mutex<Vec<SignalChangeLogEntry>>,
    events: Mutex<Vec<SignalChangeEvent>>,
    fail_next_override: AtomicBool,
    fail_next_log: AtomicBool,
    fail_next_event: AtomicBool,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next override insert/update in any transaction fail.
    pub fn fail_next_override_write(&self) {
        self.fail_next_override.store(true, Ordering::Relaxed);
    }

    /// Make the next change-log insert fail.
    pub fn fail_next_log_insert(&self) {
        self.fail_next_log.store(true, Ordering::Relaxed);
    }

    /// Make the next change-event insert fail.
    pub fn fail_next_event_insert(&self) {
        self.fail_next_event.store(true, Ordering::Relaxed);
    }

    /// Number of live overrides across all vehicles.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    fn take_flag(flag: &AtomicBool) -> bool {
        flag.swap(false, Ordering::Relaxed)
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn find_override(
        &self,
        vehicle: &VehicleId,
        name: &str,
    ) -> Result<Option<SignalOverride>, StoreError> {
        let key = (vehicle.clone(), name.to_string());
        Ok(self.overrides.get(&key).map(|e| e.value().clone()))
    }

    async fn begin<'a>(&'a self) -> Result<Box<dyn SignalTransaction + 'a>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            store: self,
            pending_overrides: Vec::new(),
            pending_log: Vec::new(),
            pending_events: Vec::new(),
        }))
    }

    async fn delete_overrides(&self, vehicle: &VehicleId) -> Result<u64, StoreError> {
        let keys: Vec<OverrideKey> = self
            .overrides
            .iter()
            .filter(|e| &e.key().0 == vehicle)
            .map(|e| e.key().clone())
            .collect();

        let mut removed = 0;
        for key in keys {
            if self.overrides.remove(&key).is_some() {
                removed += 1;
            }
        }

        debug!(vehicle = %vehicle, removed, "deleted vehicle overrides");
        Ok(removed)
    }

    async fn change_log(
        &self,
        vehicle: &VehicleId,
    ) -> Result<Vec<SignalChangeLogEntry>, StoreError> {
        Ok(self
            .log
            .lock()
            .iter()
            .filter(|e| &e.vehicle_id == vehicle)
            .cloned()
            .collect())
    }

    async fn unhandled_events(
        &self,
        vehicle: &VehicleId,
    ) -> Result<Vec<SignalChangeEvent>, StoreError> {
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| &e.vehicle_id == vehicle && !e.is_handled)
            .cloned()
            .collect())
    }
}

/// Transaction buffering mutations until commit.
struct MemoryTransaction<'a> {
    store: &'a MemorySignalStore,
    pending_overrides: Vec<SignalOverride>,
    pending_log: Vec<SignalChangeLogEntry>,
    pending_events: Vec<SignalChangeEvent>,
}

#[async_trait]
impl SignalTransaction for MemoryTransaction<'_> {
    async fn find_override(
        &mut self,
        vehicle: &VehicleId,
        name: &str,
    ) -> Result<Option<SignalOverride>, StoreError> {
        // Read-your-writes: buffered records shadow committed state.
        if let Some(pending) = self
            .pending_overrides
            .iter()
            .rev()
            .find(|o| &o.vehicle_id == vehicle && o.name == name)
        {
            return Ok(Some(pending.clone()));
        }

        self.store.find_override(vehicle, name).await
    }

    async fn insert_override(
        &mut self,
        vehicle: &VehicleId,
        name: &str,
        data: SignalValue,
    ) -> Result<SignalOverride, StoreError> {
        if MemorySignalStore::take_flag(&self.store.fail_next_override) {
            return Err(StoreError::Backend("induced override write failure".into()));
        }

        let doc = SignalOverride {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.clone(),
            name: name.to_string(),
            data,
            creation_time: Utc::now(),
            last_update: None,
        };
        self.pending_overrides.push(doc.clone());
        Ok(doc)
    }

    async fn update_override(
        &mut self,
        id: Uuid,
        data: SignalValue,
    ) -> Result<SignalOverride, StoreError> {
        if MemorySignalStore::take_flag(&self.store.fail_next_override) {
            return Err(StoreError::Backend("induced override write failure".into()));
        }

        let base = if let Some(pos) = self.pending_overrides.iter().position(|o| o.id == id) {
            self.pending_overrides.remove(pos)
        } else {
            self.store
                .overrides
                .iter()
                .find(|e| e.value().id == id)
                .map(|e| e.value().clone())
                .ok_or(StoreError::OverrideNotFound { id })?
        };

        let doc = SignalOverride {
            data,
            last_update: Some(Utc::now()),
            ..base
        };
        self.pending_overrides.push(doc.clone());
        Ok(doc)
    }

    async fn insert_change_log(
        &mut self,
        entry: NewChangeLogEntry,
    ) -> Result<SignalChangeLogEntry, StoreError> {
        if MemorySignalStore::take_flag(&self.store.fail_next_log) {
            return Err(StoreError::Backend("induced change-log failure".into()));
        }

        let record = SignalChangeLogEntry {
            id: Uuid::new_v4(),
            vehicle_id: entry.vehicle_id,
            signal_id: entry.signal_id,
            name: entry.name,
            old_data: entry.old_data,
            new_data: entry.new_data,
            creation_time: Utc::now(),
        };
        self.pending_log.push(record.clone());
        Ok(record)
    }

    async fn insert_change_event(
        &mut self,
        event: NewChangeEvent,
    ) -> Result<SignalChangeEvent, StoreError> {
        if MemorySignalStore::take_flag(&self.store.fail_next_event) {
            return Err(StoreError::Backend("induced change-event failure".into()));
        }

        let record = SignalChangeEvent {
            id: Uuid::new_v4(),
            vehicle_id: event.vehicle_id,
            name: event.name,
            data: event.data,
            is_handled: false,
            creation_time: Utc::now(),
        };
        self.pending_events.push(record.clone());
        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction {
            store,
            pending_overrides,
            pending_log,
            pending_events,
        } = *self;

        debug!(
            overrides = pending_overrides.len(),
            log_entries = pending_log.len(),
            events = pending_events.len(),
            "committing signal transaction"
        );

        for doc in pending_overrides {
            let key = (doc.vehicle_id.clone(), doc.name.clone());
            store.overrides.insert(key, doc);
        }
        store.log.lock().extend(pending_log);
        store.events.lock().extend(pending_events);
        Ok(())
    }
}
