//! # Signal Store
//!
//! The persistence boundary of the signal core. The access manager never
//! talks to a database directly; it goes through [`SignalStore`], which any
//! backend (document database, SQL, in-memory) can implement.
//!
//! Writes happen inside a [`SignalTransaction`]: locate the existing
//! override, insert or update it, append the change-log entry, append the
//! change event, then commit. Dropping a transaction without committing
//! discards every buffered mutation, which is what gives the write path its
//! all-or-nothing behavior.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use vehicle_types::{
    NewChangeEvent, NewChangeLogEntry, SignalChangeEvent, SignalChangeLogEntry, SignalOverride,
    SignalValue, VehicleId,
};

pub use memory::MemorySignalStore;

/// Storage-layer failure. Variants deliberately carry backend text rather
/// than backend types so the trait stays object-safe and backend-agnostic.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Override not found: {id}")]
    OverrideNotFound { id: Uuid },

    #[error("Transaction no longer usable: {0}")]
    TransactionClosed(String),

    #[error("Storage operation failed: {0}")]
    Backend(String),
}

/// Persistence collaborator for one deployment's signal data.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// The live override for (vehicle, name), if one was ever written.
    async fn find_override(
        &self,
        vehicle: &VehicleId,
        name: &str,
    ) -> Result<Option<SignalOverride>, StoreError>;

    /// Open a write transaction. Mutations become visible only at commit.
    async fn begin<'a>(&'a self) -> Result<Box<dyn SignalTransaction + 'a>, StoreError>;

    /// Remove every override of a vehicle (the explicit reset operation).
    /// Returns the number of removed overrides.
    async fn delete_overrides(&self, vehicle: &VehicleId) -> Result<u64, StoreError>;

    /// Audit log entries for a vehicle, ordered by creation time.
    async fn change_log(
        &self,
        vehicle: &VehicleId,
    ) -> Result<Vec<SignalChangeLogEntry>, StoreError>;

    /// Change events for a vehicle not yet flagged handled, ordered by
    /// creation time.
    async fn unhandled_events(
        &self,
        vehicle: &VehicleId,
    ) -> Result<Vec<SignalChangeEvent>, StoreError>;
}

/// One write transaction. The store assigns record ids and timestamps.
#[async_trait]
pub trait SignalTransaction: Send {
    /// Read-your-writes lookup of the live override for (vehicle, name).
    async fn find_override(
        &mut self,
        vehicle: &VehicleId,
        name: &str,
    ) -> Result<Option<SignalOverride>, StoreError>;

    /// Create the override for a signal written the first time.
    async fn insert_override(
        &mut self,
        vehicle: &VehicleId,
        name: &str,
        data: SignalValue,
    ) -> Result<SignalOverride, StoreError>;

    /// Replace an existing override's data in place, refreshing
    /// `last_update`.
    async fn update_override(
        &mut self,
        id: Uuid,
        data: SignalValue,
    ) -> Result<SignalOverride, StoreError>;

    /// Append one audit record.
    async fn insert_change_log(
        &mut self,
        entry: NewChangeLogEntry,
    ) -> Result<SignalChangeLogEntry, StoreError>;

    /// Append one change event, `is_handled` initialized to false.
    async fn insert_change_event(
        &mut self,
        event: NewChangeEvent,
    ) -> Result<SignalChangeEvent, StoreError>;

    /// Make every buffered mutation visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
