//! # Signal Manager
//!
//! ## Purpose
//!
//! Per-vehicle facade over the signal catalog, the persistence layer and a
//! queue-serialized snapshot cache. The HTTP layer hands it a vehicle
//! identity and signal names/values; it answers reads from the override
//! store (falling back to registry defaults), runs writes through the
//! validate → transform → upsert → log → event pipeline inside one storage
//! transaction, and keeps the cached "all signals" snapshot fresh.
//!
//! ## Integration Points
//!
//! - **Registry**: `signal-registry` supplies the static catalog and the
//!   validation/transformation rules.
//! - **Storage**: any `signal_store::SignalStore` implementation; the write
//!   path commits override + audit log + change event atomically, with the
//!   audit log and event inserts downgraded to best-effort.
//! - **Cache**: [`VehicleCache`] is injected at construction so tests own
//!   their instance and the snapshot's lifetime is explicit.
//!
//! ## Error handling
//!
//! Unknown signal names are sentinels (`Ok(None)` / `Ok(false)`), not
//! errors — get-all relies on that to skip non-signal names. Read-only
//! writes, validation rejections and storage failures surface as
//! [`SignalError`] variants.

pub mod cache;
pub mod manager;
pub mod snapshot;

pub use cache::{CacheError, VehicleCache, VehicleCacheConfig, KEY_SIGNALS};
pub use manager::{SignalError, VehicleSignalManager};
pub use snapshot::SignalSnapshot;
