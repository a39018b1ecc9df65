//! # Vehicle Signal Types
//!
//! Shared type system for the vehicle signal core: the canonical stored
//! value representation, vehicle identity, and the persisted record shapes
//! (overrides, change-log entries, change events) that flow between the
//! signal registry, the access manager and the storage layer.
//!
//! This crate deliberately carries no I/O and no async code so that every
//! other crate in the workspace can depend on it without pulling in a
//! runtime.

pub mod identifiers;
pub mod records;
pub mod value;

pub use identifiers::VehicleId;
pub use records::{
    AccessDirection, NewChangeEvent, NewChangeLogEntry, SignalChangeData, SignalChangeEvent,
    SignalChangeLogEntry, SignalOverride, SIGNAL_CHANGE_PREFIX,
};
pub use value::SignalValue;
