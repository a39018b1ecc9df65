//! Per-vehicle snapshot cache
//!
//! A background worker task owns the `vehicle → {key → snapshot}` map;
//! every operation travels through one bounded command channel and is
//! answered over a oneshot reply. That single lane serializes all cache
//! access — across vehicles, not per vehicle — so the shared map never sees
//! interleaved partial mutations. The cache never expires entries on its
//! own; the access manager overwrites the snapshot after every successful
//! write.

use crate::snapshot::SignalSnapshot;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use vehicle_types::VehicleId;

/// The only key the signal subsystem stores per vehicle: the full
/// materialized snapshot.
pub const KEY_SIGNALS: &str = "signals";

/// Cache tuning knobs.
#[derive(Debug, Clone)]
pub struct VehicleCacheConfig {
    /// Depth of the command queue; senders back-pressure once it fills.
    pub queue_depth: usize,
}

impl Default for VehicleCacheConfig {
    fn default() -> Self {
        Self { queue_depth: 256 }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache worker is no longer running")]
    WorkerGone,
}

enum CacheCommand {
    Get {
        vehicle: VehicleId,
        key: String,
        reply: oneshot::Sender<Option<SignalSnapshot>>,
    },
    Set {
        vehicle: VehicleId,
        key: String,
        /// `None` deletes the key instead of storing a placeholder.
        value: Option<SignalSnapshot>,
        reply: oneshot::Sender<()>,
    },
}

/// Queue-serialized in-memory cache of per-vehicle signal snapshots.
///
/// Must be constructed inside a Tokio runtime; the worker task lives until
/// the last handle is dropped.
#[derive(Debug, Clone)]
pub struct VehicleCache {
    commands: mpsc::Sender<CacheCommand>,
}

impl VehicleCache {
    pub fn new() -> Self {
        Self::with_config(VehicleCacheConfig::default())
    }

    pub fn with_config(config: VehicleCacheConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_depth);
        tokio::spawn(worker(rx));
        VehicleCache { commands: tx }
    }

    /// Cached value for (vehicle, key); `None` when absent.
    pub async fn get(
        &self,
        vehicle: &VehicleId,
        key: &str,
    ) -> Result<Option<SignalSnapshot>, CacheError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(CacheCommand::Get {
                vehicle: vehicle.clone(),
                key: key.to_string(),
                reply,
            })
            .await
            .map_err(|_| CacheError::WorkerGone)?;
        answer.await.map_err(|_| CacheError::WorkerGone)
    }

    /// Overwrite (vehicle, key); passing `None` deletes the key.
    pub async fn set(
        &self,
        vehicle: &VehicleId,
        key: &str,
        value: Option<SignalSnapshot>,
    ) -> Result<(), CacheError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(CacheCommand::Set {
                vehicle: vehicle.clone(),
                key: key.to_string(),
                value,
                reply,
            })
            .await
            .map_err(|_| CacheError::WorkerGone)?;
        answer.await.map_err(|_| CacheError::WorkerGone)
    }
}

impl Default for VehicleCache {
    fn default() -> Self {
        Self::new()
    }
}

async fn worker(mut commands: mpsc::Receiver<CacheCommand>) {
    let mut storage: HashMap<VehicleId, HashMap<String, SignalSnapshot>> = HashMap::new();

    while let Some(command) = commands.recv().await {
        match command {
            CacheCommand::Get {
                vehicle,
                key,
                reply,
            } => {
                let value = storage
                    .get(&vehicle)
                    .and_then(|values| values.get(&key))
                    .cloned();
                let _ = reply.send(value);
            }
            CacheCommand::Set {
                vehicle,
                key,
                value,
                reply,
            } => {
                match value {
                    Some(value) => {
                        storage.entry(vehicle).or_default().insert(key, value);
                    }
                    None => {
                        if let Some(values) = storage.get_mut(&vehicle) {
                            values.remove(&key);
                        }
                    }
                }
                let _ = reply.send(());
            }
        }
    }

    debug!("vehicle cache worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use vehicle_types::SignalValue;

    fn snapshot(speed: i64) -> SignalSnapshot {
        SignalSnapshot::new(vec![("speed", SignalValue::Int(speed))])
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = VehicleCache::new();
        let vh = VehicleId::new("vh-1");

        assert_eq!(cache.get(&vh, "signals").await.unwrap(), None);
        cache.set(&vh, "signals", Some(snapshot(10))).await.unwrap();
        assert_eq!(cache.get(&vh, "signals").await.unwrap(), Some(snapshot(10)));
    }

    #[tokio::test]
    async fn entries_are_partitioned_by_vehicle() {
        let cache = VehicleCache::new();
        let vh1 = VehicleId::new("vh-1");
        let vh2 = VehicleId::new("vh-2");

        cache
            .set(&vh1, "signals", Some(snapshot(1)))
            .await
            .unwrap();
        assert_eq!(cache.get(&vh2, "signals").await.unwrap(), None);
    }

    #[tokio::test]
    async fn setting_none_deletes_the_key() {
        let cache = VehicleCache::new();
        let vh = VehicleId::new("vh-1");

        cache.set(&vh, "signals", Some(snapshot(1))).await.unwrap();
        cache.set(&vh, "signals", None).await.unwrap();
        assert_eq!(cache.get(&vh, "signals").await.unwrap(), None);
    }

    #[tokio::test]
    async fn later_set_overwrites_earlier_value() {
        let cache = VehicleCache::new();
        let vh = VehicleId::new("vh-1");

        cache.set(&vh, "signals", Some(snapshot(1))).await.unwrap();
        cache.set(&vh, "signals", Some(snapshot(2))).await.unwrap();
        assert_eq!(cache.get(&vh, "signals").await.unwrap(), Some(snapshot(2)));
    }

    #[tokio::test]
    async fn operations_complete_in_submission_order() {
        let cache = VehicleCache::new();
        let vh = VehicleId::new("vh-1");

        // Interleave writes against two vehicles through the shared lane;
        // the last write per key must win.
        for i in 0..50 {
            cache
                .set(&vh, "signals", Some(snapshot(i)))
                .await
                .unwrap();
        }
        assert_eq!(cache.get(&vh, "signals").await.unwrap(), Some(snapshot(49)));
    }
}
