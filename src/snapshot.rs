//! Pivot snapshot cache boundary.
//!
//! A snapshot is the last computed pivot list for one (symbol, timeframe)
//! key, always replaced wholesale, never merged. Concurrent writers for the
//! same key are tolerated as last-writer-wins; recompute-on-miss is safe
//! because detection is deterministic.

use dashmap::DashMap;
use thiserror::Error;

use crate::models::{Pivot, Timeframe};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encode failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("snapshot decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Keyed cache of the last computed pivot list.
///
/// `get` returning `Ok(None)` is a miss; a `Decode` error is non-fatal and
/// callers fall back to recompute-then-persist.
pub trait SnapshotStore {
    fn get(&self, symbol: &str, timeframe: Timeframe)
        -> Result<Option<Vec<Pivot>>, SnapshotError>;
    fn put(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        pivots: &[Pivot],
    ) -> Result<(), SnapshotError>;
}

/// In-memory store holding snapshots in serialized form, so the decode
/// failure path behaves exactly like an external cache.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: DashMap<(String, Timeframe), String>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Test/ops hook: overwrite the raw payload for a key.
    pub fn put_raw(&self, symbol: &str, timeframe: Timeframe, payload: String) {
        self.entries.insert((symbol.to_string(), timeframe), payload);
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<Vec<Pivot>>, SnapshotError> {
        match self.entries.get(&(symbol.to_string(), timeframe)) {
            Some(raw) => {
                let pivots = serde_json::from_str(raw.value()).map_err(SnapshotError::Decode)?;
                Ok(Some(pivots))
            }
            None => Ok(None),
        }
    }

    fn put(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        pivots: &[Pivot],
    ) -> Result<(), SnapshotError> {
        let raw = serde_json::to_string(pivots).map_err(SnapshotError::Encode)?;
        self.entries.insert((symbol.to_string(), timeframe), raw);
        Ok(())
    }
}
