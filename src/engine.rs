//! Pipeline orchestration: parameters → detection → metrics → snapshot →
//! classification.
//!
//! The computation itself is synchronous and pure; the resolver and snapshot
//! store are the only collaborators, invoked strictly before/after it. Calls
//! for different (symbol, timeframe) keys are independent; same-key races on
//! the store are tolerated because every write fully replaces the snapshot.

use tracing::{debug, error, info, warn};

use crate::config::{ClassifierConfig, Config, ConfigResolver, ParameterResolver};
use crate::detect::{metrics, zigzag};
use crate::models::{Bar, BoundaryLine, Pivot, Timeframe};
use crate::patterns;
use crate::snapshot::{MemorySnapshotStore, SnapshotStore};

pub struct PivotEngine<R, S> {
    resolver: R,
    store: S,
    classifier: ClassifierConfig,
}

impl PivotEngine<ConfigResolver, MemorySnapshotStore> {
    /// Engine with crate defaults and an in-memory snapshot store.
    pub fn with_defaults(config: Config) -> Self {
        Self::new(
            ConfigResolver::new(config.detector),
            MemorySnapshotStore::new(),
            config.classifier,
        )
    }
}

impl<R: ParameterResolver, S: SnapshotStore> PivotEngine<R, S> {
    pub fn new(resolver: R, store: S, classifier: ClassifierConfig) -> Self {
        Self {
            resolver,
            store,
            classifier,
        }
    }

    /// Run the full pipeline and replace the stored snapshot for the key.
    ///
    /// Store failures are logged, never escalated: the freshly computed list
    /// is returned regardless.
    pub fn detect_and_persist(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: &[Bar],
    ) -> Vec<Pivot> {
        let params = self.resolver.resolve(symbol, timeframe);
        let mut pivots = zigzag::detect(bars, &params);
        metrics::annotate(&mut pivots);

        if let Err(e) = self.store.put(symbol, timeframe, &pivots) {
            error!("failed to persist pivot snapshot for {symbol}@{timeframe}: {e}");
        }
        info!(
            symbol,
            timeframe = %timeframe,
            bars = bars.len(),
            pivots = pivots.len(),
            "pivots recomputed"
        );
        pivots
    }

    /// Snapshot-first pivot lookup.
    ///
    /// Miss and decode failure both fall back to recompute-then-persist;
    /// neither surfaces as an error.
    pub fn pivots(&self, symbol: &str, timeframe: Timeframe, bars: &[Bar]) -> Vec<Pivot> {
        match self.store.get(symbol, timeframe) {
            Ok(Some(pivots)) => {
                debug!(symbol, timeframe = %timeframe, "pivot snapshot hit");
                pivots
            }
            Ok(None) => self.detect_and_persist(symbol, timeframe, bars),
            Err(e) => {
                warn!("unreadable pivot snapshot for {symbol}@{timeframe}, recomputing: {e}");
                self.detect_and_persist(symbol, timeframe, bars)
            }
        }
    }

    /// Pivots → pattern lines. Classification failures surface as an empty
    /// list, indistinguishable from "no pattern present".
    pub fn patterns(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: &[Bar],
    ) -> Vec<BoundaryLine> {
        let pivots = self.pivots(symbol, timeframe, bars);
        patterns::classify(&pivots, &self.classifier)
    }
}
