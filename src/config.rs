use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Only confirmed pivots are reported.
    Live,
    /// Additionally reports the still-open trailing leg as a synthetic pivot.
    Backtest,
}

/// Fully resolved detector parameters for one symbol/timeframe.
///
/// Immutable per resolution: together with the bar series this value
/// completely determines detector output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PivotParams {
    pub atr_length: usize,
    /// ATR multiplier for the absolute threshold floor.
    pub atr_mult: f64,
    /// Static percent floor, used when dynamic scaling is off.
    pub pct_min: f64,
    /// Multiplier (>1) applied to the reversal threshold only, so breaking a
    /// leg is harder than establishing one.
    pub hysteresis: f64,
    pub min_bars_between_pivots: usize,
    pub dynamic_pct_enabled: bool,
    /// Multiplier for EMA(TR/close) when dynamic scaling is on.
    pub vol_mult: f64,
    /// Window for the relative-volatility EMA.
    pub rvol_window: usize,
    pub mode: Mode,
}

impl Default for PivotParams {
    fn default() -> Self {
        Self {
            atr_length: 14,
            atr_mult: 2.0,
            pct_min: 0.03,
            hysteresis: 1.6,
            min_bars_between_pivots: 3,
            dynamic_pct_enabled: true,
            vol_mult: 2.0,
            rvol_window: 50,
            mode: Mode::Live,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Number of most recent pivots considered by the pattern classifier.
    pub recent_pivot_count: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            recent_pivot_count: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub detector: PivotParams,
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load configuration from environment variables (.env file) on top of
    /// the built-in defaults.
    ///
    /// Optional env vars:
    ///   SWINGSCAN_MODE: LIVE or BACKTEST (default: LIVE)
    ///   SWINGSCAN_ATR_LENGTH: ATR lookback (default: 14)
    ///   SWINGSCAN_PCT_MIN: static percent floor (default: 0.03)
    ///   RUST_LOG: log level (default: info)
    pub fn load_or_default() -> Self {
        let _ = dotenv::dotenv();

        let mut config = Self::default();

        if let Ok(mode) = std::env::var("SWINGSCAN_MODE") {
            if mode.eq_ignore_ascii_case("backtest") {
                config.detector.mode = Mode::Backtest;
            }
        }
        if let Ok(len) = std::env::var("SWINGSCAN_ATR_LENGTH") {
            if let Ok(len) = len.parse() {
                config.detector.atr_length = len;
            }
        }
        if let Ok(pct) = std::env::var("SWINGSCAN_PCT_MIN") {
            if let Ok(pct) = pct.parse() {
                config.detector.pct_min = pct;
            }
        }

        config
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.detector.atr_length >= 1, "atr_length must be >= 1");
        anyhow::ensure!(self.detector.rvol_window >= 1, "rvol_window must be >= 1");
        anyhow::ensure!(
            self.detector.hysteresis >= 1.0,
            "hysteresis must be >= 1.0, got {}",
            self.detector.hysteresis
        );
        anyhow::ensure!(
            self.detector.pct_min >= 0.0 && self.detector.atr_mult >= 0.0,
            "thresholds must be non-negative"
        );
        anyhow::ensure!(
            self.classifier.recent_pivot_count >= 4,
            "recent_pivot_count must be >= 4 (classification needs 2 highs + 2 lows)"
        );
        Ok(())
    }
}

/// Supplies fully resolved detector parameters per symbol/timeframe.
///
/// The detection core treats the resolved value as opaque input; it never
/// fetches or merges defaults itself.
pub trait ParameterResolver {
    fn resolve(&self, symbol: &str, timeframe: Timeframe) -> PivotParams;
}

/// Default resolver: crate-level defaults plus optional per-key overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    defaults: PivotParams,
    overrides: HashMap<(String, Timeframe), PivotParams>,
}

impl ConfigResolver {
    pub fn new(defaults: PivotParams) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(
        mut self,
        symbol: impl Into<String>,
        timeframe: Timeframe,
        params: PivotParams,
    ) -> Self {
        self.overrides.insert((symbol.into(), timeframe), params);
        self
    }
}

impl ParameterResolver for ConfigResolver {
    fn resolve(&self, symbol: &str, timeframe: Timeframe) -> PivotParams {
        self.overrides
            .get(&(symbol.to_string(), timeframe))
            .copied()
            .unwrap_or(self.defaults)
    }
}
