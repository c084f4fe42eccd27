//! Offline pivot & pattern scanner
//!
//! Reads a JSON array of OHLCV bars from a file, runs the full detection
//! pipeline (volatility → zigzag pivots → swing metrics → pattern lines) and
//! logs the results. Useful for eyeballing parameter choices against a saved
//! candle dump before wiring the engine into anything bigger.
//!
//! Usage:  cargo run --bin scan -- <candles.json> [SYMBOL] [TIMEFRAME]
//!
//! TIMEFRAME is one of 1m, 5m, 15m, 1h, 1d (default 15m). Detector mode can
//! be switched with SWINGSCAN_MODE=BACKTEST to include the trailing
//! unconfirmed leg.

use swingscan::config::Config;
use swingscan::engine::PivotEngine;
use swingscan::models::{Bar, Timeframe};

use tracing::{info, warn};

fn parse_timeframe(label: &str) -> Option<Timeframe> {
    match label {
        "1m" => Some(Timeframe::M1),
        "5m" => Some(Timeframe::M5),
        "15m" => Some(Timeframe::M15),
        "1h" => Some(Timeframe::H1),
        "1d" => Some(Timeframe::D1),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: scan <candles.json> [SYMBOL] [TIMEFRAME]"))?;
    let symbol = args.next().unwrap_or_else(|| "SIM".to_string());
    let timeframe = match args.next() {
        Some(label) => parse_timeframe(&label)
            .ok_or_else(|| anyhow::anyhow!("unknown timeframe '{label}'"))?,
        None => Timeframe::M15,
    };

    let config = Config::load_or_default();
    config.validate()?;

    let raw = std::fs::read_to_string(&path)?;
    let bars: Vec<Bar> = serde_json::from_str(&raw)?;
    info!("loaded {} bars from {path}", bars.len());
    if bars.is_empty() {
        warn!("empty candle file, nothing to scan");
        return Ok(());
    }

    let engine = PivotEngine::with_defaults(config);
    let pivots = engine.pivots(&symbol, timeframe, &bars);
    info!("{symbol}@{timeframe}: {} pivots", pivots.len());
    for p in &pivots {
        info!(
            "  {:?} {} @ bar {} value {:.4} atr {:.4} retr {:?} ext {:?}",
            p.kind, p.timestamp, p.bar_index, p.value, p.atr_at_pivot,
            p.retracement_pct, p.extension_pct
        );
    }

    let lines = engine.patterns(&symbol, timeframe, &bars);
    info!("{} pattern lines", lines.len());
    for line in &lines {
        info!(
            "  {:?} {:?} ({},{:.4}) -> ({},{:.4}) slope {:.6}/bar conf {:.2} group {}",
            line.pattern, line.side, line.start_idx, line.y1, line.end_idx, line.y2,
            line.slope_per_bar, line.confidence, line.group_id
        );
    }

    Ok(())
}
