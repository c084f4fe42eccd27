pub mod metrics;
pub mod volatility;
pub mod zigzag;
