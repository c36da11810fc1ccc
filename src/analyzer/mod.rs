// Analyzer module: derived per-product price statistics.

pub mod price_analysis;
pub mod rolling;

pub use price_analysis::{AnalyticsConfig, AnalyticsEngine, buy_candidates};
