use crate::analyzer::rolling::{rolling_max, rolling_mean, rolling_min};
use crate::config::AppConfig;
use crate::model::{AnalyticsRow, PriceObservation};
use crate::storage::Snapshot;
use std::collections::BTreeMap;

/// Analytics rows per product, in the same order as the snapshot series.
pub type Analytics = BTreeMap<String, Vec<AnalyticsRow>>;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Window behind the `*_7d` fields.
    pub short_window: usize,
    /// Window behind the `*_30d` fields.
    pub long_window: usize,
    /// A price at most `long-window low * buy_threshold` raises the buy signal.
    pub buy_threshold: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            short_window: 7,
            long_window: 30,
            buy_threshold: 1.05,
        }
    }
}

impl AnalyticsConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            short_window: config.short_window,
            long_window: config.long_window,
            buy_threshold: config.buy_threshold,
        }
    }
}

pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Derives rows for every product independently. Pure: same snapshot, same output.
    pub fn compute(&self, snapshot: &Snapshot) -> Analytics {
        snapshot
            .iter()
            .map(|(name, series)| (name.clone(), self.compute_series(series)))
            .collect()
    }

    /// Row `i` only looks at `series[..=i]`, so appending later observations
    /// never changes earlier rows.
    pub fn compute_series(&self, series: &[PriceObservation]) -> Vec<AnalyticsRow> {
        let prices: Vec<Option<f64>> = series.iter().map(|o| o.price).collect();
        let short = self.config.short_window;
        let long = self.config.long_window;

        series
            .iter()
            .enumerate()
            .map(|(i, observation)| {
                let price = prices[i];
                let prev = if i > 0 { prices[i - 1] } else { None };

                let price_change_abs = match (price, prev) {
                    (Some(p), Some(q)) => Some(p - q),
                    _ => None,
                };
                let price_change_pct = match (price, prev) {
                    (Some(p), Some(q)) if q != 0.0 => Some((p - q) / q * 100.0),
                    _ => None,
                };

                let rolling_min_30d = rolling_min(&prices, i, long);
                let buy_signal = match (price, rolling_min_30d) {
                    (Some(p), Some(low)) => p <= low * self.config.buy_threshold,
                    _ => false,
                };

                AnalyticsRow {
                    observation: observation.clone(),
                    price_change_abs,
                    price_change_pct,
                    rolling_avg_7d: rolling_mean(&prices, i, short),
                    rolling_min_7d: rolling_min(&prices, i, short),
                    rolling_max_7d: rolling_max(&prices, i, short),
                    rolling_min_30d,
                    rolling_max_30d: rolling_max(&prices, i, long),
                    buy_signal,
                }
            })
            .collect()
    }
}

/// Latest row of each product whose latest row carries a buy signal.
pub fn buy_candidates(analytics: &Analytics) -> Vec<&AnalyticsRow> {
    analytics
        .values()
        .filter_map(|rows| rows.last())
        .filter(|row| row.buy_signal)
        .collect()
}
