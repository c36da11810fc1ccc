use crate::model::PriceObservation;
use std::collections::BTreeMap;

/// Per-product observations, sorted by date with ties in insertion order.
pub type Snapshot = BTreeMap<String, Vec<PriceObservation>>;

/// Append-only observation log. Ordering is resolved at snapshot time, so
/// arrival order across products (or within one) does not matter.
#[derive(Debug, Default)]
pub struct TimeSeriesStore {
    log: Vec<PriceObservation>,
}

impl TimeSeriesStore {
    /// Rebuilds a store from a previously persisted log, given in insertion order.
    pub fn from_log(log: Vec<PriceObservation>) -> Self {
        Self { log }
    }

    pub fn append(&mut self, observations: impl IntoIterator<Item = PriceObservation>) {
        self.log.extend(observations);
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut grouped = Snapshot::new();
        for observation in &self.log {
            grouped
                .entry(observation.product_name.clone())
                .or_default()
                .push(observation.clone());
        }
        for series in grouped.values_mut() {
            // sort_by_key is stable: same-date entries keep insertion order
            series.sort_by_key(|o| o.date);
        }
        grouped
    }
}
