// Observation log: in-memory time series plus SQLite persistence.

pub mod series;
pub mod sqlite;

pub use series::{Snapshot, TimeSeriesStore};
pub use sqlite::SqliteStorage;
