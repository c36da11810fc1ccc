use crate::model::{AnalyticsRow, ExtractionStatus, PriceObservation, Product, StorageError};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};

/// Persists the observation log and the derived analytics table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database and runs migrations. A fresh file is an empty log.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS observations (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                product_name TEXT NOT NULL,
                date TEXT NOT NULL,
                price REAL,
                status TEXT NOT NULL DEFAULT 'ok'
            );

            CREATE TABLE IF NOT EXISTS products (
                name TEXT PRIMARY KEY,
                normalized_key TEXT NOT NULL,
                url TEXT
            );

            CREATE TABLE IF NOT EXISTS analytics (
                product_name TEXT NOT NULL,
                date TEXT NOT NULL,
                price REAL,
                status TEXT NOT NULL,
                price_change_abs REAL,
                price_change_pct REAL,
                rolling_avg_7d REAL,
                rolling_min_7d REAL,
                rolling_max_7d REAL,
                rolling_min_30d REAL,
                rolling_max_30d REAL,
                buy_signal INTEGER NOT NULL
            );
            "
        )?;

        // Logs written before outcome classification only carry a price.
        Self::migrate_add_column_if_missing(&conn, "observations", "status", "TEXT NOT NULL DEFAULT 'ok'")?;

        Ok(Self { conn })
    }

    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    /// Rewrites the normalized catalog used by the current run.
    pub fn save_products(&mut self, products: &[Product]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        {
            tx.execute("DELETE FROM products", [])?;
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO products (name, normalized_key, url) VALUES (?1, ?2, ?3)",
            )?;
            for p in products {
                stmt.execute(params![&p.name, &p.normalized_key, &p.url])?;
            }
        }
        tx.commit()?;
        Ok(products.len())
    }

    /// Whole log in insertion order.
    pub fn load_observations(&self) -> Result<Vec<PriceObservation>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT product_name, date, price, status FROM observations ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map([], Self::map_observation)?;
        let mut observations = Vec::new();
        for row in rows {
            observations.push(row??);
        }

        Ok(observations)
    }

    /// Inserts one run's observations atomically. Existing rows are never touched.
    pub fn append_observations(&mut self, observations: &[PriceObservation]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO observations (product_name, date, price, status) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for o in observations {
                stmt.execute(params![&o.product_name, &o.date, &o.price, o.status.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Replaces the analytics table with a freshly computed set of rows.
    pub fn replace_analytics<'a>(
        &mut self,
        rows: impl IntoIterator<Item = &'a AnalyticsRow>,
    ) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            tx.execute("DELETE FROM analytics", [])?;
            let mut stmt = tx.prepare(
                "INSERT INTO analytics (
                    product_name, date, price, status,
                    price_change_abs, price_change_pct,
                    rolling_avg_7d, rolling_min_7d, rolling_max_7d,
                    rolling_min_30d, rolling_max_30d, buy_signal
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                let o = &row.observation;
                stmt.execute(params![
                    &o.product_name,
                    &o.date,
                    &o.price,
                    o.status.as_str(),
                    &row.price_change_abs,
                    &row.price_change_pct,
                    &row.rolling_avg_7d,
                    &row.rolling_min_7d,
                    &row.rolling_max_7d,
                    &row.rolling_min_30d,
                    &row.rolling_max_30d,
                    row.buy_signal,
                ])?;
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Maps a row to an observation. The outer error is SQL-level, the inner one a
    /// value that cannot be an observation.
    fn map_observation(row: &Row) -> Result<Result<PriceObservation, StorageError>, rusqlite::Error> {
        let product_name: String = row.get(0)?;
        let date: NaiveDate = row.get(1)?;
        let price: Option<f64> = row.get(2)?;
        let status_str: String = row.get(3)?;

        let status = match status_str.parse::<ExtractionStatus>() {
            Ok(status) => status,
            Err(e) => return Ok(Err(StorageError::Corrupt(e))),
        };

        let observation = match (status, price) {
            (ExtractionStatus::Ok, Some(_)) => PriceObservation { product_name, date, price, status },
            // Legacy rows recorded a miss as an empty price with no status.
            (ExtractionStatus::Ok, None) => PriceObservation {
                product_name,
                date,
                price: None,
                status: ExtractionStatus::NotFound,
            },
            (_, Some(p)) => {
                return Ok(Err(StorageError::Corrupt(format!(
                    "{} on {} has price {} with status {}",
                    product_name, date, p, status
                ))));
            }
            (_, None) => PriceObservation { product_name, date, price: None, status },
        };

        Ok(Ok(observation))
    }
}
