// Core structs: Product, PriceObservation, AnalyticsRow
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::normalizer::normalize_name;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub normalized_key: String,
    pub url: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        let name = name.into();
        let normalized_key = normalize_name(&name);
        Self {
            name,
            normalized_key,
            url,
        }
    }
}

/// Outcome classification of a single extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStatus {
    Ok,
    Blocked,
    NotFound,
    Timeout,
    Error,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Ok => "ok",
            ExtractionStatus::Blocked => "blocked",
            ExtractionStatus::NotFound => "not_found",
            ExtractionStatus::Timeout => "timeout",
            ExtractionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(ExtractionStatus::Ok),
            "blocked" => Ok(ExtractionStatus::Blocked),
            "not_found" => Ok(ExtractionStatus::NotFound),
            "timeout" => Ok(ExtractionStatus::Timeout),
            "error" => Ok(ExtractionStatus::Error),
            other => Err(format!("unknown extraction status '{}'", other)),
        }
    }
}

/// Result of one `Extractor::extract` call. `price` is `Some` iff `status` is `Ok`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceResult {
    pub status: ExtractionStatus,
    pub price: Option<f64>,
}

impl PriceResult {
    pub fn ok(price: f64) -> Self {
        Self {
            status: ExtractionStatus::Ok,
            price: Some(price),
        }
    }

    pub fn failed(status: ExtractionStatus) -> Self {
        debug_assert!(status != ExtractionStatus::Ok);
        Self {
            status,
            price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub product_name: String,
    pub date: NaiveDate,
    pub price: Option<f64>,
    pub status: ExtractionStatus,
}

impl PriceObservation {
    pub fn from_result(product: &Product, date: NaiveDate, result: PriceResult) -> Self {
        Self {
            product_name: product.name.clone(),
            date,
            price: result.price,
            status: result.status,
        }
    }

    pub fn failed(product: &Product, date: NaiveDate, status: ExtractionStatus) -> Self {
        Self::from_result(product, date, PriceResult::failed(status))
    }
}

/// An observation plus the fields derived from its product's history.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsRow {
    pub observation: PriceObservation,
    pub price_change_abs: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub rolling_avg_7d: Option<f64>,
    pub rolling_min_7d: Option<f64>,
    pub rolling_max_7d: Option<f64>,
    pub rolling_min_30d: Option<f64>,
    pub rolling_max_30d: Option<f64>,
    pub buy_signal: bool,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("navigation timed out")]
    Timeout,
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("no page loaded")]
    NoPage,
    #[error("selector lookup failed: {0}")]
    Selector(String),
    #[error("http client error: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}
