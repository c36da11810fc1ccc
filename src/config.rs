use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub products: Vec<ProductConfig>,
    pub selectors: Vec<String>,
    #[serde(default = "default_block_markers")]
    pub block_markers: HashSet<String>,
    #[serde(default = "default_expected_domain")]
    pub expected_domain: String,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_search_param")]
    pub search_param: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,
    #[serde(default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default)]
    pub request_jitter_ms: u64,
    #[serde(default)]
    pub retry_attempts: u32,
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: f64,
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_block_markers() -> HashSet<String> {
    [
        "Robot Check",
        "Enter the characters you see below",
        "captcha",
        "api-services-support@amazon.com",
        "To discuss automated access to Amazon data",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_expected_domain() -> String {
    "amazon.in".into()
}

fn default_search_url() -> String {
    "https://www.amazon.in/s".into()
}

fn default_search_param() -> String {
    "k".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into()
}

fn default_nav_timeout_ms() -> u64 {
    30_000
}

fn default_selector_timeout_ms() -> u64 {
    1_500
}

fn default_settle_delay_ms() -> u64 {
    4_000
}

fn default_concurrency() -> usize {
    2
}

fn default_request_delay_ms() -> u64 {
    2_000
}

fn default_buy_threshold() -> f64 {
    1.05
}

fn default_short_window() -> usize {
    7
}

fn default_long_window() -> usize {
    30
}

fn default_database_path() -> String {
    "data/prices.db".into()
}

impl AppConfig {
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_jitter(&self) -> Duration {
        Duration::from_millis(self.request_jitter_ms)
    }

    /// Rejects configuration that would make a crawl meaningless. Called before any network work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selectors.is_empty() {
            return Err(ConfigError::Invalid("selector list is empty".into()));
        }
        for selector in &self.selectors {
            scraper::Selector::parse(selector)
                .map_err(|e| ConfigError::Invalid(format!("bad selector '{}': {}", selector, e)))?;
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.short_window == 0 || self.long_window == 0 {
            return Err(ConfigError::Invalid("rolling windows must be at least 1".into()));
        }
        if self.long_window < self.short_window {
            return Err(ConfigError::Invalid(
                "long window must not be shorter than short window".into(),
            ));
        }
        if !(self.buy_threshold.is_finite() && self.buy_threshold > 0.0) {
            return Err(ConfigError::Invalid("buy threshold must be positive".into()));
        }
        if self.products.iter().any(|p| p.name.trim().is_empty()) {
            return Err(ConfigError::Invalid("product with empty name".into()));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
