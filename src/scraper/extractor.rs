use crate::config::AppConfig;
use crate::model::{ExtractionStatus, FetchError, PriceResult, Product};
use crate::parser::{is_blocked, parse_price};
use crate::scraper::traits::PageSession;
use crate::utils::{build_search_url, is_on_domain};

use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Price selectors in priority order.
    pub selectors: Vec<String>,
    pub block_markers: HashSet<String>,
    pub nav_timeout: Duration,
    pub selector_timeout: Duration,
    pub settle_delay: Duration,
    pub expected_domain: String,
    pub search_url: String,
    pub search_param: String,
}

impl ExtractorConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            selectors: config.selectors.clone(),
            block_markers: config.block_markers.clone(),
            nav_timeout: config.nav_timeout(),
            selector_timeout: config.selector_timeout(),
            settle_delay: config.settle_delay(),
            expected_domain: config.expected_domain.clone(),
            search_url: config.search_url.clone(),
            search_param: config.search_param.clone(),
        }
    }
}

/// Visits one product page and classifies the outcome. Never retries.
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Direct URL when it points at the expected domain, otherwise a search on the normalized key.
    pub fn resolve_target(&self, product: &Product) -> Option<String> {
        if let Some(url) = product.url.as_deref() {
            if is_on_domain(url, &self.config.expected_domain) {
                return Some(url.to_string());
            }
            debug!("Ignoring off-domain url for {}: {}", product.name, url);
        }

        if product.normalized_key.is_empty() {
            return None;
        }
        build_search_url(
            &self.config.search_url,
            &self.config.search_param,
            &product.normalized_key,
        )
    }

    pub async fn extract<S>(&self, session: &mut S, product: &Product) -> PriceResult
    where
        S: PageSession + ?Sized,
    {
        let Some(url) = self.resolve_target(product) else {
            return PriceResult::failed(ExtractionStatus::NotFound);
        };

        match session.goto(&url, self.config.nav_timeout).await {
            Ok(()) => {}
            Err(FetchError::Timeout) => return PriceResult::failed(ExtractionStatus::Timeout),
            Err(e) => {
                debug!("Navigation to {} failed: {}", url, e);
                return PriceResult::failed(ExtractionStatus::Error);
            }
        }

        if !self.config.settle_delay.is_zero() {
            sleep(self.config.settle_delay).await;
        }

        let page = async { Ok::<_, FetchError>((session.title().await?, session.content().await?)) };
        let (title, html) = match page.await {
            Ok(page) => page,
            Err(e) => {
                debug!("Reading page {} failed: {}", url, e);
                return PriceResult::failed(ExtractionStatus::Error);
            }
        };

        if is_blocked(&title, &html, &self.config.block_markers) {
            return PriceResult::failed(ExtractionStatus::Blocked);
        }

        let Some(text) = self.first_price_text(session).await else {
            return PriceResult::failed(ExtractionStatus::NotFound);
        };

        match parse_price(&text) {
            Some(price) => PriceResult::ok(price),
            None => {
                debug!("Unparsable price text for {}: {:?}", product.name, text);
                PriceResult::failed(ExtractionStatus::NotFound)
            }
        }
    }

    /// First non-empty text among the selectors, each bounded by the selector timeout.
    async fn first_price_text<S>(&self, session: &mut S) -> Option<String>
    where
        S: PageSession + ?Sized,
    {
        for selector in &self.config.selectors {
            match timeout(self.config.selector_timeout, session.text_of(selector)).await {
                Ok(Ok(Some(text))) if !text.trim().is_empty() => {
                    debug!("Selector '{}' matched: {:?}", selector, text);
                    return Some(text);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!("Selector '{}' failed: {}", selector, e),
                Err(_) => debug!("Selector '{}' timed out", selector),
            }
        }
        None
    }
}
