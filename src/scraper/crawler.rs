use crate::config::AppConfig;
use crate::model::{ExtractionStatus, PriceObservation, PriceResult, Product};
use crate::scraper::extractor::Extractor;
use crate::scraper::traits::{PageSession, SessionFactory};

use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::join_all;
use rand::Rng;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub concurrency: usize,
    pub request_delay: Duration,
    pub request_jitter: Duration,
    /// Extra attempts for `Timeout`/`Error` outcomes.
    pub retry_attempts: u32,
}

impl CrawlerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            request_delay: config.request_delay(),
            request_jitter: config.request_jitter(),
            retry_attempts: config.retry_attempts,
        }
    }

    fn next_delay(&self) -> Duration {
        let jitter_ms = self.request_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.request_delay;
        }
        self.request_delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }
}

/// Runs the extractor over a product list with a fixed pool of workers.
pub struct Crawler<F: SessionFactory> {
    factory: Arc<F>,
    extractor: Arc<Extractor>,
    config: CrawlerConfig,
}

impl<F> Crawler<F>
where
    F: SessionFactory + 'static,
{
    pub fn new(factory: F, extractor: Extractor, config: CrawlerConfig) -> Self {
        Self {
            factory: Arc::new(factory),
            extractor: Arc::new(extractor),
            config,
        }
    }

    /// One observation per product unless the run is cancelled, in which case
    /// products not yet finished are left out. Output order is arbitrary.
    pub async fn run(
        &self,
        products: &[Product],
        date: NaiveDate,
        cancel: watch::Receiver<bool>,
    ) -> Vec<PriceObservation> {
        if products.is_empty() {
            return Vec::new();
        }

        let products = Arc::new(products.to_vec());
        let width = self.config.concurrency.clamp(1, products.len());
        let (tx, mut rx) = mpsc::unbounded_channel();

        info!("Crawling {} products with {} workers", products.len(), width);

        let mut assignments = Vec::with_capacity(width);
        let mut handles = Vec::with_capacity(width);
        for worker_id in 0..width {
            let assigned: Vec<usize> = (worker_id..products.len()).step_by(width).collect();
            let worker = Worker {
                id: worker_id,
                assigned: assigned.clone(),
                products: products.clone(),
                factory: self.factory.clone(),
                extractor: self.extractor.clone(),
                config: self.config.clone(),
                date,
                cancel: cancel.clone(),
                tx: tx.clone(),
            };
            assignments.push(assigned);
            handles.push(tokio::spawn(worker.run()));
        }
        drop(tx);

        let joined = join_all(handles).await;

        let mut reported = vec![false; products.len()];
        let mut observations = Vec::with_capacity(products.len());
        while let Ok((idx, observation)) = rx.try_recv() {
            reported[idx] = true;
            observations.push(observation);
        }

        let was_cancelled = *cancel.borrow();
        for (assigned, result) in assignments.iter().zip(joined) {
            let Err(e) = result else { continue };
            error!("Crawl worker died: {}", e);
            if was_cancelled {
                continue;
            }
            for &idx in assigned.iter().filter(|&&idx| !reported[idx]) {
                observations.push(PriceObservation::failed(
                    &products[idx],
                    date,
                    ExtractionStatus::Error,
                ));
            }
        }

        info!("Crawl finished with {} observations", observations.len());
        observations
    }
}

struct Worker<F: SessionFactory> {
    id: usize,
    assigned: Vec<usize>,
    products: Arc<Vec<Product>>,
    factory: Arc<F>,
    extractor: Arc<Extractor>,
    config: CrawlerConfig,
    date: NaiveDate,
    cancel: watch::Receiver<bool>,
    tx: mpsc::UnboundedSender<(usize, PriceObservation)>,
}

impl<F: SessionFactory> Worker<F> {
    async fn run(mut self) {
        let mut session = match self.factory.open().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Worker {} could not open a session: {}", self.id, e);
                for &idx in &self.assigned {
                    let observation =
                        PriceObservation::failed(&self.products[idx], self.date, ExtractionStatus::Error);
                    if self.tx.send((idx, observation)).is_err() {
                        break;
                    }
                }
                return;
            }
        };

        for (n, &idx) in self.assigned.iter().enumerate() {
            if *self.cancel.borrow() {
                info!("Worker {} stopping: run cancelled", self.id);
                break;
            }

            let product = &self.products[idx];
            let result = tokio::select! {
                result = extract_guarded(&self.extractor, &mut session, product, &self.config) => result,
                _ = cancelled(&mut self.cancel) => {
                    info!("Worker {} abandoned {}: run cancelled", self.id, product.name);
                    break;
                }
            };

            match result.status {
                ExtractionStatus::Ok => info!(
                    "[{}] {} -> {:.2}",
                    result.status,
                    product.name,
                    result.price.unwrap_or_default()
                ),
                status => warn!("[{}] {} -> no price", status, product.name),
            }

            let observation = PriceObservation::from_result(product, self.date, result);
            if self.tx.send((idx, observation)).is_err() {
                break;
            }

            if n + 1 < self.assigned.len() {
                tokio::select! {
                    _ = sleep(self.config.next_delay()) => {}
                    _ = cancelled(&mut self.cancel) => break,
                }
            }
        }

        session.close().await;
    }
}

/// Extracts with bounded retries; a panic inside the session becomes an `Error` outcome.
/// Retries wait the same inter-request delay as a new product would.
async fn extract_guarded<S: PageSession>(
    extractor: &Extractor,
    session: &mut S,
    product: &Product,
    config: &CrawlerConfig,
) -> PriceResult {
    let retries = config.retry_attempts;
    let mut attempt = 0;
    loop {
        let result = match AssertUnwindSafe(extractor.extract(&mut *session, product))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                error!("Extraction of {} panicked", product.name);
                PriceResult::failed(ExtractionStatus::Error)
            }
        };

        let retryable = matches!(
            result.status,
            ExtractionStatus::Timeout | ExtractionStatus::Error
        );
        if !retryable || attempt >= retries {
            return result;
        }
        attempt += 1;
        warn!(
            "Retrying {} after {} (attempt {}/{})",
            product.name, result.status, attempt, retries
        );
        sleep(config.next_delay()).await;
    }
}

/// Resolves once cancellation is requested; never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}
