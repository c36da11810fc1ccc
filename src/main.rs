mod analyzer;
mod config;
mod model;
mod normalizer;
mod parser;
mod scraper;
mod storage;
mod utils;

use analyzer::{AnalyticsConfig, AnalyticsEngine, buy_candidates};
use config::{AppConfig, load_config};
use model::ExtractionStatus;
use normalizer::normalize_all;
use scraper::{Crawler, CrawlerConfig, Extractor, ExtractorConfig, HttpSessionFactory};
use storage::{SqliteStorage, TimeSeriesStore};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".into());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// One crawl followed by a full analytics recompute.
async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let products = normalize_all(&config.products);
    info!("Products to track: {}", products.len());

    if let Some(parent) = Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut storage = SqliteStorage::new(&config.database_path)?;
    storage.save_products(&products)?;
    let mut store = TimeSeriesStore::from_log(storage.load_observations()?);
    if store.is_empty() {
        info!("No prior observations, starting a fresh log");
    } else {
        info!("Loaded {} prior observations", store.len());
    }

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Stop requested, abandoning in-flight products...");
            let _ = cancel_tx.send(true);
        }
    });

    let crawler = Crawler::new(
        HttpSessionFactory::new(config.user_agent.clone()),
        Extractor::new(ExtractorConfig::from_app_config(config)),
        CrawlerConfig::from_app_config(config),
    );
    let observations = crawler.run(&products, utils::today(), cancel_rx).await;

    let mut by_status: HashMap<ExtractionStatus, usize> = HashMap::new();
    for observation in &observations {
        *by_status.entry(observation.status).or_default() += 1;
    }
    for (status, count) in &by_status {
        info!("Outcome {}: {}", status, count);
    }
    if observations.len() < products.len() {
        warn!(
            "{} products left out of this run",
            products.len() - observations.len()
        );
    }

    storage.append_observations(&observations)?;
    store.append(observations);

    let engine = AnalyticsEngine::new(AnalyticsConfig::from_app_config(config));
    let analytics = engine.compute(&store.snapshot());
    let written = storage.replace_analytics(analytics.values().flatten())?;
    info!("Analytics rows written: {}", written);

    for row in buy_candidates(&analytics) {
        info!(
            "Buy signal: {} at {:.2} (low {:.2})",
            row.observation.product_name,
            row.observation.price.unwrap_or_default(),
            row.rolling_min_30d.unwrap_or_default()
        );
    }

    Ok(())
}
