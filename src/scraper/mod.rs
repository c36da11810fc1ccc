// Page retrieval: fetch sessions, single-page extraction and the concurrent crawler.

pub mod crawler;
pub mod extractor;
pub mod fetcher;
pub mod traits;

#[cfg(test)]
pub(crate) mod fake;

pub use crawler::{Crawler, CrawlerConfig};
pub use extractor::{Extractor, ExtractorConfig};
pub use fetcher::HttpSessionFactory;
pub use traits::{PageSession, SessionFactory};
