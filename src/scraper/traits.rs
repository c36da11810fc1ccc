use crate::model::FetchError;
use std::time::Duration;

/// One browsing context: a cookie jar plus the currently loaded page.
/// Never shared between crawl workers.
#[async_trait::async_trait]
pub trait PageSession: Send {
    /// Loads `url`, failing with `FetchError::Timeout` if it takes longer than `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError>;
    async fn title(&mut self) -> Result<String, FetchError>;
    async fn content(&mut self) -> Result<String, FetchError>;
    /// Text of the first element matching `selector`, or `None` if nothing matches.
    async fn text_of(&mut self, selector: &str) -> Result<Option<String>, FetchError>;
    async fn close(&mut self);
}

#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: PageSession + 'static;

    async fn open(&self) -> Result<Self::Session, FetchError>;
}
