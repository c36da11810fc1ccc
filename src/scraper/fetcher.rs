use crate::model::FetchError;
use crate::scraper::traits::{PageSession, SessionFactory};

use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

/// Opens plain-HTTP sessions, each with its own client and cookie store.
pub struct HttpSessionFactory {
    user_agent: String,
}

impl HttpSessionFactory {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait::async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, FetchError> {
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(HttpSession { client, page: None })
    }
}

pub struct HttpSession {
    client: Client,
    page: Option<String>,
}

impl HttpSession {
    fn page(&self) -> Result<&str, FetchError> {
        self.page.as_deref().ok_or(FetchError::NoPage)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Navigation(e.to_string())
    }
}

#[async_trait::async_trait]
impl PageSession for HttpSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        self.page = None;

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        // Challenge pages often come back as 503, so the body is kept for block detection.
        let status = response.status();
        if !status.is_success() {
            warn!("Non-success status {} for {}", status, url);
        }

        let body = response.text().await.map_err(classify)?;
        debug!("Loaded {} ({} bytes)", url, body.len());
        self.page = Some(body);
        Ok(())
    }

    async fn title(&mut self) -> Result<String, FetchError> {
        Ok(page_title(self.page()?))
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.page().map(str::to_string)
    }

    async fn text_of(&mut self, selector: &str) -> Result<Option<String>, FetchError> {
        first_text(self.page()?, selector)
    }

    async fn close(&mut self) {
        self.page = None;
    }
}

pub fn page_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

pub fn first_text(html: &str, selector: &str) -> Result<Option<String>, FetchError> {
    let selector = Selector::parse(selector).map_err(|e| FetchError::Selector(e.to_string()))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string()))
}
