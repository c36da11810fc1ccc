// In-process page sessions for tests.
use crate::model::FetchError;
use crate::scraper::traits::{PageSession, SessionFactory};

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Every `goto` across all sessions of one factory, with the time it happened.
pub type VisitLog = Arc<Mutex<Vec<(String, Instant)>>>;

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: String,
    pub html: String,
    pub texts: HashMap<String, String>,
    pub slow: HashSet<String>,
}

impl FakePage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            html: "<html><body></body></html>".to_string(),
            ..Self::default()
        }
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.html = html.to_string();
        self
    }

    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_slow_text(mut self, selector: &str, text: &str) -> Self {
        self.slow.insert(selector.to_string());
        self.with_text(selector, text)
    }
}

#[derive(Debug, Clone)]
pub enum FakeNav {
    Page(FakePage),
    Timeout,
    Fail,
    Panic,
}

pub struct FakeSession {
    sites: Arc<HashMap<String, FakeNav>>,
    current: Option<FakePage>,
    pub visited: Vec<String>,
    pub queried: Vec<String>,
    closed: Option<Arc<AtomicUsize>>,
    log: Option<VisitLog>,
}

impl FakeSession {
    pub fn new(sites: Arc<HashMap<String, FakeNav>>) -> Self {
        Self {
            sites,
            current: None,
            visited: Vec::new(),
            queried: Vec::new(),
            closed: None,
            log: None,
        }
    }
}

#[async_trait::async_trait]
impl PageSession for FakeSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), FetchError> {
        self.visited.push(url.to_string());
        if let Some(log) = &self.log {
            log.lock().unwrap().push((url.to_string(), Instant::now()));
        }
        self.current = None;
        match self.sites.get(url) {
            Some(FakeNav::Page(page)) => {
                self.current = Some(page.clone());
                Ok(())
            }
            Some(FakeNav::Timeout) => Err(FetchError::Timeout),
            Some(FakeNav::Panic) => panic!("fake session exploded on {}", url),
            Some(FakeNav::Fail) | None => Err(FetchError::Navigation(format!("no route to {}", url))),
        }
    }

    async fn title(&mut self) -> Result<String, FetchError> {
        self.current.as_ref().map(|p| p.title.clone()).ok_or(FetchError::NoPage)
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.current.as_ref().map(|p| p.html.clone()).ok_or(FetchError::NoPage)
    }

    async fn text_of(&mut self, selector: &str) -> Result<Option<String>, FetchError> {
        self.queried.push(selector.to_string());
        let page = self.current.as_ref().ok_or(FetchError::NoPage)?;
        if page.slow.contains(selector) {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        Ok(page.texts.get(selector).cloned())
    }

    async fn close(&mut self) {
        if let Some(closed) = &self.closed {
            closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub sites: Arc<HashMap<String, FakeNav>>,
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    pub visits: VisitLog,
    pub fail_open: bool,
}

impl FakeFactory {
    pub fn new(sites: HashMap<String, FakeNav>) -> Self {
        Self {
            sites: Arc::new(sites),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, FetchError> {
        if self.fail_open {
            return Err(FetchError::Client("no browser".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let mut session = FakeSession::new(self.sites.clone());
        session.closed = Some(self.closed.clone());
        session.log = Some(self.visits.clone());
        Ok(session)
    }
}
