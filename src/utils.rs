// Utility functions
use chrono::{Local, NaiveDate};
use reqwest::Url;

/// Calendar date of the current run in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// True if `url` parses and its host is `domain` or a subdomain of it.
pub fn is_on_domain(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Builds `base?param=query`, form-encoding the query (spaces become '+').
pub fn build_search_url(base: &str, param: &str, query: &str) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    url.query_pairs_mut().append_pair(param, query);
    Some(url.into())
}
