use std::time::Duration;

use reqwest::{header, Client};

use crate::modes::Mode;
use crate::{Result, PAGE_SIZE, REQUEST_TIMEOUT_SECS};

/// The remote endpoint plus the opaque session context sent with every
/// request. The base URL is swappable so tests can point the whole engine at
/// a local server.
#[derive(Debug, Clone)]
pub struct Site {
    pub base_url: String,
    pub cookie: Option<String>,
    pub user_agent: String,
}

impl Site {
    pub fn douban() -> Self {
        Self {
            base_url: "https://movie.douban.com".into(),
            cookie: None,
            user_agent: concat!("dbscrape/", env!("CARGO_PKG_VERSION")).into(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Site::douban()
        }
    }

    /// Builds the shared client: session headers plus the per-request
    /// timeout. Client uses Arc internally so callers clone it cheaply.
    pub fn client(&self) -> Result<Client> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&self.user_agent)?,
        );
        if let Some(cookie) = &self.cookie {
            headers.insert(header::COOKIE, header::HeaderValue::from_str(cookie)?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(client)
    }

    fn comments_url(&self, movie_id: &str) -> String {
        format!("{}/subject/{movie_id}/comments", self.base_url)
    }
}

/// Requests the head of a mode's listing, the page the comment-count
/// indicator is read from. Carries no `start` offset.
pub(crate) async fn fetch_listing_head(
    client: &Client,
    site: &Site,
    movie_id: &str,
    mode: Mode,
) -> Result<String> {
    let mut req = client.get(site.comments_url(movie_id)).query(&[
        ("sort", mode.sort.as_param().to_string()),
        ("status", "P".to_string()),
        ("limit", PAGE_SIZE.to_string()),
    ]);
    if let Some(sentiment) = mode.sentiment {
        req = req.query(&[("percent_type", sentiment.as_param())]);
    }

    let res = req.send().await?.error_for_status()?;
    Ok(res.text().await?)
}

/// Requests one page of a mode's listing and returns the raw HTML. No retry
/// here; the worker pool decides what a failed page costs.
pub(crate) async fn fetch_page(
    client: &Client,
    site: &Site,
    movie_id: &str,
    mode: Mode,
    page: usize,
) -> Result<String> {
    let start = page * PAGE_SIZE;
    let mut req = client.get(site.comments_url(movie_id)).query(&[
        ("start", start.to_string()),
        ("limit", PAGE_SIZE.to_string()),
        ("status", "P".to_string()),
        ("sort", mode.sort.as_param().to_string()),
    ]);
    if let Some(sentiment) = mode.sentiment {
        req = req.query(&[("percent_type", sentiment.as_param())]);
    }

    let res = req.send().await?.error_for_status()?;
    Ok(res.text().await?)
}
