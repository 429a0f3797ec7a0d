use reqwest::Client;

use crate::modes::Mode;
use crate::request::{fetch_listing_head, Site};
use crate::{parse, Result, MAX_PAGES, PAGE_SIZE};

/// What one mode's listing head reports: the comment total the site claims
/// and the number of pages actually worth fetching. Computed once per mode,
/// before any page task is dispatched.
#[derive(Debug, Clone, Copy)]
pub struct CrawlTotals {
    pub comments: u64,
    pub pages: usize,
}

/// One retrieval against the listing head, then the page arithmetic.
/// Network failures surface as `Error::Reqwest`, an unreadable count
/// indicator as `Error::MalformedSummary`.
pub async fn resolve(
    client: &Client,
    site: &Site,
    movie_id: &str,
    mode: Mode,
) -> Result<CrawlTotals> {
    let html = fetch_listing_head(client, site, movie_id, mode).await?;
    let comments = parse::extract_total(&html)?;
    Ok(CrawlTotals {
        comments,
        pages: pages_for(comments),
    })
}

/// 20 comments per page, capped at 25 pages. The cap is policy, not a site
/// limit: it trades completeness for a bounded runtime on popular titles.
pub fn pages_for(comments: u64) -> usize {
    (comments as usize).div_ceil(PAGE_SIZE).min(MAX_PAGES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_capped() {
        assert_eq!(pages_for(137163), 25);
    }

    #[test]
    fn partial_page_rounds_up() {
        assert_eq!(pages_for(15), 1);
        assert_eq!(pages_for(21), 2);
        assert_eq!(pages_for(40), 2);
    }

    #[test]
    fn no_comments_means_no_pages() {
        assert_eq!(pages_for(0), 0);
    }

    #[test]
    fn cap_boundary() {
        assert_eq!(pages_for(500), 25);
        assert_eq!(pages_for(501), 25);
        assert_eq!(pages_for(499), 25);
        assert_eq!(pages_for(480), 24);
    }
}
