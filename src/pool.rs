use std::sync::Arc;

use chrono::Local;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::modes::Mode;
use crate::pacing::Pacing;
use crate::request::{fetch_page, Site};
use crate::sink::Sink;
use crate::{info_time, parse, warn_time, Result};

/// Per-mode outcome counts, reported once the pool drains.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModeStats {
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub comments: usize,
}

/// What a single page task resolved to. Fetch failures land here instead of
/// in the `Result` so one dead page never takes its siblings down.
enum PageOutcome {
    Served(usize),
    Failed,
    Cancelled,
}

/// Fans one mode's pages out over a bounded set of workers and waits for all
/// of them. Every page index in `[0, total_pages)` becomes one task; the
/// semaphore keeps at most `workers` of them in flight, and each holds its
/// permit through the post-page pacing pause so the pause also throttles.
///
/// Errors returned here are fatal (sink I/O, runtime); a page that merely
/// failed to fetch is counted in the stats and logged.
pub async fn crawl_mode(
    client: &Client,
    site: &Site,
    movie_id: &str,
    mode: Mode,
    total_pages: usize,
    sink: &Sink,
    pacing: Pacing,
    workers: usize,
    cancel: &CancellationToken,
) -> Result<ModeStats> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for page in 0..total_pages {
        let permits = Arc::clone(&permits);
        let client = client.clone();
        let site = site.clone();
        let movie_id = movie_id.to_owned();
        let sink = sink.clone();
        let cancel = cancel.clone();

        tasks.spawn(async move {
            crawl_single_page(
                permits,
                client,
                site,
                movie_id,
                mode,
                page,
                total_pages,
                sink,
                pacing,
                cancel,
            )
            .await
        });
    }

    let mut stats = ModeStats::default();
    while let Some(joined) = tasks.join_next().await {
        match joined?? {
            PageOutcome::Served(count) => {
                stats.pages_ok += 1;
                stats.comments += count;
            }
            PageOutcome::Failed => stats.pages_failed += 1,
            PageOutcome::Cancelled => {}
        }
    }
    Ok(stats)
}

async fn crawl_single_page(
    permits: Arc<Semaphore>,
    client: Client,
    site: Site,
    movie_id: String,
    mode: Mode,
    page: usize,
    total_pages: usize,
    sink: Sink,
    pacing: Pacing,
    cancel: CancellationToken,
) -> Result<PageOutcome> {
    // Permits hand out in request order, so pages start ascending even
    // though they finish in whatever order the network decides. A closed
    // semaphore only happens on teardown.
    let Ok(_permit) = permits.acquire_owned().await else {
        return Ok(PageOutcome::Cancelled);
    };
    if cancel.is_cancelled() {
        return Ok(PageOutcome::Cancelled);
    }

    info_time!("[{}] fetching page {}/{}", mode.label, page + 1, total_pages);
    let fetched = tokio::select! {
        _ = cancel.cancelled() => return Ok(PageOutcome::Cancelled),
        fetched = fetch_page(&client, &site, &movie_id, mode, page) => fetched,
    };

    match fetched {
        Ok(html) => {
            let comments = parse::parse_page(html, mode.label).await?;
            let count = comments.len();
            sink.write(comments).await?;
            pacing.after_success().await;
            Ok(PageOutcome::Served(count))
        }
        Err(err) => {
            warn_time!("[{}] page {} failed: {err}", mode.label, page + 1);
            pacing.after_failure().await;
            Ok(PageOutcome::Failed)
        }
    }
}
