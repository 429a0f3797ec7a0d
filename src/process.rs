use std::path::PathBuf;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::modes::Mode;
use crate::pacing::Pacing;
use crate::pool;
use crate::request::Site;
use crate::resolve;
use crate::sink;
use crate::{info_time, warn_time, Result, WORKER_COUNT};

/// Run-wide knobs the CLI maps onto.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub out: PathBuf,
    pub workers: usize,
    pub pacing: Pacing,
    /// Skip a mode whose count resolution fails instead of aborting the run.
    pub keep_going: bool,
}

impl CrawlOptions {
    pub fn new(out: impl Into<PathBuf>) -> Self {
        Self {
            out: out.into(),
            workers: WORKER_COUNT,
            pacing: Pacing::polite(),
            keep_going: false,
        }
    }

    /// The original tool's naming scheme for the output file.
    pub fn default_out_path(movie_id: &str) -> PathBuf {
        PathBuf::from(format!("douban_comments_{movie_id}_all_sorts.csv"))
    }
}

/// Crawls the full mode catalog for one movie and returns the output path.
pub async fn crawl_all(
    site: &Site,
    movie_id: &str,
    opts: &CrawlOptions,
    cancel: CancellationToken,
) -> Result<PathBuf> {
    crawl_modes(site, movie_id, &Mode::catalog(), opts, cancel).await?;
    Ok(opts.out.clone())
}

/// The driver: opens the sink once, then runs the given modes strictly one
/// after another; only the pages inside a mode run concurrently. Count
/// resolution must land before a mode's pages dispatch, since it bounds the
/// dispatch range.
pub async fn crawl_modes(
    site: &Site,
    movie_id: &str,
    modes: &[Mode],
    opts: &CrawlOptions,
    cancel: CancellationToken,
) -> Result<u64> {
    let client = site.client()?;
    let (records, guard) = sink::open(&opts.out)?;

    for &mode in modes {
        if cancel.is_cancelled() {
            warn_time!("run cancelled, stopping before [{}]", mode.label);
            break;
        }

        let totals = match resolve::resolve(&client, site, movie_id, mode).await {
            Ok(totals) => totals,
            Err(err) if opts.keep_going => {
                warn_time!("[{}] count resolution failed, skipping mode: {err}", mode.label);
                continue;
            }
            Err(err) => return Err(err),
        };
        info_time!(
            "[{}] {} comments reported, fetching up to {} pages",
            mode.label,
            totals.comments,
            totals.pages
        );

        let mode_start = Local::now();
        let stats = pool::crawl_mode(
            &client,
            site,
            movie_id,
            mode,
            totals.pages,
            &records,
            opts.pacing,
            opts.workers,
            &cancel,
        )
        .await?;
        info_time!(
            mode_start,
            "[{}] done: {} pages served, {} failed, {} comments",
            mode.label,
            stats.pages_ok,
            stats.pages_failed,
            stats.comments
        );
    }

    // The writer drains once the last sender is gone.
    drop(records);
    let written = guard.close().await?;
    info_time!("wrote {} rows to {}", written, opts.out.display());
    Ok(written)
}
