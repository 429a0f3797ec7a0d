use std::io::BufRead;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use dbscrape::process::{crawl_all, CrawlOptions};
use dbscrape::{info_time, Result, Site, WORKER_COUNT};

/// Scrapes every comment listing of one douban movie into a CSV file.
#[derive(Parser, Debug)]
#[command(name = "dbscrape")]
#[command(about = "Douban movie comment scraper, all sort modes")]
#[command(version)]
struct Args {
    /// Movie id, e.g. 1292052 for The Shawshank Redemption
    movie_id: String,

    /// Output CSV path (default: douban_comments_<id>_all_sorts.csv)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Cookie header sent with every request
    #[arg(long)]
    cookie: Option<String>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Concurrent page fetches within a mode
    #[arg(short, long, default_value_t = WORKER_COUNT)]
    workers: usize,

    /// Skip a mode whose comment count cannot be resolved instead of aborting
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    /// Exit immediately instead of waiting for Enter
    #[arg(long, default_value_t = false)]
    no_pause: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut site = Site::douban();
    if let Some(cookie) = args.cookie {
        site.cookie = Some(cookie);
    }
    if let Some(user_agent) = args.user_agent {
        site.user_agent = user_agent;
    }

    let mut opts = CrawlOptions::new(
        args.out
            .unwrap_or_else(|| CrawlOptions::default_out_path(&args.movie_id)),
    );
    opts.workers = args.workers;
    opts.keep_going = args.keep_going;

    // Ctrl-C stops dispatch and lets in-flight pages wind down.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let start_time = Local::now();
    let out = crawl_all(&site, &args.movie_id, &opts, cancel).await?;
    info_time!(start_time, "all modes done, data saved in {}", out.display());

    if !args.no_pause {
        println!("Press Enter to close");
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
    }

    Ok(())
}
