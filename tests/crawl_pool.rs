//! Worker-pool behavior against a mock listing server: failure isolation,
//! the concurrency bound, cancellation.

mod common;

use std::time::{Duration, Instant};

use dbscrape::modes::Mode;
use dbscrape::pacing::Pacing;
use dbscrape::{pool, sink, Site};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn recommended() -> Mode {
    Mode::catalog()[0]
}

fn output() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    (dir, path)
}

#[tokio::test]
async fn failed_page_does_not_stop_siblings() {
    let server = MockServer::start().await;
    let listing = "/subject/77/comments";

    Mock::given(method("GET"))
        .and(path(listing))
        .and(query_param("start", "20"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    for start in ["0", "40"] {
        Mock::given(method("GET"))
            .and(path(listing))
            .and(query_param("start", start))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(common::comments_page(2, &format!("p{start}"))),
            )
            .mount(&server)
            .await;
    }

    let site = Site::with_base_url(server.uri());
    let client = site.client().unwrap();
    let (_dir, out) = output();
    let (records, guard) = sink::open(&out).unwrap();
    let cancel = CancellationToken::new();

    let stats = pool::crawl_mode(
        &client,
        &site,
        "77",
        recommended(),
        3,
        &records,
        Pacing::none(),
        10,
        &cancel,
    )
    .await
    .unwrap();

    drop(records);
    let written = guard.close().await.unwrap();

    assert_eq!(stats.pages_ok, 2);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.comments, 4);
    assert_eq!(written, 4);
}

#[tokio::test]
async fn pool_respects_the_worker_bound() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(120);
    Mock::given(method("GET"))
        .and(path("/subject/88/comments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(delay)
                .set_body_string(common::comments_page(1, "p")),
        )
        .mount(&server)
        .await;

    let site = Site::with_base_url(server.uri());
    let client = site.client().unwrap();
    let cancel = CancellationToken::new();

    // 6 pages through 2 workers is at least 3 server delays end to end.
    let (_dir, out) = output();
    let (records, guard) = sink::open(&out).unwrap();
    let begin = Instant::now();
    let stats = pool::crawl_mode(
        &client,
        &site,
        "88",
        recommended(),
        6,
        &records,
        Pacing::none(),
        2,
        &cancel,
    )
    .await
    .unwrap();
    let narrow = begin.elapsed();
    drop(records);
    guard.close().await.unwrap();
    assert_eq!(stats.pages_ok, 6);
    assert!(narrow >= delay * 3, "2 workers finished in {narrow:?}");

    // With a worker per page the same crawl runs wider than serial.
    let (_dir, out) = output();
    let (records, guard) = sink::open(&out).unwrap();
    let begin = Instant::now();
    let stats = pool::crawl_mode(
        &client,
        &site,
        "88",
        recommended(),
        6,
        &records,
        Pacing::none(),
        6,
        &cancel,
    )
    .await
    .unwrap();
    let wide = begin.elapsed();
    drop(records);
    guard.close().await.unwrap();
    assert_eq!(stats.pages_ok, 6);
    assert!(wide < delay * 6, "6 workers took serial time: {wide:?}");
}

#[tokio::test]
async fn cancelled_run_dispatches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::comments_page(1, "p")))
        .expect(0)
        .mount(&server)
        .await;

    let site = Site::with_base_url(server.uri());
    let client = site.client().unwrap();
    let (_dir, out) = output();
    let (records, guard) = sink::open(&out).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let stats = pool::crawl_mode(
        &client,
        &site,
        "99",
        recommended(),
        5,
        &records,
        Pacing::none(),
        10,
        &cancel,
    )
    .await
    .unwrap();

    drop(records);
    assert_eq!(guard.close().await.unwrap(), 0);
    assert_eq!(stats.pages_ok, 0);
    assert_eq!(stats.pages_failed, 0);
}
