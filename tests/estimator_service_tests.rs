mod common;

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::watch;
use tokio::time::timeout;

use liquidwatch::ingestion::pipeline::process_feed_event;
use liquidwatch::ingestion::FeedEvent;
use liquidwatch::models::EstimateBook;
use liquidwatch::services::run_estimator;
use liquidwatch::tracker::TwapBook;

const TICK_MS: u64 = 10;

async fn seed_halfway_order(book: &TwapBook, hash: &str) {
    let rec = common::make_record(hash, Utc::now() - ChronoDuration::minutes(30), 60.0, 100, 10_000);
    process_feed_event(FeedEvent::Update { order: rec }, book).await;
}

#[tokio::test]
async fn test_loop_publishes_fresh_batches() {
    let book = TwapBook::new();
    seed_halfway_order(&book, "0xlive").await;

    let (estimates_tx, mut estimates_rx) = watch::channel(EstimateBook::empty());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_estimator(book.clone(), TICK_MS, estimates_tx, shutdown_rx));

    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should publish within a second")
        .expect("estimates channel should stay open");
    let first = estimates_rx.borrow_and_update().clone();

    let est = first.get("0xlive").expect("seeded order should be estimated");
    assert!(
        est.progression >= 50.0 && est.progression < 51.0,
        "expected ~50% progression, got {}",
        est.progression
    );

    // The next batch carries a strictly newer clock reading
    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should keep publishing")
        .expect("estimates channel should stay open");
    let second = estimates_rx.borrow_and_update().clone();
    assert!(second.computed_at > first.computed_at);
    assert!(second.get("0xlive").unwrap().progression >= est.progression);

    shutdown_tx.send(true).expect("estimator should still be listening");
    timeout(Duration::from_secs(1), handle)
        .await
        .expect("estimator should stop on shutdown")
        .expect("estimator task should not panic");
}

#[tokio::test]
async fn test_empty_book_publishes_once_then_idles() {
    let book = TwapBook::new();
    let (estimates_tx, mut estimates_rx) = watch::channel(EstimateBook::empty());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_estimator(book.clone(), TICK_MS, estimates_tx, shutdown_rx));

    // One empty batch goes out so subscribers clear
    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should publish the empty book")
        .expect("estimates channel should stay open");
    assert!(estimates_rx.borrow_and_update().is_empty());

    // ...then nothing while the book stays empty
    let quiet = timeout(Duration::from_millis(200), estimates_rx.changed()).await;
    assert!(quiet.is_err(), "estimator should idle while nothing is tracked");

    // New orders wake it back up
    seed_halfway_order(&book, "0xwake").await;
    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should resume publishing")
        .expect("estimates channel should stay open");
    assert_eq!(estimates_rx.borrow_and_update().len(), 1);

    shutdown_tx.send(true).expect("estimator should still be listening");
    timeout(Duration::from_secs(1), handle)
        .await
        .expect("estimator should stop on shutdown")
        .expect("estimator task should not panic");
}

#[tokio::test]
async fn test_clearing_the_book_clears_subscribers() {
    let book = TwapBook::new();
    seed_halfway_order(&book, "0xgone").await;

    let (estimates_tx, mut estimates_rx) = watch::channel(EstimateBook::empty());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_estimator(book.clone(), TICK_MS, estimates_tx, shutdown_rx));

    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should publish")
        .expect("estimates channel should stay open");
    assert_eq!(estimates_rx.borrow_and_update().len(), 1);

    // Upstream snapshot empties out; subscribers get exactly one empty book
    process_feed_event(FeedEvent::Snapshot { orders: vec![] }, &book).await;

    // A non-empty batch may already be in flight; the empty one follows
    let mut cleared = false;
    for _ in 0..10 {
        if timeout(Duration::from_millis(200), estimates_rx.changed())
            .await
            .is_err()
        {
            break;
        }
        if estimates_rx.borrow_and_update().is_empty() {
            cleared = true;
            break;
        }
    }
    assert!(cleared, "subscribers should observe the cleared book");

    shutdown_tx.send(true).expect("estimator should still be listening");
    timeout(Duration::from_secs(1), handle)
        .await
        .expect("estimator should stop on shutdown")
        .expect("estimator task should not panic");
}

#[tokio::test]
async fn test_estimator_stops_when_subscribers_leave() {
    let book = TwapBook::new();
    seed_halfway_order(&book, "0xleft").await;

    let (estimates_tx, estimates_rx) = watch::channel(EstimateBook::empty());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_estimator(book.clone(), TICK_MS, estimates_tx, shutdown_rx));

    drop(estimates_rx);

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("estimator should stop once every subscriber is gone")
        .expect("estimator task should not panic");
}

#[tokio::test]
async fn test_terminal_orders_stay_frozen_across_ticks() {
    let book = TwapBook::new();
    let rec = common::make_ended_record("0xdone", Utc::now() - ChronoDuration::hours(2), 87.5, 81_250);
    process_feed_event(FeedEvent::Update { order: rec }, &book).await;

    let (estimates_tx, mut estimates_rx) = watch::channel(EstimateBook::empty());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_estimator(book.clone(), TICK_MS, estimates_tx, shutdown_rx));

    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should publish")
        .expect("estimates channel should stay open");
    let first = estimates_rx.borrow_and_update().clone();

    timeout(Duration::from_secs(1), estimates_rx.changed())
        .await
        .expect("estimator should keep publishing")
        .expect("estimates channel should stay open");
    let second = estimates_rx.borrow_and_update().clone();

    let a = first.get("0xdone").expect("terminal order should be served");
    let b = second.get("0xdone").expect("terminal order should still be served");
    assert_eq!(a, b, "terminal estimates must not drift between ticks");
    assert_eq!(a.progression, 87.5);
    assert_eq!(a.remaining_value, 81_250.0);
    assert!(a.is_completed);

    shutdown_tx.send(true).expect("estimator should still be listening");
    timeout(Duration::from_secs(1), handle)
        .await
        .expect("estimator should stop on shutdown")
        .expect("estimator task should not panic");
}
