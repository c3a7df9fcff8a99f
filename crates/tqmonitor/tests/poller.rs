// crates/tqmonitor/tests/poller.rs
mod common;

use std::time::Duration;

use common::{Fixture, MockBackend};
use serde_json::json;
use tokio::time::{sleep, timeout};

use tqmonitor::jobs::{DetailResolver, PollState, PollingController, View};

const TICK: Duration = Duration::from_millis(50);

async fn stats_backend() -> MockBackend {
    MockBackend::start(Fixture {
        stats: json!({"total_pending": 1, "total_success": 2, "total_failed": 3}),
        ..Default::default()
    })
    .await
}

#[tokio::test]
async fn activation_fetches_immediately_then_on_interval() {
    let backend = stats_backend().await;
    let resolver = DetailResolver::new(backend.client());
    // long interval: only the immediate fetch can land in time
    let (mut poller, mut rx) = PollingController::new(resolver, Duration::from_secs(60));

    poller.on_view_change(View::Dashboard);
    assert_eq!(poller.state(), PollState::Active);

    let update = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("first fetch should not wait for the interval")
        .expect("channel open");
    assert!(poller.accepts(&update));
    assert_eq!(update.snapshot.failed, 3);
}

#[tokio::test]
async fn leaving_dashboard_stops_polling() {
    let backend = stats_backend().await;
    let resolver = DetailResolver::new(backend.client());
    let (mut poller, mut rx) = PollingController::new(resolver, TICK);

    poller.activate();
    let _ = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    sleep(TICK * 3).await;

    poller.on_view_change(View::Jobs);
    assert_eq!(poller.state(), PollState::Suspended);

    // let any request already on the wire finish
    sleep(TICK).await;
    let after_suspend = backend.state.hits("stats");
    sleep(TICK * 4).await;
    assert_eq!(backend.state.hits("stats"), after_suspend);
}

#[tokio::test]
async fn updates_from_an_older_activation_are_rejected() {
    let backend = stats_backend().await;
    let resolver = DetailResolver::new(backend.client());
    let (mut poller, mut rx) = PollingController::new(resolver, Duration::from_secs(60));

    poller.activate();
    let stale = timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();

    poller.suspend();
    assert!(!poller.accepts(&stale));

    poller.activate();
    assert!(!poller.accepts(&stale));
    let fresh = timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(poller.accepts(&fresh));
    assert!(fresh.generation > stale.generation);
}

#[tokio::test]
async fn failed_refresh_keeps_polling() {
    let backend = stats_backend().await;
    backend.state.fixture.lock().unwrap().stats_down = true;
    let resolver = DetailResolver::new(backend.client());
    let (mut poller, mut rx) = PollingController::new(resolver, TICK);

    poller.activate();
    sleep(TICK * 4).await;
    // failures produce no update
    assert!(rx.try_recv().is_err());
    assert!(backend.state.hits("stats") >= 2);

    backend.state.fixture.lock().unwrap().stats_down = false;
    let update = timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.snapshot.pending, 1);
}

#[tokio::test]
async fn manual_refresh_only_while_active() {
    let backend = stats_backend().await;
    let resolver = DetailResolver::new(backend.client());
    let (mut poller, mut rx) = PollingController::new(resolver, Duration::from_secs(60));

    poller.refresh_now();
    assert_eq!(poller.state(), PollState::Suspended);
    sleep(TICK).await;
    assert_eq!(backend.state.hits("stats"), 0);

    poller.activate();
    let _ = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    poller.refresh_now();
    let update = timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(poller.accepts(&update));
    assert_eq!(backend.state.hits("stats"), 2);
}
