mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{order, read_json, test_config, TestApp};
use orderdesk::OverviewRefresher;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct RefreshStatus {
    interval_seconds: u64,
    paused: bool,
    last_refreshed_at: Option<String>,
}

#[derive(Deserialize)]
struct Overview {
    groups: Vec<Group>,
}

#[derive(Deserialize)]
struct Group {
    bucket: String,
    orders: Vec<Summary>,
}

#[derive(Deserialize)]
struct Summary {
    id: i64,
}

impl Overview {
    fn ids(&self, bucket: &str) -> Vec<i64> {
        self.groups
            .iter()
            .find(|group| group.bucket == bucket)
            .map(|group| group.orders.iter().map(|summary| summary.id).collect())
            .unwrap_or_default()
    }
}

#[tokio::test]
async fn refresh_can_be_paused_and_resumed() -> Result<()> {
    let mut config = test_config();
    config.refresh_interval_seconds = 15;
    let app = TestApp::with_config(config);

    let status: RefreshStatus = read_json(app.get("/api/refresh").await?).await?;
    assert_eq!(status.interval_seconds, 15);
    assert!(!status.paused);
    assert!(status.last_refreshed_at.is_none());

    let paused = app.put_json("/api/refresh", &json!({ "paused": true })).await?;
    assert_eq!(paused.status(), StatusCode::OK);
    let paused: RefreshStatus = read_json(paused).await?;
    assert!(paused.paused);
    assert!(app.state.refresh.is_paused());

    let health: serde_json::Value = read_json(app.get("/api/health").await?).await?;
    assert_eq!(health["status"], json!("ok"));
    assert_eq!(health["refresh_paused"], json!(true));

    let resumed: RefreshStatus =
        read_json(app.put_json("/api/refresh", &json!({ "paused": false })).await?).await?;
    assert!(!resumed.paused);
    Ok(())
}

#[tokio::test]
async fn paused_refresher_skips_ticks() -> Result<()> {
    let app = TestApp::new();
    app.seed(vec![order(1, "Review", None)]).await;
    let refresher = OverviewRefresher::new(app.state.clone());

    app.state.refresh.set_paused(true);
    assert!(!refresher.tick().await);
    assert_eq!(app.store().list_calls(), 0);

    app.state.refresh.set_paused(false);
    assert!(refresher.tick().await);
    assert_eq!(app.store().list_calls(), 1);

    let status: RefreshStatus = read_json(app.get("/api/refresh").await?).await?;
    assert!(status.last_refreshed_at.is_some());
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_the_refresher_alive() -> Result<()> {
    let app = TestApp::new();
    let refresher = OverviewRefresher::new(app.state.clone());

    app.store().fail_reads(true);
    assert!(!refresher.tick().await);

    app.store().fail_reads(false);
    assert!(refresher.tick().await);
    Ok(())
}

#[tokio::test]
async fn overview_is_served_from_cache_until_refreshed() -> Result<()> {
    let app = TestApp::new();
    app.seed(vec![order(1, "Review", None)]).await;
    let refresher = OverviewRefresher::new(app.state.clone());

    let first: Overview = read_json(app.get("/api/orders").await?).await?;
    assert_eq!(first.ids("new"), vec![1]);
    assert_eq!(app.store().list_calls(), 1);

    app.store().insert(order(2, "Nieuw", None)).await;
    let cached: Overview = read_json(app.get("/api/orders").await?).await?;
    assert_eq!(cached.ids("new"), vec![1]);
    assert_eq!(app.store().list_calls(), 1);

    assert!(refresher.tick().await);
    let refreshed: Overview = read_json(app.get("/api/orders").await?).await?;
    assert_eq!(refreshed.ids("new"), vec![2, 1]);
    assert_eq!(app.store().list_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn writes_invalidate_the_cached_overview() -> Result<()> {
    let app = TestApp::new();
    app.seed(vec![order(1, "Review", None)]).await;

    let first: Overview = read_json(app.get("/api/orders").await?).await?;
    assert_eq!(first.ids("new"), vec![1]);

    app.store().insert(order(2, "Review", None)).await;
    let taken = app.post("/api/orders/1/take-into-progress").await?;
    assert_eq!(taken.status(), StatusCode::OK);

    let after: Overview = read_json(app.get("/api/orders").await?).await?;
    assert_eq!(after.ids("new"), vec![2]);
    assert_eq!(after.ids("in_progress"), vec![1]);
    Ok(())
}
