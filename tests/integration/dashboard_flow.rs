//! End-to-end dashboard flows through the HTTP surface.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use fortune::dashboard::{build_router, AppState, DashboardState};
use fortune::engine::{ScanDriver, ScanScheduler, ScheduleConfig, SystemClock};
use fortune::render::ToolRenderRegistry;
use fortune::state::AgentStateStore;

use crate::mock_agent::MockAgent;

fn app_state() -> AppState {
    Arc::new(DashboardState::new(
        Arc::new(AgentStateStore::new()),
        ToolRenderRegistry::with_defaults(),
    ))
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    call(build_router(state.clone()), req).await
}

async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    call(build_router(state.clone()), req).await
}

#[tokio::test]
async fn test_snapshot_drives_page() {
    let state = app_state();
    let snapshot = json!({
        "markets": [{
            "id": "m1",
            "question": "Will BTC close above $100k?",
            "outcomes": "[\"Yes\",\"No\"]",
            "outcomePrices": "[\"0.62\",\"0.38\"]",
            "volume": 15000,
            "liquidity": "2500",
            "endDate": "2026-12-31T00:00:00Z",
            "recommendation": "BUY YES",
            "confidence": 0.7
        }],
        "positions": [{
            "market_question": "Will BTC close above $100k?",
            "outcome": "Yes",
            "size": "10",
            "avg_price": "0.50",
            "current_price": 0.62
        }],
        "last_action": "Bought 10 Yes",
        "wallet_balance": "95.00",
        "total_pnl": 1.2
    });
    let (status, _) = post(&state, "/api/state", snapshot).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, html) = get(&state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Will BTC close above $100k?"));
    assert!(html.contains("$95.00"));
    assert!(html.contains("+$1.20"));
    assert!(html.contains("62%"));
    assert!(html.contains("$15.0K"));
    // (0.62 - 0.50) * 10 on a 5.00 basis
    assert!(html.contains("+24.0%"));
    assert!(!html.contains("wallet setup command"));
}

#[tokio::test]
async fn test_bad_snapshot_keeps_previous() {
    let state = app_state();
    post(&state, "/api/state", json!({"last_action": "first"})).await;
    let (status, _) = post(&state, "/api/state", json!("garbage")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = get(&state, "/api/state").await;
    let snap: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(snap["version"], 1);
    assert_eq!(snap["state"]["last_action"], "first");
}

#[tokio::test]
async fn test_place_bet_lifecycle() {
    let state = app_state();
    let args = json!({"token_id": "tok-1", "side": "BUY", "price": 0.45, "size": 10});

    let (_, body) = post(
        &state,
        "/api/tools",
        json!({"id": "bet-1", "name": "place_bet", "status": "executing", "args": args}),
    )
    .await;
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["fragment"]["state"], "placing");
    assert!(resp["html"].as_str().unwrap().contains("Placing order..."));

    let (_, body) = post(
        &state,
        "/api/tools",
        json!({
            "id": "bet-1",
            "name": "place_bet",
            "status": "complete",
            "args": args,
            "result": "{\"error\":\"insufficient balance\"}"
        }),
    )
    .await;
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["fragment"]["state"], "failed");
    assert_eq!(resp["fragment"]["cost"], 4.5);
    assert!(resp["html"].as_str().unwrap().contains("insufficient balance"));

    // One entry per invocation, holding the latest status.
    let (_, body) = get(&state, "/api/activity").await;
    let feed: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["id"], "bet-1");
    assert_eq!(feed[0]["status"], "complete");
}

#[tokio::test]
async fn test_not_json_results_render_empty_states() {
    let state = app_state();
    for tool in ["search_markets", "get_order_book", "exa_research", "get_closing_soon_markets"] {
        let (status, body) = post(
            &state,
            "/api/tools",
            json!({"name": tool, "status": "complete", "result": "not json"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let resp: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(resp["fragment"]["kind"], "empty", "tool {tool}");
    }
}

#[tokio::test]
async fn test_watchlist_tool_updates_state() {
    let state = app_state();
    let args = json!({
        "markets": {
            "markets": [{"question": "Rain tomorrow?", "outcomes": ["Yes", "No"], "outcome_prices": ["0.3", "0.7"]}],
            "positions": [],
            "last_action": "Added rain market",
            "wallet_balance": "20"
        }
    });
    let (_, body) = post(
        &state,
        "/api/tools",
        json!({"name": "update_watchlist", "status": "complete", "args": args}),
    )
    .await;
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["state_version"], 1);

    let (_, html) = get(&state, "/").await;
    assert!(html.contains("Rain tomorrow?"));
    assert!(html.contains("Added rain market"));
}

#[tokio::test]
async fn test_tool_event_with_odd_scalars_is_accepted() {
    let state = app_state();

    let (status, body) = post(&state, "/api/tools", json!({"name": "search_markets", "status": null})).await;
    assert_eq!(status, StatusCode::OK);
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["status"], "pending");

    let (status, body) = post(&state, "/api/tools", json!({"id": 17, "name": "search_markets"})).await;
    assert_eq!(status, StatusCode::OK);
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["id"], "17");

    let (status, body) = post(&state, "/api/tools", json!({"name": null, "status": "complete"})).await;
    assert_eq!(status, StatusCode::OK);
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["fragment"]["kind"], "generic");
}

#[tokio::test]
async fn test_watchlist_applied_once_per_invocation() {
    let state = app_state();
    let args = json!({"last_action": "Watching rain"});

    let (_, body) = post(
        &state,
        "/api/tools",
        json!({"id": "w1", "name": "update_watchlist", "status": "executing", "args": args}),
    )
    .await;
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["state_version"], 1);

    let (_, body) = post(
        &state,
        "/api/tools",
        json!({"id": "w1", "name": "update_watchlist", "status": "complete", "args": args}),
    )
    .await;
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert!(resp.get("state_version").is_none());

    let (_, body) = get(&state, "/api/state").await;
    let snap: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(snap["version"], 1);
}

#[tokio::test]
async fn test_manual_scan_sends_prompt() {
    let agent = MockAgent::new();
    let store = Arc::new(AgentStateStore::new());
    let driver = Arc::new(ScanDriver::new(
        ScanScheduler::new(SystemClock, ScheduleConfig::default()),
        Arc::new(agent.clone()),
        store.clone(),
        "Manual scan",
    ));
    let handle = driver.spawn();
    tokio::task::yield_now().await;

    let state: AppState = Arc::new(
        DashboardState::new(store, ToolRenderRegistry::with_defaults()).with_scanner(driver),
    );

    let (status, body) = post(&state, "/api/scan", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["outcome"], "sent");
    assert_eq!(agent.sent()[0].prompt, "Manual scan");

    // Busy agent: skipped, not queued.
    agent.set_busy(true);
    let (_, body) = post(&state, "/api/scan", json!({})).await;
    let resp: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resp["outcome"], "skipped_in_flight");
    assert_eq!(agent.sent_count(), 1);

    handle.shutdown().await;
}
