//! Dashboard: Axum web server for the agent's live state and tool activity.
//!
//! Serves the inbound snapshot/tool-event endpoints, a JSON read API and a
//! server-rendered HTML page. CORS enabled for local development.

pub mod activity;
pub mod routes;
pub mod view;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use activity::{ActivityEntry, ActivityFeed};
pub use routes::{AppState, DashboardState};

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/state", get(routes::get_state).post(routes::post_state))
        .route("/api/tools", get(routes::get_tools).post(routes::post_tool))
        .route("/api/activity", get(routes::get_activity))
        .route("/api/scan", get(routes::get_scan).post(routes::post_scan))
        .route("/health", get(routes::health))
        .route("/", get(routes::get_page))
        .layer(cors)
        .with_state(state)
}

/// Serve the dashboard until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard on {addr}"))?;
    let local = listener.local_addr().context("Dashboard listener has no address")?;
    info!(%local, "Dashboard listening on http://{local}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MockAgentChannel;
    use crate::engine::{ScanDriver, ScanScheduler, ScheduleConfig, SystemClock};
    use crate::render::ToolRenderRegistry;
    use crate::state::AgentStateStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        Arc::new(DashboardState::new(
            Arc::new(AgentStateStore::new()),
            ToolRenderRegistry::with_defaults(),
        ))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
        (status, body.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, _) = send(build_router(test_state()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_state_roundtrip() {
        let state = test_state();
        let (status, body) = send(
            build_router(state.clone()),
            post_json("/api/state", json!({"wallet_balance": "12.5", "total_pnl": "3"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let accepted: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(accepted["version"], 1);

        let (status, body) = send(build_router(state), get("/api/state")).await;
        assert_eq!(status, StatusCode::OK);
        let snap: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(snap["version"], 1);
        assert_eq!(snap["state"]["wallet_balance"], "12.5");
        assert_eq!(snap["state"]["total_pnl"], 3.0);
    }

    #[tokio::test]
    async fn test_state_rejects_array() {
        let (status, body) = send(build_router(test_state()), post_json("/api/state", json!([1]))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let err: Value = serde_json::from_slice(&body).unwrap();
        assert!(err["error"].as_str().unwrap().contains("object"));
    }

    #[tokio::test]
    async fn test_tool_event_renders_order_book() {
        let event = json!({
            "toolCallId": "call-7",
            "name": "get_order_book",
            "status": "complete",
            "args": {"token_id": "tok"},
            "result": "{\"bids\":[{\"price\":\"0.40\",\"size\":\"200\"}],\"asks\":[{\"price\":\"0.45\",\"size\":\"100\"}]}"
        });
        let state = test_state();
        let (status, body) = send(build_router(state.clone()), post_json("/api/tools", event)).await;
        assert_eq!(status, StatusCode::OK);
        let resp: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp["id"], "call-7");
        assert_eq!(resp["fragment"]["kind"], "depth");
        assert!(resp["html"].as_str().unwrap().contains("width:50.0%"));

        let (_, body) = send(build_router(state), get("/api/activity")).await;
        let feed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(feed.as_array().unwrap().len(), 1);
        assert_eq!(feed[0]["status"], "complete");
    }

    #[tokio::test]
    async fn test_unknown_tool_uses_fallback() {
        let event = json!({"name": "get_positions", "status": "complete", "result": {"positions": []}});
        let (status, body) = send(build_router(test_state()), post_json("/api/tools", event)).await;
        assert_eq!(status, StatusCode::OK);
        let resp: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp["fragment"]["kind"], "generic");
    }

    #[tokio::test]
    async fn test_tool_specs_listed() {
        let (status, body) = send(build_router(test_state()), get("/api/tools")).await;
        assert_eq!(status, StatusCode::OK);
        let specs: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(specs.len(), 8);
    }

    #[tokio::test]
    async fn test_dashboard_html() {
        let (status, body) = send(build_router(test_state()), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("FORTUNE"));
        assert!(html.contains("Dashboard"));
        assert!(html.contains("wallet setup command"));
    }

    #[tokio::test]
    async fn test_manual_scan_route() {
        let mut agent = MockAgentChannel::new();
        agent.expect_is_loading().return_const(false);
        agent.expect_send_prompt().times(1).returning(|_, _| Ok(()));

        let store = Arc::new(AgentStateStore::new());
        let scanner = Arc::new(ScanDriver::new(
            ScanScheduler::new(SystemClock, ScheduleConfig::default()),
            Arc::new(agent),
            store.clone(),
            "scan",
        ));
        let handle = scanner.spawn();
        tokio::task::yield_now().await;

        let state = Arc::new(
            DashboardState::new(store, ToolRenderRegistry::with_defaults()).with_scanner(scanner),
        );
        let (status, body) = send(build_router(state.clone()), post_json("/api/scan", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let resp: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp["outcome"], "sent");
        assert_eq!(resp["status"]["stats"]["sent"], 1);

        let (_, body) = send(build_router(state), get("/api/scan")).await;
        let view: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(view["enabled"], true);
        assert!(view["last_scan"].is_string());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let req = Request::builder()
            .uri("/api/state")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = build_router(test_state()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
