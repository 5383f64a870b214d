//! Dashboard API route handlers.
//!
//! Inbound endpoints accept agent snapshots and tool events; read endpoints
//! return JSON. State is shared via `Arc<DashboardState>`.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::activity::{ActivityEntry, ActivityFeed};
use super::view::DashboardPage;
use crate::engine::{FireOutcome, ScanDriver, ScanStatus, SystemClock};
use crate::render::{Fragment, ToolRenderRegistry, ToolSpec};
use crate::state::{AgentStateStore, Snapshot};
use crate::types::{DeckError, ToolInvocation, ToolName, ToolStatus};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub store: Arc<AgentStateStore>,
    pub registry: ToolRenderRegistry,
    pub activity: RwLock<ActivityFeed>,
    /// Invocation ids whose `update_watchlist` args were already applied.
    applied_watchlists: RwLock<HashSet<String>>,
    /// Absent when scanning is disabled.
    pub scanner: Option<Arc<ScanDriver<SystemClock>>>,
}

impl DashboardState {
    pub fn new(store: Arc<AgentStateStore>, registry: ToolRenderRegistry) -> Self {
        Self {
            store,
            registry,
            activity: RwLock::new(ActivityFeed::default()),
            applied_watchlists: RwLock::new(HashSet::new()),
            scanner: None,
        }
    }

    pub fn with_scanner(mut self, scanner: Arc<ScanDriver<SystemClock>>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Render a tool event, record it in the activity feed and apply any
    /// state it carries.
    pub async fn ingest_tool_event(&self, mut invocation: ToolInvocation) -> ToolEventResponse {
        if invocation.id.trim().is_empty() {
            invocation.id = uuid::Uuid::new_v4().to_string();
        }

        let mut version = None;
        if invocation.tool_name() == ToolName::UpdateWatchlist
            && !matches!(invocation.status, ToolStatus::Pending | ToolStatus::Error)
            && self.applied_watchlists.write().await.insert(invocation.id.clone())
        {
            version = self
                .store
                .apply_watchlist_args(&Value::Object(invocation.args.clone()));
        }

        let fragment = self.registry.render(&invocation);
        debug!(
            id = %invocation.id,
            tool = %invocation.name,
            status = %invocation.status,
            kind = fragment.kind(),
            "Tool event rendered"
        );

        let html = fragment.to_html();
        self.activity.write().await.upsert(ActivityEntry {
            id: invocation.id.clone(),
            tool: invocation.name.clone(),
            status: invocation.status.clone(),
            fragment: fragment.clone(),
            updated_at: Utc::now(),
        });

        ToolEventResponse {
            id: invocation.id,
            tool: invocation.name,
            status: invocation.status,
            fragment,
            html,
            state_version: version,
        }
    }

    async fn scan_status(&self) -> Option<ScanStatus> {
        match &self.scanner {
            Some(scanner) => Some(scanner.status().await),
            None => None,
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StateAccepted {
    pub version: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolEventResponse {
    pub id: String,
    pub tool: String,
    pub status: ToolStatus,
    pub fragment: Fragment,
    pub html: String,
    /// Set when the event installed a new state snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanView {
    pub enabled: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScanStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanTriggered {
    /// `None` when the scheduler was not accepting fires.
    pub outcome: Option<FireOutcome>,
    pub status: ScanStatus,
}

/// JSON error response.
#[derive(Debug)]
pub struct ApiError(pub DeckError);

impl From<DeckError> for ApiError {
    fn from(e: DeckError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DeckError::InvalidSnapshot(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DeckError::Transport(_) | DeckError::AgentRejected { .. } => StatusCode::BAD_GATEWAY,
            DeckError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn render_template<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Page template failed to render");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// GET /
pub async fn get_page(State(state): State<AppState>) -> Response {
    let snapshot = state.store.current();
    let scan = state.scan_status().await;
    let activity = state.activity.read().await;
    render_template(&DashboardPage::new(&snapshot, activity.entries(), scan.as_ref()))
}

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.store.current().as_ref().clone())
}

/// POST /api/state
pub async fn post_state(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<StateAccepted>), ApiError> {
    let version = state.store.ingest_json(&body)?;
    Ok((StatusCode::ACCEPTED, Json(StateAccepted { version })))
}

/// POST /api/tools
pub async fn post_tool(
    State(state): State<AppState>,
    Json(invocation): Json<ToolInvocation>,
) -> Json<ToolEventResponse> {
    Json(state.ingest_tool_event(invocation).await)
}

/// GET /api/tools
pub async fn get_tools(State(state): State<AppState>) -> Json<Vec<ToolSpec>> {
    Json(state.registry.specs())
}

/// GET /api/activity
pub async fn get_activity(State(state): State<AppState>) -> Json<Vec<ActivityEntry>> {
    let feed = state.activity.read().await;
    Json(feed.entries().cloned().collect())
}

/// GET /api/scan
pub async fn get_scan(State(state): State<AppState>) -> Json<ScanView> {
    let status = state.scan_status().await;
    Json(ScanView {
        enabled: status.is_some(),
        status,
    })
}

/// POST /api/scan
pub async fn post_scan(State(state): State<AppState>) -> Result<Json<ScanTriggered>, ApiError> {
    let Some(scanner) = &state.scanner else {
        return Err(DeckError::Config("scanner is disabled".to_string()).into());
    };
    let outcome = scanner.trigger_manual().await;
    info!(?outcome, "Manual scan requested");
    Ok(Json(ScanTriggered {
        outcome,
        status: scanner.status().await,
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
