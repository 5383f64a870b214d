//! FORTUNE: live dashboard for an autonomous Polymarket trading agent
//!
//! Entry point. Loads configuration, initialises structured logging, wires
//! the state store, tool renderers and scan scheduler together, and serves
//! the dashboard until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use fortune::agent::http::HttpAgentClient;
use fortune::agent::AgentChannel;
use fortune::config;
use fortune::dashboard::{self, DashboardState};
use fortune::engine::{ScanDriver, ScanScheduler, SystemClock};
use fortune::render::ToolRenderRegistry;
use fortune::state::AgentStateStore;

const BANNER: &str = r#"
 _____ ___  ____ _____ _   _ _   _ _____
|  ___/ _ \|  _ \_   _| | | | \ | | ____|
| |_ | | | | |_) || | | | | |  \| |  _|
|  _|| |_| |  _ < | | | |_| | |\  | |___
|_|   \___/|_| \_\|_|  \___/|_| \_|_____|

  Polymarket agent dashboard
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = config::AppConfig::load("config.toml")?;

    println!("{BANNER}");
    info!(
        agent_url = %cfg.agent.url,
        scanner_enabled = cfg.scanner.enabled,
        scan_interval_secs = cfg.scanner.interval_secs,
        port = cfg.dashboard.port,
        "FORTUNE starting up"
    );

    // -- Initialise components -------------------------------------------

    let token = cfg.agent.token();
    if token.is_none() {
        warn!("No agent token configured, prompts are sent unauthenticated");
    }
    let agent: Arc<dyn AgentChannel> = Arc::new(
        HttpAgentClient::new(cfg.agent.url.clone(), token, cfg.agent.timeout())
            .context("Failed to build agent client")?,
    );

    let store = Arc::new(AgentStateStore::new());
    let registry = ToolRenderRegistry::with_defaults();
    let mut state = DashboardState::new(store.clone(), registry);

    let mut scan_handle = None;
    if cfg.scanner.enabled {
        let scheduler = ScanScheduler::new(SystemClock, cfg.scanner.schedule());
        let driver = Arc::new(ScanDriver::new(
            scheduler,
            agent.clone(),
            store.clone(),
            cfg.scanner.prompt.clone(),
        ));
        scan_handle = Some(driver.spawn());
        state = state.with_scanner(driver);
    } else {
        info!("Scanner disabled, no scan prompts will be sent");
    }

    // -- Serve -------------------------------------------------------------

    let addr = cfg.dashboard.socket_addr()?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    dashboard::serve(addr, Arc::new(state), shutdown).await?;

    if let Some(handle) = scan_handle {
        handle.shutdown().await;
    }

    let snapshot = store.current();
    info!(version = snapshot.version, state = %snapshot.state, "FORTUNE stopped");
    Ok(())
}

/// Initialise the tracing subscriber with JSON or pretty output.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fortune=info"));

    let json_logging = std::env::var("FORTUNE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
