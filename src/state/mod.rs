//! Agent state store.
//!
//! Holds the latest snapshot the agent published. Snapshots are immutable
//! and replaced wholesale; readers take an `Arc<Snapshot>` and render from
//! it, so a render pass never sees fields from two different pushes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::types::{AgentState, DeckError};

/// One installed version of the agent state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// 0 for the initial empty state, +1 per install.
    pub version: u64,
    pub received_at: DateTime<Utc>,
    pub state: AgentState,
}

pub struct AgentStateStore {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl Default for AgentStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentStateStore {
    pub fn new() -> Self {
        let initial = Arc::new(Snapshot {
            version: 0,
            received_at: Utc::now(),
            state: AgentState::default(),
        });
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Install a new snapshot, replacing the previous one. Returns its version.
    pub fn publish(&self, state: AgentState) -> u64 {
        let (markets, positions) = (state.markets.len(), state.positions.len());
        let mut version = 0;
        self.tx.send_modify(|current| {
            version = current.version + 1;
            *current = Arc::new(Snapshot {
                version,
                received_at: Utc::now(),
                state,
            });
        });
        info!(version, markets, positions, "Agent state snapshot installed");
        version
    }

    /// Decode and install a raw JSON snapshot. Non-object payloads are
    /// rejected and the current snapshot is kept.
    pub fn ingest_json(&self, value: &Value) -> Result<u64, DeckError> {
        if !value.is_object() {
            warn!("Rejected non-object state snapshot");
            return Err(DeckError::InvalidSnapshot(
                "snapshot must be a JSON object".to_string(),
            ));
        }
        let state: AgentState = serde_json::from_value(value.clone())
            .map_err(|e| DeckError::InvalidSnapshot(e.to_string()))?;
        Ok(self.publish(state))
    }

    /// Install the state carried by `update_watchlist` tool arguments.
    pub fn apply_watchlist_args(&self, args: &Value) -> Option<u64> {
        match state_from_watchlist_args(args) {
            Some(state) => Some(self.publish(state)),
            None => {
                debug!("update_watchlist args carried no state");
                None
            }
        }
    }
}

/// Extract agent state from `update_watchlist` arguments.
///
/// Args may be a JSON-encoded string. The state sits under `markets`; args
/// without that key are taken as the state itself. A `markets` key holding
/// anything but an object yields nothing.
pub fn state_from_watchlist_args(args: &Value) -> Option<AgentState> {
    let decoded;
    let args = match args {
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text).ok()?;
            &decoded
        }
        other => other,
    };
    let root = args.as_object()?;
    let state = match root.get("markets") {
        Some(inner @ Value::Object(_)) => inner,
        Some(_) => return None,
        None => args,
    };
    serde_json::from_value(state.clone()).ok()
}
