//! Outbound prompt channel to the agent process.
//!
//! The agent itself (tools, trading, wallet) is opaque. All the dashboard
//! needs is a way to send it a free-text prompt and to know whether one is
//! still in flight.

pub mod http;

use async_trait::async_trait;

use crate::types::{AgentState, DeckError};

/// Abstraction over the agent transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentChannel: Send + Sync {
    /// Whether a prompt is currently being processed.
    fn is_loading(&self) -> bool;

    /// Send a prompt along with the dashboard's current view of the state.
    async fn send_prompt(&self, prompt: &str, state: &AgentState) -> Result<(), DeckError>;
}
