//! HTTP transport to the agent.
//!
//! POSTs `{ "prompt": ..., "state": ... }` to the agent endpoint and holds
//! the loading flag for the duration of the request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use super::AgentChannel;
use crate::types::{AgentState, DeckError};

#[derive(Debug, Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
    state: &'a AgentState,
}

/// Clears the loading flag when the request ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct HttpAgentClient {
    http: Client,
    url: String,
    token: Option<SecretString>,
    loading: AtomicBool,
}

impl HttpAgentClient {
    pub fn new(url: impl Into<String>, token: Option<SecretString>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build agent HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
            token,
            loading: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl AgentChannel for HttpAgentClient {
    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    async fn send_prompt(&self, prompt: &str, state: &AgentState) -> Result<(), DeckError> {
        if self.loading.swap(true, Ordering::SeqCst) {
            return Err(DeckError::Transport("a prompt is already in flight".to_string()));
        }
        let _guard = LoadingGuard(&self.loading);

        debug!(url = %self.url, prompt_len = prompt.len(), "Sending prompt to agent");

        let mut request = self.http.post(&self.url).json(&PromptRequest { prompt, state });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| DeckError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeckError::AgentRejected { status, body });
        }

        info!(url = %self.url, "Agent accepted prompt");
        Ok(())
    }
}
