//! Mock agent channel for integration testing.
//!
//! Records every prompt it receives along with the state it was sent with.
//! Busy and failure modes are controllable from test code.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use fortune::agent::AgentChannel;
use fortune::types::{AgentState, DeckError};

#[derive(Debug, Clone)]
pub struct SentPrompt {
    pub prompt: String,
    pub state: AgentState,
}

#[derive(Clone, Default)]
pub struct MockAgent {
    sent: Arc<Mutex<Vec<SentPrompt>>>,
    busy: Arc<AtomicBool>,
    /// If set, every send fails with this transport error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn set_error(&self, error: Option<&str>) {
        *self.force_error.lock().unwrap() = error.map(str::to_string);
    }

    pub fn sent(&self) -> Vec<SentPrompt> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentChannel for MockAgent {
    fn is_loading(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    async fn send_prompt(&self, prompt: &str, state: &AgentState) -> Result<(), DeckError> {
        if let Some(err) = self.force_error.lock().unwrap().clone() {
            return Err(DeckError::Transport(err));
        }
        self.sent.lock().unwrap().push(SentPrompt {
            prompt: prompt.to_string(),
            state: state.clone(),
        });
        Ok(())
    }
}
