//! Tool name → renderer dispatch.
//!
//! Every renderer branches on invocation status first: in-progress calls
//! get a progress fragment, everything else is treated as terminal and
//! goes through the result parser. Unknown tool names fall through to
//! the generic renderer so no invocation is dropped.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::fragment::Fragment;
use super::tools;
use crate::types::ToolInvocation;

// ---------------------------------------------------------------------------
// Tool specs (introspection only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
        }
    }
}

/// What a tool accepts. Not consulted when rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

// ---------------------------------------------------------------------------
// Renderer trait
// ---------------------------------------------------------------------------

pub trait ToolRenderer: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Fragment for `pending` / `executing` / `inProgress`.
    fn render_pending(&self, args: &Map<String, Value>) -> Fragment;

    /// Fragment for any terminal status, including `error`.
    fn render_complete(&self, args: &Map<String, Value>, result: Option<&Value>) -> Fragment;

    fn render(&self, invocation: &ToolInvocation) -> Fragment {
        if invocation.status.is_in_progress() {
            self.render_pending(&invocation.args)
        } else {
            self.render_complete(&invocation.args, invocation.result.as_ref())
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct ToolRenderRegistry {
    renderers: HashMap<String, Box<dyn ToolRenderer>>,
    fallback: tools::FallbackRenderer,
}

impl Default for ToolRenderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRenderRegistry {
    /// A registry with only the generic fallback.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: tools::FallbackRenderer,
        }
    }

    /// A registry with every built-in renderer registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(tools::ClosingSoonRenderer);
        registry.register(tools::ResearchRenderer);
        registry.register(tools::SearchMarketsRenderer);
        registry.register(tools::OrderBookRenderer);
        registry.register(tools::PlaceBetRenderer);
        registry.register(tools::MarketDetailsRenderer);
        registry.register(tools::PriceHistoryRenderer);
        registry.register(tools::WatchlistRenderer);
        registry
    }

    /// Register a renderer under the name its spec declares. Replaces any
    /// earlier renderer for that name.
    pub fn register(&mut self, renderer: impl ToolRenderer + 'static) {
        let name = renderer.spec().name;
        debug!(tool = %name, "Registered tool renderer");
        self.renderers.insert(name, Box::new(renderer));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Render one invocation with its registered renderer, or the generic
    /// fallback.
    pub fn render(&self, invocation: &ToolInvocation) -> Fragment {
        let Some(renderer) = self.renderers.get(&invocation.name) else {
            return self.fallback.render(invocation);
        };
        let fragment = renderer.render(invocation);
        if fragment.is_blank() {
            debug!(tool = %invocation.name, "Renderer produced a blank fragment, using fallback");
            return self.fallback.render(invocation);
        }
        fragment
    }

    /// Specs for every registered tool, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.renderers.values().map(|r| r.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
