use serde_json::Value;

use crate::render::fragment::Fragment;
use crate::render::parser::decode;
use crate::types::ToolInvocation;

/// Generic rendering for tools without a dedicated renderer: name, args
/// and the parsed result (or the raw text when it doesn't parse).
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRenderer;

impl FallbackRenderer {
    pub fn render(&self, invocation: &ToolInvocation) -> Fragment {
        let tool = if invocation.name.trim().is_empty() {
            "unknown tool".to_string()
        } else {
            invocation.name.clone()
        };
        let result = if invocation.status.is_in_progress() {
            None
        } else {
            decode(invocation.result.as_ref()).or_else(|| invocation.result.clone())
        };
        Fragment::Generic {
            tool,
            status: invocation.status.to_string(),
            args: Value::Object(invocation.args.clone()),
            result,
        }
    }
}
