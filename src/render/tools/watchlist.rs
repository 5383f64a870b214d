use serde_json::{Map, Value};

use crate::render::fragment::Fragment;
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::state::state_from_watchlist_args;
use crate::types::ToolName;

/// Confirmation for `update_watchlist`, summarising the state it carried.
pub struct WatchlistRenderer;

impl ToolRenderer for WatchlistRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::UpdateWatchlist.to_string(),
            description: "Replace the shared watchlist and positions state".into(),
            parameters: vec![ParamSpec::required("markets", "The complete updated agent state")],
        }
    }

    fn render_pending(&self, _args: &Map<String, Value>) -> Fragment {
        Fragment::progress(ToolName::UpdateWatchlist.as_str(), "Updating watchlist", None)
    }

    fn render_complete(&self, args: &Map<String, Value>, _result: Option<&Value>) -> Fragment {
        match state_from_watchlist_args(&Value::Object(args.clone())) {
            Some(state) => Fragment::WatchlistUpdated {
                markets: state.markets.len(),
                positions: state.positions.len(),
                last_action: state.last_action,
            },
            None => Fragment::empty(
                ToolName::UpdateWatchlist.as_str(),
                "Watchlist update carried no state",
            ),
        }
    }
}
