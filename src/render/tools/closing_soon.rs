use serde_json::{Map, Value};

use crate::render::format::{countdown, date_only, format_volume};
use crate::render::fragment::{ClosingSoonRow, Fragment};
use crate::render::market_card::outcome_bars;
use crate::render::parser::{parse_list, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_f64, Market, ToolName};

pub const MAX_CLOSING_ROWS: usize = 8;

/// Ranked list of markets about to resolve.
pub struct ClosingSoonRenderer;

impl ToolRenderer for ClosingSoonRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::ClosingSoonMarkets.to_string(),
            description: "Find active markets resolving within the next few hours".into(),
            parameters: vec![
                ParamSpec::optional("hours", "Look-ahead window in hours"),
                ParamSpec::optional("limit", "Maximum number of markets to return"),
            ],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        let label = match arg_f64(args, "hours") {
            Some(h) => format!("Finding markets closing within {h}h"),
            None => "Finding markets closing soon".to_string(),
        };
        Fragment::progress(ToolName::ClosingSoonMarkets.as_str(), label, None)
    }

    fn render_complete(&self, _args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        let markets = match parse_list::<Market>(result).non_empty() {
            Parsed::Ok(markets) => markets,
            Parsed::Empty => {
                return Fragment::empty(
                    ToolName::ClosingSoonMarkets.as_str(),
                    "No markets closing soon",
                )
            }
        };

        let rows = markets
            .iter()
            .take(MAX_CLOSING_ROWS)
            .enumerate()
            .map(|(i, m)| ClosingSoonRow {
                rank: i + 1,
                question: m.question.clone(),
                countdown: m
                    .hours_remaining
                    .map(countdown)
                    .unwrap_or_else(|| date_only(&m.end_date)),
                outcomes: outcome_bars(m),
                volume: format_volume(m.volume_usd()),
            })
            .collect();

        Fragment::ClosingSoon { rows }
    }
}
