use serde_json::{Map, Value};

use crate::render::fragment::Fragment;
use crate::render::market_card::market_card;
use crate::render::parser::{parse_list, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_str, Market, ToolName};

pub const MAX_SEARCH_CARDS: usize = 6;

/// Market search results as a card grid.
pub struct SearchMarketsRenderer;

impl ToolRenderer for SearchMarketsRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::SearchMarkets.to_string(),
            description: "Search Polymarket for markets matching a query".into(),
            parameters: vec![
                ParamSpec::required("query", "Search term, e.g. \"crypto\" or \"election\""),
                ParamSpec::optional("limit", "Maximum number of results"),
            ],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        let label = match arg_str(args, "query") {
            Some(q) => format!("Searching markets for \"{q}\""),
            None => "Searching markets".to_string(),
        };
        Fragment::progress(ToolName::SearchMarkets.as_str(), label, None)
    }

    fn render_complete(&self, _args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        match parse_list::<Market>(result).non_empty() {
            Parsed::Ok(markets) => Fragment::MarketGrid {
                cards: markets.iter().take(MAX_SEARCH_CARDS).map(market_card).collect(),
            },
            Parsed::Empty => Fragment::empty(ToolName::SearchMarkets.as_str(), "No markets found"),
        }
    }
}
