use serde_json::{Map, Value};

use crate::render::fragment::Fragment;
use crate::render::market_card::market_card;
use crate::render::parser::{parse_object, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_str, Market, ToolName};

/// Single market card for `get_market_details`.
pub struct MarketDetailsRenderer;

impl ToolRenderer for MarketDetailsRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::GetMarketDetails.to_string(),
            description: "Get full details for a specific market".into(),
            parameters: vec![ParamSpec::required("market_id", "The market ID to look up")],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        Fragment::progress(
            ToolName::GetMarketDetails.as_str(),
            "Loading market details",
            arg_str(args, "market_id"),
        )
    }

    fn render_complete(&self, _args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        let unavailable = || Fragment::empty(ToolName::GetMarketDetails.as_str(), "Market details unavailable");
        let fields = match parse_object::<Map<String, Value>>(result) {
            Parsed::Ok(fields) if !fields.contains_key("error") => fields,
            _ => return unavailable(),
        };
        match serde_json::from_value::<Market>(Value::Object(fields)) {
            Ok(market) if !market.question.trim().is_empty() => Fragment::MarketDetail {
                card: market_card(&market),
            },
            _ => unavailable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolInvocation, ToolStatus};
    use serde_json::json;

    #[test]
    fn test_details_card() {
        let inv = ToolInvocation::new("get_market_details", ToolStatus::Complete).with_result(json!({
            "id": "512",
            "question": "Will ETH flip BTC?",
            "outcomes": ["Yes", "No"],
            "outcome_prices": ["0.03", "0.97"],
            "volume": "1200000",
            "clob_token_ids": ["1", "2"]
        }));
        match MarketDetailsRenderer.render(&inv) {
            Fragment::MarketDetail { card } => {
                assert_eq!(card.outcomes[0].percent, 3);
                assert_eq!(card.volume, "$1.2M");
            }
            other => panic!("unexpected fragment {other:?}"),
        }
    }

    #[test]
    fn test_error_payload() {
        let inv = ToolInvocation::new("get_market_details", ToolStatus::Complete)
            .with_result(json!("{\"error\": \"404 Not Found\"}"));
        assert_eq!(MarketDetailsRenderer.render(&inv).kind(), "empty");
    }
}
