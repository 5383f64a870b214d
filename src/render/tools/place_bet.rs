use rust_decimal::prelude::*;
use serde_json::{Map, Value};

use crate::render::fragment::{Fragment, OrderTicket, TicketState};
use crate::render::parser::{parse_object, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_f64, arg_str, BetResult, ToolName};

/// price × size, rounded half away from zero to 2 decimals.
pub fn order_cost(price: f64, size: f64) -> Decimal {
    let price = Decimal::from_f64(price).unwrap_or_default();
    let size = Decimal::from_f64(size).unwrap_or_default();
    price
        .checked_mul(size)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The ticket always reflects the attempted order, whatever the outcome.
fn ticket(args: &Map<String, Value>, state: TicketState) -> OrderTicket {
    let price = arg_f64(args, "price").unwrap_or(0.0);
    let shares = arg_f64(args, "size").unwrap_or(0.0);
    let side_label = arg_str(args, "side").unwrap_or_default().trim().to_uppercase();
    OrderTicket {
        side: side_label.parse().ok(),
        side_label,
        price,
        shares,
        cost: order_cost(price, shares),
        token_id: arg_str(args, "token_id"),
        state,
    }
}

/// Order ticket for a limit order.
pub struct PlaceBetRenderer;

impl ToolRenderer for PlaceBetRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::PlaceBet.to_string(),
            description: "Place a limit order on a market outcome".into(),
            parameters: vec![
                ParamSpec::required("token_id", "CLOB token ID of the outcome"),
                ParamSpec::required("side", "BUY or SELL"),
                ParamSpec::required("price", "Limit price (0.01 to 0.99)"),
                ParamSpec::required("size", "Number of shares"),
            ],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        Fragment::Ticket(ticket(args, TicketState::Placing))
    }

    fn render_complete(&self, args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        let outcome = match parse_object::<BetResult>(result) {
            Parsed::Ok(r) => r,
            Parsed::Empty => BetResult::default(),
        };
        let state = match outcome.error.filter(|e| !e.trim().is_empty()) {
            Some(error) => TicketState::Failed { error },
            None => TicketState::Succeeded {
                badge: outcome
                    .status
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| capitalise(s.trim()))
                    .unwrap_or_else(|| "Done".to_string()),
            },
        };
        Fragment::Ticket(ticket(args, state))
    }
}
