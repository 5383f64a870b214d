use serde_json::{Map, Value};

use crate::render::format::clamp_width;
use crate::render::fragment::{DepthRow, DepthView, Fragment};
use crate::render::parser::{parse_object, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_str, Level, OrderBook, ToolName};

pub const MAX_DEPTH_LEVELS: usize = 8;

/// Build the depth panel from caller-ordered book sides.
///
/// Sides are not re-sorted: the first `MAX_DEPTH_LEVELS` entries of each
/// are shown as supplied. Asks are reversed so the best ask sits directly
/// above the divider, next to the best bid.
pub fn depth_view(bids: &[Level], asks: &[Level]) -> DepthView {
    let bids = &bids[..bids.len().min(MAX_DEPTH_LEVELS)];
    let asks = &asks[..asks.len().min(MAX_DEPTH_LEVELS)];

    let max_size = bids
        .iter()
        .chain(asks)
        .map(Level::size_f64)
        .fold(1.0_f64, f64::max);

    let row = |level: &Level| DepthRow {
        price: format!("{:.3}", level.price_f64()),
        size: format!("{:.1}", level.size_f64()),
        width: clamp_width(level.size_f64() / max_size * 100.0),
    };

    let spread = match (bids.first(), asks.first()) {
        (Some(bid), Some(ask)) => Some(format!("{:.3}", ask.price_f64() - bid.price_f64())),
        _ => None,
    };

    DepthView {
        asks: asks.iter().rev().map(row).collect(),
        bids: bids.iter().map(row).collect(),
        spread,
    }
}

/// Order book depth view.
pub struct OrderBookRenderer;

impl ToolRenderer for OrderBookRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::GetOrderBook.to_string(),
            description: "Fetch bid/ask depth for an outcome token".into(),
            parameters: vec![ParamSpec::required("token_id", "CLOB token ID of the outcome")],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        Fragment::progress(
            ToolName::GetOrderBook.as_str(),
            "Fetching order book",
            arg_str(args, "token_id"),
        )
    }

    fn render_complete(&self, _args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        match parse_object::<OrderBook>(result) {
            Parsed::Ok(book) if book.bids.is_empty() && book.asks.is_empty() => {
                match book.error {
                    Some(error) => Fragment::empty(
                        ToolName::GetOrderBook.as_str(),
                        &format!("Order book unavailable: {error}"),
                    ),
                    None => Fragment::Depth(DepthView::default()),
                }
            }
            Parsed::Ok(book) => Fragment::Depth(depth_view(&book.bids, &book.asks)),
            Parsed::Empty => Fragment::empty(ToolName::GetOrderBook.as_str(), "Order book unavailable"),
        }
    }
}
