use serde_json::{Map, Value};

use crate::render::fragment::{Fragment, PriceSummary};
use crate::render::parser::{parse_object, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_str, PriceHistory, PricePoint, ToolName};

fn summarise(points: &[PricePoint]) -> Option<PriceSummary> {
    let first = points.first()?.p;
    let last = points.last()?.p;
    let (low, high) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), pt| (lo.min(pt.p), hi.max(pt.p)));
    Some(PriceSummary {
        points: points.len(),
        first,
        last,
        low,
        high,
        change_pts: ((last - first) * 1000.0).round() / 10.0,
    })
}

/// Summary of a token's price history.
pub struct PriceHistoryRenderer;

impl ToolRenderer for PriceHistoryRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::GetPriceHistory.to_string(),
            description: "Get historical price data for an outcome token".into(),
            parameters: vec![ParamSpec::required("token_id", "CLOB token ID of the outcome")],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        Fragment::progress(
            ToolName::GetPriceHistory.as_str(),
            "Loading price history",
            arg_str(args, "token_id"),
        )
    }

    fn render_complete(&self, _args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        let summary = match parse_object::<PriceHistory>(result) {
            Parsed::Ok(h) => summarise(&h.history),
            Parsed::Empty => None,
        };
        match summary {
            Some(s) => Fragment::PriceSummary(s),
            None => Fragment::empty(ToolName::GetPriceHistory.as_str(), "No price history"),
        }
    }
}
