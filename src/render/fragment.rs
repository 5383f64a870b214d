//! Typed UI fragments produced by the tool renderers.
//!
//! A fragment is plain data. The dashboard turns it into HTML
//! (see `html.rs`); API consumers get it as tagged JSON.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::types::Side;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// In-progress indicator while a tool is running.
    Progress {
        tool: String,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Explicit "no results" state.
    Empty { tool: String, message: String },
    ClosingSoon { rows: Vec<ClosingSoonRow> },
    Citations {
        #[serde(skip_serializing_if = "Option::is_none")]
        query: Option<String>,
        items: Vec<Citation>,
    },
    MarketGrid { cards: Vec<MarketCard> },
    MarketDetail { card: MarketCard },
    Depth(DepthView),
    Ticket(OrderTicket),
    PriceSummary(PriceSummary),
    WatchlistUpdated {
        markets: usize,
        positions: usize,
        last_action: String,
    },
    /// Catch-all for tools without a dedicated renderer.
    Generic {
        tool: String,
        status: String,
        args: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
}

impl Fragment {
    pub fn empty(tool: &str, message: &str) -> Self {
        Fragment::Empty {
            tool: tool.to_string(),
            message: message.to_string(),
        }
    }

    pub fn progress(tool: &str, label: impl Into<String>, detail: Option<String>) -> Self {
        Fragment::Progress {
            tool: tool.to_string(),
            label: label.into(),
            detail,
        }
    }

    /// A fragment that would render as nothing visible.
    pub fn is_blank(&self) -> bool {
        match self {
            Fragment::Empty { message, .. } => message.trim().is_empty(),
            Fragment::Progress { label, .. } => label.trim().is_empty(),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Fragment::Progress { .. } => "progress",
            Fragment::Empty { .. } => "empty",
            Fragment::ClosingSoon { .. } => "closing_soon",
            Fragment::Citations { .. } => "citations",
            Fragment::MarketGrid { .. } => "market_grid",
            Fragment::MarketDetail { .. } => "market_detail",
            Fragment::Depth(_) => "depth",
            Fragment::Ticket(_) => "ticket",
            Fragment::PriceSummary(_) => "price_summary",
            Fragment::WatchlistUpdated { .. } => "watchlist_updated",
            Fragment::Generic { .. } => "generic",
        }
    }
}

/// One outcome bar on a market card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeBar {
    pub label: String,
    /// Whole percentage, price × 100 rounded.
    pub percent: i64,
    /// Bar width in [0, 100].
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCard {
    pub question: String,
    pub outcomes: Vec<OutcomeBar>,
    /// Formatted, e.g. `$15.0K`.
    pub volume: String,
    pub liquidity: String,
    /// Date portion only.
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_pct: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosingSoonRow {
    /// 1-based.
    pub rank: usize,
    pub question: String,
    pub countdown: String,
    pub outcomes: Vec<OutcomeBar>,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthRow {
    /// 3 decimal places.
    pub price: String,
    /// 1 decimal place.
    pub size: String,
    /// Proportional bar width in [0, 100].
    pub width: f64,
}

/// Order book depth panel. `asks` are already in display order
/// (reversed, best ask last, adjacent to the divider).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepthView {
    pub asks: Vec<DepthRow>,
    pub bids: Vec<DepthRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TicketState {
    /// Still executing: "placing" label, no badge.
    Placing,
    Succeeded { badge: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTicket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Side as the agent sent it, for display when it isn't BUY/SELL.
    pub side_label: String,
    pub price: f64,
    pub shares: f64,
    /// price × size, rounded to 2 decimals.
    pub cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    /// Flattened: `state` plus `badge` or `error` sit beside the prices.
    #[serde(flatten)]
    pub state: TicketState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub points: usize,
    pub first: f64,
    pub last: f64,
    pub low: f64,
    pub high: f64,
    /// last - first, in percentage points.
    pub change_pts: f64,
}
