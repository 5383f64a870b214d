//! Server-rendered dashboard page (`templates/page.html`).

use askama::Template;

use crate::engine::ScanStatus;
use crate::render::format::{format_signed_pct, format_signed_usd};
use crate::render::fragment::MarketCard;
use crate::render::market_card::market_card;
use crate::state::Snapshot;
use crate::types::Position;

use super::activity::ActivityEntry;

/// Shown until the agent reports a wallet balance.
pub const WALLET_BOOTSTRAP_MESSAGE: &str =
    "No agent wallet yet. Run the wallet setup command to create one.";

pub struct PositionRow {
    pub question: String,
    pub outcome: String,
    pub size: f64,
    pub avg_price: f64,
    pub current_price: f64,
    pub class: &'static str,
    pub pnl: String,
    pub pnl_pct: String,
}

impl From<&Position> for PositionRow {
    fn from(p: &Position) -> Self {
        let pnl = p.pnl();
        Self {
            question: p.market_question.clone(),
            outcome: p.outcome.clone(),
            size: p.size,
            avg_price: p.avg_price,
            current_price: p.current_price,
            class: pnl_class(pnl),
            pnl: format_signed_usd(pnl),
            pnl_pct: format_signed_pct(p.pnl_pct()),
        }
    }
}

pub struct ActivityRow {
    pub id: String,
    pub tool: String,
    pub status: String,
    pub time: String,
    /// Already rendered by the fragment templates.
    pub html: String,
}

impl From<&ActivityEntry> for ActivityRow {
    fn from(e: &ActivityEntry) -> Self {
        Self {
            id: e.id.clone(),
            tool: e.tool.clone(),
            status: e.status.as_str().to_string(),
            time: e.updated_at.format("%H:%M:%S").to_string(),
            html: e.fragment.to_html(),
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct DashboardPage {
    pub wallet: Option<String>,
    pub bootstrap: &'static str,
    pub total_pnl: String,
    pub pnl_class: &'static str,
    pub market_count: usize,
    pub last_action: String,
    /// `None` hides the stat; there is no scanner.
    pub last_scan: Option<String>,
    pub version: u64,
    pub cards: Vec<MarketCard>,
    pub positions: Vec<PositionRow>,
    pub activity: Vec<ActivityRow>,
}

impl DashboardPage {
    /// Build the page from one snapshot and the activity feed.
    pub fn new<'a>(
        snapshot: &Snapshot,
        activity: impl Iterator<Item = &'a ActivityEntry>,
        scan: Option<&ScanStatus>,
    ) -> Self {
        let state = &snapshot.state;
        let last_action = match state.last_action.trim() {
            "" => "-".to_string(),
            action => action.to_string(),
        };
        let last_scan = scan.map(|s| {
            s.last_scan
                .map(|t| t.format("%H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string())
        });

        Self {
            wallet: state.has_wallet().then(|| state.wallet_balance.trim().to_string()),
            bootstrap: WALLET_BOOTSTRAP_MESSAGE,
            total_pnl: format_signed_usd(state.total_pnl),
            pnl_class: pnl_class(state.total_pnl),
            market_count: state.markets.len(),
            last_action,
            last_scan,
            version: snapshot.version,
            cards: state.markets.iter().map(market_card).collect(),
            positions: state.positions.iter().map(PositionRow::from).collect(),
            activity: activity.map(ActivityRow::from).collect(),
        }
    }
}

fn pnl_class(v: f64) -> &'static str {
    if v > 0.0 {
        "positive"
    } else if v < 0.0 {
        "negative"
    } else {
        ""
    }
}
