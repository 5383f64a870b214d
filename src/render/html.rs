//! HTML for fragments, rendered through the askama templates under
//! `templates/fragments/`. Class names only; styling lives in the page
//! template.

use askama::Template;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use super::fragment::{
    Citation, ClosingSoonRow, DepthRow, Fragment, MarketCard, OrderTicket, PriceSummary,
    TicketState,
};

#[derive(Template)]
#[template(path = "fragments/progress.html")]
struct ProgressHtml<'a> {
    tool: &'a str,
    label: &'a str,
    detail: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "fragments/empty.html")]
struct EmptyHtml<'a> {
    tool: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "fragments/closing_soon.html")]
struct ClosingSoonHtml<'a> {
    rows: &'a [ClosingSoonRow],
}

struct CitationView<'a> {
    title: &'a str,
    href: Option<&'a str>,
    date: Option<&'a str>,
    excerpt: Option<&'a str>,
}

impl<'a> From<&'a Citation> for CitationView<'a> {
    fn from(c: &'a Citation) -> Self {
        Self {
            title: &c.title,
            href: c.url.as_deref().and_then(safe_href),
            date: c.date.as_deref(),
            excerpt: c.excerpt.as_deref(),
        }
    }
}

#[derive(Template)]
#[template(path = "fragments/citations.html")]
struct CitationsHtml<'a> {
    query: Option<&'a str>,
    items: Vec<CitationView<'a>>,
}

#[derive(Template)]
#[template(path = "fragments/market_grid.html")]
struct MarketGridHtml<'a> {
    cards: &'a [MarketCard],
}

#[derive(Template)]
#[template(path = "fragments/market_detail.html")]
struct MarketDetailHtml<'a> {
    card: &'a MarketCard,
}

#[derive(Template)]
#[template(path = "fragments/depth.html")]
struct DepthHtml<'a> {
    asks: &'a [DepthRow],
    bids: &'a [DepthRow],
    spread: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "fragments/ticket.html")]
struct TicketHtml<'a> {
    state_class: &'static str,
    side_label: &'a str,
    price: f64,
    shares: f64,
    cost: Decimal,
    placing: bool,
    badge: Option<&'a str>,
    error: Option<&'a str>,
}

impl<'a> From<&'a OrderTicket> for TicketHtml<'a> {
    fn from(t: &'a OrderTicket) -> Self {
        let (state_class, placing, badge, error) = match &t.state {
            TicketState::Placing => ("placing", true, None, None),
            TicketState::Succeeded { badge } => ("succeeded", false, Some(badge.as_str()), None),
            TicketState::Failed { error } => ("failed", false, None, Some(error.as_str())),
        };
        Self {
            state_class,
            side_label: &t.side_label,
            price: t.price,
            shares: t.shares,
            cost: t.cost,
            placing,
            badge,
            error,
        }
    }
}

#[derive(Template)]
#[template(path = "fragments/price_summary.html")]
struct PriceSummaryHtml<'a> {
    summary: &'a PriceSummary,
}

#[derive(Template)]
#[template(path = "fragments/watchlist_updated.html")]
struct WatchlistUpdatedHtml<'a> {
    markets: usize,
    positions: usize,
    last_action: &'a str,
}

#[derive(Template)]
#[template(path = "fragments/generic.html")]
struct GenericHtml<'a> {
    tool: &'a str,
    status: &'a str,
    args: String,
    result: Option<String>,
}

/// Only http(s) links are rendered as anchors.
fn safe_href(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then_some(url)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl Fragment {
    /// Render through the template for this fragment's kind.
    pub fn render_html(&self) -> askama::Result<String> {
        match self {
            Fragment::Progress { tool, label, detail } => ProgressHtml {
                tool,
                label,
                detail: detail.as_deref(),
            }
            .render(),
            Fragment::Empty { tool, message } => EmptyHtml { tool, message }.render(),
            Fragment::ClosingSoon { rows } => ClosingSoonHtml { rows }.render(),
            Fragment::Citations { query, items } => CitationsHtml {
                query: query.as_deref(),
                items: items.iter().map(CitationView::from).collect(),
            }
            .render(),
            Fragment::MarketGrid { cards } => MarketGridHtml { cards }.render(),
            Fragment::MarketDetail { card } => MarketDetailHtml { card }.render(),
            Fragment::Depth(view) => DepthHtml {
                asks: &view.asks,
                bids: &view.bids,
                spread: view.spread.as_deref(),
            }
            .render(),
            Fragment::Ticket(t) => TicketHtml::from(t).render(),
            Fragment::PriceSummary(summary) => PriceSummaryHtml { summary }.render(),
            Fragment::WatchlistUpdated { markets, positions, last_action } => WatchlistUpdatedHtml {
                markets: *markets,
                positions: *positions,
                last_action,
            }
            .render(),
            Fragment::Generic { tool, status, args, result } => GenericHtml {
                tool,
                status,
                args: pretty(args),
                result: result.as_ref().map(pretty),
            }
            .render(),
        }
    }

    /// Markup for the dashboard. A template failure is logged and renders
    /// as nothing.
    pub fn to_html(&self) -> String {
        self.render_html().unwrap_or_else(|e| {
            warn!(kind = self.kind(), error = %e, "Fragment template failed to render");
            String::new()
        })
    }
}
