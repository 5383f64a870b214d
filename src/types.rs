//! Shared types for the FORTUNE dashboard.
//!
//! These mirror the JSON the agent publishes (state snapshots and tool
//! invocation events). Decoding is lenient: the agent is an
//! LLM-driven process and routinely emits numbers as strings, arrays as
//! JSON-encoded strings, or drops fields altogether. Every field decodes
//! to its empty/zero default instead of failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Lenient decoding helpers
// ---------------------------------------------------------------------------

/// Read a JSON number or numeric string as `f64`.
pub fn value_as_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

/// Read a JSON scalar as display text. Objects and arrays yield `None`.
pub fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(value_as_f64(&v).unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(value_as_f64(&v))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(value_as_string(&v).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Null => None,
        Value::Object(_) | Value::Array(_) => Some(v.to_string()),
        other => value_as_string(&other),
    })
}

/// A list of strings that may arrive as a JSON array or as a JSON-encoded
/// string (`"[\"Yes\",\"No\"]"`, the Gamma API convention).
fn lenient_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let v = Value::deserialize(d)?;
    let items = match v {
        Value::Array(items) => items,
        Value::String(s) => serde_json::from_str::<Vec<Value>>(&s).unwrap_or_default(),
        _ => Vec::new(),
    };
    Ok(items.iter().filter_map(value_as_string).collect())
}

/// A list of records where undecodable elements are dropped.
fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Tool arguments may arrive as an object or as its JSON-encoded string.
fn lenient_args<'de, D: Deserializer<'de>>(d: D) -> Result<Map<String, Value>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Object(map) => map,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    })
}

/// A status that is null or not a string reads as `Pending`.
fn lenient_status<'de, D: Deserializer<'de>>(d: D) -> Result<ToolStatus, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => ToolStatus::from(s),
        _ => ToolStatus::Pending,
    })
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// A prediction market as reported by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub outcomes: Vec<String>,
    /// Parallel to `outcomes`, same order.
    #[serde(default, alias = "outcomePrices", deserialize_with = "lenient_string_list")]
    pub outcome_prices: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub volume: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub liquidity: String,
    #[serde(default, alias = "endDate", deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub recommendation: Option<String>,
    /// Agent confidence (0–1).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub reasoning: Option<String>,
    /// Estimated mispricing, signed fraction.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_f64")]
    pub edge: Option<f64>,
    /// Only present on `get_closing_soon_markets` results.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_f64")]
    pub hours_remaining: Option<f64>,
}

/// One outcome paired with its price.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeQuote {
    pub label: String,
    pub price: f64,
}

impl OutcomeQuote {
    /// Implied probability as a whole percentage (price × 100, rounded).
    pub fn percent(&self) -> i64 {
        (self.price * 100.0).round() as i64
    }
}

impl Market {
    /// Price for outcome `i`. A missing or unparseable price reads as 0.
    pub fn price_at(&self, i: usize) -> f64 {
        self.outcome_prices
            .get(i)
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
    }

    /// Outcomes paired positionally with their prices.
    pub fn quotes(&self) -> Vec<OutcomeQuote> {
        self.outcomes
            .iter()
            .enumerate()
            .map(|(i, label)| OutcomeQuote {
                label: label.clone(),
                price: self.price_at(i),
            })
            .collect()
    }

    pub fn volume_usd(&self) -> f64 {
        self.volume.trim().parse().unwrap_or(0.0)
    }

    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.trim().parse().unwrap_or(0.0)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quotes: Vec<String> = self
            .quotes()
            .iter()
            .map(|q| format!("{}: {}%", q.label, q.percent()))
            .collect();
        write!(f, "{} ({})", self.question, quotes.join(" | "))
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A held quantity of one outcome's shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient_string")]
    pub market_question: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub outcome: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub size: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: f64,
}

impl Position {
    /// Unrealized P&L: (current - avg) × size.
    pub fn pnl(&self) -> f64 {
        (self.current_price - self.avg_price) * self.size
    }

    /// P&L as a fraction of cost basis. Zero when the cost basis is zero.
    pub fn pnl_pct(&self) -> f64 {
        let basis = self.avg_price * self.size;
        if basis == 0.0 {
            return 0.0;
        }
        let pct = self.pnl() / basis;
        if pct.is_finite() {
            pct
        } else {
            0.0
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] size={:.2} avg={:.3} now={:.3} pnl={:+.2}",
            self.market_question,
            self.outcome,
            self.size,
            self.avg_price,
            self.current_price,
            self.pnl(),
        )
    }
}

// ---------------------------------------------------------------------------
// Agent state
// ---------------------------------------------------------------------------

/// The shared state blob published by the agent. Replaced wholesale on
/// every push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub markets: Vec<Market>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub positions: Vec<Position>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_action: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wallet_balance: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_pnl: f64,
}

impl AgentState {
    /// Whether the agent has reported a wallet yet.
    pub fn has_wallet(&self) -> bool {
        !self.wallet_balance.trim().is_empty()
    }

    /// Sum of unrealized P&L across open positions.
    pub fn unrealized_pnl(&self) -> f64 {
        self.positions.iter().map(Position::pnl).sum()
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "markets={} positions={} wallet={} pnl={:+.2} last_action={:?}",
            self.markets.len(),
            self.positions.len(),
            if self.has_wallet() { self.wallet_balance.as_str() } else { "-" },
            self.total_pnl,
            self.last_action,
        )
    }
}

// ---------------------------------------------------------------------------
// Tool invocations
// ---------------------------------------------------------------------------

/// Lifecycle of a single tool call: `pending → executing → complete|error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolStatus {
    #[default]
    Pending,
    Executing,
    InProgress,
    Complete,
    Error,
    /// Any status we don't recognise. Treated as terminal.
    Other(String),
}

impl ToolStatus {
    /// Whether the call is still running (render a progress indicator).
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            ToolStatus::Pending | ToolStatus::Executing | ToolStatus::InProgress
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ToolStatus::Pending => "pending",
            ToolStatus::Executing => "executing",
            ToolStatus::InProgress => "inProgress",
            ToolStatus::Complete => "complete",
            ToolStatus::Error => "error",
            ToolStatus::Other(s) => s,
        }
    }
}

impl From<String> for ToolStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => ToolStatus::Pending,
            "executing" => ToolStatus::Executing,
            "inProgress" | "in_progress" => ToolStatus::InProgress,
            "complete" => ToolStatus::Complete,
            "error" => ToolStatus::Error,
            _ => ToolStatus::Other(s),
        }
    }
}

impl From<ToolStatus> for String {
    fn from(s: ToolStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tools the agent is known to expose.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolName {
    ClosingSoonMarkets,
    ExaResearch,
    SearchMarkets,
    GetOrderBook,
    PlaceBet,
    GetMarketDetails,
    GetPriceHistory,
    UpdateWatchlist,
    GetPositions,
    CancelOrder,
    Custom(String),
}

impl ToolName {
    pub fn as_str(&self) -> &str {
        match self {
            ToolName::ClosingSoonMarkets => "get_closing_soon_markets",
            ToolName::ExaResearch => "exa_research",
            ToolName::SearchMarkets => "search_markets",
            ToolName::GetOrderBook => "get_order_book",
            ToolName::PlaceBet => "place_bet",
            ToolName::GetMarketDetails => "get_market_details",
            ToolName::GetPriceHistory => "get_price_history",
            ToolName::UpdateWatchlist => "update_watchlist",
            ToolName::GetPositions => "get_positions",
            ToolName::CancelOrder => "cancel_order",
            ToolName::Custom(name) => name,
        }
    }
}

impl std::str::FromStr for ToolName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "get_closing_soon_markets" => ToolName::ClosingSoonMarkets,
            "exa_research" => ToolName::ExaResearch,
            "search_markets" => ToolName::SearchMarkets,
            "get_order_book" => ToolName::GetOrderBook,
            "place_bet" => ToolName::PlaceBet,
            "get_market_details" => ToolName::GetMarketDetails,
            "get_price_history" => ToolName::GetPriceHistory,
            "update_watchlist" => ToolName::UpdateWatchlist,
            "get_positions" => ToolName::GetPositions,
            "cancel_order" => ToolName::CancelOrder,
            other => ToolName::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed tool call event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Invocation identity. Assigned by the dashboard when absent.
    #[serde(default, alias = "toolCallId", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ToolStatus,
    #[serde(default, deserialize_with = "lenient_args")]
    pub args: Map<String, Value>,
    /// Either a JSON-encoded string or an already structured value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, status: ToolStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            status,
            args: Map::new(),
            result: None,
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            self.args = map;
        }
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn tool_name(&self) -> ToolName {
        match self.name.parse() {
            Ok(name) => name,
            Err(never) => match never {},
        }
    }
}

/// Read a string argument (numbers are stringified).
pub fn arg_str(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(value_as_string)
        .filter(|s| !s.trim().is_empty())
}

/// Read a numeric argument; numeric strings are accepted.
pub fn arg_f64(args: &Map<String, Value>, key: &str) -> Option<f64> {
    args.get(key).and_then(value_as_f64)
}

// ---------------------------------------------------------------------------
// Tool payloads
// ---------------------------------------------------------------------------

/// Order direction for `place_bet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::str::FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(anyhow::anyhow!("Unknown order side: {s}")),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// One price level of an order book side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: String,
}

impl Level {
    pub fn new(price: &str, size: &str) -> Self {
        Self {
            price: price.to_string(),
            size: size.to_string(),
        }
    }

    pub fn price_f64(&self) -> f64 {
        self.price.trim().parse().ok().filter(|p: &f64| p.is_finite()).unwrap_or(0.0)
    }

    pub fn size_f64(&self) -> f64 {
        self.size.trim().parse().ok().filter(|s: &f64| s.is_finite()).unwrap_or(0.0)
    }
}

/// `get_order_book` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub bids: Vec<Level>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub asks: Vec<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub error: Option<String>,
}

/// `exa_research` citation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, alias = "publishedDate", deserialize_with = "lenient_opt_string")]
    pub published_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub text: Option<String>,
}

/// `place_bet` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetResult {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub error: Option<String>,
}

/// One point of a CLOB price history series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub t: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p: f64,
}

/// `get_price_history` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub history: Vec<PricePoint>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for FORTUNE.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("Agent transport not ready: {0}")]
    Transport(String),

    #[error("Agent rejected prompt ({status}): {body}")]
    AgentRejected { status: u16, body: String },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
