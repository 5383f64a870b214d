//! Built-in renderers, one per agent tool.

mod closing_soon;
mod details;
mod fallback;
mod order_book;
mod place_bet;
mod price_history;
mod research;
mod search;
mod watchlist;

pub use closing_soon::{ClosingSoonRenderer, MAX_CLOSING_ROWS};
pub use details::MarketDetailsRenderer;
pub use fallback::FallbackRenderer;
pub use order_book::{depth_view, OrderBookRenderer, MAX_DEPTH_LEVELS};
pub use place_bet::{order_cost, PlaceBetRenderer};
pub use price_history::PriceHistoryRenderer;
pub use research::ResearchRenderer;
pub use search::{SearchMarketsRenderer, MAX_SEARCH_CARDS};
pub use watchlist::WatchlistRenderer;
