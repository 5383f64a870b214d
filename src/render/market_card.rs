//! Generic market card, shared by search results, market details and
//! the dashboard watchlist.

use super::format::{clamp_width, date_only, format_volume};
use super::fragment::{MarketCard, OutcomeBar};
use crate::types::Market;

/// Outcome bars for a market. Missing prices render as 0%.
pub fn outcome_bars(market: &Market) -> Vec<OutcomeBar> {
    market
        .quotes()
        .into_iter()
        .map(|q| OutcomeBar {
            percent: q.percent(),
            width: clamp_width(q.price * 100.0),
            label: q.label,
        })
        .collect()
}

pub fn market_card(market: &Market) -> MarketCard {
    MarketCard {
        question: market.question.clone(),
        outcomes: outcome_bars(market),
        volume: format_volume(market.volume_usd()),
        liquidity: format_volume(market.liquidity_usd()),
        end_date: date_only(&market.end_date),
        recommendation: market
            .recommendation
            .clone()
            .filter(|r| !r.trim().is_empty()),
        confidence_pct: market.confidence.map(|c| (c * 100.0).round() as i64),
        edge_pct: market.edge.map(|e| (e * 1000.0).round() / 10.0),
        reasoning: market.reasoning.clone().filter(|r| !r.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Market {
        Market {
            id: "m1".into(),
            question: "Will X happen?".into(),
            outcomes: vec!["Yes".into(), "No".into()],
            outcome_prices: vec!["0.62".into(), "0.38".into()],
            volume: "15000".into(),
            liquidity: "5000".into(),
            end_date: "2025-01-01T00:00:00Z".into(),
            confidence: Some(0.8),
            edge: Some(-0.053),
            recommendation: Some("BUY YES".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_market_card_fields() {
        let card = market_card(&sample());
        assert_eq!(card.outcomes[0].percent, 62);
        assert_eq!(card.outcomes[1].percent, 38);
        assert_eq!(card.volume, "$15.0K");
        assert_eq!(card.liquidity, "$5.0K");
        assert_eq!(card.end_date, "2025-01-01");
        assert_eq!(card.confidence_pct, Some(80));
        assert_eq!(card.edge_pct, Some(-5.3));
        assert_eq!(card.recommendation.as_deref(), Some("BUY YES"));
        assert!(card.reasoning.is_none());
    }

    #[test]
    fn test_outcome_bars_short_prices() {
        let mut m = sample();
        m.outcomes.push("Maybe".into());
        let bars = outcome_bars(&m);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[2].percent, 0);
        assert_eq!(bars[2].width, 0.0);
    }
}
