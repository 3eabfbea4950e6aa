//! Arbitrage opportunity detection
//!
//! Pure pairing over a snapshot of quotes; no I/O. All percentage math
//! stays in `Decimal` so the threshold comparison is exact. The profit
//! threshold is inclusive: an opportunity whose net profit equals
//! `min_profit_pct` passes.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;
use crate::types::{ArbitrageOpportunity, Quote};

/// Finds every profitable ordered venue pairing among `quotes`.
///
/// `gas_cost_estimate` is a flat amount in base token units; it is
/// converted into a percentage of the trade notional (`trade_size`) and
/// subtracted from the gross spread. The result is sorted by descending
/// net profit, ties broken by descending gross profit and then by
/// ascending (buy, sell) venue ids, so the output is invariant under any
/// permutation of the input.
///
/// Fewer than two quotes is normal insufficiency, not an error: the
/// result is simply empty.
pub fn find_opportunities(
    quotes: &[Quote],
    min_profit_pct: Decimal,
    gas_cost_estimate: Decimal,
    trade_size: Decimal,
) -> Vec<ArbitrageOpportunity> {
    if quotes.len() < 2 || trade_size <= dec!(0) {
        return Vec::new();
    }

    let pair = &quotes[0].pair;
    let gas_cost_pct = gas_cost_estimate / trade_size * dec!(100);

    let mut opportunities = Vec::new();

    for buy in quotes {
        if buy.pair != *pair {
            debug!("Skipping quote for mismatched pair {} in {} snapshot", buy.pair, pair);
            continue;
        }
        for sell in quotes {
            if sell.pair != *pair || buy.venue_id == sell.venue_id {
                continue;
            }
            if buy.price <= dec!(0) {
                continue;
            }

            let gross_profit_pct = (sell.price - buy.price) / buy.price * dec!(100);
            if gross_profit_pct <= dec!(0) {
                continue;
            }

            let net_profit_pct = gross_profit_pct - gas_cost_pct;
            if net_profit_pct < min_profit_pct {
                continue;
            }

            opportunities.push(ArbitrageOpportunity {
                id: uuid::Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                pair: pair.clone(),
                buy_venue: buy.venue_id.clone(),
                sell_venue: sell.venue_id.clone(),
                buy_price: buy.price,
                sell_price: sell.price,
                gross_profit_pct,
                estimated_gas_cost: gas_cost_estimate,
                net_profit_pct,
                trade_size,
            });
        }
    }

    opportunities.sort_by(|a, b| {
        b.net_profit_pct
            .cmp(&a.net_profit_pct)
            .then_with(|| b.gross_profit_pct.cmp(&a.gross_profit_pct))
            .then_with(|| a.buy_venue.cmp(&b.buy_venue))
            .then_with(|| a.sell_venue.cmp(&b.sell_venue))
    });

    opportunities
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::types::TokenPair;

    fn quote(venue: &str, price: Decimal) -> Quote {
        Quote::new(venue, TokenPair::new("WETH", "USDC"), price)
    }

    #[test]
    fn no_spread_means_no_opportunities() {
        let quotes = vec![
            quote("alpha", dec!(3250)),
            quote("bravo", dec!(3250)),
            quote("charlie", dec!(3250)),
        ];
        assert!(find_opportunities(&quotes, dec!(0.1), dec!(0), dec!(1)).is_empty());
    }

    #[test]
    fn single_quote_is_insufficient_data() {
        let quotes = vec![quote("alpha", dec!(3250))];
        assert!(find_opportunities(&quotes, dec!(0.1), dec!(0), dec!(1)).is_empty());
    }

    #[test]
    fn detects_the_documented_scenario() {
        // Buy at 3245.50, sell at 3262.75; gas worth 0.1% of notional.
        let quotes = vec![quote("alpha", dec!(3245.50)), quote("bravo", dec!(3262.75))];
        let found = find_opportunities(&quotes, dec!(0.3), dec!(0.001), dec!(1));

        assert_eq!(found.len(), 1);
        let opp = &found[0];
        assert_eq!(opp.buy_venue, "alpha");
        assert_eq!(opp.sell_venue, "bravo");
        assert!((opp.gross_profit_pct - dec!(0.5315)).abs() < dec!(0.0001));
        assert!((opp.net_profit_pct - dec!(0.4315)).abs() < dec!(0.0001));
        // Exact fixed-point identity, not approximate.
        assert_eq!(opp.net_profit_pct, opp.gross_profit_pct - dec!(0.1));
    }

    #[test]
    fn same_scenario_below_a_higher_threshold_is_empty() {
        let quotes = vec![quote("alpha", dec!(3245.50)), quote("bravo", dec!(3262.75))];
        assert!(find_opportunities(&quotes, dec!(1.0), dec!(0.001), dec!(1)).is_empty());
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 100 -> 101 is exactly 1% gross; with zero gas the net equals the
        // threshold and must pass.
        let quotes = vec![quote("alpha", dec!(100)), quote("bravo", dec!(101))];
        let found = find_opportunities(&quotes, dec!(1), dec!(0), dec!(1));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].net_profit_pct, dec!(1));
    }

    #[test]
    fn sorted_by_net_profit_descending() {
        let quotes = vec![
            quote("alpha", dec!(100)),
            quote("bravo", dec!(102)),
            quote("charlie", dec!(105)),
        ];
        let found = find_opportunities(&quotes, dec!(0.1), dec!(0), dec!(1));

        assert!(!found.is_empty());
        for window in found.windows(2) {
            assert!(window[0].net_profit_pct >= window[1].net_profit_pct);
        }
        // Widest spread first: buy alpha, sell charlie.
        assert_eq!(found[0].buy_venue, "alpha");
        assert_eq!(found[0].sell_venue, "charlie");
    }

    #[test]
    fn gas_cost_scales_with_notional() {
        // 0.02 base units of gas on a 2-unit trade is 1% of notional.
        let quotes = vec![quote("alpha", dec!(100)), quote("bravo", dec!(103))];
        let found = find_opportunities(&quotes, dec!(0), dec!(0.02), dec!(2));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].net_profit_pct, dec!(2));
    }

    fn strip_ids(mut opps: Vec<ArbitrageOpportunity>) -> Vec<(String, String, Decimal)> {
        opps.drain(..)
            .map(|o| (o.buy_venue, o.sell_venue, o.net_profit_pct))
            .collect()
    }

    proptest! {
        #[test]
        fn output_is_invariant_under_input_permutation(
            prices in proptest::collection::vec(1u32..100_000u32, 2..6),
            rotation in 0usize..6,
        ) {
            let venues = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
            let quotes: Vec<Quote> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| quote(venues[i], Decimal::from(*p) / dec!(100)))
                .collect();

            let mut rotated = quotes.clone();
            let rotated_len = rotated.len();
            rotated.rotate_left(rotation % rotated_len);

            let a = find_opportunities(&quotes, dec!(0.1), dec!(0.001), dec!(1));
            let b = find_opportunities(&rotated, dec!(0.1), dec!(0.001), dec!(1));
            prop_assert_eq!(strip_ids(a), strip_ids(b));
        }

        #[test]
        fn every_opportunity_upholds_its_invariants(
            prices in proptest::collection::vec(1u32..100_000u32, 2..6),
        ) {
            let venues = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
            let quotes: Vec<Quote> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| quote(venues[i], Decimal::from(*p) / dec!(100)))
                .collect();

            let found = find_opportunities(&quotes, dec!(0.1), dec!(0.001), dec!(1));
            for opp in &found {
                prop_assert!(opp.buy_price < opp.sell_price);
                prop_assert!(opp.net_profit_pct >= dec!(0.1));
                // Net equals gross minus gas-as-percentage, exactly.
                let gas_pct = opp.estimated_gas_cost / opp.trade_size * dec!(100);
                prop_assert_eq!(opp.net_profit_pct, opp.gross_profit_pct - gas_pct);
            }
        }
    }
}
