//! Display and printing utilities

use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, info, warn};
use crate::{
    errors::CircuitBreaker,
    types::{ArbitrageOpportunity, LoopOutcome, Quote},
};

pub async fn print_session_stats(
    start_time: Instant,
    total_opportunities: u64,
    profitable_opportunities: u64,
    finalized_drafts: u64,
    rejected_drafts: u64,
    error_counts: &HashMap<String, u32>,
    circuit_breaker: &CircuitBreaker,
) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   📈 ARBITRAGE:");
    info!("     Opportunities detected: {}", total_opportunities);
    info!("     Above profit threshold: {}", profitable_opportunities);
    info!("   📋 DRAFTS:");
    info!("     Finalized: {}", finalized_drafts);
    info!("     Rejected: {}", rejected_drafts);
    info!("   ⚙️  SYSTEM:");
    info!("     Circuit breaker: {}",
        if circuit_breaker.is_open().await { "OPEN" } else { "CLOSED" }
    );

    if !error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}

pub fn print_quotes(quotes: &[Quote]) {
    for quote in quotes {
        info!(
            "💹 {} | {} = {:.6} ({}ms)",
            quote.venue_id, quote.pair, quote.price, quote.source_latency_ms
        );
    }
}

pub fn print_opportunity(opportunity: &ArbitrageOpportunity) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY #{}", opportunity.id);
    warn!("📍 Pair: {}", opportunity.pair);
    warn!("📋 Strategy: Buy on {} → Sell on {}", opportunity.buy_venue, opportunity.sell_venue);
    warn!("💰 Profit Analysis:");
    warn!("   Buy Price:  {:.6}", opportunity.buy_price);
    warn!("   Sell Price: {:.6}", opportunity.sell_price);
    warn!("   Gross Profit: {:.3}%", opportunity.gross_profit_pct);
    warn!("   Net Profit:   {:.3}% (gas {:.4} {})",
        opportunity.net_profit_pct,
        opportunity.estimated_gas_cost,
        opportunity.pair.base
    );
    warn!("   Trade Size: {} {}", opportunity.trade_size, opportunity.pair.base);
}

pub fn print_loop_outcome(outcome: &LoopOutcome) {
    match outcome {
        LoopOutcome::Finalized { draft, rounds, .. } => {
            warn!("\n✅ DRAFT FINALIZED #{} (round {})", draft.id, rounds);
            warn!("   To: {}", draft.to);
            warn!("   Value: {} wei", draft.value);
            warn!("   Gas: {} units (estimated: {})", draft.estimated_gas, draft.gas_estimated);
            warn!("   Revision: {}", draft.revision);
            if draft.private_relay {
                warn!("   Routing: private relay");
            }
        }
        LoopOutcome::Rejected { reasons, rounds } => {
            error!("\n❌ DRAFT REJECTED after {} round(s)", rounds);
            for reason in reasons {
                error!("   {}", reason);
            }
        }
    }
}
