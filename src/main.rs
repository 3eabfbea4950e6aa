//! DEX Arbitrage Agent - Main Entry Point
//!
//! Scans configured pairs across venues, detects arbitrage, drafts the
//! buy-leg transaction and validates it through the evaluation loop.

use dex_arb_agent::*;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, error, info, warn};
use dex_arb_agent::chain::{RpcChainClient, WalletResolver};
use dex_arb_agent::config::Registry;
use dex_arb_agent::drafting::Drafter;
use dex_arb_agent::evaluator::EvaluationLoop;
use dex_arb_agent::utils::cancel::{cancel_pair, CancelToken};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    // Load configuration
    let config = Config::load();

    info!("🤖 DEX Arbitrage Agent v0.3.0");
    info!("📋 Configuration:");
    info!("   Pairs: {}", config.pairs.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", "));
    info!("   Trade Size: {} (base units)", config.trade_size);
    info!("   Min Profit: {}%", config.min_profit_pct);
    info!("   Gas Estimate: {} (base units)", config.gas_cost_estimate);
    info!("   Revision Budget: {}", config.max_retries);
    info!("   Venue Timeout: {}ms / Deadline: {}ms", config.venue_timeout_ms, config.fetch_deadline_ms);

    // Initialize components
    let circuit_breaker = Arc::new(errors::CircuitBreaker::new(
        config.max_consecutive_errors,
        config.circuit_breaker_cooldown_secs,
    ));

    let provider = network::setup_mainnet_provider(&config).await?;
    let chain: Arc<dyn chain::ChainClient> = Arc::new(RpcChainClient::new(provider));
    let registry = Arc::new(Registry::mainnet());
    let adapters = venues::build_adapters(chain.clone(), registry.clone(), &config);
    info!("✅ Initialized {} venue adapter(s)", adapters.len());

    // Drafting and evaluation need a wallet; without one we run
    // detection-only.
    let drafter = match WalletResolver::from_config(&config) {
        Ok(wallet) => {
            info!("👛 Agent wallet: {}", wallet.agent_address());
            Some(Drafter::new(
                chain.clone(),
                wallet,
                registry.clone(),
                config.clone(),
            ))
        }
        Err(e) => {
            warn!("⚠️ {} - running in detection-only mode", e);
            None
        }
    };
    let evaluation_loop = EvaluationLoop::new(chain.clone(), registry.clone(), &config);

    // Setup shutdown handling
    let (cancel_handle, cancel_token) = cancel_pair();
    tokio::spawn({
        let cancel_handle = cancel_handle.clone();
        async move {
            tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
            info!("\n📛 Received shutdown signal (Ctrl+C)...");
            cancel_handle.cancel();
        }
    });

    info!("\n🚀 Starting scan loop...\n");

    let start_time = Instant::now();
    let mut state = ScanState::new();
    let limits = aggregator::FetchLimits::from_config(&config);
    let mut interval = time::interval(Duration::from_secs(config.scan_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = run_scan_cycle(
                    &config,
                    &adapters,
                    &limits,
                    drafter.as_ref(),
                    &evaluation_loop,
                    &circuit_breaker,
                    &cancel_token,
                    &mut state,
                ).await {
                    error!("Scan cycle error: {}", e);
                    if circuit_breaker.record_error().await {
                        error!("Circuit breaker activated due to scan errors");
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Shutdown requested, exiting scan loop...");
                break;
            }
        }
    }

    print_final_statistics(start_time, &state, &circuit_breaker).await;
    Ok(())
}

/// Session counters for the scan loop
struct ScanState {
    total_opportunities: u64,
    profitable_opportunities: u64,
    finalized_drafts: u64,
    rejected_drafts: u64,
    error_counts: HashMap<String, u32>,
    cycles: u64,
}

impl ScanState {
    fn new() -> Self {
        Self {
            total_opportunities: 0,
            profitable_opportunities: 0,
            finalized_drafts: 0,
            rejected_drafts: 0,
            error_counts: HashMap::new(),
            cycles: 0,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_scan_cycle(
    config: &Config,
    adapters: &[Arc<dyn venues::VenueAdapter>],
    limits: &aggregator::FetchLimits,
    drafter: Option<&Drafter>,
    evaluation_loop: &EvaluationLoop,
    circuit_breaker: &Arc<errors::CircuitBreaker>,
    cancel: &CancelToken,
    state: &mut ScanState,
) -> Result<()> {
    if !circuit_breaker.can_proceed().await {
        warn!("⚡ Circuit breaker is OPEN, waiting for cooldown...");
        return Ok(());
    }

    state.cycles += 1;

    for pair in &config.pairs {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let quotes = aggregator::fetch_all(pair, adapters, limits, cancel).await;
        utils::print_quotes(&quotes);

        if quotes.len() < 2 {
            let insufficient = AgentError::InsufficientData {
                pair: pair.to_string(),
                got: quotes.len(),
            };
            debug!("{}", insufficient);
            *state.error_counts.entry("insufficient_data".to_string()).or_insert(0) += 1;
            continue;
        }

        let opportunities = detector::find_opportunities(
            &quotes,
            config.min_profit_pct,
            config.gas_cost_estimate,
            config.trade_size,
        );

        state.total_opportunities += opportunities.len() as u64;
        if opportunities.is_empty() {
            debug!("No opportunity above {}% on {}", config.min_profit_pct, pair);
            continue;
        }
        state.profitable_opportunities += 1;

        // Best opportunity first; sort order is deterministic.
        let best = &opportunities[0];
        utils::print_opportunity(best);

        let Some(drafter) = drafter else {
            debug!("No wallet configured, skipping draft for {}", best.id);
            continue;
        };

        match drafter.draft_from_opportunity(best).await {
            Ok(draft) => match evaluation_loop.run(draft, cancel).await {
                Ok(outcome) => {
                    utils::print_loop_outcome(&outcome);
                    match outcome {
                        LoopOutcome::Finalized { .. } => state.finalized_drafts += 1,
                        LoopOutcome::Rejected { .. } => state.rejected_drafts += 1,
                    }
                    circuit_breaker.record_success().await;
                }
                Err(AgentError::Cancelled) => return Ok(()),
                Err(e) => {
                    error!("Evaluation loop failed for {}: {}", best.id, e);
                    *state.error_counts.entry("evaluation".to_string()).or_insert(0) += 1;
                }
            },
            Err(e) => {
                warn!("Drafting failed for opportunity {}: {}", best.id, e);
                *state.error_counts.entry("drafting".to_string()).or_insert(0) += 1;
            }
        }
    }

    Ok(())
}

async fn print_final_statistics(
    start_time: Instant,
    state: &ScanState,
    circuit_breaker: &errors::CircuitBreaker,
) {
    info!("\n🛑 Shutting down gracefully...");
    info!("Final statistics:");
    info!("   Total runtime: {:?}", start_time.elapsed());
    info!("   Scan cycles: {}", state.cycles);
    utils::print_session_stats(
        start_time,
        state.total_opportunities,
        state.profitable_opportunities,
        state.finalized_drafts,
        state.rejected_drafts,
        &state.error_counts,
        circuit_breaker,
    )
    .await;
}
