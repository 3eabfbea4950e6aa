//! Custom error types for the agent

use alloy::primitives::Address;
use thiserror::Error;

/// Failure taxonomy for the agent core.
///
/// Venue-level and criterion-level failures are contained where they occur
/// and folded into structured results; only `InvalidIntent` and
/// `RevisionLimitExceeded` reach the user-facing caller as failure outcomes.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Contract interaction failed: {contract} - {message}")]
    Contract {
        contract: Address,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Venue {venue} unavailable: {reason}")]
    VenueUnavailable { venue: String, reason: String },

    #[error("Insufficient data for {pair}: {got} quote(s), need at least 2")]
    InsufficientData { pair: String, got: usize },

    #[error("Invalid intent: {reason}")]
    InvalidIntent { reason: String },

    #[error("Criterion {criterion} could not complete: {reason}")]
    CriterionFailed { criterion: String, reason: String },

    #[error("Revision limit exceeded after {attempts} attempt(s)")]
    RevisionLimitExceeded {
        attempts: u32,
        reasons: Vec<String>,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    /// True for failures that abort the surrounding user request rather
    /// than being folded into a structured result.
    pub fn is_fatal_for_request(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidIntent { .. } | AgentError::RevisionLimitExceeded { .. }
        )
    }
}
