//! Error types and failure containment

pub mod agent_error;
pub mod circuit_breaker;

pub use agent_error::*;
pub use circuit_breaker::*;
