//! Network providers and transport-level retry

pub mod providers;
pub mod retry;

pub use providers::*;
pub use retry::*;
