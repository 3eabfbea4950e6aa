//! Utility functions and helpers

pub mod abi;
pub mod math;
pub mod logging;
pub mod display;
pub mod cancel;

pub use math::*;
pub use logging::*;
pub use display::*;
pub use cancel::*;
