//! Core data types and structures

pub mod pair;
pub mod quote;
pub mod opportunity;
pub mod draft;
pub mod evaluation;

pub use pair::*;
pub use quote::*;
pub use opportunity::*;
pub use draft::*;
pub use evaluation::*;
