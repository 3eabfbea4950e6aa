//! Draft evaluation and bounded optimization
//!
//! One evaluation round gathers an external-state snapshot, applies the
//! four fixed criteria as pure functions of (draft, snapshot), and joins
//! the scores. The runner loops evaluation and revision until the draft
//! passes or the revision budget runs out.

pub mod snapshot;
pub mod criteria;
pub mod engine;
pub mod optimizer;
pub mod runner;

pub use criteria::CriterionLimits;
pub use engine::evaluate_draft;
pub use optimizer::Optimizer;
pub use runner::{run_evaluation_loop, EvaluationLoop};
pub use snapshot::ExternalSnapshot;
