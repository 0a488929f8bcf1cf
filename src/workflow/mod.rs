//! Teacher-request review workflow.
//!
//! - [`state_machine`] owns the lifecycle and the decision guards.
//! - [`eligibility`] plans and runs resource and candidate queries.
//! - [`merge`] reconciles list summaries with detail payloads.
//! - [`orchestrator`] drives a reviewer session end to end.

pub mod eligibility;
pub mod error_map;
pub mod list;
pub mod merge;
pub mod orchestrator;
pub mod state;
pub mod state_machine;

pub use orchestrator::{DecisionOrchestrator, DecisionOutcome, LoadOutcome};
