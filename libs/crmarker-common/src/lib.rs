pub mod config;
pub mod types;

pub use config::MarkingConfig;
pub use types::{CheckResult, ExecutionOutcome, MarkingRequest, Verdict, SENTINEL};
