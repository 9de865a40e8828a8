//! Per-cycle audit orchestration

pub mod orchestrator;

pub use orchestrator::*;
