//! Cycle execution

pub mod engine;

pub use engine::*;
