//! Forensic profit accounting

pub mod calculator;

pub use calculator::*;
