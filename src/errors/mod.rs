//! Error handling for the audit engine

pub mod audit_error;

pub use audit_error::*;
