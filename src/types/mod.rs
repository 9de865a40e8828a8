//! Core data types and structures

pub mod tokens;
pub mod pools;
pub mod opportunity;
pub mod execution;
pub mod report;

pub use tokens::*;
pub use pools::*;
pub use opportunity::*;
pub use execution::*;
pub use report::*;
