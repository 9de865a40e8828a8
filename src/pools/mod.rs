//! Pool dataset lookup and reserve provisioning

pub mod index;
pub mod reserves;

pub use index::*;
pub use reserves::*;
