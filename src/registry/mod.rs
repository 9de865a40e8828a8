//! Synthetic token registry

pub mod address_map;

pub use address_map::*;
