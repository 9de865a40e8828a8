//! Input datasets: the real pool snapshot and the candidate cycle list

pub mod opportunities;
pub mod pools;

pub use opportunities::*;
pub use pools::*;
