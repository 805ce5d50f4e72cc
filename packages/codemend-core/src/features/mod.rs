//! Feature slices of the maintenance pipeline

pub mod detection;
pub mod graph;
pub mod indexing;
pub mod parsing;
pub mod patching;
pub mod planning;
pub mod testing;
