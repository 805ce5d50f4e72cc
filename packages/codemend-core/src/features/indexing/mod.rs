//! Indexing: source units, the source index, and the repo scanner

pub mod scanner;
pub mod source_index;
pub mod source_unit;

pub use scanner::RepoScanner;
pub use source_index::SourceIndex;
pub use source_unit::SourceUnit;
