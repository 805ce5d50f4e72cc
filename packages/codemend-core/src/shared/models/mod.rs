//! Shared data models

pub mod error;
pub mod finding;
pub mod span;

pub use error::{CodemendError, ErrorKind, Result};
pub use finding::{rules, Finding, Severity};
pub use span::{Location, Span};
