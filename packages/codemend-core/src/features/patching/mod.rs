//! Patching: backups and the patch applier

pub mod applier;
pub mod backup;

pub use applier::{ApplySummary, PatchApplier};
pub use backup::{Backup, BackupStore};
