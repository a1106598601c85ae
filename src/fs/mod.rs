//! File system operations module
//!
//! Source-tree modeling, bounded physical traversal, kernel-mediated
//! payload transfer, and per-entry metadata replication.

mod copier;
mod entry;
mod transfer;
mod walker;

pub use copier::*;
pub use entry::*;
pub use transfer::*;
pub use walker::*;
