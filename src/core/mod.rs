//! Core extraction engine module
//!
//! Sequences mount, count, copy, progress finalization, and unmount, and
//! owns the run state for one extraction.

mod extractor;

pub use extractor::*;
