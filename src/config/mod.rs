//! Configuration module
//!
//! CLI argument definitions, run configuration, and the well-known
//! constants shared by the extraction pipeline.

mod settings;

pub use settings::*;
