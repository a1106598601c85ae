//! Mount control module
//!
//! Brings the filesystem image online and offline through the external
//! privileged mount tooling. The crate never reads the image's on-disk
//! format itself; decompression is the mount layer's job.

mod controller;

pub use controller::*;
