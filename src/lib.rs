//! # squashfs-extract - Filesystem Image Extraction
//!
//! squashfs-extract deploys the contents of a squashfs filesystem image
//! into a destination directory. The image is brought online through the
//! OS mount layer (decompression included), then mirrored entry by entry:
//! every POSIX file type, permission bits, ownership, and extended
//! attributes, with the completion percentage persisted for an external
//! consumer such as an installer frontend.
//!
//! ## Features
//!
//! - **Two-pass traversal**: count first, then copy, so progress is exact
//! - **Physical walk**: symlinks are recreated, never followed or inlined
//! - **Zero-copy transfer**: regular files move via `sendfile(2)`
//! - **Full metadata**: mode bits, link-aware ownership, xattrs
//! - **Fail-fast**: the payload is deployed completely or the run fails
//! - **Bounded descriptors**: at most 256 directory handles open at once
//!
//! ## Quick Start
//!
//! ```no_run
//! use squashfs_extract::config::ExtractConfig;
//! use squashfs_extract::core::ExtractEngine;
//! use std::path::PathBuf;
//!
//! let config = ExtractConfig {
//!     image: PathBuf::from("filesystem.squashfs"),
//!     dest: PathBuf::from("squashfs-root"),
//!     progress_file: None,
//!     mount_point: PathBuf::from(squashfs_extract::config::MOUNT_POINT),
//! };
//!
//! let mut engine = ExtractEngine::new(config);
//! let report = engine.execute().unwrap();
//! report.print_summary();
//! ```
//!
//! ## Copying an already-mounted tree
//!
//! ```no_run
//! use squashfs_extract::config::ExtractConfig;
//! use squashfs_extract::core::ExtractEngine;
//! use std::path::{Path, PathBuf};
//!
//! # let config = ExtractConfig {
//! #     image: PathBuf::new(),
//! #     dest: PathBuf::from("out"),
//! #     progress_file: None,
//! #     mount_point: PathBuf::new(),
//! # };
//! let mut engine = ExtractEngine::new(config);
//! let report = engine.copy_files(Path::new("/mnt/source")).unwrap();
//! println!("copied {} entries", report.entries_copied);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod mount;
pub mod progress;

// Re-export commonly used types
pub use config::{CliArgs, ExtractConfig};
pub use error::{ExtractError, Result};
pub use progress::{ProgressTracker, ProgressWriter};
pub use self::core::{ExtractEngine, ExtractReport, RunState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use squashfs_extract::prelude::*;
    //! ```

    pub use crate::config::{CliArgs, ExtractConfig};
    pub use crate::core::{ExtractEngine, ExtractReport, RunState};
    pub use crate::error::{ExtractError, IoResultExt, Result};
    pub use crate::fs::{EntryCopier, EntryKind, SourceEntry, TreeWalker};
    pub use crate::mount::MountController;
    pub use crate::progress::{ProgressTracker, ProgressWriter};
}
