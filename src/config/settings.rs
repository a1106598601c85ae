//! Configuration settings for squashfs-extract
//!
//! Defines the CLI surface, the run configuration derived from it,
//! and the fixed paths and limits the extraction pipeline relies on.

use crate::error::{ExtractError, IoResultExt, Result};
use clap::Parser;
use std::path::PathBuf;

/// Default folder name of the extraction target.
pub const DEFAULT_DEST: &str = "squashfs-root";

/// Absolute folder path the filesystem image is mounted to.
pub const MOUNT_POINT: &str = "/dev/shm/squashfs-extract";

/// Maximum number of simultaneously open directory handles during traversal.
///
/// Keeps deep/wide trees within the process descriptor limit; see
/// /proc/self/limits.
pub const MAX_OPEN_DIRS: usize = 256;

/// squashfs-extract - extract a squashfs filesystem image
#[derive(Parser, Debug, Clone)]
#[command(name = "squashfs-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tool to extract squashfs filesystem images")]
#[command(long_about = r#"
Mounts a squashfs filesystem image through the OS mount layer and copies
every entry into a destination directory, preserving file types, permission
bits, ownership, and extended attributes. Extraction progress (0-100) is
written to a progress file for an external consumer, or to stdout.

Examples:
  squashfs-extract filesystem.squashfs                     # extract to ./squashfs-root
  squashfs-extract --dest /mnt/target filesystem.squashfs  # extract to /mnt/target
  squashfs-extract --progress /run/progress img.squashfs   # progress to a file
"#)]
pub struct CliArgs {
    /// squashfs filesystem image to be extracted
    #[arg(value_name = "FILE")]
    pub image: PathBuf,

    /// Extract to <PATHNAME>
    #[arg(long, default_value = DEFAULT_DEST, value_name = "PATHNAME")]
    pub dest: PathBuf,

    /// Print progress info to <FILE> instead of stdout
    #[arg(long, value_name = "FILE")]
    pub progress: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Resolved configuration for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Path to the filesystem image
    pub image: PathBuf,
    /// Destination directory the tree is mirrored into
    pub dest: PathBuf,
    /// Progress sink path; `None` means stdout
    pub progress_file: Option<PathBuf>,
    /// Where the image gets mounted
    pub mount_point: PathBuf,
}

impl ExtractConfig {
    /// Build a configuration from parsed CLI arguments
    pub fn from_cli(args: &CliArgs) -> Self {
        Self {
            image: args.image.clone(),
            dest: args.dest.clone(),
            progress_file: args.progress.clone(),
            mount_point: PathBuf::from(MOUNT_POINT),
        }
    }

    /// Validate the image before any filesystem mutation
    ///
    /// The image must exist, be a regular file, and be non-empty.
    pub fn validate(&self) -> Result<()> {
        if !self.image.is_file() {
            return Err(ExtractError::ImageNotFound(self.image.clone()));
        }
        let metadata = std::fs::metadata(&self.image).with_path(&self.image)?;
        if metadata.len() == 0 {
            return Err(ExtractError::ImageEmpty(self.image.clone()));
        }
        Ok(())
    }
}
