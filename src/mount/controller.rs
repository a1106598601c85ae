//! Mount controller implementation
//!
//! Thin wrapper over the system `mount`/`umount` binaries. Exit status
//! decides success; on failure the tool's stderr is surfaced verbatim in
//! the returned error.

use crate::error::{ExtractError, IoResultExt, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Mounts and unmounts the source image at a fixed mount point
#[derive(Debug, Clone)]
pub struct MountController {
    mount_point: PathBuf,
}

impl MountController {
    /// Create a controller for `mount_point`
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self {
            mount_point: mount_point.into(),
        }
    }

    /// The mount point this controller manages
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Mount `image` at the mount point, creating the directory if absent
    pub fn mount(&self, image: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.mount_point).with_path(&self.mount_point)?;

        debug!(image = %image.display(), mount_point = %self.mount_point.display(), "mounting");
        let output = Command::new("mount")
            .arg(image)
            .arg(&self.mount_point)
            .output()
            .with_path(image)?;

        if !output.status.success() {
            return Err(ExtractError::mount(
                image,
                &self.mount_point,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        info!(image = %image.display(), mount_point = %self.mount_point.display(), "mounted");
        Ok(())
    }

    /// Unmount the mount point
    pub fn unmount(&self) -> Result<()> {
        debug!(mount_point = %self.mount_point.display(), "unmounting");
        let output = Command::new("umount")
            .arg(&self.mount_point)
            .output()
            .with_path(&self.mount_point)?;

        if !output.status.success() {
            return Err(ExtractError::unmount(
                &self.mount_point,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        info!(mount_point = %self.mount_point.display(), "unmounted");
        Ok(())
    }
}
