//! Per-entry copy
//!
//! Creates one destination node per source entry: payload dispatch on the
//! entry's POSIX type, then the best-effort metadata sequence (permission
//! bits, link-aware ownership, extended attributes). Metadata steps are
//! attempted independently; every failure is recorded and returned so the
//! caller can fail the entry without losing the remaining steps.

use crate::error::{ExtractError, IoResultExt, MetadataFailure, MetadataStep, Result};
use crate::fs::{copy_file_contents, EntryKind, SourceEntry};
use nix::sys::stat::{mknod, Mode, SFlag};
use std::os::unix::fs::{lchown, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of copying one entry whose payload succeeded
#[derive(Debug)]
pub struct EntryOutcome {
    /// Bytes of regular-file content moved (0 for all other types)
    pub bytes_copied: u64,
    /// Failed metadata steps, empty when the entry is fully replicated
    pub metadata_failures: Vec<MetadataFailure>,
}

impl EntryOutcome {
    /// True when every metadata step succeeded as well
    pub fn is_clean(&self) -> bool {
        self.metadata_failures.is_empty()
    }
}

/// Copies single entries from the source tree into the destination tree
#[derive(Debug, Clone)]
pub struct EntryCopier {
    dest_root: PathBuf,
}

impl EntryCopier {
    /// Create a copier mirroring entries under `dest_root`
    pub fn new(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            dest_root: dest_root.into(),
        }
    }

    /// Destination path an entry maps to
    pub fn dest_path(&self, entry: &SourceEntry) -> PathBuf {
        self.dest_root.join(&entry.relative_path)
    }

    /// Copy one entry: payload, then metadata
    ///
    /// A payload failure returns immediately and the entry does not count
    /// as completed. Metadata failures are accumulated in the returned
    /// outcome; the caller decides the entry's net verdict.
    pub fn copy_entry(&self, entry: &SourceEntry) -> Result<EntryOutcome> {
        let dest = self.dest_path(entry);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).with_path(parent)?;
        }

        let bytes_copied = match entry.kind {
            EntryKind::Regular => copy_file_contents(&entry.path, &dest, entry.size)?,
            EntryKind::Symlink => {
                self.copy_symlink(entry, &dest)?;
                0
            }
            EntryKind::Directory => {
                // May already exist as some child's parent; that is fine.
                std::fs::create_dir_all(&dest).with_path(&dest)?;
                0
            }
            EntryKind::CharDevice
            | EntryKind::BlockDevice
            | EntryKind::Fifo
            | EntryKind::Socket => {
                self.make_node(entry, &dest)?;
                0
            }
            EntryKind::Unknown => {
                return Err(ExtractError::UnsupportedFileType {
                    path: entry.path.clone(),
                    mode: entry.mode,
                });
            }
        };

        Ok(EntryOutcome {
            bytes_copied,
            metadata_failures: self.apply_metadata(entry, &dest),
        })
    }

    /// Recreate a symlink with an identical target
    ///
    /// The link target is read as-is and never resolved, so a link is never
    /// materialized as file content.
    fn copy_symlink(&self, entry: &SourceEntry, dest: &Path) -> Result<()> {
        let target = std::fs::read_link(&entry.path)
            .map_err(|e| ExtractError::symlink(&entry.path, format!("readlink: {e}")))?;
        std::os::unix::fs::symlink(&target, dest).map_err(|e| {
            ExtractError::symlink(dest, format!("symlink to '{}': {e}", target.display()))
        })?;
        Ok(())
    }

    /// Recreate a device node, FIFO, or socket with the original device number
    fn make_node(&self, entry: &SourceEntry, dest: &Path) -> Result<()> {
        let kind = match entry.kind {
            EntryKind::CharDevice => SFlag::S_IFCHR,
            EntryKind::BlockDevice => SFlag::S_IFBLK,
            EntryKind::Fifo => SFlag::S_IFIFO,
            EntryKind::Socket => SFlag::S_IFSOCK,
            _ => unreachable!("make_node called for non-special entry"),
        };
        let perm = Mode::from_bits_truncate(entry.mode as nix::libc::mode_t);
        mknod(dest, kind, perm, entry.rdev as nix::libc::dev_t)
            .map_err(|e| ExtractError::io(dest, e.into()))?;
        Ok(())
    }

    /// Best-effort metadata replication, in order: mode, ownership, xattrs
    ///
    /// Each step runs regardless of earlier failures; every failure is
    /// logged and recorded.
    fn apply_metadata(&self, entry: &SourceEntry, dest: &Path) -> Vec<MetadataFailure> {
        let mut failures = Vec::new();

        // Permission bits. A symlink's mode is not independently settable.
        if entry.kind != EntryKind::Symlink {
            let perms = std::fs::Permissions::from_mode(entry.mode);
            if let Err(e) = std::fs::set_permissions(dest, perms) {
                warn!(path = %dest.display(), "chmod {:#o} failed: {e}", entry.mode);
                failures.push(MetadataFailure {
                    step: MetadataStep::Permissions,
                    detail: e.to_string(),
                });
            }
        }

        // Ownership on the node itself; for symlinks this applies to the
        // link, not its target.
        if let Err(e) = lchown(dest, Some(entry.uid), Some(entry.gid)) {
            warn!(path = %dest.display(), uid = entry.uid, gid = entry.gid, "lchown failed: {e}");
            failures.push(MetadataFailure {
                step: MetadataStep::Ownership,
                detail: e.to_string(),
            });
        }

        failures.extend(self.copy_xattrs(entry, dest));
        failures
    }

    /// Replicate every extended attribute in source enumeration order
    ///
    /// Uses the link-aware path API, so a symlink's own attributes are
    /// copied. Individual attribute failures are recorded and the rest are
    /// still attempted.
    fn copy_xattrs(&self, entry: &SourceEntry, dest: &Path) -> Vec<MetadataFailure> {
        let mut failures = Vec::new();

        let names = match xattr::list(&entry.path) {
            Ok(names) => names,
            Err(e) => {
                warn!(path = %entry.path.display(), "listxattr failed: {e}");
                failures.push(MetadataFailure {
                    step: MetadataStep::Xattr,
                    detail: format!("list: {e}"),
                });
                return failures;
            }
        };

        for name in names {
            let value = match xattr::get(&entry.path, &name) {
                Ok(Some(value)) => value,
                // Attribute disappeared between list and get.
                Ok(None) => continue,
                Err(e) => {
                    warn!(path = %entry.path.display(), attr = ?name, "getxattr failed: {e}");
                    failures.push(MetadataFailure {
                        step: MetadataStep::Xattr,
                        detail: format!("get {}: {e}", name.to_string_lossy()),
                    });
                    continue;
                }
            };
            if let Err(e) = xattr::set(dest, &name, &value) {
                warn!(path = %dest.display(), attr = ?name, "setxattr failed: {e}");
                failures.push(MetadataFailure {
                    step: MetadataStep::Xattr,
                    detail: format!("set {}: {e}", name.to_string_lossy()),
                });
            }
        }

        failures
    }
}
