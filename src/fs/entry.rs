//! Source tree entries
//!
//! One `SourceEntry` per node reachable from the mounted source root,
//! captured with `symlink_metadata` so links are described, never followed.

use crate::error::{IoResultExt, Result};
use nix::sys::stat::SFlag;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// POSIX file type of a source entry
///
/// `Unknown` is an explicit variant so the copier can reject it instead of
/// silently falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    Regular,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Character device
    CharDevice,
    /// Block device
    BlockDevice,
    /// Named pipe
    Fifo,
    /// Unix domain socket
    Socket,
    /// Anything the mode bits do not identify
    Unknown,
}

impl EntryKind {
    /// Decode the type bits of a raw `st_mode`
    pub fn from_mode(mode: u32) -> Self {
        match mode & SFlag::S_IFMT.bits() {
            m if m == SFlag::S_IFREG.bits() => EntryKind::Regular,
            m if m == SFlag::S_IFDIR.bits() => EntryKind::Directory,
            m if m == SFlag::S_IFLNK.bits() => EntryKind::Symlink,
            m if m == SFlag::S_IFCHR.bits() => EntryKind::CharDevice,
            m if m == SFlag::S_IFBLK.bits() => EntryKind::BlockDevice,
            m if m == SFlag::S_IFIFO.bits() => EntryKind::Fifo,
            m if m == SFlag::S_IFSOCK.bits() => EntryKind::Socket,
            _ => EntryKind::Unknown,
        }
    }

    /// True for char/block devices, FIFOs and sockets
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            EntryKind::CharDevice | EntryKind::BlockDevice | EntryKind::Fifo | EntryKind::Socket
        )
    }
}

/// Metadata for a single node under the source root
///
/// Immutable snapshot taken at visit time. Extended attributes are
/// enumerated by the copier when they are applied, not stored here.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Absolute path under the source root
    pub path: PathBuf,
    /// Path relative to the source root (empty for the root itself)
    pub relative_path: PathBuf,
    /// POSIX type
    pub kind: EntryKind,
    /// Size in bytes (meaningful for regular files)
    pub size: u64,
    /// Permission bits (mode & 0o7777)
    pub mode: u32,
    /// Owner user id
    pub uid: u32,
    /// Owner group id
    pub gid: u32,
    /// Raw device number for char/block device nodes
    pub rdev: u64,
}

impl SourceEntry {
    /// Create a SourceEntry from a path, relative to `source_root`
    pub fn from_path(path: &Path, source_root: &Path) -> Result<Self> {
        let metadata = std::fs::symlink_metadata(path).with_path(path)?;

        let relative_path = path
            .strip_prefix(source_root)
            .unwrap_or(path)
            .to_path_buf();

        Ok(SourceEntry {
            path: path.to_path_buf(),
            relative_path,
            kind: EntryKind::from_mode(metadata.mode()),
            size: metadata.len(),
            mode: metadata.mode() & 0o7777,
            uid: metadata.uid(),
            gid: metadata.gid(),
            rdev: metadata.rdev(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_mode() {
        assert_eq!(EntryKind::from_mode(0o100644), EntryKind::Regular);
        assert_eq!(EntryKind::from_mode(0o040755), EntryKind::Directory);
        assert_eq!(EntryKind::from_mode(0o120777), EntryKind::Symlink);
        assert_eq!(EntryKind::from_mode(0o020620), EntryKind::CharDevice);
        assert_eq!(EntryKind::from_mode(0o060660), EntryKind::BlockDevice);
        assert_eq!(EntryKind::from_mode(0o010644), EntryKind::Fifo);
        assert_eq!(EntryKind::from_mode(0o140755), EntryKind::Socket);
        assert_eq!(EntryKind::from_mode(0o644), EntryKind::Unknown);
    }

    #[test]
    fn test_regular_file_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"hello world!").unwrap();

        let entry = SourceEntry::from_path(&path, dir.path()).unwrap();
        assert_eq!(entry.kind, EntryKind::Regular);
        assert_eq!(entry.size, 12);
        assert_eq!(entry.relative_path, PathBuf::from("data.bin"));
    }

    #[test]
    fn test_symlink_entry_not_followed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"payload").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("target.txt", &link).unwrap();

        let entry = SourceEntry::from_path(&link, dir.path()).unwrap();
        assert_eq!(entry.kind, EntryKind::Symlink);
    }

    #[test]
    fn test_fifo_entry() {
        let dir = TempDir::new().unwrap();
        let fifo = dir.path().join("pipe");
        nix::unistd::mkfifo(&fifo, nix::sys::stat::Mode::from_bits_truncate(0o644)).unwrap();

        let entry = SourceEntry::from_path(&fifo, dir.path()).unwrap();
        assert_eq!(entry.kind, EntryKind::Fifo);
        assert!(entry.kind.is_special());
    }

    #[test]
    fn test_root_entry_has_empty_relative_path() {
        let dir = TempDir::new().unwrap();
        let entry = SourceEntry::from_path(dir.path(), dir.path()).unwrap();
        assert_eq!(entry.kind, EntryKind::Directory);
        assert_eq!(entry.relative_path, PathBuf::new());
    }
}
