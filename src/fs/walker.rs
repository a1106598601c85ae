//! Source tree traversal
//!
//! Depth-first pre-order physical walk of everything reachable from the
//! source root: symbolic links are visited as leaves and never followed,
//! which rules out traversal cycles by construction. The same traversal is
//! run twice — a pure count pass, then the copy pass — and the number of
//! simultaneously open directory handles is bounded so deep or wide trees
//! cannot exhaust descriptors.

use crate::config::MAX_OPEN_DIRS;
use crate::error::Result;
use crate::fs::SourceEntry;
use std::path::PathBuf;
use tracing::warn;
use walkdir::WalkDir;

/// Deterministic two-pass traversal of the source root
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    max_open: usize,
}

impl TreeWalker {
    /// Create a walker rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_open: MAX_OPEN_DIRS,
        }
    }

    fn walk(&self) -> walkdir::IntoIter {
        WalkDir::new(&self.root)
            .follow_links(false)
            .max_open(self.max_open)
            .sort_by_file_name()
            .into_iter()
    }

    /// Count pass: number of reachable entries, the root included
    ///
    /// Never touches the destination. Traversal errors are logged and
    /// skipped; the result is a best-effort count, possibly low.
    pub fn count_entries(&self) -> u64 {
        let mut count = 0u64;
        for item in self.walk() {
            match item {
                Ok(_) => count += 1,
                Err(e) => warn!("count pass: {e}"),
            }
        }
        count
    }

    /// Copy pass: lazy iterator of source entries in traversal order
    ///
    /// Traversal errors surface as `Err` items; the caller aborts on the
    /// first one (fail-fast).
    pub fn entries(&self) -> impl Iterator<Item = Result<SourceEntry>> + '_ {
        let root = self.root.clone();
        self.walk().map(move |item| {
            let dirent = item?;
            SourceEntry::from_path(dirent.path(), &root)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::EntryKind;
    use tempfile::TempDir;

    fn build_tree(root: &std::path::Path) {
        // root, a, a/b.txt, a/link, top.txt  => 5 entries
        std::fs::create_dir(root.join("a")).unwrap();
        std::fs::write(root.join("a/b.txt"), b"twelve bytes").unwrap();
        std::os::unix::fs::symlink("b.txt", root.join("a/link")).unwrap();
        std::fs::write(root.join("top.txt"), b"top").unwrap();
    }

    #[test]
    fn test_count_matches_reachable_entries() {
        let dir = TempDir::new().unwrap();
        build_tree(dir.path());

        let walker = TreeWalker::new(dir.path());
        assert_eq!(walker.count_entries(), 5);
    }

    #[test]
    fn test_empty_tree_counts_only_root() {
        let dir = TempDir::new().unwrap();
        let walker = TreeWalker::new(dir.path());
        assert_eq!(walker.count_entries(), 1);
    }

    #[test]
    fn test_missing_root_counts_zero() {
        let dir = TempDir::new().unwrap();
        let walker = TreeWalker::new(dir.path().join("gone"));
        assert_eq!(walker.count_entries(), 0);
    }

    #[test]
    fn test_symlinked_directory_is_a_leaf() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::fs::write(dir.path().join("real/inner.txt"), b"x").unwrap();
        std::os::unix::fs::symlink("real", dir.path().join("alias")).unwrap();

        // root, real, real/inner.txt, alias — the alias is not descended,
        // so inner.txt is seen exactly once.
        let walker = TreeWalker::new(dir.path());
        assert_eq!(walker.count_entries(), 4);

        let entries: Vec<_> = walker.entries().map(|e| e.unwrap()).collect();
        let alias = entries
            .iter()
            .find(|e| e.relative_path == std::path::PathBuf::from("alias"))
            .unwrap();
        assert_eq!(alias.kind, EntryKind::Symlink);
    }

    #[test]
    fn test_traversal_is_deterministic_and_preorder() {
        let dir = TempDir::new().unwrap();
        build_tree(dir.path());

        let walker = TreeWalker::new(dir.path());
        let order: Vec<_> = walker
            .entries()
            .map(|e| e.unwrap().relative_path)
            .collect();
        let rerun: Vec<_> = walker
            .entries()
            .map(|e| e.unwrap().relative_path)
            .collect();
        assert_eq!(order, rerun);

        // Parents come before their contents.
        let pos = |name: &str| {
            order
                .iter()
                .position(|p| p == &std::path::PathBuf::from(name))
                .unwrap()
        };
        assert_eq!(order[0], std::path::PathBuf::new());
        assert!(pos("a") < pos("a/b.txt"));
        assert!(pos("a") < pos("a/link"));
    }

    #[test]
    fn test_count_and_copy_passes_agree() {
        let dir = TempDir::new().unwrap();
        build_tree(dir.path());
        std::fs::create_dir_all(dir.path().join("deep/x/y/z")).unwrap();

        let walker = TreeWalker::new(dir.path());
        let counted = walker.count_entries();
        let visited = walker.entries().count() as u64;
        assert_eq!(counted, visited);
    }
}
