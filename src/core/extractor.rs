//! Extraction engine
//!
//! One engine instance drives one run: mount the image, count the source
//! tree, mirror it entry by entry while reporting progress, emit the final
//! 100, and always unmount once the copy phase has finished. All counters
//! live in the engine, passed by reference into the passes — no globals.

use crate::config::ExtractConfig;
use crate::error::{ExtractError, IoResultExt, Result};
use crate::fs::{EntryCopier, TreeWalker};
use crate::mount::MountController;
use crate::progress::{ProgressTracker, ProgressWriter};
use nix::sys::stat::{umask, Mode};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Phases of one extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing happened yet
    Idle,
    /// The image is online at the mount point
    Mounted,
    /// The count pass finished
    Counted,
    /// The copy pass finished, naturally or by abort
    Copied,
    /// The mount point was released
    Unmounted,
}

/// Summary of a finished extraction
#[derive(Debug)]
pub struct ExtractReport {
    /// Entries the count pass expected
    pub entries_expected: u64,
    /// Entries actually copied
    pub entries_copied: u64,
    /// Regular-file bytes moved
    pub bytes_copied: u64,
    /// Wall-clock duration
    pub duration: Duration,
}

impl ExtractReport {
    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Extraction Summary ===");
        println!(
            "Entries copied:  {}/{}",
            self.entries_copied, self.entries_expected
        );
        println!(
            "Bytes copied:    {}",
            humansize::format_size(self.bytes_copied, humansize::BINARY)
        );
        println!("Duration:        {:.2?}", self.duration);
    }
}

/// Restores the saved process umask when dropped.
struct UmaskGuard {
    previous: Mode,
}

impl UmaskGuard {
    /// Clear the umask so created modes are not masked during the passes
    fn clear() -> Self {
        Self {
            previous: umask(Mode::empty()),
        }
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        umask(self.previous);
    }
}

/// Drives one extraction run
pub struct ExtractEngine {
    config: ExtractConfig,
    mounter: MountController,
    state: RunState,
}

impl ExtractEngine {
    /// Create an engine for the given configuration
    pub fn new(config: ExtractConfig) -> Self {
        let mounter = MountController::new(&config.mount_point);
        Self {
            config,
            mounter,
            state: RunState::Idle,
        }
    }

    /// Current phase of the run
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the full extraction: mount, copy, unmount
    ///
    /// Unmount is attempted exactly once whenever the mount succeeded,
    /// even after a failed copy phase; a copy error takes precedence in
    /// the returned result.
    pub fn execute(&mut self) -> Result<ExtractReport> {
        let start = Instant::now();

        // A mount failure means nothing is online; no unmount to attempt.
        self.mounter.mount(&self.config.image)?;
        self.state = RunState::Mounted;

        let source = self.config.mount_point.clone();
        let copy_result = self.copy_files(&source);

        let unmount_result = self.mounter.unmount();
        match &unmount_result {
            Ok(()) => self.state = RunState::Unmounted,
            Err(e) => error!("unmount failed: {e}"),
        }

        let mut report = copy_result?;
        unmount_result?;

        report.duration = start.elapsed();
        Ok(report)
    }

    /// Copy phase: count pass, then copy pass, then the final 100
    ///
    /// Takes an already-online source root, which also makes the phase
    /// drivable against a plain directory in tests.
    pub fn copy_files(&mut self, source: &Path) -> Result<ExtractReport> {
        let start = Instant::now();

        std::fs::create_dir_all(&self.config.dest).with_path(&self.config.dest)?;

        let writer = ProgressWriter::from_config(self.config.progress_file.as_deref());
        let _umask = UmaskGuard::clear();

        let walker = TreeWalker::new(source);
        let expected = walker.count_entries();
        self.state = RunState::Counted;
        if expected == 0 {
            warn!(source = %source.display(), "failed to count any entries in source tree");
        }

        let mut tracker = ProgressTracker::new(expected, writer);
        let copier = EntryCopier::new(&self.config.dest);

        let copy_result = Self::copy_pass(&walker, &copier, &mut tracker);
        self.state = RunState::Copied;
        let bytes_copied = copy_result?;

        tracker.finish();
        info!(
            entries = tracker.completed(),
            bytes = bytes_copied,
            "copy pass complete"
        );

        Ok(ExtractReport {
            entries_expected: expected,
            entries_copied: tracker.completed(),
            bytes_copied,
            duration: start.elapsed(),
        })
    }

    /// Copy every entry, fail-fast, progress tick per completed payload
    ///
    /// An entry whose payload failed is not counted. An entry whose
    /// payload succeeded but lost a metadata step is counted and ticked,
    /// then fails the pass — the two-tier policy.
    fn copy_pass(
        walker: &TreeWalker,
        copier: &EntryCopier,
        tracker: &mut ProgressTracker,
    ) -> Result<u64> {
        let mut bytes = 0u64;

        for entry in walker.entries() {
            let entry = entry?;
            let outcome = copier.copy_entry(&entry)?;

            bytes += outcome.bytes_copied;
            tracker.advance();

            if !outcome.is_clean() {
                return Err(ExtractError::MetadataIncomplete {
                    path: copier.dest_path(&entry),
                    failures: outcome.metadata_failures,
                });
            }
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn config_for(dest: &Path, progress: Option<&Path>) -> ExtractConfig {
        ExtractConfig {
            image: std::path::PathBuf::from("/nonexistent/image.squashfs"),
            dest: dest.to_path_buf(),
            progress_file: progress.map(|p| p.to_path_buf()),
            mount_point: std::path::PathBuf::from("/nonexistent/mount-point"),
        }
    }

    fn build_source(root: &Path) {
        std::fs::create_dir(root.join("a")).unwrap();
        std::fs::write(root.join("a/b.txt"), b"twelve bytes").unwrap();
        std::fs::set_permissions(
            root.join("a/b.txt"),
            std::fs::Permissions::from_mode(0o640),
        )
        .unwrap();
        std::os::unix::fs::symlink("b.txt", root.join("a/link")).unwrap();
    }

    #[test]
    fn test_copy_files_mirrors_tree_and_finishes_progress() {
        let src = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        build_source(src.path());

        let dest = work.path().join("out");
        let progress = work.path().join("progress");
        let mut engine = ExtractEngine::new(config_for(&dest, Some(&progress)));

        let report = engine.copy_files(src.path()).unwrap();

        // root, a, a/b.txt, a/link
        assert_eq!(report.entries_expected, 4);
        assert_eq!(report.entries_copied, 4);
        assert_eq!(report.bytes_copied, 12);
        assert_eq!(engine.state(), RunState::Copied);

        let copied = dest.join("a/b.txt");
        assert_eq!(std::fs::read(&copied).unwrap(), b"twelve bytes");
        assert_eq!(
            std::fs::metadata(&copied).unwrap().permissions().mode() & 0o7777,
            0o640
        );
        assert!(std::fs::symlink_metadata(dest.join("a/link"))
            .unwrap()
            .file_type()
            .is_symlink());

        assert_eq!(std::fs::read_to_string(&progress).unwrap(), "100");
    }

    #[test]
    fn test_copy_files_of_empty_tree() {
        let src = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let dest = work.path().join("out");
        let progress = work.path().join("progress");
        let mut engine = ExtractEngine::new(config_for(&dest, Some(&progress)));

        let report = engine.copy_files(src.path()).unwrap();

        // Only the source root itself.
        assert_eq!(report.entries_expected, 1);
        assert_eq!(report.entries_copied, 1);
        assert!(dest.is_dir());
        assert_eq!(std::fs::read_to_string(&progress).unwrap(), "100");
    }

    #[test]
    fn test_copy_files_aborts_on_first_fatal_entry() {
        let src = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        // "clash" sorts before "zz.txt"; the collision aborts the pass
        // before the later entry is reached.
        std::fs::write(src.path().join("clash"), b"data").unwrap();
        std::fs::write(src.path().join("zz.txt"), b"never copied").unwrap();

        let dest = work.path().join("out");
        std::fs::create_dir_all(dest.join("clash")).unwrap();

        let progress = work.path().join("progress");
        let mut engine = ExtractEngine::new(config_for(&dest, Some(&progress)));

        assert!(engine.copy_files(src.path()).is_err());
        assert_eq!(engine.state(), RunState::Copied);
        assert!(!dest.join("zz.txt").exists());

        // Final 100 is only written on success.
        assert_ne!(std::fs::read_to_string(&progress).unwrap(), "100");
    }

    #[test]
    fn test_execute_fails_before_any_mutation_when_mount_fails() {
        let work = TempDir::new().unwrap();
        let dest = work.path().join("out");

        let mut config = config_for(&dest, None);
        config.mount_point = work.path().join("mnt");
        let mut engine = ExtractEngine::new(config);

        let err = engine.execute().unwrap_err();
        assert!(matches!(err, ExtractError::Mount { .. }));
        assert_eq!(engine.state(), RunState::Idle);
        // The copy phase never ran, so the destination was not created.
        assert!(!dest.exists());
    }

    #[test]
    fn test_report_summary_counts() {
        let report = ExtractReport {
            entries_expected: 10,
            entries_copied: 10,
            bytes_copied: 4096,
            duration: Duration::from_millis(5),
        };
        // Smoke test: formatting must not panic.
        report.print_summary();
    }
}
