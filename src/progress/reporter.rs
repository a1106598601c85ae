//! Progress reporter implementation
//!
//! The sink is either a file or stdout. File writes rewind to byte offset 0
//! and overwrite the previous value (never append, no trailing newline);
//! the value sequence is non-decreasing, so the rendered digit count never
//! shrinks and a reader at offset 0 always sees a complete number.

use crate::error::{IoResultExt, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Integer percentage from completed/expected, floor division, clamped
///
/// Callers must not pass `expected == 0`; the tracker guards that case.
pub fn percentage(completed: u64, expected: u64) -> u8 {
    ((completed * 100 / expected).min(100)) as u8
}

enum Sink {
    Stdout(std::io::Stdout),
    File { file: File, path: PathBuf },
}

/// Writes the current percentage to the configured sink
pub struct ProgressWriter {
    sink: Sink,
}

impl ProgressWriter {
    /// Writer targeting standard output
    pub fn stdout() -> Self {
        Self {
            sink: Sink::Stdout(std::io::stdout()),
        }
    }

    /// Writer targeting a file, created (or truncated) up front
    pub fn to_file(path: &Path) -> Result<Self> {
        let file = File::create(path).with_path(path)?;
        Ok(Self {
            sink: Sink::File {
                file,
                path: path.to_path_buf(),
            },
        })
    }

    /// Writer for an optional configured path
    ///
    /// No path means stdout. A path that cannot be created falls back to
    /// stdout with a warning instead of failing the run.
    pub fn from_config(path: Option<&Path>) -> Self {
        match path {
            None => Self::stdout(),
            Some(p) => match Self::to_file(p) {
                Ok(writer) => writer,
                Err(e) => {
                    warn!("failed to open progress file, falling back to stdout: {e}");
                    Self::stdout()
                }
            },
        }
    }

    /// Persist one percentage value
    pub fn write_percent(&mut self, percent: u8) -> Result<()> {
        match &mut self.sink {
            Sink::File { file, path } => {
                file.seek(SeekFrom::Start(0)).with_path(path.as_path())?;
                write!(file, "{percent}").with_path(path.as_path())?;
                file.flush().with_path(path.as_path())?;
            }
            Sink::Stdout(out) => {
                // Stdout cannot rewind; values are emitted sequentially.
                write!(out, "{percent}").with_path("stdout")?;
                out.flush().with_path("stdout")?;
            }
        }
        Ok(())
    }
}

/// Tracks copy-pass completion and drives the writer
///
/// Owns the `{expected, completed}` counters. With `expected == 0` (empty
/// or uncountable tree) percentage math is skipped entirely — warned once,
/// never a division by zero.
pub struct ProgressTracker {
    expected: u64,
    completed: u64,
    writer: ProgressWriter,
    warned_zero_expected: bool,
}

impl ProgressTracker {
    /// Create a tracker for `expected` entries
    pub fn new(expected: u64, writer: ProgressWriter) -> Self {
        Self {
            expected,
            completed: 0,
            writer,
            warned_zero_expected: false,
        }
    }

    /// Entries the count pass expects
    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Entries completed so far
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Record one completed entry and persist the new percentage
    ///
    /// Sink write failures are logged, not fatal; extraction matters more
    /// than reporting it.
    pub fn advance(&mut self) {
        self.completed += 1;

        if self.expected == 0 {
            if !self.warned_zero_expected {
                warn!("expected entry count is zero, skipping percentage updates");
                self.warned_zero_expected = true;
            }
            return;
        }

        let percent = percentage(self.completed, self.expected);
        if let Err(e) = self.writer.write_percent(percent) {
            warn!("failed to write progress: {e}");
        }
    }

    /// Emit the final literal 100 after a fully successful copy pass
    pub fn finish(&mut self) {
        if let Err(e) = self.writer.write_percent(100) {
            warn!("failed to write final progress: {e}");
        }
    }
}
