//! Regular-file payload transfer
//!
//! Moves file contents with the kernel `sendfile(2)` primitive instead of a
//! user-space read/write loop. A single call may legally move fewer bytes
//! than requested; the remainder is retried until the full size is copied
//! or an unrecoverable error occurs.

use crate::error::{ExtractError, IoResultExt, Result};
use std::fs::File;
use std::path::Path;

/// Maximum bytes per sendfile call.
///
/// Linux caps one transfer at about 2 GiB; larger files take several calls.
#[cfg(target_os = "linux")]
const SENDFILE_CHUNK_SIZE: u64 = 0x7fff_f000;

/// Buffer size for the non-Linux fallback path
#[cfg(not(target_os = "linux"))]
const FALLBACK_BUFFER_SIZE: usize = 1024 * 1024;

/// Copy exactly `size` bytes of regular-file content from `source` to `dest`
///
/// Returns the number of bytes copied (always `size` on success).
pub fn copy_file_contents(source: &Path, dest: &Path, size: u64) -> Result<u64> {
    let src_file = File::open(source).with_path(source)?;
    let dst_file = File::create(dest).with_path(dest)?;

    if size == 0 {
        return Ok(0);
    }

    transfer(&src_file, &dst_file, size, source)
}

#[cfg(target_os = "linux")]
fn transfer(src: &File, dst: &File, size: u64, source: &Path) -> Result<u64> {
    use std::os::fd::AsRawFd;

    let src_fd = src.as_raw_fd();
    let dst_fd = dst.as_raw_fd();

    let mut remaining = size;
    while remaining > 0 {
        let chunk = remaining.min(SENDFILE_CHUNK_SIZE) as usize;
        // SAFETY: both descriptors come from live File handles; the null
        // offset makes the syscall use and advance the current positions.
        let sent =
            unsafe { libc::sendfile(dst_fd, src_fd, std::ptr::null_mut(), chunk) };

        if sent < 0 {
            return Err(ExtractError::io(source, std::io::Error::last_os_error()));
        }
        if sent == 0 {
            // Source ended before the stat-reported size was reached.
            return Err(ExtractError::ShortTransfer {
                path: source.to_path_buf(),
                expected: size,
                copied: size - remaining,
            });
        }

        remaining -= sent as u64;
    }

    Ok(size)
}

#[cfg(not(target_os = "linux"))]
fn transfer(src: &File, dst: &File, size: u64, source: &Path) -> Result<u64> {
    use std::io::{Read, Write};

    let mut reader = std::io::BufReader::with_capacity(FALLBACK_BUFFER_SIZE, src);
    let mut writer = std::io::BufWriter::with_capacity(FALLBACK_BUFFER_SIZE, dst);

    let copied = std::io::copy(&mut reader.by_ref().take(size), &mut writer)
        .map_err(|e| ExtractError::io(source, e))?;
    writer
        .flush()
        .map_err(|e| ExtractError::io(source, e))?;

    if copied < size {
        return Err(ExtractError::ShortTransfer {
            path: source.to_path_buf(),
            expected: size,
            copied,
        });
    }

    Ok(copied)
}
