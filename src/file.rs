//! File-open helpers with sync and read-only flag combinations
//!
//! "Sync" opens the file with `O_DSYNC` where the platform has it, so data
//! writes return only after reaching the device. Elsewhere it is ignored.

use std::fs::{File, OpenOptions};
use std::io;
use std::ops::BitOr;
use std::path::Path;

#[cfg(all(unix, not(any(target_os = "dragonfly", target_os = "freebsd"))))]
const DATASYNC_FLAG: i32 = libc::O_DSYNC;
#[cfg(not(all(unix, not(any(target_os = "dragonfly", target_os = "freebsd")))))]
const DATASYNC_FLAG: i32 = 0;

/// Flags for [`open_existing_file`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags(u32);

impl OpenFlags {
    /// Read-write, no sync
    pub const NONE: OpenFlags = OpenFlags(0);
    /// Data writes are synchronous
    pub const SYNC: OpenFlags = OpenFlags(1);
    /// Open read-only
    pub const READ_ONLY: OpenFlags = OpenFlags(1 << 1);

    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

fn options(sync: bool) -> OpenOptions {
    let mut opts = OpenOptions::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o666);
        if sync {
            opts.custom_flags(DATASYNC_FLAG);
        }
    }
    #[cfg(not(unix))]
    let _ = (sync, DATASYNC_FLAG);
    opts
}

/// Open an existing file; fails if it does not exist.
pub fn open_existing_file(path: &Path, flags: OpenFlags) -> io::Result<File> {
    let mut opts = options(flags.contains(OpenFlags::SYNC));
    opts.read(true);
    if !flags.contains(OpenFlags::READ_ONLY) {
        opts.write(true);
    }
    opts.open(path)
}

/// Create a new read-write file; fails if it already exists.
pub fn create_synced_file(path: &Path, sync: bool) -> io::Result<File> {
    options(sync)
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
}

/// Open a read-write file, creating it if missing.
pub fn open_synced_file(path: &Path, sync: bool) -> io::Result<File> {
    options(sync).read(true).write(true).create(true).open(path)
}

/// Open a read-write file, creating it if missing and truncating it.
pub fn open_trunc_file(path: &Path, sync: bool) -> io::Result<File> {
    options(sync)
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let flags = OpenFlags::SYNC | OpenFlags::READ_ONLY;
        assert!(flags.contains(OpenFlags::SYNC));
        assert!(flags.contains(OpenFlags::READ_ONLY));
        assert!(!OpenFlags::NONE.contains(OpenFlags::SYNC));
        assert!(OpenFlags::NONE.contains(OpenFlags::NONE));
    }

    #[test]
    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "openbsd", target_os = "netbsd"))]
    fn test_datasync_flag_set() {
        assert_eq!(DATASYNC_FLAG, libc::O_DSYNC);
        assert_ne!(DATASYNC_FLAG, 0);
    }
}
