use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use log::warn;

use crate::error::{DevCertError, Result};

/// Creates `path` for writing, failing if anything already exists there.
///
/// The existence check and the creation are a single atomic open. On Unix the file is created
/// readable and writable by its owner only.
pub fn create_new_private(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => DevCertError::OutputPathConflict(path.to_path_buf()),
        _ => DevCertError::OutputOpen {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// An opened output file that must reach the disk before it is closed.
pub trait OutputFile: Write {
    fn sync_close(self) -> io::Result<()>;
}

impl OutputFile for File {
    fn sync_close(self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Flushes `file` to disk and closes it, reporting the failure instead of dropping it.
pub fn close<F: OutputFile>(file: F, path: &Path) -> Result<()> {
    file.sync_close().map_err(|e| DevCertError::OutputClose {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Removes a file this process created for a generation that then failed.
pub fn remove_created(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("failed to remove {} after a failed generation: {e}", path.display());
        }
    }
}
