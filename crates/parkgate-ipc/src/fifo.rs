//! Named pipe helpers

use nix::sys::stat::Mode;
use std::path::Path;
use tracing::debug;

use crate::IpcResult;

/// Create a FIFO at `path`, replacing any stale file and creating the
/// parent directory if needed.
pub fn create_fifo(path: &Path) -> IpcResult<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    // Owner and group may read and write
    nix::unistd::mkfifo(path, Mode::from_bits_truncate(0o660))?;
    debug!(path = %path.display(), "FIFO created");
    Ok(())
}

/// Remove a FIFO, ignoring a missing file
pub fn remove_fifo(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        debug!(path = %path.display(), error = %e, "Failed to remove FIFO");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::FileTypeExt;
    use tempfile::tempdir;

    #[test]
    fn creates_fifo_in_new_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("requests.pipe");

        create_fifo(&path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.file_type().is_fifo());
    }

    #[test]
    fn replaces_stale_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requests.pipe");
        std::fs::write(&path, b"stale").unwrap();

        create_fifo(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().file_type().is_fifo());

        remove_fifo(&path);
        assert!(!path.exists());
        remove_fifo(&path);
    }
}
