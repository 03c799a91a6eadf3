//! Placement of the verified executable into the destination directory.
//!
//! The executable is written to a temporary file inside the destination
//! directory and renamed over the final path, so a concurrent reader sees
//! either the previous binary or the new one, never a partial file.

use crate::error::{InstallerError, Result};
use camino::Utf8PathBuf;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Permission bits applied to the installed executable.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Handles placing the executable into the destination directory.
#[derive(Debug, Clone)]
pub struct Stager {
    dest_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a new stager for `dest_dir`.
    #[must_use]
    pub fn new(dest_dir: Utf8PathBuf) -> Self {
        Self { dest_dir }
    }

    /// Ensure the destination directory exists and is writable.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Filesystem`] if the directory cannot be
    /// created or is not writable.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dest_dir)
            .map_err(|e| InstallerError::filesystem(&self.dest_dir, &e))?;

        // Check writability with a file that is removed on drop.
        tempfile::Builder::new()
            .prefix(".nu-mcp-installer-check")
            .tempfile_in(&self.dest_dir)
            .map(drop)
            .map_err(|e| InstallerError::filesystem(&self.dest_dir, &e))
    }

    /// Atomically install `source` as `dest_dir/name` with mode `0o755`.
    ///
    /// An existing file at the destination is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Filesystem`] if copying, setting permissions,
    /// or the final rename fails. The destination is left untouched on error.
    pub fn install_executable(&self, source: &Path, name: &str) -> Result<Utf8PathBuf> {
        let dest_path = self.dest_dir.join(name);
        let fs_err = |e: std::io::Error| InstallerError::filesystem(&dest_path, &e);

        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{name}."))
            .tempfile_in(&self.dest_dir)
            .map_err(fs_err)?;
        let mut reader = fs::File::open(source)
            .map_err(|e| InstallerError::filesystem(source.display(), &e))?;
        std::io::copy(&mut reader, staged.as_file_mut()).map_err(fs_err)?;
        staged.as_file_mut().flush().map_err(fs_err)?;
        set_executable(staged.as_file()).map_err(fs_err)?;
        staged.as_file().sync_all().map_err(fs_err)?;

        staged
            .persist(&dest_path)
            .map_err(|e| InstallerError::filesystem(&dest_path, &e.error))?;
        log::debug!("installed executable at {dest_path}");
        Ok(dest_path)
    }
}

#[cfg(unix)]
fn set_executable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(EXECUTABLE_MODE))
}

#[cfg(not(unix))]
fn set_executable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
