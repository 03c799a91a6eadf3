//! Platform directory resolution.
//!
//! Wraps `directories-next` behind a trait so callers can substitute fixed
//! paths in tests.

use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Resolves per-user directories used by the installer.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The per-user executable directory.
    fn bin_dir(&self) -> Option<PathBuf>;
}

/// Directory resolver backed by `directories-next`.
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    inner: directories_next::BaseDirs,
}

impl SystemBaseDirs {
    /// Resolve the current user's directories.
    ///
    /// Returns `None` when no home directory can be determined.
    #[must_use]
    pub fn new() -> Option<Self> {
        directories_next::BaseDirs::new().map(|inner| Self { inner })
    }
}

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.inner.home_dir().to_path_buf())
    }

    // `executable_dir` is only populated on Linux; macOS falls back to
    // `~/.local/bin`.
    fn bin_dir(&self) -> Option<PathBuf> {
        self.inner
            .executable_dir()
            .map(std::path::Path::to_path_buf)
            .or_else(|| self.home_dir().map(|home| home.join(".local").join("bin")))
    }
}

/// Return the default install directory for nu-mcp.
///
/// Resolves to the platform executable directory, typically
/// `~/.local/bin`. Returns `None` when the directory cannot be determined or
/// is not valid UTF-8.
#[must_use]
pub fn default_bin_dir(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.bin_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
}
