//! Advisory locking of an install destination.
//!
//! Two installers targeting the same directory would otherwise race on the
//! final rename, with the last writer winning. Holding an exclusive `flock`
//! serialises them. The lock is taken on a per-destination file in the
//! system temporary directory, so the destination itself is not created or
//! modified before the archive has been verified. The lock is advisory: it
//! only excludes other processes that also take it.

use crate::artefact::sha256_digest::Sha256Digest;
use crate::error::{InstallerError, Result};
use camino::Utf8Path;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Hex digits of the destination digest used in lock file names.
const LOCK_NAME_DIGITS: usize = 16;

/// An exclusive lock on an install destination, held until dropped.
#[derive(Debug)]
pub struct DestinationLock {
    file: File,
    path: PathBuf,
}

impl DestinationLock {
    /// Block until the exclusive lock for `dest_dir` is acquired.
    ///
    /// `dest_dir` does not need to exist.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Filesystem`] if the lock file cannot be
    /// opened or locked.
    pub fn acquire(dest_dir: &Utf8Path) -> Result<Self> {
        Self::acquire_in(&std::env::temp_dir(), dest_dir)
    }

    /// Like [`Self::acquire`], keeping the lock file in `lock_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Filesystem`] if the lock file cannot be
    /// opened or locked.
    pub fn acquire_in(lock_dir: &Path, dest_dir: &Utf8Path) -> Result<Self> {
        let path = lock_dir.join(lock_file_name(dest_dir));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| InstallerError::filesystem(path.display(), &e))?;
        if let Err(err) = file.try_lock_exclusive() {
            log::info!("waiting for another installer targeting {dest_dir}");
            log::debug!("try_lock_exclusive on {}: {err}", path.display());
            file.lock_exclusive()
                .map_err(|e| InstallerError::filesystem(path.display(), &e))?;
        }
        log::debug!("acquired install lock {} for {dest_dir}", path.display());
        Ok(Self { file, path })
    }

    /// The lock file backing this lock.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            log::debug!("failed to unlock {}: {err}", self.path.display());
        }
    }
}

/// Lock file name for `dest_dir`, stable across spellings of the same
/// absolute path.
fn lock_file_name(dest_dir: &Utf8Path) -> String {
    let absolute = std::path::absolute(dest_dir.as_std_path())
        .unwrap_or_else(|_| dest_dir.as_std_path().to_path_buf());
    let normalised: PathBuf = absolute.components().collect();
    let digest = Sha256Digest::of_bytes(normalised.to_string_lossy().as_bytes());
    let short = digest.as_str().get(..LOCK_NAME_DIGITS).unwrap_or(digest.as_str());
    format!("nu-mcp-install-{short}.lock")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn utf8(dir: &Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.to_path_buf()).expect("utf-8 path")
    }

    #[test]
    fn lock_excludes_second_holder_until_dropped() {
        let locks = tempfile::tempdir().expect("temp dir");
        let dest = tempfile::tempdir().expect("temp dir");
        let lock = DestinationLock::acquire_in(locks.path(), &utf8(dest.path())).expect("lock");

        let contender = File::open(lock.path()).expect("open lock file");
        assert!(contender.try_lock_exclusive().is_err(), "lock should be held");

        drop(lock);
        contender
            .try_lock_exclusive()
            .expect("lock should be free after drop");
    }

    #[test]
    fn acquire_does_not_create_destination() {
        let locks = tempfile::tempdir().expect("temp dir");
        let root = tempfile::tempdir().expect("temp dir");
        let dest = utf8(root.path()).join("bin");

        let lock = DestinationLock::acquire_in(locks.path(), &dest).expect("lock");

        assert!(!dest.exists());
        assert!(lock.path().starts_with(locks.path()));
    }

    #[test]
    fn acquire_fails_when_lock_directory_is_missing() {
        let locks = tempfile::tempdir().expect("temp dir");
        let err = DestinationLock::acquire_in(
            &locks.path().join("missing"),
            Utf8Path::new("/opt/bin"),
        )
        .expect_err("missing lock dir");
        assert!(matches!(err, InstallerError::Filesystem { .. }));
    }

    #[test]
    fn spellings_of_one_destination_share_a_lock_file() {
        assert_eq!(
            lock_file_name(Utf8Path::new("/opt/bin")),
            lock_file_name(Utf8Path::new("/opt/./bin/"))
        );
        assert_ne!(
            lock_file_name(Utf8Path::new("/opt/bin")),
            lock_file_name(Utf8Path::new("/usr/local/bin"))
        );
    }
}
