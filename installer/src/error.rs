//! Error types for the nu-mcp installer.
//!
//! Every install failure is terminal for that attempt. Each variant names the
//! step that failed and carries enough context (URL, expected and actual
//! digest, path) to diagnose the problem without re-running verbosely.

use crate::artefact::manifest_parser::ManifestParseError;
use thiserror::Error;

/// Coarse classification of an [`InstallerError`], used for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The manifest or command-line input was invalid.
    InvalidInput,
    /// The requested platform has no artefact in the manifest.
    UnsupportedPlatform,
    /// The download failed.
    FetchFailed,
    /// The downloaded bytes did not match the expected digest.
    ChecksumMismatch,
    /// The archive could not be unpacked.
    ExtractionFailed,
    /// A filesystem operation failed.
    Filesystem,
}

impl FailureKind {
    /// Process exit code reported by the CLI for this kind of failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::error::FailureKind;
    ///
    /// assert_eq!(FailureKind::ChecksumMismatch.exit_code(), 5);
    /// ```
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InvalidInput => 2,
            Self::UnsupportedPlatform => 3,
            Self::FetchFailed => 4,
            Self::ChecksumMismatch => 5,
            Self::ExtractionFailed => 6,
            Self::Filesystem => 7,
        }
    }

    /// Whether a later attempt could plausibly succeed without changes.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::FetchFailed)
    }
}

/// Errors that can occur while resolving or installing a release binary.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The release manifest could not be loaded or failed validation.
    #[error("invalid release manifest: {reason}")]
    InvalidManifest {
        /// Description of the problem.
        reason: String,
    },

    /// The host or requested platform could not be determined.
    #[error("cannot determine target platform: {reason}")]
    InvalidPlatform {
        /// Description of the problem.
        reason: String,
    },

    /// The manifest has no artefact for the requested platform.
    #[error(
        "nu-mcp {version} is not available for {platform}; supported platforms: {supported}"
    )]
    UnsupportedPlatform {
        /// The requested platform, as `os/arch`.
        platform: String,
        /// The release version that was consulted.
        version: String,
        /// Comma-separated list of platforms the release does support.
        supported: String,
    },

    /// Downloading the archive failed.
    #[error("fetch failed for {url}: {reason}")]
    FetchFailed {
        /// The URL that was requested.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The downloaded archive does not match the manifest digest.
    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The URL the archive was downloaded from.
        url: String,
        /// Digest recorded in the manifest.
        expected: String,
        /// Digest of the downloaded bytes.
        actual: String,
    },

    /// The archive could not be unpacked or lacks the executable.
    #[error("extraction failed: {reason}")]
    ExtractionFailed {
        /// Description of the failure.
        reason: String,
    },

    /// A filesystem operation on the temp or destination directory failed.
    #[error("filesystem error at {path}: {reason}")]
    Filesystem {
        /// The path being operated on.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed outside a more specific step.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallerError {
    /// Classify this error for exit-code reporting.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidManifest { .. } | Self::InvalidPlatform { .. } => {
                FailureKind::InvalidInput
            }
            Self::UnsupportedPlatform { .. } => FailureKind::UnsupportedPlatform,
            Self::FetchFailed { .. } => FailureKind::FetchFailed,
            Self::ChecksumMismatch { .. } => FailureKind::ChecksumMismatch,
            Self::ExtractionFailed { .. } => FailureKind::ExtractionFailed,
            Self::Filesystem { .. } | Self::Io(_) => FailureKind::Filesystem,
        }
    }

    /// Build a [`InstallerError::Filesystem`] from a path and I/O error.
    #[must_use]
    pub fn filesystem(path: impl std::fmt::Display, source: &std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_string(),
            reason: source.to_string(),
        }
    }
}

impl From<ManifestParseError> for InstallerError {
    fn from(err: ManifestParseError) -> Self {
        Self::InvalidManifest {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
