//! Error types for artefact metadata validation.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// The operating system name is not one of the modelled families.
    #[error("unknown operating system \"{value}\"; expected one of: {expected}")]
    UnknownOs {
        /// The rejected OS string.
        value: String,
        /// Comma-separated list of accepted spellings.
        expected: String,
    },

    /// The CPU architecture name is not one of the modelled architectures.
    #[error("unknown architecture \"{value}\"; expected one of: {expected}")]
    UnknownArch {
        /// The rejected architecture string.
        value: String,
        /// Comma-separated list of accepted spellings.
        expected: String,
    },

    /// A release version is empty or not of the form `MAJOR.MINOR.PATCH`.
    #[error("invalid release version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A download URL is not a well-formed HTTPS URL.
    #[error("invalid artefact URL \"{value}\": {reason}")]
    InvalidUrl {
        /// The rejected URL string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A release manifest lists the same platform more than once.
    #[error("duplicate artefact entry for platform {platform}")]
    DuplicatePlatform {
        /// The repeated platform, as `os/arch`.
        platform: String,
    },

    /// A release manifest lists no artefacts at all.
    #[error("release {version} lists no platform entries")]
    EmptyManifest {
        /// The release version of the empty manifest.
        version: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
