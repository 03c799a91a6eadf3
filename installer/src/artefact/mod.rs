//! Release artefact model, download, and extraction.
//!
//! Everything here is independent of where the executable is finally
//! installed: validated newtypes for the manifest fields, the manifest
//! itself, and the I/O seams used to fetch and unpack an archive.
//!
//! # Sub-modules
//!
//! - [`error`] - Semantic error types for validation failures.
//! - [`platform`] - Operating system, architecture, and platform keys.
//! - [`version`] - Release version newtype (`ReleaseVersion`).
//! - [`url`] - HTTPS artefact URL newtype (`ArtefactUrl`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`naming`] - Release archive naming policy (`ArtefactName`).
//! - [`manifest`] - Release manifest (`ReleaseManifest`).
//! - [`manifest_parser`] - Manifest JSON and TOML deserialization.
//! - [`download`] - Artefact download trait and HTTP implementation.
//! - [`extraction`] - Archive extraction with path traversal protection.

pub mod download;
pub mod error;
pub mod extraction;
pub mod manifest;
pub mod manifest_parser;
pub mod naming;
pub mod platform;
pub mod sha256_digest;
pub mod url;
pub mod version;
