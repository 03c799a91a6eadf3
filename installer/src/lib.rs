//! nu-mcp installer library.
//!
//! This crate resolves, downloads, verifies, and installs prebuilt nu-mcp
//! release binaries. It is used by the `nu-mcp-installer` CLI binary and can
//! be consumed programmatically for testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Release manifest model, download, and archive extraction
//! - [`cli`] - Command-line argument definitions
//! - [`deps`] - Nushell runtime dependency check
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Installer error types and exit-code classification
//! - [`install`] - Verified install pipeline
//! - [`lock`] - Advisory locking of the destination directory
//! - [`output`] - User-facing message formatting
//! - [`release`] - The bundled release manifest
//! - [`stager`] - Atomic placement of the executable

pub mod artefact;
pub mod cli;
pub mod deps;
pub mod dirs;
pub mod error;
pub mod install;
pub mod lock;
pub mod output;
pub mod release;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
