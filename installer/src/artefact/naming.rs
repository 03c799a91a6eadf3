//! Artefact naming policy for nu-mcp release archives.
//!
//! Release archives are published as GitHub release assets named
//! `nu-mcp-<version>-<arch>-<os>.tgz` under the tag `v<version>`.

use super::error::Result;
use super::platform::PlatformKey;
use super::url::ArtefactUrl;
use super::version::ReleaseVersion;
use std::fmt;

/// The GitHub repository owner/name for URL construction.
pub const GITHUB_REPO: &str = "ck3mp3r/nu-mcp";

/// Name of the executable shipped in every release archive.
pub const BINARY_NAME: &str = "nu-mcp";

/// The fixed file extension for release archives.
const ARTEFACT_EXTENSION: &str = ".tgz";

/// A fully-qualified release archive name.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::naming::ArtefactName;
/// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily, PlatformKey};
/// use nu_mcp_installer::artefact::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "0.3.8".try_into().expect("valid version");
/// let platform = PlatformKey::new(OsFamily::Linux, Architecture::X86_64);
/// let name = ArtefactName::new(version, platform);
/// assert_eq!(name.filename(), "nu-mcp-0.3.8-x86_64-linux.tgz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactName {
    version: ReleaseVersion,
    platform: PlatformKey,
}

impl ArtefactName {
    /// Create an artefact name from validated components.
    #[must_use]
    pub fn new(version: ReleaseVersion, platform: PlatformKey) -> Self {
        Self { version, platform }
    }

    /// Return the archive filename.
    #[must_use]
    pub fn filename(&self) -> String {
        format!(
            "{BINARY_NAME}-{}-{}{ARTEFACT_EXTENSION}",
            self.version,
            self.platform.release_suffix()
        )
    }

    /// Return the GitHub release download URL for this archive.
    ///
    /// # Errors
    ///
    /// Returns an error only if the composed URL fails validation, which
    /// cannot happen for validated components.
    pub fn release_url(&self) -> Result<ArtefactUrl> {
        ArtefactUrl::try_from(format!(
            "https://github.com/{GITHUB_REPO}/releases/download/{}/{}",
            self.version.tag(),
            self.filename()
        ))
    }
}

impl fmt::Display for ArtefactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename())
    }
}
