//! Release manifest types.
//!
//! A [`ReleaseManifest`] maps each supported [`PlatformKey`] to the download
//! URL and expected SHA-256 digest of its release archive. Unsupported
//! platforms are simply absent from the table.
//!
//! On disk (JSON or TOML) a manifest is a version plus a flat list of
//! entries:
//!
//! ```json
//! {
//!   "version": "0.3.8",
//!   "platform_entries": [
//!     {
//!       "os": "linux",
//!       "arch": "x86_64",
//!       "url": "https://github.com/ck3mp3r/nu-mcp/releases/download/v0.3.8/nu-mcp-0.3.8-x86_64-linux.tgz",
//!       "sha256": "51f306ece35e7012ecb7496b268ff5d7e02f8e747052d0bf42633ea98503bb4a"
//!     }
//!   ]
//! }
//! ```

use super::error::{ArtefactError, Result};
use super::naming::ArtefactName;
use super::platform::{Architecture, OsFamily, PlatformKey};
use super::sha256_digest::Sha256Digest;
use super::url::ArtefactUrl;
use super::version::ReleaseVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Download location and expected digest of one release archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactEntry {
    /// HTTPS URL of the archive.
    pub url: ArtefactUrl,
    /// Expected SHA-256 digest of the archive bytes.
    pub checksum: Sha256Digest,
}

/// One platform row of the on-disk manifest format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformEntry {
    /// Operating system family.
    pub os: OsFamily,
    /// CPU architecture.
    pub arch: Architecture,
    /// HTTPS URL of the archive.
    pub url: ArtefactUrl,
    /// Expected SHA-256 digest of the archive bytes.
    pub sha256: Sha256Digest,
}

/// The serialised form of a [`ReleaseManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDocument {
    /// Release version.
    pub version: ReleaseVersion,
    /// One entry per supported platform.
    pub platform_entries: Vec<PlatformEntry>,
}

/// An immutable table of release artefacts for one version.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::manifest::{PlatformEntry, ReleaseManifest};
/// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily, PlatformKey};
///
/// let manifest = ReleaseManifest::new(
///     "0.5.0".try_into().expect("valid version"),
///     vec![PlatformEntry {
///         os: OsFamily::Linux,
///         arch: Architecture::X86_64,
///         url: "https://example.com/nu-mcp.tgz".try_into().expect("valid URL"),
///         sha256: "a".repeat(64).try_into().expect("valid digest"),
///     }],
/// )
/// .expect("valid manifest");
///
/// let linux = PlatformKey::new(OsFamily::Linux, Architecture::X86_64);
/// let intel_mac = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);
/// assert!(manifest.entry_for(linux).is_some());
/// assert!(manifest.entry_for(intel_mac).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestDocument", into = "ManifestDocument")]
pub struct ReleaseManifest {
    version: ReleaseVersion,
    artefacts: BTreeMap<PlatformKey, ArtefactEntry>,
}

impl ReleaseManifest {
    /// Build a manifest from a version and its platform entries.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::DuplicatePlatform`] if a platform appears
    /// twice, or [`ArtefactError::EmptyManifest`] if `entries` is empty.
    pub fn new(version: ReleaseVersion, entries: Vec<PlatformEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ArtefactError::EmptyManifest {
                version: version.to_string(),
            });
        }
        let mut artefacts = BTreeMap::new();
        for entry in entries {
            let platform = PlatformKey::new(entry.os, entry.arch);
            let artefact = ArtefactEntry {
                url: entry.url,
                checksum: entry.sha256,
            };
            if artefacts.insert(platform, artefact).is_some() {
                return Err(ArtefactError::DuplicatePlatform {
                    platform: platform.to_string(),
                });
            }
        }
        Ok(Self { version, artefacts })
    }

    /// Build a manifest whose URLs follow the GitHub release naming rule.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate or missing platforms, as [`Self::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::artefact::manifest::ReleaseManifest;
    /// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily, PlatformKey};
    ///
    /// let linux = PlatformKey::new(OsFamily::Linux, Architecture::Aarch64);
    /// let manifest = ReleaseManifest::github_release(
    ///     "0.3.8".try_into().expect("valid version"),
    ///     vec![(linux, "b".repeat(64).try_into().expect("valid digest"))],
    /// )
    /// .expect("valid manifest");
    /// let entry = manifest.entry_for(linux).expect("present");
    /// assert!(entry.url.as_str().ends_with("/v0.3.8/nu-mcp-0.3.8-aarch64-linux.tgz"));
    /// ```
    pub fn github_release(
        version: ReleaseVersion,
        checksums: Vec<(PlatformKey, Sha256Digest)>,
    ) -> Result<Self> {
        let entries = checksums
            .into_iter()
            .map(|(platform, sha256)| {
                let url = ArtefactName::new(version.clone(), platform).release_url()?;
                Ok(PlatformEntry {
                    os: platform.os,
                    arch: platform.arch,
                    url,
                    sha256,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(version, entries)
    }

    /// Return the release version.
    #[must_use]
    pub fn version(&self) -> &ReleaseVersion {
        &self.version
    }

    /// Look up the artefact for `platform`; `None` means unsupported.
    #[must_use]
    pub fn entry_for(&self, platform: PlatformKey) -> Option<&ArtefactEntry> {
        self.artefacts.get(&platform)
    }

    /// Iterate over the supported platforms in a stable order.
    pub fn supported_platforms(&self) -> impl Iterator<Item = PlatformKey> + '_ {
        self.artefacts.keys().copied()
    }
}

impl TryFrom<ManifestDocument> for ReleaseManifest {
    type Error = ArtefactError;

    fn try_from(document: ManifestDocument) -> Result<Self> {
        Self::new(document.version, document.platform_entries)
    }
}

impl From<ReleaseManifest> for ManifestDocument {
    fn from(manifest: ReleaseManifest) -> Self {
        let platform_entries = manifest
            .artefacts
            .into_iter()
            .map(|(platform, entry)| PlatformEntry {
                os: platform.os,
                arch: platform.arch,
                url: entry.url,
                sha256: entry.checksum,
            })
            .collect();
        Self {
            version: manifest.version,
            platform_entries,
        }
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
