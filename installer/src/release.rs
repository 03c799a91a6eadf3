//! The release manifest bundled with this installer.
//!
//! Tracks the current published nu-mcp release. Intel macOS builds are no
//! longer published, so that platform is intentionally absent. A manifest
//! file supplied at runtime replaces the bundled one wholesale.

use crate::artefact::error::Result;
use crate::artefact::manifest::ReleaseManifest;
use crate::artefact::manifest_parser::load_manifest;
use crate::artefact::platform::{Architecture, OsFamily, PlatformKey};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::version::ReleaseVersion;
use crate::error::InstallerError;
use camino::Utf8Path;

/// Version of the bundled release.
pub const BUNDLED_VERSION: &str = "0.3.8";

/// Published archive digests for [`BUNDLED_VERSION`].
const BUNDLED_CHECKSUMS: &[(OsFamily, Architecture, &str)] = &[
    (
        OsFamily::MacOs,
        Architecture::Aarch64,
        "b109c02ddd219b050d45e9b469962185706f887a4cb44b7288ab8d3b0c04e024",
    ),
    (
        OsFamily::Linux,
        Architecture::X86_64,
        "51f306ece35e7012ecb7496b268ff5d7e02f8e747052d0bf42633ea98503bb4a",
    ),
    (
        OsFamily::Linux,
        Architecture::Aarch64,
        "9dd75b06f05ee04144666297a2db08f8ba8ae9c86b9a327e988bec565864a0c5",
    ),
];

/// Build the manifest for the bundled release.
///
/// # Errors
///
/// Returns an error only if the bundled constants are malformed.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily, PlatformKey};
/// use nu_mcp_installer::release::bundled_manifest;
///
/// let manifest = bundled_manifest().expect("bundled manifest is valid");
/// let intel_mac = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);
/// assert!(manifest.entry_for(intel_mac).is_none());
/// ```
pub fn bundled_manifest() -> Result<ReleaseManifest> {
    let version = ReleaseVersion::try_from(BUNDLED_VERSION)?;
    let checksums = BUNDLED_CHECKSUMS
        .iter()
        .map(|(os, arch, digest)| {
            Ok((PlatformKey::new(*os, *arch), Sha256Digest::try_from(*digest)?))
        })
        .collect::<Result<Vec<_>>>()?;
    ReleaseManifest::github_release(version, checksums)
}

/// Load the manifest at `path`, or the bundled manifest when `path` is
/// `None`.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidManifest`] if the file cannot be read,
/// parsed, or validated.
pub fn select_manifest(path: Option<&Utf8Path>) -> crate::error::Result<ReleaseManifest> {
    match path {
        Some(path) => Ok(load_manifest(path.as_std_path())?),
        None => bundled_manifest().map_err(|e| InstallerError::InvalidManifest {
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bundled_manifest_is_valid() {
        let manifest = bundled_manifest().expect("bundled manifest");
        assert_eq!(manifest.version().as_str(), BUNDLED_VERSION);
        assert_eq!(manifest.supported_platforms().count(), 3);
    }

    #[rstest]
    #[case::mac_arm(
        OsFamily::MacOs,
        Architecture::Aarch64,
        "https://github.com/ck3mp3r/nu-mcp/releases/download/v0.3.8/nu-mcp-0.3.8-aarch64-darwin.tgz",
        "b109c02ddd219b050d45e9b469962185706f887a4cb44b7288ab8d3b0c04e024"
    )]
    #[case::linux_intel(
        OsFamily::Linux,
        Architecture::X86_64,
        "https://github.com/ck3mp3r/nu-mcp/releases/download/v0.3.8/nu-mcp-0.3.8-x86_64-linux.tgz",
        "51f306ece35e7012ecb7496b268ff5d7e02f8e747052d0bf42633ea98503bb4a"
    )]
    #[case::linux_arm(
        OsFamily::Linux,
        Architecture::Aarch64,
        "https://github.com/ck3mp3r/nu-mcp/releases/download/v0.3.8/nu-mcp-0.3.8-aarch64-linux.tgz",
        "9dd75b06f05ee04144666297a2db08f8ba8ae9c86b9a327e988bec565864a0c5"
    )]
    fn bundled_entries_match_published_release(
        #[case] os: OsFamily,
        #[case] arch: Architecture,
        #[case] url: &str,
        #[case] sha256: &str,
    ) {
        let manifest = bundled_manifest().expect("bundled manifest");
        let entry = manifest
            .entry_for(PlatformKey::new(os, arch))
            .expect("platform present");
        assert_eq!(entry.url.as_str(), url);
        assert_eq!(entry.checksum.as_str(), sha256);
    }

    #[test]
    fn select_manifest_defaults_to_bundled() {
        let manifest = select_manifest(None).expect("bundled manifest");
        assert_eq!(manifest, bundled_manifest().expect("bundled manifest"));
    }

    #[test]
    fn select_manifest_reports_missing_file_as_invalid() {
        let err = select_manifest(Some(Utf8Path::new("/nonexistent/release.toml")))
            .expect_err("missing file");
        assert!(matches!(err, InstallerError::InvalidManifest { .. }));
    }

    #[test]
    fn intel_macos_is_not_published() {
        let manifest = bundled_manifest().expect("bundled manifest");
        let intel_mac = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);
        assert!(manifest.entry_for(intel_mac).is_none());
    }
}
