//! Verified install pipeline.
//!
//! Resolves the manifest entry for a platform, downloads the archive into a
//! private temporary directory, verifies its SHA-256 digest, extracts the
//! `nu-mcp` executable, and atomically places it in the destination
//! directory. The destination is not touched until verification and
//! extraction have both succeeded, so every failure leaves it as it was.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::artefact::download::{ArtefactDownloader, DownloadError, HttpDownloader};
use crate::artefact::extraction::{ArchiveFormat, BinaryExtractor, TarExtractor};
use crate::artefact::manifest::{ArtefactEntry, ReleaseManifest};
use crate::artefact::naming::BINARY_NAME;
use crate::artefact::platform::{Architecture, OsFamily, PlatformKey};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::version::ReleaseVersion;
use crate::error::{InstallerError, Result};
use crate::output::write_stderr_line;
use crate::stager::Stager;

/// Name of the downloaded archive inside the private work directory.
const ARCHIVE_FILE_NAME: &str = "archive";

/// Steps of a single install, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Looking up the manifest entry.
    Resolving,
    /// Downloading the archive.
    Fetching,
    /// Comparing the archive digest with the manifest.
    Verifying,
    /// Unpacking the executable.
    Extracting,
    /// Placing the executable in the destination directory.
    Installing,
    /// Finished successfully.
    Done,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolving => "resolving",
            Self::Fetching => "fetching",
            Self::Verifying => "verifying",
            Self::Extracting => "extracting",
            Self::Installing => "installing",
            Self::Done => "done",
        })
    }
}

/// Parameters for one install.
#[derive(Debug, Clone, Copy)]
pub struct InstallConfig<'a> {
    /// Platform whose artefact is installed.
    pub platform: PlatformKey,
    /// Directory that receives the `nu-mcp` executable.
    pub dest_dir: &'a Utf8Path,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Final path of the installed executable.
    pub installed_path: Utf8PathBuf,
    /// Digest of the archive that was verified.
    pub verified_checksum: Sha256Digest,
    /// Installed release version.
    pub version: ReleaseVersion,
    /// Platform that was installed.
    pub platform: PlatformKey,
}

/// Combine optional overrides with the host platform.
///
/// Each component not overridden is taken from the host.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidPlatform`] when a component is neither
/// overridden nor detectable on this host.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily};
/// use nu_mcp_installer::install::target_platform;
///
/// let platform = target_platform(Some(OsFamily::Linux), Some(Architecture::Aarch64))
///     .expect("explicit platform");
/// assert_eq!(platform.to_string(), "linux/aarch64");
/// ```
pub fn target_platform(
    os: Option<OsFamily>,
    arch: Option<Architecture>,
) -> Result<PlatformKey> {
    let os = os.or_else(OsFamily::host).ok_or_else(|| InstallerError::InvalidPlatform {
        reason: format!(
            "unsupported host operating system `{}`; pass --os",
            std::env::consts::OS
        ),
    })?;
    let arch = arch
        .or_else(Architecture::host)
        .ok_or_else(|| InstallerError::InvalidPlatform {
            reason: format!(
                "unsupported host architecture `{}`; pass --arch",
                std::env::consts::ARCH
            ),
        })?;
    Ok(PlatformKey::new(os, arch))
}

/// Look up the manifest entry for `platform`.
///
/// # Errors
///
/// Returns [`InstallerError::UnsupportedPlatform`], listing the platforms the
/// release does publish, when `platform` has no entry.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily, PlatformKey};
/// use nu_mcp_installer::install::resolve;
/// use nu_mcp_installer::release::bundled_manifest;
///
/// let manifest = bundled_manifest().expect("bundled manifest");
/// let linux = PlatformKey::new(OsFamily::Linux, Architecture::X86_64);
/// assert!(resolve(&manifest, linux).is_ok());
///
/// let intel_mac = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);
/// assert!(resolve(&manifest, intel_mac).is_err());
/// ```
pub fn resolve(manifest: &ReleaseManifest, platform: PlatformKey) -> Result<&ArtefactEntry> {
    log::debug!("{}: nu-mcp {} for {platform}", InstallStage::Resolving, manifest.version());
    manifest
        .entry_for(platform)
        .ok_or_else(|| InstallerError::UnsupportedPlatform {
            platform: platform.to_string(),
            version: manifest.version().to_string(),
            supported: manifest
                .supported_platforms()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Install nu-mcp using the production HTTP downloader and tar extractor.
///
/// # Errors
///
/// See [`install_with`].
pub fn install(
    manifest: &ReleaseManifest,
    config: &InstallConfig<'_>,
    timeout: Duration,
    stderr: &mut dyn Write,
) -> Result<InstallResult> {
    install_with(
        manifest,
        config,
        &HttpDownloader::with_timeout(timeout),
        &TarExtractor,
        stderr,
    )
}

/// Install nu-mcp with injected download and extraction implementations.
///
/// The production entry point [`install`] delegates here; tests inject
/// mocks.
///
/// # Errors
///
/// Returns the [`InstallerError`] variant for the step that failed:
/// `UnsupportedPlatform`, `FetchFailed`, `ChecksumMismatch`,
/// `ExtractionFailed`, or `Filesystem`.
pub fn install_with(
    manifest: &ReleaseManifest,
    config: &InstallConfig<'_>,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn BinaryExtractor,
    stderr: &mut dyn Write,
) -> Result<InstallResult> {
    let entry = resolve(manifest, config.platform)?;

    let work_dir = tempfile::tempdir().map_err(|e| InstallerError::filesystem("temp dir", &e))?;
    let archive_path = work_dir.path().join(ARCHIVE_FILE_NAME);

    progress(config, stderr, format!("Downloading {}...", entry.url));
    fetch(downloader, entry, &archive_path)?;

    log::debug!("{}: {archive_path:?}", InstallStage::Verifying);
    let checksum = verify(entry, &archive_path)?;

    let format = archive_format(entry, &archive_path)?;
    log::debug!("{}: {format:?}", InstallStage::Extracting);
    let extract_dir = work_dir.path().join("extract");
    std::fs::create_dir(&extract_dir)
        .map_err(|e| InstallerError::filesystem(extract_dir.display(), &e))?;
    let binary = extractor
        .extract_binary(&archive_path, format, BINARY_NAME, &extract_dir)
        .map_err(|e| InstallerError::ExtractionFailed {
            reason: e.to_string(),
        })?;

    log::debug!("{}: {}", InstallStage::Installing, config.dest_dir);
    let stager = Stager::new(config.dest_dir.to_owned());
    stager.prepare()?;
    let installed_path = stager.install_executable(&binary, BINARY_NAME)?;

    log::info!(
        "{}: installed nu-mcp {} for {} at {installed_path}",
        InstallStage::Done,
        manifest.version(),
        config.platform
    );
    Ok(InstallResult {
        installed_path,
        verified_checksum: checksum,
        version: manifest.version().clone(),
        platform: config.platform,
    })
}

fn progress(config: &InstallConfig<'_>, stderr: &mut dyn Write, message: String) {
    if !config.quiet {
        write_stderr_line(stderr, message);
    }
}

fn fetch(downloader: &dyn ArtefactDownloader, entry: &ArtefactEntry, dest: &Path) -> Result<()> {
    log::debug!("{}: {}", InstallStage::Fetching, entry.url);
    let bytes = downloader.fetch(&entry.url, dest).map_err(|e| match e {
        DownloadError::Io(source) => InstallerError::filesystem(dest.display(), &source),
        other => InstallerError::FetchFailed {
            url: entry.url.to_string(),
            reason: other.to_string(),
        },
    })?;
    log::debug!("fetched {bytes} bytes");
    Ok(())
}

/// Identify the verified archive by content, using the URL file name as a
/// fallback hint.
fn archive_format(entry: &ArtefactEntry, archive_path: &Path) -> Result<ArchiveFormat> {
    ArchiveFormat::detect(archive_path, entry.url.file_name())
        .map_err(|e| InstallerError::filesystem(archive_path.display(), &e))?
        .ok_or_else(|| InstallerError::ExtractionFailed {
            reason: format!("unrecognised archive format for {}", entry.url),
        })
}

/// Compare the archive digest with the manifest, deleting the archive on
/// mismatch.
fn verify(entry: &ArtefactEntry, archive_path: &Path) -> Result<Sha256Digest> {
    let actual = Sha256Digest::of_file(archive_path)
        .map_err(|e| InstallerError::filesystem(archive_path.display(), &e))?;
    if actual != entry.checksum {
        if let Err(err) = std::fs::remove_file(archive_path) {
            log::debug!("could not remove rejected archive: {err}");
        }
        return Err(InstallerError::ChecksumMismatch {
            url: entry.url.to_string(),
            expected: entry.checksum.to_string(),
            actual: actual.into_inner(),
        });
    }
    Ok(actual)
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
