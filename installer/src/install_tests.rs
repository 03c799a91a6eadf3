//! Unit tests for the install pipeline.

use super::*;
use crate::artefact::download::MockArtefactDownloader;
use crate::artefact::extraction::MockBinaryExtractor;
use crate::artefact::platform::{Architecture, OsFamily};
use crate::release::bundled_manifest;
use crate::test_utils::{ArchiveEntry, sha256_hex, single_platform_manifest, tar_gz_bytes};
use rstest::rstest;

const BINARY: &[u8] = b"\x7fELF nu-mcp 0.5.0";
const LINUX_X64: PlatformKey = PlatformKey {
    os: OsFamily::Linux,
    arch: Architecture::X86_64,
};
const ARCHIVE_NAME: &str = "nu-mcp-0.5.0-x86_64-linux.tgz";

fn utf8_temp() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    (temp, path)
}

fn release_archive() -> Vec<u8> {
    tar_gz_bytes(&[
        ArchiveEntry::file("nu-mcp", BINARY),
        ArchiveEntry::file("LICENSE", b"MIT"),
    ])
}

fn serving(bytes: Vec<u8>) -> MockArtefactDownloader {
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().times(1).returning(move |_url, dest| {
        std::fs::write(dest, &bytes)?;
        Ok(bytes.len() as u64)
    });
    downloader
}

fn untouched_extractor() -> MockBinaryExtractor {
    let mut extractor = MockBinaryExtractor::new();
    extractor.expect_extract_binary().never();
    extractor
}

fn config(dest_dir: &Utf8Path, platform: PlatformKey) -> InstallConfig<'_> {
    InstallConfig {
        platform,
        dest_dir,
        quiet: true,
    }
}

fn dir_listing(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[rstest]
#[case::mac_arm(OsFamily::MacOs, Architecture::Aarch64, "aarch64-darwin")]
#[case::linux_x64(OsFamily::Linux, Architecture::X86_64, "x86_64-linux")]
#[case::linux_arm(OsFamily::Linux, Architecture::Aarch64, "aarch64-linux")]
fn resolve_returns_entry_for_published_platform(
    #[case] os: OsFamily,
    #[case] arch: Architecture,
    #[case] suffix: &str,
) {
    let manifest = bundled_manifest().expect("bundled manifest");
    let platform = PlatformKey::new(os, arch);

    let entry = resolve(&manifest, platform).expect("resolved");

    assert_eq!(Some(entry), manifest.entry_for(platform));
    assert!(entry.url.as_str().ends_with(&format!("{suffix}.tgz")));
}

#[test]
fn resolve_reports_supported_platforms_for_missing_entry() {
    let manifest = bundled_manifest().expect("bundled manifest");
    let intel_mac = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);

    let err = resolve(&manifest, intel_mac).expect_err("unsupported");

    match err {
        InstallerError::UnsupportedPlatform {
            platform,
            version,
            supported,
        } => {
            assert_eq!(platform, "macos/x86_64");
            assert_eq!(version, "0.3.8");
            assert!(supported.contains("macos/aarch64"));
            assert!(supported.contains("linux/x86_64"));
            assert!(supported.contains("linux/aarch64"));
        }
        other => panic!("expected UnsupportedPlatform, got {other:?}"),
    }
}

#[test]
fn unsupported_platform_fails_before_any_download() {
    let (_temp, root) = utf8_temp();
    let dest = root.join("bin");
    let manifest = bundled_manifest().expect("bundled manifest");
    let intel_mac = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().never();

    let err = install_with(
        &manifest,
        &config(&dest, intel_mac),
        &downloader,
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("unsupported");

    assert_eq!(err.kind(), crate::error::FailureKind::UnsupportedPlatform);
    assert!(!dest.exists());
}

#[test]
fn verified_archive_installs_identical_executable() {
    let (_temp, dest) = utf8_temp();
    let archive = release_archive();
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(&archive));

    let result = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive.clone()),
        &TarExtractor,
        &mut Vec::new(),
    )
    .expect("install");

    assert_eq!(result.installed_path, dest.join("nu-mcp"));
    assert_eq!(result.verified_checksum.as_str(), sha256_hex(&archive));
    assert_eq!(result.version.as_str(), "0.5.0");
    assert_eq!(result.platform, LINUX_X64);
    assert_eq!(std::fs::read(&result.installed_path).expect("read"), BINARY);
    assert_eq!(dir_listing(&dest), vec!["nu-mcp".to_owned()]);
}

#[cfg(unix)]
#[test]
fn installed_executable_has_execute_bits() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp, dest) = utf8_temp();
    let archive = release_archive();
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(&archive));

    let result = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive),
        &TarExtractor,
        &mut Vec::new(),
    )
    .expect("install");

    let mode = std::fs::metadata(&result.installed_path)
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn checksum_mismatch_leaves_missing_destination_absent() {
    let (_temp, root) = utf8_temp();
    let dest = root.join("bin");
    let archive = release_archive();
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(b"other"));

    let err = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive.clone()),
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("mismatch");

    match err {
        InstallerError::ChecksumMismatch {
            url,
            expected,
            actual,
        } => {
            assert_eq!(url, format!("https://downloads.test/{ARCHIVE_NAME}"));
            assert_eq!(expected, sha256_hex(b"other"));
            assert_eq!(actual, sha256_hex(&archive));
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn checksum_mismatch_keeps_previous_install() {
    let (_temp, dest) = utf8_temp();
    std::fs::write(dest.join("nu-mcp"), b"previous").expect("seed");
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(b"other"));

    let err = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(release_archive()),
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("mismatch");

    assert_eq!(err.kind().exit_code(), 5);
    assert_eq!(std::fs::read(dest.join("nu-mcp")).expect("read"), b"previous");
    assert_eq!(dir_listing(&dest), vec!["nu-mcp".to_owned()]);
}

#[rstest]
#[case::not_found(DownloadError::NotFound { url: "u".to_owned() })]
#[case::status(DownloadError::Status { url: "u".to_owned(), status: 500 })]
#[case::transport(DownloadError::Transport { url: "u".to_owned(), reason: "timed out".to_owned() })]
fn download_failures_map_to_fetch_failed(#[case] failure: DownloadError) {
    let (_temp, root) = utf8_temp();
    let dest = root.join("bin");
    let manifest = single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(b"x"));
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_fetch()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let err = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &downloader,
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("fetch failure");

    assert!(matches!(err, InstallerError::FetchFailed { .. }), "got {err:?}");
    assert!(!dest.exists());
}

#[test]
fn archive_without_binary_is_an_extraction_failure() {
    let (_temp, root) = utf8_temp();
    let dest = root.join("bin");
    let archive = tar_gz_bytes(&[ArchiveEntry::file("dist/nu-mcp", BINARY)]);
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(&archive));

    let err = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive),
        &TarExtractor,
        &mut Vec::new(),
    )
    .expect_err("missing binary");

    assert!(matches!(err, InstallerError::ExtractionFailed { .. }), "got {err:?}");
    assert!(!dest.exists());
}

#[rstest]
#[case::extensionless("download")]
#[case::misleading_suffix("nu-mcp.zip")]
fn archive_format_is_read_from_content(#[case] file_name: &str) {
    let (_temp, dest) = utf8_temp();
    let archive = release_archive();
    let manifest = single_platform_manifest("0.5.0", LINUX_X64, file_name, &sha256_hex(&archive));

    let result = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive),
        &TarExtractor,
        &mut Vec::new(),
    )
    .expect("install");

    assert_eq!(std::fs::read(&result.installed_path).expect("read"), BINARY);
}

#[test]
fn unrecognised_archive_is_an_extraction_failure() {
    let (_temp, root) = utf8_temp();
    let dest = root.join("bin");
    let archive = b"PK\x03\x04 zip archive".to_vec();
    let manifest = single_platform_manifest("0.5.0", LINUX_X64, "download", &sha256_hex(&archive));

    let err = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive),
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("unknown format");

    assert!(matches!(err, InstallerError::ExtractionFailed { .. }), "got {err:?}");
    assert!(!dest.exists());
}

#[test]
fn reinstalling_produces_the_same_file() {
    let (_temp, dest) = utf8_temp();
    let archive = release_archive();
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(&archive));

    let first = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive.clone()),
        &TarExtractor,
        &mut Vec::new(),
    )
    .expect("first install");
    let first_bytes = std::fs::read(&first.installed_path).expect("read");
    let second = install_with(
        &manifest,
        &config(&dest, LINUX_X64),
        &serving(archive),
        &TarExtractor,
        &mut Vec::new(),
    )
    .expect("second install");

    assert_eq!(first, second);
    assert_eq!(std::fs::read(&second.installed_path).expect("read"), first_bytes);
    assert_eq!(dir_listing(&dest), vec!["nu-mcp".to_owned()]);
}

#[rstest]
#[case::quiet(true, false)]
#[case::chatty(false, true)]
fn progress_output_respects_quiet(#[case] quiet: bool, #[case] expect_output: bool) {
    let (_temp, dest) = utf8_temp();
    let archive = release_archive();
    let manifest =
        single_platform_manifest("0.5.0", LINUX_X64, ARCHIVE_NAME, &sha256_hex(&archive));
    let config = InstallConfig {
        quiet,
        ..config(&dest, LINUX_X64)
    };
    let mut stderr = Vec::new();

    install_with(&manifest, &config, &serving(archive), &TarExtractor, &mut stderr)
        .expect("install");

    let text = String::from_utf8(stderr).expect("UTF-8");
    assert_eq!(text.contains("Downloading"), expect_output, "stderr: {text}");
}

#[rstest]
#[case(InstallStage::Resolving, "resolving")]
#[case(InstallStage::Verifying, "verifying")]
#[case(InstallStage::Done, "done")]
fn stage_names(#[case] stage: InstallStage, #[case] expected: &str) {
    assert_eq!(stage.to_string(), expected);
}

#[test]
fn target_platform_prefers_overrides() {
    let platform =
        target_platform(Some(OsFamily::MacOs), Some(Architecture::X86_64)).expect("platform");
    assert_eq!(platform, PlatformKey::new(OsFamily::MacOs, Architecture::X86_64));
}

#[test]
fn target_platform_fills_gaps_from_host() {
    let (Some(os), Some(arch)) = (OsFamily::host(), Architecture::host()) else {
        // Hosts outside the supported set have nothing to fall back to.
        return;
    };
    assert_eq!(
        target_platform(None, Some(arch)).expect("platform"),
        PlatformKey::new(os, arch)
    );
    assert_eq!(
        target_platform(Some(os), None).expect("platform"),
        PlatformKey::new(os, arch)
    );
}
