//! Platform keys for artefact resolution.
//!
//! A [`PlatformKey`] pairs an [`OsFamily`] with an [`Architecture`]. Keys are
//! plain lookup values: whether a platform is supported is decided by the
//! release manifest, never by this module.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accepted spellings for each operating system family.
const OS_SPELLINGS: &[(&str, OsFamily)] = &[
    ("macos", OsFamily::MacOs),
    ("darwin", OsFamily::MacOs),
    ("osx", OsFamily::MacOs),
    ("linux", OsFamily::Linux),
];

/// Accepted spellings for each CPU architecture.
const ARCH_SPELLINGS: &[(&str, Architecture)] = &[
    ("x86_64", Architecture::X86_64),
    ("amd64", Architecture::X86_64),
    ("x64", Architecture::X86_64),
    ("aarch64", Architecture::Aarch64),
    ("arm64", Architecture::Aarch64),
];

/// Operating system family of an install target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum OsFamily {
    /// Apple macOS.
    MacOs,
    /// Linux (any distribution).
    Linux,
}

impl OsFamily {
    /// Canonical lowercase name used in manifests and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Linux => "linux",
        }
    }

    /// Name used in release artefact file names.
    #[must_use]
    pub const fn release_name(self) -> &'static str {
        match self {
            Self::MacOs => "darwin",
            Self::Linux => "linux",
        }
    }

    /// Family of the operating system this binary was compiled for.
    #[must_use]
    pub fn host() -> Option<Self> {
        Self::from_str(std::env::consts::OS).ok()
    }
}

impl FromStr for OsFamily {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        OS_SPELLINGS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, os)| *os)
            .ok_or_else(|| ArtefactError::UnknownOs {
                value: value.to_owned(),
                expected: spellings(OS_SPELLINGS),
            })
    }
}

impl TryFrom<String> for OsFamily {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OsFamily> for &'static str {
    fn from(value: OsFamily) -> Self {
        value.as_str()
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of an install target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Architecture {
    /// 64-bit x86 (Intel/AMD).
    X86_64,
    /// 64-bit ARM (Apple Silicon, Graviton, ...).
    Aarch64,
}

impl Architecture {
    /// Canonical name used in manifests, CLI output, and artefact names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }

    /// Architecture this binary was compiled for.
    #[must_use]
    pub fn host() -> Option<Self> {
        Self::from_str(std::env::consts::ARCH).ok()
    }
}

impl FromStr for Architecture {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        ARCH_SPELLINGS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, arch)| *arch)
            .ok_or_else(|| ArtefactError::UnknownArch {
                value: value.to_owned(),
                expected: spellings(ARCH_SPELLINGS),
            })
    }
}

impl TryFrom<String> for Architecture {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Architecture> for &'static str {
    fn from(value: Architecture) -> Self {
        value.as_str()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An (OS family, architecture) pair identifying one release artefact.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::platform::{Architecture, OsFamily, PlatformKey};
///
/// let key = PlatformKey::new(OsFamily::MacOs, Architecture::Aarch64);
/// assert_eq!(key.release_suffix(), "aarch64-darwin");
/// assert_eq!(key.to_string(), "macos/aarch64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformKey {
    /// Operating system family.
    pub os: OsFamily,
    /// CPU architecture.
    pub arch: Architecture,
}

impl PlatformKey {
    /// Pair an OS family with an architecture.
    #[must_use]
    pub const fn new(os: OsFamily, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// Platform this binary was compiled for, if it is a modelled one.
    ///
    /// Returns `None` on hosts such as Windows or 32-bit ARM.
    #[must_use]
    pub fn host() -> Option<Self> {
        Some(Self::new(OsFamily::host()?, Architecture::host()?))
    }

    /// The `{arch}-{os}` suffix used in release artefact names.
    #[must_use]
    pub fn release_suffix(&self) -> String {
        format!("{}-{}", self.arch.as_str(), self.os.release_name())
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn spellings<T>(table: &[(&str, T)]) -> String {
    table
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::macos("macos", OsFamily::MacOs)]
    #[case::darwin("Darwin", OsFamily::MacOs)]
    #[case::osx("osx", OsFamily::MacOs)]
    #[case::linux(" linux ", OsFamily::Linux)]
    fn parses_os_spellings(#[case] input: &str, #[case] expected: OsFamily) {
        assert_eq!(input.parse::<OsFamily>().expect("known OS"), expected);
    }

    #[rstest]
    #[case::x86_64("x86_64", Architecture::X86_64)]
    #[case::amd64("AMD64", Architecture::X86_64)]
    #[case::x64("x64", Architecture::X86_64)]
    #[case::aarch64("aarch64", Architecture::Aarch64)]
    #[case::arm64("arm64", Architecture::Aarch64)]
    fn parses_arch_spellings(#[case] input: &str, #[case] expected: Architecture) {
        assert_eq!(input.parse::<Architecture>().expect("known arch"), expected);
    }

    #[test]
    fn rejects_unknown_os_with_expected_list() {
        let err = "windows".parse::<OsFamily>().expect_err("windows is not modelled");
        assert!(matches!(err, ArtefactError::UnknownOs { .. }));
        assert!(err.to_string().contains("darwin"));
    }

    #[test]
    fn rejects_unknown_arch() {
        let err = "riscv64".parse::<Architecture>().expect_err("riscv64 is not modelled");
        assert!(matches!(err, ArtefactError::UnknownArch { .. }));
    }

    #[rstest]
    #[case::mac_arm(OsFamily::MacOs, Architecture::Aarch64, "aarch64-darwin")]
    #[case::mac_intel(OsFamily::MacOs, Architecture::X86_64, "x86_64-darwin")]
    #[case::linux_intel(OsFamily::Linux, Architecture::X86_64, "x86_64-linux")]
    #[case::linux_arm(OsFamily::Linux, Architecture::Aarch64, "aarch64-linux")]
    fn release_suffix_matches_artefact_naming(
        #[case] os: OsFamily,
        #[case] arch: Architecture,
        #[case] expected: &str,
    ) {
        assert_eq!(PlatformKey::new(os, arch).release_suffix(), expected);
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&OsFamily::MacOs).expect("serialise");
        assert_eq!(json, "\"macos\"");
        let arch: Architecture = serde_json::from_str("\"arm64\"").expect("deserialise");
        assert_eq!(arch, Architecture::Aarch64);
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn host_detects_linux_x86_64() {
        assert_eq!(
            PlatformKey::host(),
            Some(PlatformKey::new(OsFamily::Linux, Architecture::X86_64))
        );
    }
}
