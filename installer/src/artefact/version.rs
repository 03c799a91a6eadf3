//! Release version newtype.
//!
//! Accepts semantic versions of the form `MAJOR.MINOR.PATCH`, optionally
//! followed by a `-prerelease` and/or `+build` suffix. The release tag is
//! derived by prefixing `v`, so a leading `v` in the input is rejected.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated release version string (e.g. `0.3.8`).
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "0.3.8".try_into().expect("valid version");
/// assert_eq!(version.tag(), "v0.3.8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the git tag the release is published under.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{}", self.0)
    }
}

impl TryFrom<&str> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_version(value).map_err(|reason| ArtefactError::InvalidVersion {
            value: value.to_owned(),
            reason,
        })?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl From<ReleaseVersion> for String {
    fn from(value: ReleaseVersion) -> Self {
        value.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_version(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("version must not be empty".to_owned());
    }
    let (core, build) = match value.split_once('+') {
        Some((core, build)) => (core, Some(build)),
        None => (value, None),
    };
    let (core, pre) = match core.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (core, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected MAJOR.MINOR.PATCH, found {} component(s)",
            parts.len()
        ));
    }
    for part in parts {
        validate_numeric(part)?;
    }
    if let Some(pre) = pre {
        validate_identifiers(pre, "pre-release")?;
    }
    if let Some(build) = build {
        validate_identifiers(build, "build metadata")?;
    }
    Ok(())
}

fn validate_numeric(part: &str) -> std::result::Result<(), String> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("\"{part}\" is not a number"));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(format!("\"{part}\" has a leading zero"));
    }
    Ok(())
}

fn validate_identifiers(section: &str, label: &str) -> std::result::Result<(), String> {
    let valid = section.split('.').all(|ident| {
        !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if valid {
        Ok(())
    } else {
        Err(format!("malformed {label} \"{section}\""))
    }
}
