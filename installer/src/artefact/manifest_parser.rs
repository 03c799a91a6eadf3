//! Manifest deserialisation from JSON and TOML.
//!
//! All newtype validation (known OS and architecture, HTTPS URL, SHA-256
//! digest, semantic version, no duplicate platforms) runs during
//! deserialisation, so a successfully parsed manifest is always valid.

use super::manifest::ReleaseManifest;
use std::path::Path;

/// Errors arising from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    /// JSON deserialisation or field validation failed.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialisation or field validation failed.
    #[error("manifest parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The manifest file has an extension other than `.json` or `.toml`.
    #[error("unsupported manifest format for {path}; expected a .json or .toml file")]
    UnsupportedFormat {
        /// The manifest path as given.
        path: String,
    },

    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Read {
        /// The manifest path as given.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Parse a JSON string into a validated [`ReleaseManifest`].
///
/// # Errors
///
/// Returns an error if the JSON is malformed or any field fails validation.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::manifest_parser::parse_manifest_json;
///
/// let json = concat!(
///     r#"{"version":"0.3.8","platform_entries":[{"#,
///     r#""os":"linux","arch":"x86_64","#,
///     r#""url":"https://example.com/nu-mcp.tgz","#,
///     r#""sha256":"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}]}"#,
/// );
/// let manifest = parse_manifest_json(json).expect("valid manifest");
/// assert_eq!(manifest.version().as_str(), "0.3.8");
/// ```
pub fn parse_manifest_json(json: &str) -> Result<ReleaseManifest, ManifestParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a TOML string into a validated [`ReleaseManifest`].
///
/// # Errors
///
/// Returns an error if the TOML is malformed or any field fails validation.
pub fn parse_manifest_toml(source: &str) -> Result<ReleaseManifest, ManifestParseError> {
    Ok(toml::from_str(source)?)
}

/// Read and parse a manifest file, choosing the format by extension.
///
/// # Errors
///
/// Returns [`ManifestParseError::UnsupportedFormat`] for unknown extensions,
/// [`ManifestParseError::Read`] if the file cannot be read, and a parse
/// error if the contents are invalid.
pub fn load_manifest(path: &Path) -> Result<ReleaseManifest, ManifestParseError> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str) -> Result<ReleaseManifest, ManifestParseError> =
        match extension.as_deref() {
            Some("json") => parse_manifest_json,
            Some("toml") => parse_manifest_toml,
            _ => return Err(ManifestParseError::UnsupportedFormat { path: display }),
        };
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestParseError::Read {
        path: display,
        source,
    })?;
    log::debug!("parsing release manifest from {}", path.display());
    parse(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::platform::{Architecture, OsFamily, PlatformKey};
    use rstest::rstest;

    const DIGEST: &str = "51f306ece35e7012ecb7496b268ff5d7e02f8e747052d0bf42633ea98503bb4a";

    fn valid_manifest_json() -> String {
        format!(
            concat!(
                r#"{{"version":"0.3.8","platform_entries":["#,
                r#"{{"os":"linux","arch":"x86_64","#,
                r#""url":"https://example.com/nu-mcp-0.3.8-x86_64-linux.tgz","#,
                r#""sha256":"{}"}}]}}"#,
            ),
            DIGEST
        )
    }

    fn valid_manifest_toml() -> String {
        format!(
            concat!(
                "version = \"0.3.8\"\n\n",
                "[[platform_entries]]\n",
                "os = \"darwin\"\n",
                "arch = \"arm64\"\n",
                "url = \"https://example.com/nu-mcp-0.3.8-aarch64-darwin.tgz\"\n",
                "sha256 = \"{}\"\n",
            ),
            DIGEST
        )
    }

    #[test]
    fn parses_valid_json_manifest() {
        let manifest = parse_manifest_json(&valid_manifest_json()).expect("valid");
        assert_eq!(manifest.version().as_str(), "0.3.8");
        let entry = manifest
            .entry_for(PlatformKey::new(OsFamily::Linux, Architecture::X86_64))
            .expect("linux entry");
        assert_eq!(entry.checksum.as_str(), DIGEST);
    }

    #[test]
    fn parses_valid_toml_manifest_with_aliases() {
        let manifest = parse_manifest_toml(&valid_manifest_toml()).expect("valid");
        let platforms: Vec<_> = manifest.supported_platforms().collect();
        assert_eq!(
            platforms,
            vec![PlatformKey::new(OsFamily::MacOs, Architecture::Aarch64)]
        );
    }

    #[test]
    fn rejects_invalid_json_syntax() {
        let result = parse_manifest_json("{not valid json");
        assert!(matches!(result, Err(ManifestParseError::Json(_))));
    }

    #[rstest]
    #[case::plain_http(
        r#""url":"https://example.com/a.tgz""#,
        r#""url":"http://example.com/a.tgz""#,
        "https"
    )]
    #[case::short_digest(DIGEST, "abc", "SHA-256")]
    #[case::unknown_os(r#""os":"linux""#, r#""os":"windows""#, "windows")]
    #[case::bad_version(r#""version":"0.3.8""#, r#""version":"latest""#, "latest")]
    fn rejects_invalid_fields(#[case] from: &str, #[case] to: &str, #[case] expected: &str) {
        let json = valid_manifest_json()
            .replace(
                "https://example.com/nu-mcp-0.3.8-x86_64-linux.tgz",
                "https://example.com/a.tgz",
            )
            .replace(from, to);
        let err = parse_manifest_json(&json).expect_err("invalid field must fail");
        assert!(
            err.to_string().contains(expected),
            "expected '{expected}' in: {err}"
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = valid_manifest_json().replace(r#""version""#, r#""extra":1,"version""#);
        assert!(parse_manifest_json(&json).is_err());
    }

    #[test]
    fn rejects_duplicate_platforms() {
        let entry = format!(
            r#"{{"os":"linux","arch":"amd64","url":"https://example.com/b.tgz","sha256":"{DIGEST}"}}"#
        );
        let json = valid_manifest_json().replace("]}", &format!(",{entry}]}}"));
        let err = parse_manifest_json(&json).expect_err("duplicate must fail");
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }

    #[test]
    fn load_manifest_selects_format_by_extension() {
        let temp = tempfile::tempdir().expect("temp dir");
        let json_path = temp.path().join("release.json");
        let toml_path = temp.path().join("release.TOML");
        std::fs::write(&json_path, valid_manifest_json()).expect("write json");
        std::fs::write(&toml_path, valid_manifest_toml()).expect("write toml");

        assert!(load_manifest(&json_path).is_ok());
        assert!(load_manifest(&toml_path).is_ok());
    }

    #[test]
    fn load_manifest_rejects_unknown_extension() {
        let result = load_manifest(Path::new("release.yaml"));
        assert!(matches!(
            result,
            Err(ManifestParseError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_manifest_reports_missing_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let result = load_manifest(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(ManifestParseError::Read { .. })));
    }
}
