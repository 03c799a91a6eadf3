//! Output formatting for the installer CLI.
//!
//! Builds the user-facing text for resolution results, dry runs, install
//! success, PATH guidance, and the missing-Nushell warning. Everything here
//! returns strings; writing them is left to the caller.

use crate::artefact::manifest::ArtefactEntry;
use crate::artefact::platform::PlatformKey;
use crate::artefact::version::ReleaseVersion;
use crate::install::InstallResult;
use camino::Utf8Path;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Write a line to stderr, ignoring failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// A resolved artefact, as reported by `resolve` and `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution<'a> {
    /// Release version.
    pub version: &'a str,
    /// Target platform, as `os/arch`.
    pub platform: String,
    /// Archive URL.
    pub url: &'a str,
    /// Expected SHA-256 digest.
    pub sha256: &'a str,
}

impl<'a> Resolution<'a> {
    /// Describe the manifest entry chosen for `platform`.
    #[must_use]
    pub fn new(
        version: &'a ReleaseVersion,
        platform: PlatformKey,
        entry: &'a ArtefactEntry,
    ) -> Self {
        Self {
            version: version.as_str(),
            platform: platform.to_string(),
            url: entry.url.as_str(),
            sha256: entry.checksum.as_str(),
        }
    }

    /// Format as aligned `key: value` lines.
    ///
    /// # Example
    ///
    /// ```
    /// use nu_mcp_installer::output::Resolution;
    ///
    /// let resolution = Resolution {
    ///     version: "0.3.8",
    ///     platform: "linux/x86_64".to_owned(),
    ///     url: "https://example.test/nu-mcp.tgz",
    ///     sha256: "abc",
    /// };
    /// assert!(resolution.display_text().contains("Platform: linux/x86_64"));
    /// ```
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            format!("Version:  {}", self.version),
            format!("Platform: {}", self.platform),
            format!("URL:      {}", self.url),
            format!("SHA-256:  {}", self.sha256),
        ]
        .join("\n")
    }

    /// Serialise as a single-line JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Format the dry-run report for an install that would be performed.
#[must_use]
pub fn dry_run_text(resolution: &Resolution<'_>, dest_dir: &Utf8Path) -> String {
    format!(
        "Dry run - no files will be downloaded or modified\n\n{}\nDestination: {dest_dir}",
        resolution.display_text()
    )
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(result: &InstallResult) -> String {
    format!(
        "Installed nu-mcp {} ({}) to {}",
        result.version, result.platform, result.installed_path
    )
}

/// Warning shown when Nushell cannot be found after installation.
#[must_use]
pub fn missing_nushell_warning() -> &'static str {
    concat!(
        "Warning: Nushell (`nu`) was not found on PATH.\n",
        "nu-mcp needs Nushell at runtime; install it from https://www.nushell.sh"
    )
}

/// Checks if a directory is in the PATH environment variable.
#[must_use]
pub fn is_directory_in_path(dir: &Path) -> bool {
    std::env::var_os("PATH")
        .is_some_and(|path| std::env::split_paths(&path).any(|p| p == dir))
}

/// Returns instructions for adding a directory to PATH.
#[must_use]
pub fn path_instructions(bin_dir: &Utf8Path) -> String {
    format!(
        concat!(
            "{bin_dir} is not on your PATH. Add it to your shell profile:\n",
            "  # bash/zsh (~/.bashrc, ~/.zshrc)\n",
            "  export PATH=\"{bin_dir}:$PATH\"\n",
            "  # fish (~/.config/fish/config.fish)\n",
            "  fish_add_path \"{bin_dir}\"\n",
            "  # nushell (config.nu)\n",
            "  $env.PATH = ($env.PATH | prepend \"{bin_dir}\")"
        ),
        bin_dir = bin_dir
    )
}
