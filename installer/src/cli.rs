//! CLI argument definitions for the nu-mcp installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::download::DEFAULT_DOWNLOAD_TIMEOUT;
use crate::artefact::platform::{Architecture, OsFamily};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

/// Install the prebuilt nu-mcp binary after verifying its SHA-256 checksum.
#[derive(Parser, Debug)]
#[command(name = "nu-mcp-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the prebuilt nu-mcp binary after verifying its SHA-256 checksum.\n\n",
    "nu-mcp is a Model Context Protocol server backed by Nushell. This installer ",
    "selects the release archive for the current platform from a release manifest, ",
    "downloads it, rejects it unless its digest matches the manifest, and places ",
    "the `nu-mcp` executable in the destination directory.\n\n",
    "Without --manifest the release bundled with this installer is used.",
))]
#[command(after_help = concat!(
    "EXIT CODES:\n",
    "  0  success\n",
    "  2  invalid manifest or platform\n",
    "  3  platform not published for this release\n",
    "  4  download failed\n",
    "  5  checksum mismatch\n",
    "  6  archive extraction failed\n",
    "  7  filesystem error\n\n",
    "EXAMPLES:\n",
    "  Install the bundled release into ~/.local/bin:\n",
    "    $ nu-mcp-installer\n\n",
    "  Install into a custom directory:\n",
    "    $ nu-mcp-installer -d /opt/nu-mcp/bin\n\n",
    "  Install a newer release from a manifest file:\n",
    "    $ nu-mcp-installer --manifest nu-mcp-0.5.0.toml\n\n",
    "  Show what would be installed for another platform:\n",
    "    $ nu-mcp-installer resolve --os linux --arch aarch64 --json\n\n",
    "For more information, see: https://github.com/ck3mp3r/nu-mcp",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download, verify, and install nu-mcp (default when no subcommand given).
    Install(InstallArgs),

    /// Print the archive URL and checksum for a platform without downloading.
    Resolve(ResolveArgs),
}

/// Release and platform selection shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Release manifest file (.json or .toml) [default: bundled release].
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Operating system to install for [default: host].
    #[arg(long, value_name = "OS")]
    pub os: Option<OsFamily>,

    /// CPU architecture to install for [default: host].
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<Architecture>,
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Release and platform selection.
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory to install nu-mcp into [default: ~/.local/bin].
    #[arg(short = 'd', long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Download deadline in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Do not take the advisory lock on the destination directory.
    #[arg(long)]
    pub no_lock: bool,

    /// Skip the Nushell runtime check.
    #[arg(long)]
    pub skip_deps: bool,

    /// Resolve and print the artefact without downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the resolve command.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Release and platform selection.
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

impl InstallArgs {
    /// The download deadline as a [`Duration`].
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::cli::InstallArgs;
    /// use std::time::Duration;
    ///
    /// let args = InstallArgs::default();
    /// assert_eq!(args.timeout(), Duration::from_secs(30));
    /// ```
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for InstallArgs {
    /// Creates an `InstallArgs` instance with all flags disabled and the
    /// bundled release selected.
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::cli::InstallArgs;
    ///
    /// let args = InstallArgs::default();
    /// assert!(!args.dry_run);
    /// assert!(args.bin_dir.is_none());
    /// assert!(args.target.manifest.is_none());
    /// ```
    fn default() -> Self {
        Self {
            target: TargetArgs::default(),
            bin_dir: None,
            timeout: DEFAULT_DOWNLOAD_TIMEOUT.as_secs(),
            no_lock: false,
            skip_deps: false,
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened install arguments.
    ///
    /// # Note
    ///
    /// When `Command::Resolve` is active, this returns the default flattened
    /// install arguments. Callers should check `self.command` first.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::Resolve(_)) | None => &self.install,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
