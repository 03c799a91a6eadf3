//! Install-flow helpers for the installer binary.
//!
//! This module keeps destination locking, post-install reporting, and the
//! Nushell runtime check separate from CLI orchestration in `main.rs`.

use camino::{Utf8Path, Utf8PathBuf};
use nu_mcp_installer::cli::InstallArgs;
use nu_mcp_installer::deps::{CommandExecutor, check_nushell};
use nu_mcp_installer::dirs::{BaseDirs, default_bin_dir};
use nu_mcp_installer::error::{InstallerError, Result};
use nu_mcp_installer::install::InstallResult;
use nu_mcp_installer::lock::DestinationLock;
use nu_mcp_installer::output::{
    is_directory_in_path, missing_nushell_warning, path_instructions, success_message,
    write_stderr_line,
};
use std::io::Write;

/// Determines the bin directory from CLI or falls back to the default.
pub(crate) fn determine_bin_dir(
    cli_bin_dir: Option<Utf8PathBuf>,
    dirs: Option<&dyn BaseDirs>,
) -> Result<Utf8PathBuf> {
    cli_bin_dir
        .or_else(|| dirs.and_then(default_bin_dir))
        .ok_or_else(|| InstallerError::Filesystem {
            path: "~/.local/bin".to_owned(),
            reason: "could not determine default bin directory; pass --bin-dir".to_owned(),
        })
}

/// Lock the destination, unless `--no-lock` was given.
///
/// The destination is not created here. The returned guard must be held
/// until the install has finished.
pub(crate) fn lock_destination(
    args: &InstallArgs,
    dest_dir: &Utf8Path,
) -> Result<Option<DestinationLock>> {
    if args.no_lock {
        return Ok(None);
    }
    DestinationLock::acquire(dest_dir).map(Some)
}

/// Report the installed path and, when needed, how to put it on PATH.
pub(crate) fn report_success(
    result: &InstallResult,
    dest_dir: &Utf8Path,
    quiet: bool,
    stderr: &mut dyn Write,
) {
    if quiet {
        return;
    }
    write_stderr_line(stderr, success_message(result));
    if !is_directory_in_path(dest_dir.as_std_path()) {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, path_instructions(dest_dir));
    }
}

/// Warn when Nushell is unavailable. Never fails the install.
pub(crate) fn warn_if_nushell_missing(
    executor: &dyn CommandExecutor,
    quiet: bool,
    stderr: &mut dyn Write,
) {
    let status = check_nushell(executor);
    if !status.is_available() && !quiet {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, missing_nushell_warning());
    }
}
