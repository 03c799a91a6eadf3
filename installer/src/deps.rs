//! Runtime dependency checks for nu-mcp.
//!
//! nu-mcp shells out to Nushell at runtime. The installer does not install
//! Nushell itself; it checks for a working `nu` on `PATH` after installation
//! and reports a warning when none is found. A missing runtime never fails
//! the install.

use crate::error::{InstallerError, Result};
use std::process::{Command, Output};

/// Executable name of the Nushell runtime.
pub const NUSHELL_COMMAND: &str = "nu";

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nu_mcp_installer::deps::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("nu", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), nu_mcp_installer::error::InstallerError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(InstallerError::from)
    }
}

/// Availability of the Nushell runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NushellStatus {
    /// `nu --version` succeeded and printed this version.
    Available {
        /// First line of the version output, trimmed.
        version: String,
    },
    /// `nu` could not be spawned or exited unsuccessfully.
    Missing,
}

impl NushellStatus {
    /// Returns `true` when a working `nu` was found.
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::deps::NushellStatus;
    ///
    /// assert!(!NushellStatus::Missing.is_available());
    /// ```
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Checks for the Nushell runtime by running `nu --version`.
///
/// # Examples
///
/// ```no_run
/// use nu_mcp_installer::deps::{check_nushell, SystemCommandExecutor};
///
/// let status = check_nushell(&SystemCommandExecutor);
/// if !status.is_available() {
///     eprintln!("nu-mcp needs Nushell at runtime");
/// }
/// ```
pub fn check_nushell(executor: &dyn CommandExecutor) -> NushellStatus {
    match executor.run(NUSHELL_COMMAND, &["--version"]) {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or_default().trim().to_owned();
            log::debug!("found nushell {version}");
            NushellStatus::Available { version }
        }
        Ok(output) => {
            log::debug!(
                "`nu --version` exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            NushellStatus::Missing
        }
        Err(err) => {
            log::debug!("could not run `nu`: {err}");
            NushellStatus::Missing
        }
    }
}
