//! nu-mcp installer CLI entrypoint.
//!
//! This binary resolves the nu-mcp release archive for the current platform,
//! verifies its SHA-256 digest, and installs the `nu-mcp` executable. After
//! installation it checks for the Nushell runtime and prints PATH guidance.

mod install_flow;
mod logging;

use clap::Parser;
use nu_mcp_installer::artefact::manifest::ReleaseManifest;
use nu_mcp_installer::artefact::platform::PlatformKey;
use nu_mcp_installer::cli::{Cli, Command, InstallArgs, ResolveArgs, TargetArgs};
use nu_mcp_installer::deps::SystemCommandExecutor;
use nu_mcp_installer::dirs::{BaseDirs, SystemBaseDirs};
use nu_mcp_installer::error::Result;
use nu_mcp_installer::install::{InstallConfig, install, resolve, target_platform};
use nu_mcp_installer::output::{Resolution, dry_run_text, write_stderr_line};
use nu_mcp_installer::release::select_manifest;
use std::io::Write;

use install_flow::{determine_bin_dir, lock_destination, report_success, warn_if_nushell_missing};

fn main() {
    let cli = Cli::parse();
    let args = cli.install_args();
    logging::init_logging(args.verbosity, args.quiet);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Some(Command::Resolve(args)) => run_resolve(args, stdout),
        Some(Command::Install(_)) | None => {
            let dirs = SystemBaseDirs::new();
            run_install(
                cli.install_args(),
                dirs.as_ref().map(|d| d as &dyn BaseDirs),
                stderr,
            )
        }
    }
}

/// Prints the manifest entry for the requested platform to stdout.
fn run_resolve(args: &ResolveArgs, stdout: &mut dyn Write) -> Result<()> {
    let (manifest, platform) = select_target(&args.target)?;
    let entry = resolve(&manifest, platform)?;
    let resolution = Resolution::new(manifest.version(), platform, entry);

    let text = if args.json {
        resolution.to_json().map_err(std::io::Error::from)?
    } else {
        resolution.display_text()
    };
    writeln!(stdout, "{text}")?;
    Ok(())
}

/// Downloads, verifies, and installs nu-mcp.
fn run_install(
    args: &InstallArgs,
    dirs: Option<&dyn BaseDirs>,
    stderr: &mut dyn Write,
) -> Result<()> {
    // Step 1: Select the release and platform
    let (manifest, platform) = select_target(&args.target)?;
    let entry = resolve(&manifest, platform)?;
    let dest_dir = determine_bin_dir(args.bin_dir.clone(), dirs)?;

    if args.dry_run {
        let resolution = Resolution::new(manifest.version(), platform, entry);
        write_stderr_line(stderr, dry_run_text(&resolution, &dest_dir));
        return Ok(());
    }

    // Step 2: Serialise with other installers targeting the same directory
    let _lock = lock_destination(args, &dest_dir)?;

    // Step 3: Fetch, verify, extract, and place the executable
    let config = InstallConfig {
        platform,
        dest_dir: &dest_dir,
        quiet: args.quiet,
    };
    let result = install(&manifest, &config, args.timeout(), stderr)?;
    report_success(&result, &dest_dir, args.quiet, stderr);

    // Step 4: Check the runtime dependency
    if !args.skip_deps {
        warn_if_nushell_missing(&SystemCommandExecutor, args.quiet, stderr);
    }

    Ok(())
}

/// Loads the manifest and settles the platform from CLI overrides.
fn select_target(target: &TargetArgs) -> Result<(ReleaseManifest, PlatformKey)> {
    let manifest = select_manifest(target.manifest.as_deref())?;
    let platform = target_platform(target.os, target.arch)?;
    Ok((manifest, platform))
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("failed with {:?}", err.kind());
            write_stderr_line(stderr, format!("error: {err}"));
            if err.kind().is_retryable() {
                write_stderr_line(
                    stderr,
                    "note: this may be a temporary network problem; try again",
                );
            }
            err.kind().exit_code()
        }
    }
}
