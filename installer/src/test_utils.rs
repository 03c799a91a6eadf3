//! Shared test utilities for the installer crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::artefact::manifest::{PlatformEntry, ReleaseManifest};
use crate::artefact::platform::PlatformKey;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::deps::CommandExecutor;
use crate::error::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// A single entry to place in a test archive.
///
/// Every entry is written with mode `0o755`.
#[derive(Debug, Clone)]
pub struct ArchiveEntry<'a> {
    path: &'a str,
    contents: &'a [u8],
    directory: bool,
}

impl<'a> ArchiveEntry<'a> {
    /// A regular file.
    pub fn file(path: &'a str, contents: &'a [u8]) -> Self {
        Self {
            path,
            contents,
            directory: false,
        }
    }

    /// An empty directory entry.
    pub fn directory(path: &'a str) -> Self {
        Self {
            path,
            contents: &[],
            directory: true,
        }
    }
}

fn append_entries<W: Write>(builder: &mut tar::Builder<W>, entries: &[ArchiveEntry<'_>]) {
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(if entry.directory {
            tar::EntryType::Directory
        } else {
            tar::EntryType::Regular
        });
        header.set_mode(0o755);
        header.set_size(entry.contents.len() as u64);
        header.set_cksum();
        builder
            .append_data(&mut header, entry.path, entry.contents)
            .expect("append archive entry");
    }
}

/// Build a gzip-compressed tarball in memory.
pub fn tar_gz_bytes(entries: &[ArchiveEntry<'_>]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_entries(&mut builder, entries);
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("gzip finish")
}

/// Write a gzip-compressed tarball to `path`.
pub fn write_tar_gz(path: &Path, entries: &[ArchiveEntry<'_>]) {
    std::fs::write(path, tar_gz_bytes(entries)).expect("write tar.gz");
}

/// Write a zstd-compressed tarball to `path`.
pub fn write_tar_zst(path: &Path, entries: &[ArchiveEntry<'_>]) {
    let output = std::fs::File::create(path).expect("create tar.zst");
    let encoder = zstd::Encoder::new(output, 0).expect("zstd encoder");
    let mut builder = tar::Builder::new(encoder);
    append_entries(&mut builder, entries);
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("zstd finish");
}

/// Return the lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of_bytes(bytes).into_inner()
}

/// Build a single-platform manifest whose archive is served from
/// `https://downloads.test/<file_name>`.
pub fn single_platform_manifest(
    version: &str,
    platform: PlatformKey,
    file_name: &str,
    sha256: &str,
) -> ReleaseManifest {
    ReleaseManifest::new(
        version.try_into().expect("valid version"),
        vec![PlatformEntry {
            os: platform.os,
            arch: platform.arch,
            url: format!("https://downloads.test/{file_name}")
                .try_into()
                .expect("valid URL"),
            sha256: sha256.try_into().expect("valid digest"),
        }],
    )
    .expect("valid manifest")
}

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Creates a successful command `Output` with the given stdout.
pub fn success_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "nu").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.cmd, cmd);
        assert_eq!(call.args.as_slice(), args);

        call.result
    }
}
