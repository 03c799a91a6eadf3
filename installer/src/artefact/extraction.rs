//! Executable extraction from release archives.
//!
//! Release archives are gzip- or zstd-compressed tarballs holding the
//! executable at their root. Only that one entry is unpacked; every entry
//! path is still checked so a crafted archive cannot write outside the
//! extraction directory.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Compression wrapped around the tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tgz` / `.tar.gz`
    TarGz,
    /// `.tar.zst` / `.tzst`
    TarZst,
}

impl ArchiveFormat {
    /// Infer the format from an archive file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::artefact::extraction::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_file_name("nu-mcp-0.3.8-x86_64-linux.tgz"),
    ///            Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_file_name("nu-mcp.zip"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        if lowered.ends_with(".tgz") || lowered.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else if lowered.ends_with(".tar.zst") || lowered.ends_with(".tzst") {
            Some(Self::TarZst)
        } else {
            None
        }
    }

    /// Recognise the format from the leading bytes of an archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use nu_mcp_installer::artefact::extraction::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_magic(&[0x1f, 0x8b, 0x08, 0x00]),
    ///            Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_magic(b"PK\x03\x04"), None);
    /// ```
    #[must_use]
    pub fn from_magic(header: &[u8]) -> Option<Self> {
        if header.starts_with(&GZIP_MAGIC) {
            Some(Self::TarGz)
        } else if header.starts_with(&ZSTD_MAGIC) {
            Some(Self::TarZst)
        } else {
            None
        }
    }

    /// Determine the format of the archive at `path`.
    ///
    /// The leading bytes decide; `name_hint` (usually the download file
    /// name) is consulted only when they are not recognised.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the archive cannot be read.
    pub fn detect(path: &Path, name_hint: Option<&str>) -> std::io::Result<Option<Self>> {
        let mut header = Vec::with_capacity(ZSTD_MAGIC.len());
        File::open(path)?
            .take(ZSTD_MAGIC.len() as u64)
            .read_to_end(&mut header)?;
        Ok(Self::from_magic(&header).or_else(|| name_hint.and_then(Self::from_file_name)))
    }

    fn decoder(self, file: File) -> std::io::Result<Box<dyn Read>> {
        let reader = BufReader::new(file);
        Ok(match self {
            Self::TarGz => Box::new(flate2::read::GzDecoder::new(reader)),
            Self::TarZst => Box::new(zstd::Decoder::with_buffer(reader)?),
        })
    }
}

/// Trait for extracting the executable from an archive, enabling test
/// mocking.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::extraction::TarExtractor;
///
/// let extractor = TarExtractor;
/// // Use extractor.extract_binary(archive, format, "nu-mcp", dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait BinaryExtractor {
    /// Unpack the root entry named `binary_name` from the archive at
    /// `archive_path` into `dest_dir`, returning the unpacked file path.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::MissingBinary`] when the archive has no such
    /// entry, [`ExtractionError::PathTraversal`] for entries escaping the
    /// destination, [`ExtractionError::NotAFile`] when the entry is not a
    /// regular file, and [`ExtractionError::Io`] on decode or I/O failures.
    fn extract_binary(
        &self,
        archive_path: &Path,
        format: ArchiveFormat,
        binary_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The archive could not be decoded or the entry could not be written.
    #[error("corrupt or unreadable archive: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive does not contain the expected executable at its root.
    #[error("archive does not contain `{binary_name}` at its root")]
    MissingBinary {
        /// The executable name that was looked for.
        binary_name: String,
    },

    /// The expected entry exists but is not a regular file.
    #[error("archive entry `{binary_name}` is not a regular file")]
    NotAFile {
        /// The executable name that was looked for.
        binary_name: String,
    },
}

/// Default extractor using the `tar`, `flate2`, and `zstd` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarExtractor;

impl BinaryExtractor for TarExtractor {
    fn extract_binary(
        &self,
        archive_path: &Path,
        format: ArchiveFormat,
        binary_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ExtractionError> {
        let file = File::open(archive_path)?;
        let mut archive = tar::Archive::new(format.decoder(file)?);

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            let entry_path = entry.path()?.into_owned();
            validate_entry_path(&entry_path)?;

            if !is_root_entry(&entry_path, binary_name) {
                log::trace!("skipping archive entry {}", entry_path.display());
                continue;
            }
            if !entry.header().entry_type().is_file() {
                return Err(ExtractionError::NotAFile {
                    binary_name: binary_name.to_owned(),
                });
            }

            let dest_path = dest_dir.join(binary_name);
            entry.unpack(&dest_path)?;
            log::debug!("extracted {} to {}", entry_path.display(), dest_path.display());
            return Ok(dest_path);
        }

        Err(ExtractionError::MissingBinary {
            binary_name: binary_name.to_owned(),
        })
    }
}

/// Whether `path` names `binary_name` directly at the archive root,
/// allowing a leading `./`.
fn is_root_entry(path: &Path, binary_name: &str) -> bool {
    let mut normal = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir));
    matches!(
        (normal.next(), normal.next()),
        (Some(Component::Normal(name)), None) if name == binary_name
    )
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
