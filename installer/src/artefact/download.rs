//! Artefact download logic.
//!
//! Provides a trait-based abstraction for fetching release archives so the
//! install pipeline can be exercised without network access. The HTTP
//! implementation performs exactly one request per fetch; there is no
//! retry or resume.

use super::url::ArtefactUrl;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

/// Default network deadline for a single archive download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Trait for downloading artefact archives.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader::default();
/// // Use downloader.fetch(&url, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Download `url` into a new file at `dest`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server responds with an
    /// error status, or the file cannot be written.
    fn fetch(&self, url: &ArtefactUrl, dest: &Path) -> Result<u64, DownloadError>;
}

/// Errors arising from artefact download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The requested artefact was not found (HTTP 404).
    #[error("artefact not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The request failed before a response was received (DNS, TLS,
    /// connection reset, timeout).
    #[error("download failed for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader whose requests are bounded by `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_DOWNLOAD_TIMEOUT)
    }
}

impl ArtefactDownloader for HttpDownloader {
    fn fetch(&self, url: &ArtefactUrl, dest: &Path) -> Result<u64, DownloadError> {
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|e| map_ureq_error(url.as_str(), &e))?;
        let mut file = std::fs::File::create_new(dest)?;
        let written = copy_body(url.as_str(), &mut response.into_body().as_reader(), &mut file)?;
        file.flush()?;
        log::debug!("downloaded {written} bytes from {url}");
        Ok(written)
    }
}

/// Stream the response body into `writer`.
///
/// Read failures come from the network and map to
/// [`DownloadError::Transport`]; write failures are local and map to
/// [`DownloadError::Io`].
fn copy_body(
    url: &str,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<u64, DownloadError> {
    let mut buffer = vec![0_u8; COPY_BUFFER_SIZE];
    let mut written = 0_u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => return Ok(written),
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(DownloadError::Transport {
                    url: url.to_owned(),
                    reason: err.to_string(),
                });
            }
        };
        let chunk = buffer.get(..read).unwrap_or_default();
        writer.write_all(chunk)?;
        written += read as u64;
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
