//! HTTPS download URL newtype.
//!
//! URLs are parsed with the `url` crate; only `https` URLs with a host and
//! no whitespace are accepted. Artefacts are integrity-checked after
//! download, but a plain-HTTP source is still refused at manifest
//! construction time.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const HTTPS_SCHEME: &str = "https";

/// A validated HTTPS download URL.
///
/// # Examples
///
/// ```
/// use nu_mcp_installer::artefact::url::ArtefactUrl;
///
/// let url: ArtefactUrl = "https://example.com/releases/nu-mcp.tgz"
///     .try_into()
///     .expect("valid URL");
/// assert_eq!(url.file_name(), Some("nu-mcp.tgz"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtefactUrl(Url);

impl ArtefactUrl {
    /// Return the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Return the host portion of the URL (without port or userinfo).
    #[must_use]
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Return the last non-empty path segment.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0
            .path_segments()?
            .rfind(|segment| !segment.is_empty())
    }
}

impl TryFrom<&str> for ArtefactUrl {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        let invalid = |reason: String| ArtefactError::InvalidUrl {
            value: value.to_owned(),
            reason,
        };
        if value.is_empty() {
            return Err(invalid("URL must not be empty".to_owned()));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(invalid("URL must not contain whitespace".to_owned()));
        }
        let url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
        if url.scheme() != HTTPS_SCHEME {
            return Err(invalid("only https:// URLs are accepted".to_owned()));
        }
        if url.host().is_none() {
            return Err(invalid("URL has no host".to_owned()));
        }
        Ok(Self(url))
    }
}

impl TryFrom<String> for ArtefactUrl {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl From<ArtefactUrl> for String {
    fn from(value: ArtefactUrl) -> Self {
        value.0.into()
    }
}

impl AsRef<str> for ArtefactUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ArtefactUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
