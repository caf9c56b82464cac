//! Error handling

use std::path::{Path, PathBuf};

/// Broad classes of [GenerationError], for callers that care why it failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// The WebUI could not be reached, refused the request, or returned nothing usable
    Transport,
    /// The output directory tree could not be created
    Directory,
    /// The image bytes could not be decoded, encoded or written
    Persistence,
}

/// The one failure type [crate::requester::ImageRequester] hands back.
#[derive(Debug)]
pub enum GenerationError {
    /// Network error, non-2xx status or an unreadable response body
    Transport(String),
    /// The response carried an empty (or missing) image list
    NoImages,
    /// Creating the parent directory failed
    Directory {
        /// Directory we tried to create
        path: PathBuf,
        /// What went wrong
        message: String,
    },
    /// Decoding, encoding or writing the image failed
    Persistence {
        /// Where the image was going
        path: PathBuf,
        /// What went wrong
        message: String,
    },
}

impl GenerationError {
    /// Which class of failure this is.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) | Self::NoImages => FailureKind::Transport,
            Self::Directory { .. } => FailureKind::Directory,
            Self::Persistence { .. } => FailureKind::Persistence,
        }
    }

    pub(crate) fn directory(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Directory {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn persistence(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "Failed to generate image: {message}"),
            Self::NoImages => write!(f, "Failed to generate image: no images generated"),
            Self::Directory { path, message } => write!(
                f,
                "Failed to create directory for image {}: {message}",
                path.display()
            ),
            Self::Persistence { path, message } => {
                write!(f, "Failed to save image to {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

/// Errors raised while building a [crate::config::RequesterConfig].
#[derive(Debug)]
pub enum ConfigError {
    /// The base URL didn't parse
    InvalidUrl(String, url::ParseError),
    /// The base URL parsed but can't carry an API path (eg `mailto:`)
    UnsupportedUrl(String),
    /// The timeout wasn't a whole number of seconds
    InvalidTimeout(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(url, err) => write!(f, "Invalid WebUI URL {url:?}: {err}"),
            Self::UnsupportedUrl(url) => write!(f, "WebUI URL must be http or https: {url:?}"),
            Self::InvalidTimeout(value) => write!(f, "Invalid timeout {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}
