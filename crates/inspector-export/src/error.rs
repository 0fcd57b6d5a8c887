use std::fmt;

/// Result type for inspector-export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the file span exporter.
#[derive(Debug)]
pub enum Error {
    /// IO operation failed in a way the caller must see (e.g. during
    /// `shutdown`, where a swallowed error would silently lose spans).
    Io(std::io::Error),
    /// serde_json serialization of a span failed.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
