use std::fmt;

/// Result type for inspector-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A session-id did not match the required pattern
    InvalidSessionId(String),
    /// A span-id or trace-id was not the expected hex length
    InvalidId { kind: &'static str, value: String },
    /// serde_json (de)serialization failed
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSessionId(id) => write!(f, "invalid session id: {id:?}"),
            Error::InvalidId { kind, value } => write!(f, "invalid {kind}: {value:?}"),
            Error::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::InvalidSessionId(_) | Error::InvalidId { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
