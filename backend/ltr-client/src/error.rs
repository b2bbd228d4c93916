use elasticsearch::http::transport::BuildError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LtrError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("resource not found at {path}: {body}")]
    NotFound { path: String, body: Value },
    #[error("remote error (HTTP {status}): {body}")]
    Remote { status: u16, body: Value },
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LtrError {
    /// HTTP status of the server response that produced this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LtrError::NotFound { .. } => Some(404),
            LtrError::Remote { status, .. } => Some(*status),
            LtrError::Transport(err) => err.status_code().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LtrError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, LtrError>;
