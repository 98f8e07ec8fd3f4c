use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse TOML input: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("the '{0}' format is not supported for this operation")]
    UnsupportedFormat(Format),

    #[error("invalid simulation input: {0}")]
    Invalid(String),
}

impl Error {
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::Invalid(details.into())
    }
}
