use shared::error::{ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Http,
    Transport,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiException),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid url '{raw}': {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(err) if err.requires_reauth() => ErrorCategory::Auth,
            Self::Api(_) => ErrorCategory::Http,
            Self::Transport { .. } | Self::Decode { .. } | Self::InvalidUrl { .. } => {
                ErrorCategory::Transport
            }
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Api(err) => err.code,
            _ => ErrorCode::Transport,
        }
    }
}
