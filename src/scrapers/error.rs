use crate::models::Site;
use thiserror::Error;

/// Failure to retrieve a page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{kind}")]
    Transport { kind: String },

    #[error("HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Status(status.as_u16());
        }

        let kind = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_body() || err.is_decode() {
            "body"
        } else {
            "request"
        };

        FetchError::Transport { kind: kind.to_string() }
    }
}

/// Per-URL parse failure. The display text is what the user sees.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown url {url}")]
    UnknownSource { url: String },

    #[error("{}: {url} unavailable, {reason}", .site.label())]
    SourceUnavailable { site: Site, url: String, reason: String },

    #[error("{}: {url} has an unreadable price \"{text}\"", .site.label())]
    MalformedPrice { site: Site, url: String, text: String },
}
