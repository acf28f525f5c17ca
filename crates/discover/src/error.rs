use reqwest::StatusCode;
use thiserror::Error;

/// Fixed user-facing message for a successful response whose records are
/// all unusable, kept distinct from transport failures so retry UX can
/// tell "backend is down" from "backend is misbehaving".
pub const BAD_DATA_MESSAGE: &str = "Something is wrong when load movie data.";

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("request cancelled")]
    Cancelled,

    #[error("TMDB request failed: {status}{}", .detail.as_deref().map(|d| format!(" - {d}")).unwrap_or_default())]
    HttpStatus {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("failed to parse TMDB response: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("{BAD_DATA_MESSAGE}")]
    BadData,
}

impl DiscoverError {
    pub fn http_status(status: StatusCode, detail: Option<String>) -> Self {
        let detail = detail.filter(|d| !d.trim().is_empty());
        Self::HttpStatus { status, detail }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
