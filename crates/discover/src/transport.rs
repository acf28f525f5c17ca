//! The HTTP seam the discovery engine talks through.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::DiscoverError;

/// Outbound query parameters, already reduced to the pairs that should
/// actually be sent — omitted parameters never appear here.
pub type QueryParams = Vec<(String, String)>;

/// Opaque GET capability against the upstream API. The production
/// implementation ([`crate::client::TmdbClient`]) resolves auth headers,
/// base URL, and the default language; tests script this trait directly.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one GET and returns the parsed JSON body. A cancelled
    /// token must surface as [`DiscoverError::Cancelled`], and any
    /// non-success status as [`DiscoverError::HttpStatus`].
    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        token: &CancellationToken,
    ) -> Result<Value, DiscoverError>;
}
