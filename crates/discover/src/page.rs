//! One-page requests against the discover endpoint.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::DiscoverError;
use crate::filters::{DiscoverFilters, MediaKind};
use crate::transport::{QueryParams, Transport};

/// Upstream paged envelope, parsed defensively: any absent or mistyped
/// field defaults, and records stay raw until mapping validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagedResults {
    pub page: u32,
    pub results: Vec<Value>,
    pub total_pages: u32,
    pub total_results: u32,
}

pub(crate) fn parse_paged(payload: &Value) -> PagedResults {
    let field = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };
    PagedResults {
        page: field("page"),
        results: payload
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        total_pages: field("total_pages"),
        total_results: field("total_results"),
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Deterministic outbound parameter set for one discover page. Rating
/// bounds are clamped into [0, 10], empty bounds are omitted rather
/// than sent as empty strings, and runtime bounds apply to movies only
/// and only when they constrain anything.
pub fn build_discover_params(
    filters: &DiscoverFilters,
    page: u32,
    keyword_ids: &[i64],
) -> QueryParams {
    let mut params: QueryParams = vec![
        ("include_adult".into(), "false".into()),
        ("page".into(), page.to_string()),
        ("sort_by".into(), filters.sort_by.as_str().into()),
    ];

    if !filters.original_language.is_empty() {
        params.push(("with_original_language".into(), filters.original_language.clone()));
    }
    if filters.rating_min.is_finite() {
        let min = filters.rating_min.clamp(0.0, 10.0);
        params.push(("vote_average.gte".into(), min.to_string()));
    }
    if filters.rating_max.is_finite() {
        let max = filters.rating_max.clamp(0.0, 10.0);
        params.push(("vote_average.lte".into(), max.to_string()));
    }
    if !filters.genre_ids.is_empty() {
        params.push(("with_genres".into(), join_ids(&filters.genre_ids)));
    }
    if !keyword_ids.is_empty() {
        params.push(("with_keywords".into(), join_ids(keyword_ids)));
    }

    match filters.media_kind {
        MediaKind::Movie => {
            if !filters.release_from.is_empty() {
                params.push(("primary_release_date.gte".into(), filters.release_from.clone()));
            }
            if !filters.release_to.is_empty() {
                params.push(("primary_release_date.lte".into(), filters.release_to.clone()));
            }
            if filters.runtime_min > 0 {
                params.push(("with_runtime.gte".into(), filters.runtime_min.to_string()));
            }
            if filters.runtime_max > 0 && filters.runtime_max < 300 {
                params.push(("with_runtime.lte".into(), filters.runtime_max.to_string()));
            }
        }
        MediaKind::Tv => {
            if !filters.release_from.is_empty() {
                params.push(("first_air_date.gte".into(), filters.release_from.clone()));
            }
            if !filters.release_to.is_empty() {
                params.push(("first_air_date.lte".into(), filters.release_to.clone()));
            }
        }
    }

    params
}

/// Fetches one discover page. Transport failures propagate uncaught.
pub async fn fetch_page(
    transport: &dyn Transport,
    filters: &DiscoverFilters,
    page: u32,
    keyword_ids: &[i64],
    token: &CancellationToken,
) -> Result<PagedResults, DiscoverError> {
    let path = match filters.media_kind {
        MediaKind::Movie => "/discover/movie",
        MediaKind::Tv => "/discover/tv",
    };
    let params = build_discover_params(filters, page, keyword_ids);
    debug!(path, page, "fetching discover page");
    let payload = transport.get(path, &params, token).await?;
    Ok(parse_paged(&payload))
}
