//! Free-text keyword resolution against the upstream lookup endpoint.

use futures::future::try_join_all;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::DiscoverError;
use crate::transport::Transport;

const KEYWORD_SEARCH_PATH: &str = "/search/keyword";

fn first_keyword_id(payload: &Value) -> Option<i64> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .and_then(|hit| hit.get("id"))
        .and_then(Value::as_i64)
}

/// Resolves free-text keywords to upstream identifiers, one lookup per
/// distinct keyword, issued concurrently. Output order follows input
/// order, not completion order; keywords with no hits are silently
/// dropped. Cancellation abandons the whole resolution — callers never
/// observe a partial result.
pub async fn resolve(
    transport: &dyn Transport,
    keywords: &[String],
    token: &CancellationToken,
) -> Result<Vec<i64>, DiscoverError> {
    let mut distinct: Vec<&str> = Vec::new();
    for keyword in keywords {
        let trimmed = keyword.trim();
        if !trimmed.is_empty() && !distinct.contains(&trimmed) {
            distinct.push(trimmed);
        }
    }
    if distinct.is_empty() {
        return Ok(Vec::new());
    }

    debug!(count = distinct.len(), "resolving keyword ids");

    let lookups = distinct.into_iter().map(|query| async move {
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        let payload = transport.get(KEYWORD_SEARCH_PATH, &params, token).await?;
        Ok::<Option<i64>, DiscoverError>(first_keyword_id(&payload))
    });

    let ids = try_join_all(lookups).await?;
    Ok(ids.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedTransport;
    use serde_json::json;

    fn keyword_hit(id: i64) -> Value {
        json!({ "page": 1, "results": [{ "id": id, "name": "kw" }], "total_pages": 1 })
    }

    fn keyword_miss() -> Value {
        json!({ "page": 1, "results": [], "total_pages": 1 })
    }

    #[tokio::test]
    async fn empty_input_issues_no_network_calls() {
        let transport = ScriptedTransport::new();
        let token = CancellationToken::new();

        let ids = resolve(&transport, &[], &token).await.unwrap();
        assert!(ids.is_empty());

        let ids = resolve(&transport, &[" ".to_string(), "".to_string()], &token)
            .await
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(transport.calls().len(), 0);
    }

    #[tokio::test]
    async fn resolves_in_input_order() {
        let transport = ScriptedTransport::new();
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_hit(101));
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_hit(202));
        let token = CancellationToken::new();

        let ids = resolve(&transport, &["hero".into(), "space".into()], &token)
            .await
            .unwrap();
        assert_eq!(ids, vec![101, 202]);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].param("query"), Some("hero"));
        assert_eq!(calls[1].param("query"), Some("space"));
        assert_eq!(calls[0].param("page"), Some("1"));
    }

    #[tokio::test]
    async fn unresolved_keywords_are_dropped_silently() {
        let transport = ScriptedTransport::new();
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_hit(101));
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_miss());
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_hit(303));
        let token = CancellationToken::new();

        let ids = resolve(
            &transport,
            &["hero".into(), "nonsense".into(), "space".into()],
            &token,
        )
        .await
        .unwrap();
        assert_eq!(ids, vec![101, 303]);
    }

    #[tokio::test]
    async fn duplicate_keywords_collapse_to_one_lookup() {
        let transport = ScriptedTransport::new();
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_hit(101));
        let token = CancellationToken::new();

        let ids = resolve(&transport, &["hero".into(), " hero ".into()], &token)
            .await
            .unwrap();
        assert_eq!(ids, vec![101]);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_abandons_the_whole_resolution() {
        let transport = ScriptedTransport::new();
        transport.push_ok(KEYWORD_SEARCH_PATH, keyword_hit(101));
        transport.push_err(KEYWORD_SEARCH_PATH, DiscoverError::Cancelled);
        let token = CancellationToken::new();

        let result = resolve(&transport, &["hero".into(), "space".into()], &token).await;
        assert!(matches!(result, Err(DiscoverError::Cancelled)));
    }

    #[tokio::test]
    async fn malformed_lookup_payloads_count_as_misses() {
        let transport = ScriptedTransport::new();
        transport.push_ok(KEYWORD_SEARCH_PATH, json!({ "results": "not-an-array" }));
        transport.push_ok(KEYWORD_SEARCH_PATH, json!("not even an object"));
        let token = CancellationToken::new();

        let ids = resolve(&transport, &["a".into(), "b".into()], &token)
            .await
            .unwrap();
        assert!(ids.is_empty());
    }
}
