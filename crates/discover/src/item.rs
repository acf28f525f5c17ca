//! Normalization of raw discover records.
//!
//! Raw records arrive as untyped JSON and are validated field by field;
//! nothing downstream ever touches an unvalidated value. A record whose
//! display-name field does not hold a non-blank string is discarded —
//! that is the in-band signal of soft backend corruption, injected or
//! real.

use serde::Serialize;
use serde_json::Value;

use crate::filters::MediaKind;

/// Normalized search result delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMediaItem {
    pub id: i64,
    pub media_kind: MediaKind,
    /// Non-empty after mapping, always.
    pub title: String,
    pub poster_path: Option<String>,
    pub genre_ids: Vec<i64>,
    pub vote_average: f64,
}

/// Maps one raw record, `None` iff the record's `title` (movie) or
/// `name` (tv) field is absent, not a string, or blank after trimming.
/// Other fields default when absent or mistyped.
pub fn map_record(kind: MediaKind, record: &Value) -> Option<SearchMediaItem> {
    let title = record.get(kind.title_key())?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }

    Some(SearchMediaItem {
        id: record.get("id").and_then(Value::as_i64).unwrap_or_default(),
        media_kind: kind,
        title: title.to_string(),
        poster_path: record
            .get("poster_path")
            .and_then(Value::as_str)
            .map(str::to_string),
        genre_ids: record
            .get("genre_ids")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default(),
        vote_average: record
            .get("vote_average")
            .and_then(Value::as_f64)
            .unwrap_or_default(),
    })
}
