//! Discovery filter values and their canonical change-detection signature.

use serde::{Deserialize, Serialize};

/// Media kind a discover query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Display-name field of a raw record for this kind.
    pub(crate) fn title_key(self) -> &'static str {
        match self {
            MediaKind::Movie => "title",
            MediaKind::Tv => "name",
        }
    }
}

/// Upstream sort key. The string forms are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_average.asc")]
    VoteAverageAsc,
    #[serde(rename = "primary_release_date.desc")]
    PrimaryReleaseDateDesc,
    #[serde(rename = "primary_release_date.asc")]
    PrimaryReleaseDateAsc,
    #[serde(rename = "original_title.asc")]
    OriginalTitleAsc,
    #[serde(rename = "original_title.desc")]
    OriginalTitleDesc,
    #[serde(rename = "first_air_date.desc")]
    FirstAirDateDesc,
    #[serde(rename = "first_air_date.asc")]
    FirstAirDateAsc,
    #[serde(rename = "name.asc")]
    NameAsc,
    #[serde(rename = "name.desc")]
    NameDesc,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::PopularityDesc => "popularity.desc",
            SortBy::PopularityAsc => "popularity.asc",
            SortBy::VoteAverageDesc => "vote_average.desc",
            SortBy::VoteAverageAsc => "vote_average.asc",
            SortBy::PrimaryReleaseDateDesc => "primary_release_date.desc",
            SortBy::PrimaryReleaseDateAsc => "primary_release_date.asc",
            SortBy::OriginalTitleAsc => "original_title.asc",
            SortBy::OriginalTitleDesc => "original_title.desc",
            SortBy::FirstAirDateDesc => "first_air_date.desc",
            SortBy::FirstAirDateAsc => "first_air_date.asc",
            SortBy::NameAsc => "name.asc",
            SortBy::NameDesc => "name.desc",
        }
    }
}

/// Immutable discover query value. A new value replaces the old one
/// wholesale; nothing ever partially mutates a filter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverFilters {
    pub media_kind: MediaKind,
    /// Free-text keywords, resolved to upstream ids before querying.
    pub keywords: Vec<String>,
    pub sort_by: SortBy,
    pub genre_ids: Vec<i64>,
    /// ISO date bounds; an empty string means unconstrained.
    pub release_from: String,
    pub release_to: String,
    /// Original-language code; empty means unconstrained.
    pub original_language: String,
    /// Rating window, domain [0, 10].
    pub rating_min: f64,
    pub rating_max: f64,
    /// Runtime window in minutes, domain [0, 300]. Movie-only.
    pub runtime_min: u32,
    pub runtime_max: u32,
}

impl Default for DiscoverFilters {
    fn default() -> Self {
        Self {
            media_kind: MediaKind::Movie,
            keywords: Vec::new(),
            sort_by: SortBy::PopularityDesc,
            genre_ids: Vec::new(),
            release_from: String::new(),
            release_to: String::new(),
            original_language: String::new(),
            rating_min: 0.0,
            rating_max: 10.0,
            runtime_min: 0,
            runtime_max: 300,
        }
    }
}

/// Canonical form serialized for the signature. Key order is the struct
/// field order, fixed at compile time rather than left to a map's
/// iteration order.
#[derive(Serialize)]
struct CanonicalFilters<'a> {
    media_kind: &'static str,
    keywords: Vec<&'a str>,
    sort_by: &'static str,
    genre_ids: Vec<i64>,
    release_from: &'a str,
    release_to: &'a str,
    original_language: &'a str,
    rating_min: f64,
    rating_max: f64,
    runtime_min: u32,
    runtime_max: u32,
}

impl DiscoverFilters {
    /// Order-independent comparison key: semantically equivalent filter
    /// values (array-order or whitespace differences only) produce an
    /// identical string. Equality is the only operation ever performed
    /// on a signature.
    pub fn signature(&self) -> String {
        let mut keywords: Vec<&str> = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort_unstable();
        keywords.dedup();

        let mut genre_ids = self.genre_ids.clone();
        genre_ids.sort_unstable();

        let canonical = CanonicalFilters {
            media_kind: self.media_kind.as_str(),
            keywords,
            sort_by: self.sort_by.as_str(),
            genre_ids,
            release_from: &self.release_from,
            release_to: &self.release_to,
            original_language: &self.original_language,
            rating_min: self.rating_min,
            rating_max: self.rating_max,
            runtime_min: self.runtime_min,
            runtime_max: self.runtime_max,
        };
        serde_json::to_string(&canonical).expect("canonical filter form always serializes")
    }
}
