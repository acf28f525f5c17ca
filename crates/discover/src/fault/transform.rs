//! Selective corruption of successful responses.
//!
//! A transformed response simulates a misbehaving backend while the
//! transport itself still reports success. Corruption decisions are
//! seeded from `(path, stable item id, mode)` through the deterministic
//! hash in [`super::hash`], so the same element is always judged the
//! same way for a fixed response shape.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::config::{FaultConfig, FaultMode, FaultPick, FaultTargets};
use super::hash::rand01;

static DETAIL_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(movie|tv)/[0-9]+(/credits|/videos)?$").unwrap());

/// Endpoint category a request path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTarget {
    Trending,
    NowPlaying,
    Upcoming,
    PopularTv,
    Search,
    Discover,
    Detail,
    Genres,
}

/// Routes a request path to its endpoint category, `None` when the path
/// is not a corruption candidate at all.
pub fn target_from_path(path: &str) -> Option<FaultTarget> {
    if path.starts_with("/trending/movie") {
        return Some(FaultTarget::Trending);
    }
    if path.starts_with("/movie/now_playing") {
        return Some(FaultTarget::NowPlaying);
    }
    if path.starts_with("/movie/upcoming") {
        return Some(FaultTarget::Upcoming);
    }
    if path.starts_with("/tv/popular") {
        return Some(FaultTarget::PopularTv);
    }
    if path.starts_with("/search/movie") {
        return Some(FaultTarget::Search);
    }
    if path.starts_with("/discover/movie") || path.starts_with("/discover/tv") {
        return Some(FaultTarget::Discover);
    }
    if path.starts_with("/genre/movie/list") || path.starts_with("/genre/tv/list") {
        return Some(FaultTarget::Genres);
    }
    if DETAIL_PATH.is_match(path) {
        return Some(FaultTarget::Detail);
    }
    None
}

impl FaultTargets {
    /// Whether the category's opt-in flag is set.
    pub fn allows(&self, target: FaultTarget) -> bool {
        match target {
            FaultTarget::Trending => self.trending,
            FaultTarget::NowPlaying => self.now_playing,
            FaultTarget::Upcoming => self.upcoming,
            FaultTarget::PopularTv => self.popular_tv,
            FaultTarget::Search => self.search,
            FaultTarget::Discover => self.discover,
            FaultTarget::Detail => self.detail,
            FaultTarget::Genres => self.genres,
        }
    }
}

/// Per-item corruption decision. Deterministic for a fixed seed.
pub fn should_corrupt(seed: &str, config: &FaultConfig) -> bool {
    match config.pick {
        FaultPick::All => true,
        FaultPick::Random => rand01(seed) < config.rate,
    }
}

fn corrupt_record(mode: FaultMode, record: &Value) -> Value {
    let Some(obj) = record.as_object() else {
        return record.clone();
    };
    let mut next: Map<String, Value> = obj.clone();
    match mode {
        FaultMode::Off => {}
        FaultMode::Soft => {
            // Type-safe but visibly wrong: blank display fields, zeroed
            // rating, empty genre list.
            next.insert("title".into(), json!(""));
            next.insert("name".into(), json!(""));
            next.insert("poster_path".into(), json!(""));
            next.insert("backdrop_path".into(), json!(""));
            next.insert("overview".into(), json!(""));
            next.insert("vote_average".into(), json!(0));
            next.insert("genre_ids".into(), json!([]));
        }
        FaultMode::Hard => {
            // Deliberate shape violations for defensive-parsing paths.
            next.remove("id");
            next.insert("title".into(), Value::Null);
            next.insert("name".into(), Value::Null);
            next.insert("poster_path".into(), json!(123));
            next.insert("backdrop_path".into(), json!(123));
            next.insert("vote_average".into(), json!("oops"));
            next.insert("genre_ids".into(), json!("not-an-array"));
        }
    }
    Value::Object(next)
}

fn corrupt_genre(mode: FaultMode, genre: &Value) -> Value {
    let Some(obj) = genre.as_object() else {
        return genre.clone();
    };
    let mut next = obj.clone();
    match mode {
        FaultMode::Off => {}
        FaultMode::Soft => {
            next.insert("name".into(), json!(""));
        }
        FaultMode::Hard => {
            next.remove("id");
            next.insert("name".into(), Value::Null);
        }
    }
    Value::Object(next)
}

fn stable_item_id(item: &Value, index: usize) -> String {
    match item.get("id").and_then(Value::as_i64) {
        Some(id) => id.to_string(),
        None => index.to_string(),
    }
}

/// Applies the configured corruption policy to a successful payload.
/// Pure function of its inputs; a no-op unless the mode is on and the
/// path's category is targeted.
pub fn transform(path: &str, payload: Value, config: &FaultConfig) -> Value {
    if config.mode == FaultMode::Off {
        return payload;
    }
    let Some(target) = target_from_path(path) else {
        return payload;
    };
    if !config.targets.allows(target) {
        return payload;
    }

    let mode = config.mode;
    let mut obj = match payload {
        Value::Object(obj) => obj,
        other => return other,
    };

    debug!(path, %mode, ?target, "fault-injecting response");

    if matches!(obj.get("results"), Some(Value::Array(_))) {
        if let Some(Value::Array(results)) = obj.get_mut("results") {
            for (idx, item) in results.iter_mut().enumerate() {
                let seed = format!("{path}|{}|{mode}", stable_item_id(item, idx));
                if should_corrupt(&seed, config) {
                    *item = corrupt_record(mode, item);
                }
            }
        }
        return Value::Object(obj);
    }

    if matches!(obj.get("genres"), Some(Value::Array(_))) {
        if let Some(Value::Array(genres)) = obj.get_mut("genres") {
            for (idx, genre) in genres.iter_mut().enumerate() {
                let seed = format!("{path}|genre|{}|{mode}", stable_item_id(genre, idx));
                if should_corrupt(&seed, config) {
                    *genre = corrupt_genre(mode, genre);
                }
            }
        }
        return Value::Object(obj);
    }

    let seed = format!("{path}|object|{mode}");
    if should_corrupt(&seed, config) {
        corrupt_record(mode, &Value::Object(obj))
    } else {
        Value::Object(obj)
    }
}
