//! Fault-injection configuration.
//!
//! The configuration lives in ephemeral session-scoped storage as a JSON
//! string (see [`crate::fault::store`]). A corrupted or missing stored
//! value must never break the feature, only disable injection, so parsing
//! is done field by field with per-field fallback to the default instead
//! of an all-or-nothing deserialize.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Corruption severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultMode {
    /// Injection disabled.
    #[default]
    Off,
    /// Type-preserving but semantically wrong replacements.
    Soft,
    /// Type-violating replacements.
    Hard,
}

impl fmt::Display for FaultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultMode::Off => "off",
            FaultMode::Soft => "soft",
            FaultMode::Hard => "hard",
        };
        f.write_str(s)
    }
}

/// Item selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPick {
    /// Every item in a targeted response is corrupted.
    #[default]
    All,
    /// An item is corrupted iff `rand01(seed) < rate`.
    Random,
}

/// Per-endpoint-category opt-in flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaultTargets {
    pub trending: bool,
    pub now_playing: bool,
    pub upcoming: bool,
    pub popular_tv: bool,
    pub search: bool,
    pub discover: bool,
    pub detail: bool,
    pub genres: bool,
}

impl Default for FaultTargets {
    fn default() -> Self {
        Self {
            trending: true,
            now_playing: true,
            upcoming: true,
            popular_tv: true,
            search: true,
            discover: true,
            detail: true,
            genres: false,
        }
    }
}

/// Forced HTTP failure, exercised before the request is even sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HttpSim {
    pub enabled: bool,
    /// One of 401, 404, 429, 500.
    pub status: u16,
}

impl Default for HttpSim {
    fn default() -> Self {
        Self {
            enabled: false,
            status: 401,
        }
    }
}

/// Full fault-injection configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultConfig {
    pub enabled: bool,
    /// Artificial latency before each request, milliseconds, clamped to
    /// [0, 30000]. Cancellable through the request's token.
    pub delay_ms: u64,
    pub http_sim: HttpSim,
    pub mode: FaultMode,
    pub pick: FaultPick,
    /// Corruption probability under [`FaultPick::Random`], in [0, 1].
    pub rate: f64,
    pub targets: FaultTargets,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 0,
            http_sim: HttpSim::default(),
            mode: FaultMode::Off,
            pick: FaultPick::All,
            rate: 0.35,
            targets: FaultTargets::default(),
        }
    }
}

impl FaultConfig {
    /// True when the configuration actually mutates responses.
    pub fn is_active(&self) -> bool {
        self.enabled && self.mode != FaultMode::Off
    }

    /// Parses a stored raw value. `None`, non-JSON, or a non-object all
    /// degrade to the off default; individual bad fields fall back on
    /// their own.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    /// Field-by-field normalization of an untrusted JSON value.
    pub fn from_value(value: &Value) -> Self {
        let d = Self::default();
        let Some(obj) = value.as_object() else {
            return d;
        };

        let mode = match obj.get("mode").and_then(Value::as_str) {
            Some("soft") => FaultMode::Soft,
            Some("hard") => FaultMode::Hard,
            Some("off") => FaultMode::Off,
            _ => d.mode,
        };
        let pick = match obj.get("pick").and_then(Value::as_str) {
            Some("all") => FaultPick::All,
            Some("random") => FaultPick::Random,
            _ => d.pick,
        };
        let status = match obj.get("http_sim").and_then(|h| h.get("status")).and_then(Value::as_u64) {
            Some(s @ (401 | 404 | 429 | 500)) => s as u16,
            _ => d.http_sim.status,
        };

        Self {
            enabled: bool_field(obj.get("enabled"), d.enabled),
            delay_ms: clamp_u64(obj.get("delay_ms"), 0, 30_000, d.delay_ms),
            http_sim: HttpSim {
                enabled: bool_field(
                    obj.get("http_sim").and_then(|h| h.get("enabled")),
                    d.http_sim.enabled,
                ),
                status,
            },
            mode,
            pick,
            rate: clamp_f64(obj.get("rate"), 0.0, 1.0, d.rate),
            targets: normalize_targets(obj.get("targets")),
        }
    }
}

fn bool_field(v: Option<&Value>, fallback: bool) -> bool {
    v.and_then(Value::as_bool).unwrap_or(fallback)
}

fn clamp_f64(v: Option<&Value>, min: f64, max: f64, fallback: f64) -> f64 {
    match v.and_then(Value::as_f64) {
        Some(n) if n.is_finite() => n.clamp(min, max),
        _ => fallback,
    }
}

fn clamp_u64(v: Option<&Value>, min: u64, max: u64, fallback: u64) -> u64 {
    match v.and_then(Value::as_u64) {
        Some(n) => n.clamp(min, max),
        None => fallback,
    }
}

fn normalize_targets(v: Option<&Value>) -> FaultTargets {
    let d = FaultTargets::default();
    let Some(obj) = v.and_then(Value::as_object) else {
        return d;
    };
    let get = |key: &str, fallback: bool| bool_field(obj.get(key), fallback);
    FaultTargets {
        trending: get("trending", d.trending),
        now_playing: get("now_playing", d.now_playing),
        upcoming: get("upcoming", d.upcoming),
        popular_tv: get("popular_tv", d.popular_tv),
        search: get("search", d.search),
        discover: get("discover", d.discover),
        detail: get("detail", d.detail),
        genres: get("genres", d.genres),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_raw_is_off() {
        let cfg = FaultConfig::from_raw(None);
        assert_eq!(cfg, FaultConfig::default());
        assert!(!cfg.is_active());
    }

    #[test]
    fn malformed_raw_is_off() {
        for raw in ["not json at all", "[1,2,3]", "42", "\"soft\""] {
            assert_eq!(FaultConfig::from_raw(Some(raw)), FaultConfig::default());
        }
    }

    #[test]
    fn partial_object_keeps_defaults_for_missing_fields() {
        let raw = json!({ "enabled": true, "mode": "soft" }).to_string();
        let cfg = FaultConfig::from_raw(Some(&raw));
        assert!(cfg.enabled);
        assert_eq!(cfg.mode, FaultMode::Soft);
        assert_eq!(cfg.pick, FaultPick::All);
        assert_eq!(cfg.rate, 0.35);
        assert!(cfg.targets.discover);
        assert!(!cfg.targets.genres);
    }

    #[test]
    fn bad_field_types_fall_back_individually() {
        let raw = json!({
            "enabled": "yes",
            "mode": "harder",
            "pick": "random",
            "rate": "0.9",
            "targets": { "discover": 1, "genres": true },
        })
        .to_string();
        let cfg = FaultConfig::from_raw(Some(&raw));
        assert!(!cfg.enabled);
        assert_eq!(cfg.mode, FaultMode::Off);
        assert_eq!(cfg.pick, FaultPick::Random);
        assert_eq!(cfg.rate, 0.35);
        assert!(cfg.targets.discover);
        assert!(cfg.targets.genres);
    }

    #[test]
    fn rate_and_delay_are_clamped() {
        let raw = json!({ "rate": 3.5, "delay_ms": 120_000 }).to_string();
        let cfg = FaultConfig::from_raw(Some(&raw));
        assert_eq!(cfg.rate, 1.0);
        assert_eq!(cfg.delay_ms, 30_000);
    }

    #[test]
    fn http_sim_status_must_be_known() {
        let raw = json!({ "http_sim": { "enabled": true, "status": 418 } }).to_string();
        let cfg = FaultConfig::from_raw(Some(&raw));
        assert!(cfg.http_sim.enabled);
        assert_eq!(cfg.http_sim.status, 401);

        let raw = json!({ "http_sim": { "enabled": true, "status": 429 } }).to_string();
        assert_eq!(FaultConfig::from_raw(Some(&raw)).http_sim.status, 429);
    }

    #[test]
    fn serialized_config_round_trips_through_from_raw() {
        let mut cfg = FaultConfig::default();
        cfg.enabled = true;
        cfg.mode = FaultMode::Hard;
        cfg.pick = FaultPick::Random;
        cfg.rate = 0.8;
        cfg.targets.genres = true;
        let raw = serde_json::to_string(&cfg).unwrap();
        assert_eq!(FaultConfig::from_raw(Some(&raw)), cfg);
    }
}
