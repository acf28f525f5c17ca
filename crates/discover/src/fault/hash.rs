//! Deterministic string hashing used to seed corruption decisions.
//!
//! Reproducibility is the entire point: a fault scenario must be
//! re-creatable from `(path, item id, mode)` alone, both for debugging
//! and for regression fixtures. No external entropy is ever mixed in.

/// DJB2-style rolling hash over UTF-16 code units with wrapping
/// 32-bit arithmetic.
pub fn hash_str(s: &str) -> u32 {
    let mut h: u32 = 5381;
    for unit in s.encode_utf16() {
        h = h.wrapping_mul(33) ^ u32::from(unit);
    }
    h
}

/// Maps a seed string onto `[0, 1)` with four decimal digits of
/// resolution, stable across calls and processes.
pub fn rand01(seed: &str) -> f64 {
    f64::from(hash_str(seed) % 10_000) / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_across_calls() {
        let inputs = ["", "a", "/discover/movie|7|hard", "日本語キーワード"];
        for s in inputs {
            assert_eq!(hash_str(s), hash_str(s));
        }
    }

    #[test]
    fn hash_distinguishes_inputs() {
        assert_ne!(hash_str("/discover/movie|7|soft"), hash_str("/discover/movie|7|hard"));
        assert_ne!(hash_str("/discover/movie|7|soft"), hash_str("/discover/movie|8|soft"));
    }

    #[test]
    fn empty_string_hashes_to_initial_state() {
        assert_eq!(hash_str(""), 5381);
    }

    #[test]
    fn rand01_stays_in_unit_interval() {
        for i in 0..1_000 {
            let v = rand01(&format!("/discover/movie|{i}|soft"));
            assert!((0.0..1.0).contains(&v), "rand01 out of range: {v}");
        }
    }

    #[test]
    fn rand01_is_deterministic() {
        assert_eq!(rand01("seed"), rand01("seed"));
    }
}
