//! Query boundary to the simulator's key-value configuration source.
//!
//! Parsing configuration files is the embedding simulator's job; the bridge
//! only consumes exact-key lookups, yes/no flags, and time literals. The
//! simulator builds a [`Config`] from whatever source it parsed and hands it
//! to the interface lifecycle hooks.

use crate::SimTime;
use std::collections::HashMap;

/// An immutable view of key-value configuration entries.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: HashMap<String, String>,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry. Keys are matched exactly, case-sensitive.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the key is present at all, regardless of its value.
    pub fn is_set(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Boolean lookup with yes/no normalization.
    ///
    /// Accepts `YES`/`TRUE`/`1` and `NO`/`FALSE`/`0` case-insensitively.
    /// Returns `None` when the key is absent or the value is not boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.to_ascii_uppercase().as_str() {
            "YES" | "TRUE" | "1" => Some(true),
            "NO" | "FALSE" | "0" => Some(false),
            _ => None,
        }
    }

    /// Time-literal lookup.
    ///
    /// Accepts a decimal number with an optional unit suffix: `NS`, `US`,
    /// `MS`, or `S` (case-insensitive). A bare number means seconds, matching
    /// the simulator's clock-literal convention. Returns `None` when absent
    /// or malformed.
    pub fn get_time(&self, key: &str) -> Option<SimTime> {
        let raw = self.get(key)?.trim();
        let upper = raw.to_ascii_uppercase();
        let (number, per_unit_ns) = if let Some(n) = upper.strip_suffix("NS") {
            (n, 1.0)
        } else if let Some(n) = upper.strip_suffix("US") {
            (n, 1e3)
        } else if let Some(n) = upper.strip_suffix("MS") {
            (n, 1e6)
        } else if let Some(n) = upper.strip_suffix('S') {
            (n, 1e9)
        } else {
            (upper.as_str(), 1e9)
        };
        let value: f64 = number.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        Some(SimTime::from_nanos((value * per_unit_ns).round() as i64))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Config {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config::from_iter([
            ("SOCKET-INTERFACE", "YES"),
            ("SOCKET-INTERFACE-PORT", "5132"),
            ("WARM-UP-TIME", "30S"),
            ("LOOKAHEAD", "250MS"),
            ("DEBUG", "maybe"),
        ])
    }

    #[test]
    fn test_exact_lookup() {
        let cfg = sample();
        assert_eq!(cfg.get("SOCKET-INTERFACE-PORT"), Some("5132"));
        assert!(cfg.is_set("DEBUG"));
        assert!(!cfg.is_set("socket-interface")); // case-sensitive keys
    }

    #[test]
    fn test_bool_normalization() {
        let mut cfg = sample();
        assert_eq!(cfg.get_bool("SOCKET-INTERFACE"), Some(true));
        cfg.set("A", "no").set("B", "0").set("C", "TrUe");
        assert_eq!(cfg.get_bool("A"), Some(false));
        assert_eq!(cfg.get_bool("B"), Some(false));
        assert_eq!(cfg.get_bool("C"), Some(true));
        assert_eq!(cfg.get_bool("DEBUG"), None);
        assert_eq!(cfg.get_bool("MISSING"), None);
    }

    #[test]
    fn test_time_literals() {
        let mut cfg = sample();
        assert_eq!(cfg.get_time("WARM-UP-TIME"), Some(SimTime::from_secs(30)));
        assert_eq!(cfg.get_time("LOOKAHEAD"), Some(SimTime::from_millis(250)));
        cfg.set("T1", "1.5").set("T2", "10US").set("T3", "50NS").set("T4", "-1S");
        assert_eq!(cfg.get_time("T1"), Some(SimTime::from_millis(1500)));
        assert_eq!(cfg.get_time("T2"), Some(SimTime::from_micros(10)));
        assert_eq!(cfg.get_time("T3"), Some(SimTime::from_nanos(50)));
        assert_eq!(cfg.get_time("T4"), None);
        assert_eq!(cfg.get_time("DEBUG"), None);
    }
}
