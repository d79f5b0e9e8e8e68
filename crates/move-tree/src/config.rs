//! Navigator configuration from environment variables

use std::env;

#[derive(Clone, Debug)]
pub struct NavigatorConfig {
    /// Plies moved by one `backward()` / `forward()` call
    pub fast_step: usize,

    /// Let `prev()` leave a variation from its first ply
    pub climb_out_of_variations: bool,

    /// Maximum undo snapshots kept (unlimited when `None`)
    pub undo_limit: Option<usize>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            fast_step: 5,
            climb_out_of_variations: false,
            undo_limit: None,
        }
    }
}

impl NavigatorConfig {
    /// Load from `GAMEBOX_FAST_STEP`, `GAMEBOX_CLIMB_VARIATIONS` and
    /// `GAMEBOX_UNDO_LIMIT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();

        let fast_step = lookup("GAMEBOX_FAST_STEP")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.fast_step);

        let climb_out_of_variations = lookup("GAMEBOX_CLIMB_VARIATIONS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.climb_out_of_variations);

        let undo_limit = lookup("GAMEBOX_UNDO_LIMIT")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .or(defaults.undo_limit);

        Self {
            fast_step,
            climb_out_of_variations,
            undo_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = NavigatorConfig::from_lookup(lookup(&[]));
        assert_eq!(config.fast_step, 5);
        assert!(!config.climb_out_of_variations);
        assert_eq!(config.undo_limit, None);
    }

    #[test]
    fn test_overrides() {
        let config = NavigatorConfig::from_lookup(lookup(&[
            ("GAMEBOX_FAST_STEP", "10"),
            ("GAMEBOX_CLIMB_VARIATIONS", "true"),
            ("GAMEBOX_UNDO_LIMIT", "50"),
        ]));
        assert_eq!(config.fast_step, 10);
        assert!(config.climb_out_of_variations);
        assert_eq!(config.undo_limit, Some(50));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = NavigatorConfig::from_lookup(lookup(&[
            ("GAMEBOX_FAST_STEP", "0"),
            ("GAMEBOX_UNDO_LIMIT", "lots"),
        ]));
        assert_eq!(config.fast_step, 5);
        assert_eq!(config.undo_limit, None);
    }

    #[test]
    fn test_zero_undo_limit_means_unlimited() {
        let config = NavigatorConfig::from_lookup(lookup(&[("GAMEBOX_UNDO_LIMIT", "0")]));
        assert_eq!(config.undo_limit, None);
    }
}
