use super::TrackerConfig;
use std::str::FromStr;

pub const ENV_MAX_ENTITIES: &str = "UWB_TRACKER_MAX_ENTITIES";
pub const ENV_FRAME_INTERVAL_MS: &str = "UWB_TRACKER_FRAME_INTERVAL_MS";
pub const ENV_INACTIVITY_TIMEOUT_SECONDS: &str = "UWB_TRACKER_INACTIVITY_TIMEOUT_SECONDS";
pub const ENV_ANIMATION_DURATION_MS: &str = "UWB_TRACKER_ANIMATION_DURATION_MS";

impl TrackerConfig {
    /// Apply overrides from env vars. Unset or unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (env vars in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = parse(&lookup, ENV_MAX_ENTITIES) {
            self.registry.max_entities = n;
        }
        if let Some(n) = parse(&lookup, ENV_FRAME_INTERVAL_MS) {
            self.render.frame_interval_ms = n;
        }
        if let Some(n) = parse(&lookup, ENV_INACTIVITY_TIMEOUT_SECONDS) {
            self.registry.inactivity_timeout_seconds = n;
        }
        if let Some(n) = parse(&lookup, ENV_ANIMATION_DURATION_MS) {
            self.motion.animation_duration_ms = n;
        }
    }
}

fn parse<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_overrides_applied() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_MAX_ENTITIES, "3"),
            (ENV_FRAME_INTERVAL_MS, "33"),
            (ENV_INACTIVITY_TIMEOUT_SECONDS, " 12 "),
            (ENV_ANIMATION_DURATION_MS, "0"),
        ]);

        let mut config = TrackerConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.registry.max_entities, 3);
        assert_eq!(config.render.frame_interval_ms, 33);
        assert_eq!(config.registry.inactivity_timeout_seconds, 12);
        assert_eq!(config.motion.animation_duration_ms, 0);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([(ENV_MAX_ENTITIES, "lots")]);

        let mut config = TrackerConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.registry.max_entities, 10);
    }
}
