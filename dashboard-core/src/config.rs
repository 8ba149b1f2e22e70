use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    /// Pause between a successful fix and the follow-up refresh, giving the
    /// backend time to settle.
    pub refresh_delay: Duration,
    /// Substring of `raw_data.source` that marks an automated detection.
    pub ai_source_marker: String,
    pub request_timeout: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            poll_interval: Duration::from_millis(4_000),
            refresh_delay: Duration::from_millis(500),
            ai_source_marker: "AI".into(),
            request_timeout: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; values that fail to
    /// parse keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        };

        Self {
            base_url: lookup("DASHBOARD_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            poll_interval: millis("DASHBOARD_POLL_MS").unwrap_or(defaults.poll_interval),
            refresh_delay: millis("DASHBOARD_REFRESH_DELAY_MS").unwrap_or(defaults.refresh_delay),
            ai_source_marker: lookup("DASHBOARD_AI_MARKER")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.ai_source_marker),
            request_timeout: millis("DASHBOARD_REQUEST_TIMEOUT_MS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_cadence() {
        let config = DashboardConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(4));
        assert_eq!(config.refresh_delay, Duration::from_millis(500));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn env_values_override_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("DASHBOARD_URL", "http://10.0.0.5:9000"),
            ("DASHBOARD_POLL_MS", "1500"),
            ("DASHBOARD_REFRESH_DELAY_MS", "250"),
            ("DASHBOARD_AI_MARKER", "LLM"),
            ("DASHBOARD_REQUEST_TIMEOUT_MS", "30000"),
        ]));
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.refresh_delay, Duration::from_millis(250));
        assert_eq!(config.ai_source_marker, "LLM");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("DASHBOARD_URL", "  "),
            ("DASHBOARD_POLL_MS", "fast"),
            ("DASHBOARD_REFRESH_DELAY_MS", "0"),
        ]));
        assert_eq!(config, DashboardConfig::default());
    }
}
