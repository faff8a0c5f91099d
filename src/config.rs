use std::time::Duration;

use crate::quiz::deck::DEFAULT_DRAW_COUNT;
use crate::quotes::rotator::DEFAULT_PERIOD;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 8;
const DEFAULT_DIALOGUE_DB: &str = "db.sqlite";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`).
///
/// The bot token itself is read by teloxide from `TELOXIDE_TOKEN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Without it every view shows its built-in placeholder content.
    pub content_api_url: Option<String>,
    pub quiz_log_url: Option<String>,
    pub members_hub_url: Option<String>,
    pub fetch_timeout: Duration,
    pub quiz_draw_count: usize,
    pub quote_rotation: Duration,
    pub dialogue_db: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let positive = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match non_empty(name) {
                None => Ok(default),
                Some(value) => match value.parse::<u64>() {
                    Ok(parsed) if parsed > 0 => Ok(parsed),
                    _ => Err(ConfigError::Invalid { name, value }),
                },
            }
        };

        Ok(Self {
            content_api_url: non_empty("CONTENT_API_URL"),
            quiz_log_url: non_empty("QUIZ_LOG_URL"),
            members_hub_url: non_empty("MEMBERS_HUB_URL"),
            fetch_timeout: Duration::from_secs(positive("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?),
            quiz_draw_count: positive("QUIZ_DRAW_COUNT", DEFAULT_DRAW_COUNT as u64)? as usize,
            quote_rotation: Duration::from_secs(positive("QUOTE_ROTATION_SECS", DEFAULT_PERIOD.as_secs())?),
            dialogue_db: non_empty("DIALOGUE_DB").unwrap_or_else(|| DEFAULT_DIALOGUE_DB.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("CONTENT_API_URL", "https://script.example/exec")]).unwrap();
        assert_eq!(config.quiz_log_url, None);
        assert_eq!(config.members_hub_url, None);
        assert_eq!(config.fetch_timeout, Duration::from_secs(8));
        assert_eq!(config.quiz_draw_count, 10);
        assert_eq!(config.quote_rotation, Duration::from_secs(5));
        assert_eq!(config.dialogue_db, "db.sqlite");
    }

    #[test]
    fn missing_endpoint_is_not_fatal() {
        let unset = config(&[]).unwrap();
        assert_eq!(unset.content_api_url, None);

        let blank = config(&[("CONTENT_API_URL", "   ")]).unwrap();
        assert_eq!(blank.content_api_url, None);
    }

    #[test]
    fn overrides_are_validated() {
        let config_ok = config(&[
            ("CONTENT_API_URL", "https://script.example/exec"),
            ("QUIZ_LOG_URL", "https://script.example/exec"),
            ("QUIZ_DRAW_COUNT", "5"),
        ])
        .unwrap();
        assert_eq!(config_ok.quiz_draw_count, 5);
        assert!(config_ok.quiz_log_url.is_some());

        let err = config(&[
            ("CONTENT_API_URL", "https://script.example/exec"),
            ("FETCH_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "FETCH_TIMEOUT_SECS", .. }));
    }
}
