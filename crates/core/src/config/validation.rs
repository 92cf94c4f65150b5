//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from
//! environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` or `llm_timeout_ms` is under 100ms or over 5 minutes
    /// - `user_agent` or `llm_model` is empty
    /// - `llm_base_url` is not an http(s) URL
    /// - `llm_temperature` is outside 0.0..=2.0
    /// - `llm_max_tokens`, `handoff_ttl_secs` or a readability setting is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        for (field, value) in [("timeout_ms", self.timeout_ms), ("llm_timeout_ms", self.llm_timeout_ms)] {
            if value < 100 {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > 300_000 {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.llm_model.trim().is_empty() {
            return Err(invalid("llm_model", "must not be empty"));
        }

        if !(self.llm_base_url.starts_with("https://") || self.llm_base_url.starts_with("http://")) {
            return Err(invalid("llm_base_url", "must be an http(s) URL"));
        }

        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(invalid("llm_temperature", "must be between 0.0 and 2.0"));
        }

        if self.llm_max_tokens == 0 {
            return Err(invalid("llm_max_tokens", "must be greater than 0"));
        }

        if self.handoff_ttl_secs == 0 {
            return Err(invalid("handoff_ttl_secs", "must be greater than 0"));
        }

        if self.readability_char_threshold == 0 {
            return Err(invalid("readability_char_threshold", "must be greater than 0"));
        }
        if self.readability_max_candidates == 0 {
            return Err(invalid("readability_max_candidates", "must be greater than 0"));
        }

        if self.anonymous_quiz_limit > self.daily_quiz_limit {
            tracing::warn!(
                anonymous = self.anonymous_quiz_limit,
                daily = self.daily_quiz_limit,
                "anonymous_quiz_limit exceeds daily_quiz_limit; anonymous clients get the larger allowance"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes() {
        let zero = AppConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(invalid_field(&zero).as_deref(), Some("max_bytes"));

        let huge = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        assert_eq!(invalid_field(&huge).as_deref(), Some("max_bytes"));
    }

    #[test]
    fn test_validate_timeouts() {
        let fetch = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(invalid_field(&fetch).as_deref(), Some("timeout_ms"));

        let llm = AppConfig { llm_timeout_ms: 301_000, ..Default::default() };
        assert_eq!(invalid_field(&llm).as_deref(), Some("llm_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_strings() {
        let agent = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&agent).as_deref(), Some("user_agent"));

        let model = AppConfig { llm_model: " ".into(), ..Default::default() };
        assert_eq!(invalid_field(&model).as_deref(), Some("llm_model"));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let config = AppConfig { llm_base_url: "ftp://openrouter.ai".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("llm_base_url"));
    }

    #[test]
    fn test_validate_temperature_and_tokens() {
        let hot = AppConfig { llm_temperature: 2.5, ..Default::default() };
        assert_eq!(invalid_field(&hot).as_deref(), Some("llm_temperature"));

        let no_tokens = AppConfig { llm_max_tokens: 0, ..Default::default() };
        assert_eq!(invalid_field(&no_tokens).as_deref(), Some("llm_max_tokens"));
    }

    #[test]
    fn test_validate_readability_settings() {
        let threshold = AppConfig { readability_char_threshold: 0, ..Default::default() };
        assert_eq!(invalid_field(&threshold).as_deref(), Some("readability_char_threshold"));

        let candidates = AppConfig { readability_max_candidates: 0, ..Default::default() };
        assert_eq!(invalid_field(&candidates).as_deref(), Some("readability_max_candidates"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            max_bytes: 50 * 1024 * 1024,
            timeout_ms: 100,
            llm_timeout_ms: 300_000,
            llm_temperature: 0.0,
            handoff_ttl_secs: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
