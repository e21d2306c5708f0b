// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL shape, sensible timeouts, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::LavkaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &LavkaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    let base_url = config.odata.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "odata.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("odata.base_url `{base_url}` must be an http(s) URL"),
        });
    }

    if config.odata.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "odata.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.odata.write_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "odata.write_timeout_secs must be at least 1".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate that the configuration can actually serve: the bot access
/// token is required (fatal startup error when absent).
pub fn validate_serve(config: &LavkaConfig) -> Result<(), Vec<ConfigError>> {
    match &config.telegram.bot_token {
        Some(token) if !token.trim().is_empty() => Ok(()),
        _ => Err(vec![ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&LavkaConfig::default()).is_ok());
    }

    #[test]
    fn default_config_cannot_serve() {
        let errors = validate_serve(&LavkaConfig::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "telegram.bot_token")));
    }

    #[test]
    fn config_with_token_can_serve() {
        let mut config = LavkaConfig::default();
        config.telegram.bot_token = Some("123456:ABC".into());
        assert!(validate_serve(&config).is_ok());
    }

    #[test]
    fn empty_base_url_fails_validation() {
        let mut config = LavkaConfig::default();
        config.odata.base_url = "".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = LavkaConfig::default();
        config.odata.base_url = "ftp://host/odata".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = LavkaConfig::default();
        config.odata.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = LavkaConfig::default();
        config.log.level = "loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log.level"))));
    }
}
