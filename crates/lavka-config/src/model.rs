// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lavka bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Lavka configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values -- except that serving requires `telegram.bot_token`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LavkaConfig {
    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Business-data (OData) service settings.
    #[serde(default)]
    pub odata: OdataConfig,

    /// Administrator settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Absence is a fatal error at serve time.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Register the bot command menu (`/login`, `/neworder`, ...) on
    /// connect.
    #[serde(default = "default_command_menu")]
    pub command_menu: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            command_menu: default_command_menu(),
        }
    }
}

fn default_command_menu() -> bool {
    true
}

/// Business-data service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OdataConfig {
    /// Base URL of the OData endpoint, with or without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call deadline for reads, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Per-call deadline for document writes (order creation), in seconds.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl Default for OdataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost/lavka/odata/standard.odata/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_write_timeout_secs() -> u64 {
    15
}

/// Administrator configuration.
///
/// A session is flagged admin when its authenticated phone equals
/// `admin.phone`. With no phone configured, nobody is an admin.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(default)]
    pub phone: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_serviceable() {
        let config = LavkaConfig::default();
        assert!(config.telegram.bot_token.is_none());
        assert!(config.telegram.command_menu);
        assert_eq!(config.odata.timeout_secs, 10);
        assert_eq!(config.odata.write_timeout_secs, 15);
        assert_eq!(config.log.level, "info");
        assert!(config.admin.phone.is_none());
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml_str = r#"
[telegram]
bot_token = "123:abc"
bot_tokne = "typo"
"#;
        assert!(toml::from_str::<LavkaConfig>(toml_str).is_err());
    }

    #[test]
    fn full_config_deserializes() {
        let toml_str = r#"
[telegram]
bot_token = "123456:ABC"
command_menu = false

[odata]
base_url = "http://1c.internal/shop/odata/standard.odata"
timeout_secs = 5

[admin]
phone = "+79139849805"

[log]
level = "debug"
"#;
        let config: LavkaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123456:ABC"));
        assert!(!config.telegram.command_menu);
        assert_eq!(config.odata.timeout_secs, 5);
        assert_eq!(config.odata.write_timeout_secs, 15);
        assert_eq!(config.admin.phone.as_deref(), Some("+79139849805"));
        assert_eq!(config.log.level, "debug");
    }
}
