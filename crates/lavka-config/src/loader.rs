// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lavka.toml` > `~/.config/lavka/lavka.toml` >
//! `/etc/lavka/lavka.toml` with environment variable overrides via the
//! `LAVKA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LavkaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lavka/lavka.toml` (system-wide)
/// 3. `~/.config/lavka/lavka.toml` (user XDG config)
/// 4. `./lavka.toml` (local directory)
/// 5. `LAVKA_*` environment variables
pub fn load_config() -> Result<LavkaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LavkaConfig::default()))
        .merge(Toml::file("/etc/lavka/lavka.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lavka/lavka.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lavka.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LavkaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LavkaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LavkaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LavkaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LAVKA_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("LAVKA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LAVKA_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("telegram_", "telegram.", 1)
            .replacen("odata_", "odata.", 1)
            .replacen("admin_", "admin.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.odata.timeout_secs, 10);
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[odata]
base_url = "http://example/odata/standard.odata/"
"#,
        )
        .unwrap();
        assert_eq!(config.odata.base_url, "http://example/odata/standard.odata/");
        // Untouched sections keep defaults.
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn env_vars_override_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "lavka.toml",
                r#"
[telegram]
bot_token = "from-toml"
"#,
            )?;
            jail.set_env("LAVKA_TELEGRAM_BOT_TOKEN", "from-env");
            let config: LavkaConfig = Figment::new()
                .merge(Serialized::defaults(LavkaConfig::default()))
                .merge(Toml::file("lavka.toml"))
                .merge(super::env_provider())
                .extract()?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn env_mapping_preserves_underscored_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LAVKA_ODATA_WRITE_TIMEOUT_SECS", "30");
            let config: LavkaConfig = Figment::new()
                .merge(Serialized::defaults(LavkaConfig::default()))
                .merge(super::env_provider())
                .extract()?;
            assert_eq!(config.odata.write_timeout_secs, 30);
            Ok(())
        });
    }
}
