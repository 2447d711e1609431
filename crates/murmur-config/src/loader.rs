// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./murmur.toml` > `~/.config/murmur/murmur.toml`
//! > `/etc/murmur/murmur.toml`, with environment variable overrides via the
//! `MURMUR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MurmurConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/murmur/murmur.toml` (system-wide)
/// 3. `~/.config/murmur/murmur.toml` (user XDG config)
/// 4. `./murmur.toml` (local directory)
/// 5. `MURMUR_*` environment variables
pub fn load_config() -> Result<MurmurConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurmurConfig::default()))
        .merge(Toml::file("/etc/murmur/murmur.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("murmur/murmur.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("murmur.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MurmurConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurmurConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MurmurConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurmurConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MURMUR_LIFECYCLE_DEFAULT_EXPIRATION_HOURS`
/// must map to `lifecycle.default_expiration_hours`, not
/// `lifecycle.default.expiration.hours`.
fn env_provider() -> Env {
    const SECTIONS: [&str; 8] = [
        "log",
        "storage",
        "lifecycle",
        "limits",
        "mood",
        "moderation",
        "discovery",
        "sweeper",
    ];
    Env::prefixed("MURMUR_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Only the leading section may become a dot: key names themselves
        // contain underscores (`sweeper_emotion_log_retention_days`).
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str.strip_prefix(section) {
                if let Some(rest) = rest.strip_prefix('_') {
                    return format!("{section}.{rest}").into();
                }
            }
        }
        key_str.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_extract_cleanly() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.limits.create_limit, 10);
        assert_eq!(config.limits.create_window_secs, 300);
        assert_eq!(config.limits.report_limit, 5);
        assert_eq!(config.lifecycle.default_expiration_hours, 24);
        assert_eq!(config.discovery.default_limit, 50);
        assert_eq!(config.discovery.max_limit, 100);
        assert_eq!(config.sweeper.interval_secs, 3600);
        assert_eq!(config.sweeper.emotion_log_retention_days, 365);
        assert_eq!(config.moderation.timeout_secs, 8);
        assert!(config.mood.base_url.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [limits]
            create_limit = 3
            report_window_secs = 60

            [sweeper]
            interval_secs = 300

            [mood]
            base_url = "http://localhost:9090"
            timeout_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.create_limit, 3);
        assert_eq!(config.limits.report_window_secs, 60);
        // Untouched keys keep their defaults.
        assert_eq!(config.limits.report_limit, 5);
        assert_eq!(config.sweeper.interval_secs, 300);
        assert_eq!(config.mood.base_url.as_deref(), Some("http://localhost:9090"));
        assert_eq!(config.mood.timeout_secs, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [limits]
            craete_limit = 3
            "#,
        );
        assert!(result.is_err(), "typo'd key must fail extraction");
    }

    #[test]
    fn env_mapping_splits_on_section_only() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MURMUR_LIFECYCLE_DEFAULT_EXPIRATION_HOURS", "48");
            jail.set_env("MURMUR_SWEEPER_EMOTION_LOG_RETENTION_DAYS", "30");
            let config: MurmurConfig = Figment::new()
                .merge(Serialized::defaults(MurmurConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.lifecycle.default_expiration_hours, 48);
            assert_eq!(config.sweeper.emotion_log_retention_days, 30);
            Ok(())
        });
    }
}
