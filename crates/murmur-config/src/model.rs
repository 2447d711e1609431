// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Murmur message engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Murmur configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MurmurConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Message lifecycle settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Rate limit windows for creation and reporting.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// External mood classifier settings.
    #[serde(default)]
    pub mood: MoodClassifierConfig,

    /// External content classifier settings.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Discovery query settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Expiration sweeper settings.
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Default logging level (trace, debug, info, warn, error).
    /// `RUST_LOG` overrides this when set.
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

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("murmur").join("murmur.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("murmur.db"))
        .to_string_lossy()
        .into_owned()
}

/// Message lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Default expiry horizon for ephemeral messages, in hours.
    /// Caller-supplied horizons are clamped to [1, 168].
    #[serde(default = "default_expiration_hours")]
    pub default_expiration_hours: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_expiration_hours: default_expiration_hours(),
        }
    }
}

fn default_expiration_hours() -> u32 {
    24
}

/// Rate limit windows for creation and reporting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Message creations allowed per author per window.
    #[serde(default = "default_create_limit")]
    pub create_limit: u32,

    /// Creation window length in seconds.
    #[serde(default = "default_create_window_secs")]
    pub create_window_secs: u64,

    /// Reports allowed per reporter per window.
    #[serde(default = "default_report_limit")]
    pub report_limit: u32,

    /// Reporting window length in seconds.
    #[serde(default = "default_report_window_secs")]
    pub report_window_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            create_limit: default_create_limit(),
            create_window_secs: default_create_window_secs(),
            report_limit: default_report_limit(),
            report_window_secs: default_report_window_secs(),
        }
    }
}

fn default_create_limit() -> u32 {
    10
}

fn default_create_window_secs() -> u64 {
    300
}

fn default_report_limit() -> u32 {
    5
}

fn default_report_window_secs() -> u64 {
    300
}

/// External mood classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MoodClassifierConfig {
    /// Base URL of the mood classification service. `None` disables the
    /// external call; every message gets the neutral vector.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the service. `None` sends no auth header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MoodClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

/// External content classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// Base URL of the content classification service. `None` disables the
    /// external call; the local keyword filter handles everything.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the service. `None` sends no auth header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

fn default_classifier_timeout_secs() -> u64 {
    8
}

/// Discovery query configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Result cap applied when the caller does not supply a limit.
    #[serde(default = "default_result_limit")]
    pub default_limit: usize,

    /// Hard cap on results regardless of the caller-supplied limit.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_result_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_result_limit() -> usize {
    50
}

fn default_max_limit() -> usize {
    100
}

/// Expiration sweeper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweeperConfig {
    /// Seconds between sweep cycles.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,

    /// Retention for per-user emotion log entries, in days.
    #[serde(default = "default_emotion_log_retention_days")]
    pub emotion_log_retention_days: u32,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
            emotion_log_retention_days: default_emotion_log_retention_days(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    3600 // hourly
}

fn default_emotion_log_retention_days() -> u32 {
    365
}
