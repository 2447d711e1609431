// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Murmur message engine.
//!
//! Layered loading (compiled defaults, system and XDG TOML files, local
//! `murmur.toml`, `MURMUR_*` environment overrides) with a strict serde
//! model that rejects unknown keys.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MurmurConfig;
