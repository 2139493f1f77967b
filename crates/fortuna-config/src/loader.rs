// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered merging.
//!
//! Lookup order: `/etc/fortuna/fortuna.toml`, `~/.config/fortuna/fortuna.toml`,
//! `./fortuna.toml`, then `FORTUNA_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FortunaConfig;

const SYSTEM_CONFIG: &str = "/etc/fortuna/fortuna.toml";
const LOCAL_CONFIG: &str = "fortuna.toml";

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("fortuna").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<FortunaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<FortunaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FortunaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FortunaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FortunaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used by [`load_config`] before extraction.
pub fn build_figment() -> Figment {
    config_file_candidates()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(FortunaConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider mapping `FORTUNA_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after the section name becomes a dot, so
/// `FORTUNA_ADVICE_MAX_BACKOFF_MS` maps to `advice.max_backoff_ms`.
fn env_provider() -> Env {
    Env::prefixed("FORTUNA_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["app_", "advice_", "queue_", "storage_"]
            .iter()
            .find(|section| key_str.starts_with(*section))
            .map(|section| key_str.replacen(section, &section.replace('_', "."), 1))
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
