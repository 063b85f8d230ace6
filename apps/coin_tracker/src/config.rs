use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "coin_tracker.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedCoin {
    pub name: String,
    pub symbol: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_filter: String,
    pub feed_capacity: usize,
    pub peer_name: String,
    pub seed: Vec<SeedCoin>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            feed_capacity: client_core::memory::DEFAULT_FEED_CAPACITY,
            peer_name: "peer".into(),
            seed: vec![SeedCoin {
                name: "Bitcoin".into(),
                symbol: "BTC".into(),
                price: 50_000.0,
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    log_filter: Option<String>,
    feed_capacity: Option<usize>,
    peer_name: Option<String>,
    seed: Option<Vec<SeedCoin>>,
}

/// Defaults, overlaid by the config file, overlaid by the environment.
///
/// An explicitly requested file must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg = parse_file_settings(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            apply_file_settings(&mut settings, file_cfg);
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str::<FileSettings>(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.feed_capacity {
        settings.feed_capacity = v;
    }
    if let Some(v) = file_cfg.peer_name {
        settings.peer_name = v;
    }
    if let Some(v) = file_cfg.seed {
        settings.seed = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("COIN_TRACKER_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = var("APP__FEED_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.feed_capacity = parsed;
        }
    }

    if let Some(v) = var("APP__PEER_NAME") {
        settings.peer_name = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
