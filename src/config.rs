use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::clamp_interval;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub autonomy: AutonomyConfig,
    pub context: ContextConfig,
    pub broadcast: BroadcastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonomyConfig {
    pub interval_ms: u64,
    pub settle_delay_ms: u64,
    pub reconcile_interval_ms: u64,
    pub history_count: usize,
    pub memory_table: String,
    pub enabled_key: String,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            settle_delay_ms: 2_000,
            reconcile_interval_ms: 10_000,
            history_count: 10,
            memory_table: "messages".to_string(),
            enabled_key: "AUTONOMY_ENABLED".to_string(),
        }
    }
}

impl AutonomyConfig {
    /// Iteration interval after clamping.
    pub fn effective_interval_ms(&self) -> u64 {
        clamp_interval(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub world_name: String,
    pub room_name: String,
    /// Derive room/world ids from the agent id so history survives restarts
    pub stable_room: bool,
    pub room_id: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            world_name: "Autonomy World".to_string(),
            room_name: "Autonomous Thoughts".to_string(),
            stable_room: true,
            room_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/messaging/submit".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            autonomy: AutonomyConfig::default(),
            context: ContextConfig::default(),
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl Config {
    /// Load `monologue.yml`.
    ///
    /// An explicit path must load. Without one, the user config dir is searched and
    /// then the working directory; a file there that fails to parse is skipped.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::search_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Skipping config {}: {}", candidate.display(), e),
            }
        }

        log::info!("No monologue.yml found, using defaults");
        Ok(Self::default())
    }

    /// Where `load` looks when no path is given, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let name = env!("CARGO_PKG_NAME");
        let file_name = format!("{}.yml", name);
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(name).join(&file_name));
        }
        paths.push(PathBuf::from(file_name));
        paths
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config = Self::from_yaml(&content)?;
        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
