/// Configuration module for parlasent.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corpus::keywords::DEFAULT_TOPICS;

// ── Default value functions ──────────────────────────────────────────

fn default_speeches_dir() -> PathBuf {
    PathBuf::from("data/year_2022/txt/2022")
}

fn default_output_csv() -> PathBuf {
    PathBuf::from("data/prepared_tables.csv")
}

fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect()
}

fn default_reference_year() -> i32 {
    2022
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory of `.txt` speech files with sibling `-meta.tsv` files.
    #[serde(default = "default_speeches_dir")]
    pub speeches_dir: PathBuf,

    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,

    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Year speaker ages are computed against.
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            speeches_dir: default_speeches_dir(),
            output_csv: default_output_csv(),
            topics: default_topics(),
            reference_year: default_reference_year(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and generates a
    /// template file for the default path.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let mut cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");

        cfg.topics.retain(|t| !t.trim().is_empty());
        if cfg.topics.is_empty() {
            warn!("No topics configured, falling back to the default topic list");
            cfg.topics = default_topics();
        }

        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.topics.is_empty(), "at least one topic must be specified");
        anyhow::ensure!(
            self.topics.iter().all(|t| !t.trim().is_empty()),
            "topics must not be blank"
        );
        anyhow::ensure!(
            self.reference_year > 0,
            "reference_year must be positive"
        );
        anyhow::ensure!(!self.server.bind.is_empty(), "server.bind must be set");
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
