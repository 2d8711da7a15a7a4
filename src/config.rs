//! Run configuration loaded from YAML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "homestead".to_string()
}

fn default_seed() -> u64 {
    7
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_world() -> String {
    "overworld".to_string()
}

fn default_autosave() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Directory holding one JSON file per world.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// World to simulate when the CLI does not name one.
    #[serde(default = "default_world")]
    pub world: String,
    /// Host ticks to run (20 per simulated second).
    #[serde(default)]
    pub ticks: Option<u64>,
    /// Write each world back to disk at every simulated day boundary.
    #[serde(default = "default_autosave")]
    pub autosave: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: default_seed(),
            data_dir: default_data_dir(),
            world: default_world(),
            ticks: None,
            autosave: default_autosave(),
        }
    }
}

impl SimConfig {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(24_000)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: SimConfig = serde_yaml::from_str("name: test-run\n").unwrap();
        assert_eq!(config.name, "test-run");
        assert_eq!(config.seed, 7);
        assert_eq!(config.world, "overworld");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.autosave);
        assert_eq!(config.ticks(None), 24_000);
        assert_eq!(config.ticks(Some(40)), 40);
    }

    #[test]
    fn yaml_round_trip() {
        let config = SimConfig::default();

        let temp_file = env::temp_dir().join("homestead_test_config.yaml");
        config.to_yaml(&temp_file).unwrap();

        let loaded = SimConfig::from_yaml(&temp_file).unwrap();
        assert_eq!(config.name, loaded.name);
        assert_eq!(config.seed, loaded.seed);
        assert_eq!(config.world, loaded.world);

        fs::remove_file(&temp_file).ok();
    }
}
