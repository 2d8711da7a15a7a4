//! Per-world settlement store.
//!
//! Each named world owns one settlement, persisted as one JSON file in
//! the data directory. Files are written through an envelope carrying a
//! save timestamp; unreadable files are reported and replaced with a
//! fresh settlement rather than aborting the host.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::persist;
use crate::settlement::Settlement;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settlement store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settlement store encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct WorldRegistry {
    data_dir: PathBuf,
    autosave: bool,
    worlds: HashMap<String, Settlement>,
}

impl WorldRegistry {
    pub fn open(data_dir: impl AsRef<Path>, autosave: bool) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            autosave,
            worlds: HashMap::new(),
        })
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn world_file(&self, world: &str) -> PathBuf {
        // World names come from the host; keep the file name tame.
        let safe: String = world
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{safe}.json"))
    }

    /// Fetch the settlement for `world`, loading it from disk on first
    /// access. A missing or unreadable file yields a fresh settlement.
    pub fn get_or_create(&mut self, world: &str) -> &mut Settlement {
        if !self.worlds.contains_key(world) {
            let settlement = self.load_from_disk(world);
            self.worlds.insert(world.to_string(), settlement);
        }
        self.worlds.entry(world.to_string()).or_default()
    }

    fn load_from_disk(&self, world: &str) -> Settlement {
        let path = self.world_file(world);
        if !path.exists() {
            return Settlement::new();
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(world, error = %err, "failed to read settlement file; starting fresh");
                return Settlement::new();
            }
        };
        let doc: Value = match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(world, error = %err, "failed to parse settlement file; starting fresh");
                return Settlement::new();
            }
        };
        // Accept both the envelope and a bare settlement document.
        let settlement_doc = doc.get("settlement").unwrap_or(&doc);
        persist::load(settlement_doc)
    }

    /// Write one world's settlement to disk. Unknown names are a no-op.
    pub fn save(&self, world: &str) -> Result<(), StoreError> {
        let settlement = match self.worlds.get(world) {
            Some(settlement) => settlement,
            None => return Ok(()),
        };
        let envelope = json!({
            "savedAt": chrono::Utc::now().to_rfc3339(),
            "settlement": persist::save(settlement),
        });
        fs::write(self.world_file(world), serde_json::to_string_pretty(&envelope)?)?;
        Ok(())
    }

    /// Write every loaded world to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        for world in self.worlds.keys() {
            self.save(world)?;
        }
        Ok(())
    }

    /// Drop a world from memory and delete its file.
    pub fn remove(&mut self, world: &str) -> Result<(), StoreError> {
        self.worlds.remove(world);
        let path = self.world_file(world);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn loaded_worlds(&self) -> impl Iterator<Item = &str> {
        self.worlds.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_file_yields_fresh_settlement() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = WorldRegistry::open(dir.path(), false).unwrap();
        let settlement = registry.get_or_create("overworld");
        assert_eq!(*settlement, Settlement::new());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = WorldRegistry::open(dir.path(), false).unwrap();
        let settlement = registry.get_or_create("overworld");
        settlement.add_coins(123);
        let expected = settlement.clone();
        registry.save("overworld").unwrap();

        let mut reopened = WorldRegistry::open(dir.path(), false).unwrap();
        assert_eq!(*reopened.get_or_create("overworld"), expected);
    }

    #[test]
    fn corrupt_file_falls_back_to_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = WorldRegistry::open(dir.path(), false).unwrap();
        fs::write(dir.path().join("overworld.json"), "{not json").unwrap();
        assert_eq!(*registry.get_or_create("overworld"), Settlement::new());
    }

    #[test]
    fn worlds_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = WorldRegistry::open(dir.path(), false).unwrap();
        registry.get_or_create("overworld").add_coins(999);
        assert_eq!(registry.get_or_create("nether").coins(), 500);
        registry.flush().unwrap();
        assert!(dir.path().join("overworld.json").exists());
        assert!(dir.path().join("nether.json").exists());
    }

    #[test]
    fn remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = WorldRegistry::open(dir.path(), false).unwrap();
        registry.get_or_create("overworld");
        registry.save("overworld").unwrap();
        registry.remove("overworld").unwrap();
        assert!(!dir.path().join("overworld.json").exists());
    }
}
