//! JSON file backend: graph.json, taxonomy.json and changelog.json

use super::traits::{Snapshot, StorageResult, WikiStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const GRAPH_FILE: &str = "graph.json";
pub const TAXONOMY_FILE: &str = "taxonomy.json";
pub const CHANGELOG_FILE: &str = "changelog.json";

/// Stores each section as a pretty-printed JSON file under a base directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    base: PathBuf,
}

impl JsonStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> StorageResult<T> {
        let path = self.base.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write via a sibling temp file so a failed write keeps the old section
    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> StorageResult<()> {
        let path = self.base.join(file);
        let tmp = self.base.join(format!(".{file}.tmp"));
        fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl WikiStore for JsonStore {
    fn load(&self) -> StorageResult<Snapshot> {
        Ok(Snapshot {
            graph: self.read_or_default(GRAPH_FILE)?,
            taxonomy: self.read_or_default(TAXONOMY_FILE)?,
            changelog: self.read_or_default(CHANGELOG_FILE)?,
        })
    }

    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        fs::create_dir_all(&self.base)?;
        self.write(GRAPH_FILE, &snapshot.graph)?;
        self.write(TAXONOMY_FILE, &snapshot.taxonomy)?;
        self.write(CHANGELOG_FILE, &snapshot.changelog)?;
        tracing::debug!(base = %self.base.display(), "saved JSON sections");
        Ok(())
    }
}
