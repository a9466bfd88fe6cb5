use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory layout for one ingestion run.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Local checkout of the test corpus.
    pub repo_dir: PathBuf,
    /// Where normalized abilities are written.
    pub data_dir: PathBuf,
    /// Content-addressed payload directory.
    pub payloads_dir: PathBuf,
}

impl IngestConfig {
    /// Conventional layout under a single base directory.
    pub fn with_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            repo_dir: base.join("atomic-red-team"),
            data_dir: base.join("data"),
            payloads_dir: base.join("payloads"),
        }
    }

    /// Load the layout from a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn atomics_dir(&self) -> PathBuf {
        self.repo_dir.join("atomics")
    }

    /// ATT&CK bundle shipped inside the corpus repository.
    pub fn attack_bundle_path(&self) -> PathBuf {
        self.repo_dir.join("atomic_red_team").join("enterprise-attack.json")
    }

    pub fn abilities_dir(&self) -> PathBuf {
        self.data_dir.join("abilities")
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::with_base(".")
    }
}
