use super::model::TechniqueRecord;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Technique files under `atomics/`: one `T*.yaml` per technique directory.
/// Sorted so a run visits records in a stable order.
pub fn technique_files(atomics_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(atomics_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.starts_with('T') && name.ends_with(".yaml")
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

pub fn load_technique_file(path: &Path) -> Result<TechniqueRecord> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&raw)?)
}
