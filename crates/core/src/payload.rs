use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Number of content-hash hex characters prefixed to a payload name.
const HASH_PREFIX_LEN: usize = 6;

/// Content-addressed store for file attachments referenced by commands.
///
/// Payload names are `<hash-prefix>_<basename>`, so byte-identical files
/// with the same basename always resolve to the same name and survive for
/// reuse across runs.
#[derive(Debug, Clone)]
pub struct PayloadStore {
    payload_dir: PathBuf,
}

impl PayloadStore {
    pub fn new(payload_dir: impl Into<PathBuf>) -> Self {
        Self {
            payload_dir: payload_dir.into(),
        }
    }

    pub fn payload_dir(&self) -> &Path {
        &self.payload_dir
    }

    /// Create the payload directory if it does not exist yet.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.payload_dir)?;
        Ok(())
    }

    /// Copy `source` into the store and return its payload name.
    ///
    /// Reads through symlinks, so the stored file always holds the target's
    /// bytes. Idempotent for identical content: a second ingest of the same
    /// bytes under the same basename returns the same name and leaves the
    /// stored file untouched.
    pub fn ingest(&self, source: &Path) -> Result<String> {
        let basename = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::PayloadError(format!("no basename in {}", source.display())))?;

        let bytes = fs::read(source)?;
        let digest = format!("{:x}", md5::compute(&bytes));
        let name = format!("{}_{}", &digest[..HASH_PREFIX_LEN], basename);

        let dest = self.payload_dir.join(&name);
        if dest.is_file() {
            match fs::read(&dest) {
                Ok(existing) if existing == bytes => return Ok(name),
                _ => {
                    // Same name, different bytes: hash-prefix collision.
                    warn!(payload = %name, "overwriting payload with different content");
                }
            }
        }
        fs::write(&dest, &bytes)?;
        Ok(name)
    }
}
