use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized, directly executable command plus its cleanup and the file
/// attachments the command references. One per (platform, dialect) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedCommand {
    pub command: String,
    pub cleanup: String,
    pub payloads: Vec<String>,
}

/// Reference back to the technique a test belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueRef {
    pub attack_id: String,
    pub name: String,
}

/// The per-record output handed to persistence.
///
/// BTreeMap keys keep the persisted encoding deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tactic: String,
    pub technique: TechniqueRef,
    pub platforms: BTreeMap<String, BTreeMap<String, PreparedCommand>>,
}

impl Ability {
    /// True when no platform block could be produced; such abilities carry
    /// nothing useful to save.
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
