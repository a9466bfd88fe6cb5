use crate::config::IngestConfig;
use crate::corpus::model::{AtomicTest, TechniqueRecord};
use crate::corpus::{loader, TacticMap};
use crate::error::Result;
use crate::normalize::CommandPreparer;
use crate::payload::PayloadStore;
use crate::types::{Ability, Dialect, Platform, TechniqueRef};
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, info};

/// Aggregate counters for one corpus run, returned by value so the engine
/// itself keeps no cross-call state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Platform blocks successfully normalized.
    pub ingested: usize,
    /// Platform blocks seen, manual-only ones included.
    pub total: usize,
    /// Files, records, or platform blocks that failed and were skipped.
    pub errors: usize,
}

impl IngestStats {
    fn absorb(&mut self, other: IngestStats) {
        self.ingested += other.ingested;
        self.total += other.total;
        self.errors += other.errors;
    }
}

/// Walks the corpus and persists one normalized ability per test record.
pub struct IngestService {
    config: IngestConfig,
    store: PayloadStore,
    tactics: TacticMap,
}

impl IngestService {
    pub fn new(config: IngestConfig, tactics: TacticMap) -> Self {
        let store = PayloadStore::new(config.payloads_dir.clone());
        Self {
            config,
            store,
            tactics,
        }
    }

    /// Process every technique file in the corpus. A bad file, record, or
    /// platform block is counted and skipped; the batch never aborts.
    pub fn ingest_corpus(&self) -> Result<IngestStats> {
        self.store.init()?;

        let mut stats = IngestStats::default();
        for path in loader::technique_files(&self.config.atomics_dir()) {
            let record = match loader::load_technique_file(&path) {
                Ok(record) => record,
                Err(err) => {
                    debug!(%err, file = %path.display(), "unreadable technique file");
                    stats.errors += 1;
                    continue;
                }
            };
            for test in &record.atomic_tests {
                match self.save_ability(&record, test) {
                    Ok(test_stats) => stats.absorb(test_stats),
                    Err(err) => {
                        debug!(%err, file = %path.display(), "skipping test record");
                        stats.errors += 1;
                    }
                }
            }
        }

        info!(
            ingested = stats.ingested,
            total = stats.total,
            errors = stats.errors,
            "corpus ingestion finished"
        );
        Ok(stats)
    }

    /// Normalize one test record into an ability and write it out.
    fn save_ability(&self, record: &TechniqueRecord, test: &AtomicTest) -> Result<IngestStats> {
        let definition = test.to_definition(record)?;
        let tactic = self.tactics.resolve(&record.attack_technique);

        let mut ability = Ability {
            id: test.ability_id()?,
            name: definition.test_name.clone(),
            description: definition.description.clone(),
            tactic: tactic.clone(),
            technique: TechniqueRef {
                attack_id: record.attack_technique.clone(),
                name: record.display_name.clone(),
            },
            platforms: BTreeMap::new(),
        };

        let preparer = CommandPreparer::new(&self.config.repo_dir, &self.store);
        let mut stats = IngestStats::default();
        for tag in &definition.supported_platforms {
            stats.total += 1;
            // Manual tests are run by a human; there is nothing to automate.
            if definition.executor_dialect == Dialect::Manual {
                continue;
            }
            let platform = Platform::from_tag(tag);
            match preparer.prepare(&definition, platform) {
                Ok(prepared) => {
                    ability
                        .platforms
                        .entry(platform.as_str().to_string())
                        .or_default()
                        .insert(definition.executor_dialect.as_str().to_string(), prepared);
                    stats.ingested += 1;
                }
                // One platform failing must not take the others down.
                Err(err) => {
                    debug!(%err, technique = %definition.technique_id, %platform, "platform block failed");
                    stats.errors += 1;
                }
            }
        }

        if !ability.is_empty() {
            self.persist(&ability, &tactic)?;
        }
        Ok(stats)
    }

    fn persist(&self, ability: &Ability, tactic: &str) -> Result<()> {
        let dir = self.config.abilities_dir().join(tactic);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.yml", ability.id));
        // Abilities are stored as a one-element sequence.
        let encoded = serde_yaml::to_string(&[ability])?;
        fs::write(path, encoded)?;
        Ok(())
    }
}
