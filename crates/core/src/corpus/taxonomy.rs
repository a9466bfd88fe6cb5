use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Tactic assigned to techniques absent from the taxonomy file.
pub const UNKNOWN_TACTIC: &str = "redcanary-unknown";

/// Technique-id to tactic lookup built from an ATT&CK STIX bundle. The
/// corpus records techniques but not the tactic (phase name) they belong
/// to, so the match is rebuilt from the bundle.
#[derive(Debug, Clone, Default)]
pub struct TacticMap {
    tactics: HashMap<String, Vec<String>>,
}

impl TacticMap {
    pub fn from_attack_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let bundle: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_bundle(&bundle))
    }

    pub fn from_bundle(bundle: &Value) -> Self {
        let mut tactics: HashMap<String, Vec<String>> = HashMap::new();
        for (phase_name, external_id) in attack_patterns(bundle) {
            tactics.entry(external_id).or_default().push(phase_name);
        }
        Self { tactics }
    }

    /// Collapse a technique's tactics to the single tag an ability carries:
    /// unmapped techniques fall back to [`UNKNOWN_TACTIC`], more than one
    /// tactic collapses to `"multiple"`.
    pub fn resolve(&self, technique_id: &str) -> String {
        match self.tactics.get(technique_id).map(Vec::as_slice) {
            None | Some([]) => UNKNOWN_TACTIC.to_string(),
            Some([single]) => single.clone(),
            Some(_) => "multiple".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.tactics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tactics.is_empty()
    }
}

/// `(phase_name, external_id)` couples from the bundle's `attack-pattern`
/// objects, keeping only `mitre-attack` references and kill-chain phases.
fn attack_patterns(bundle: &Value) -> Vec<(String, String)> {
    let mut couples = Vec::new();
    let Some(objects) = bundle.get("objects").and_then(Value::as_array) else {
        return couples;
    };
    for obj in objects {
        if obj.get("type").and_then(Value::as_str) != Some("attack-pattern") {
            continue;
        }
        let refs = obj.get("external_references").and_then(Value::as_array);
        let phases = obj.get("kill_chain_phases").and_then(Value::as_array);
        let (Some(refs), Some(phases)) = (refs, phases) else {
            continue;
        };
        for reference in refs {
            if reference.get("source_name").and_then(Value::as_str) != Some("mitre-attack") {
                continue;
            }
            let Some(external_id) = reference.get("external_id").and_then(Value::as_str) else {
                continue;
            };
            for phase in phases {
                if phase.get("kill_chain_name").and_then(Value::as_str) != Some("mitre-attack") {
                    continue;
                }
                if let Some(phase_name) = phase.get("phase_name").and_then(Value::as_str) {
                    couples.push((phase_name.to_string(), external_id.to_string()));
                }
            }
        }
    }
    couples
}
