//! Integration test for end-to-end corpus ingestion

use atomizer_core::corpus::TacticMap;
use atomizer_core::{Ability, IngestConfig, IngestService, IngestStats};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

const TECHNIQUE_YAML: &str = r#"
attack_technique: T1059
display_name: Command and Scripting Interpreter
atomic_tests:
  - name: Run dropped script
    description: Executes the bundled script.
    supported_platforms:
      - linux
    input_arguments:
      script_path:
        type: path
        description: Script to execute
        default: PathToAtomicsFolder/T1059/src/payload.sh
    executor:
      name: sh
      command: |
        # stage the script
        chmod +x #{script_path}
        sh #{script_path}
      cleanup_command: |
        rm -f #{script_path}
  - name: Broken record
    description: Missing platforms.
    executor:
      name: sh
      command: echo hi
  - name: Operator only
    description: Manual steps for a human.
    supported_platforms:
      - linux
    executor:
      name: manual
"#;

fn write_corpus(config: &IngestConfig) {
    let technique_dir = config.atomics_dir().join("T1059");
    fs::create_dir_all(technique_dir.join("src")).unwrap();
    fs::write(technique_dir.join("T1059.yaml"), TECHNIQUE_YAML).unwrap();
    fs::write(
        technique_dir.join("src/payload.sh"),
        "#!/bin/sh\necho pwned\n",
    )
    .unwrap();

    let bundle = json!({
        "objects": [{
            "type": "attack-pattern",
            "external_references": [
                {"source_name": "mitre-attack", "external_id": "T1059"}
            ],
            "kill_chain_phases": [
                {"kill_chain_name": "mitre-attack", "phase_name": "execution"}
            ]
        }]
    });
    let bundle_path = config.attack_bundle_path();
    fs::create_dir_all(bundle_path.parent().unwrap()).unwrap();
    fs::write(bundle_path, serde_json::to_string(&bundle).unwrap()).unwrap();
}

#[test]
fn test_ingest_corpus_end_to_end() {
    let temp = TempDir::new().unwrap();
    let config = IngestConfig::with_base(temp.path());
    write_corpus(&config);

    let tactics = TacticMap::from_attack_file(&config.attack_bundle_path()).unwrap();
    let service = IngestService::new(config.clone(), tactics);
    let stats = service.ingest_corpus().unwrap();

    // One sh block ingested, one manual block counted but skipped, one
    // malformed record recorded as an error.
    assert_eq!(
        stats,
        IngestStats {
            ingested: 1,
            total: 2,
            errors: 1,
        }
    );

    let tactic_dir = config.abilities_dir().join("execution");
    let ability_files: Vec<_> = fs::read_dir(&tactic_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    assert_eq!(ability_files.len(), 1);

    let encoded = fs::read_to_string(&ability_files[0]).unwrap();
    let abilities: Vec<Ability> = serde_yaml::from_str(&encoded).unwrap();
    assert_eq!(abilities.len(), 1);
    let ability = &abilities[0];

    assert_eq!(ability.name, "Run dropped script");
    assert_eq!(ability.tactic, "execution");
    assert_eq!(ability.technique.attack_id, "T1059");
    assert_eq!(ability.technique.name, "Command and Scripting Interpreter");

    let prepared = &ability.platforms["linux"]["sh"];
    assert_eq!(prepared.payloads.len(), 2);
    let payload = prepared.payloads[0].clone();
    assert!(payload.ends_with("_payload.sh"));
    assert_eq!(
        prepared.command,
        format!("chmod +x {payload}; sh {payload}")
    );
    assert_eq!(prepared.cleanup, format!("rm -f {payload}"));
    assert!(config.payloads_dir.join(&payload).is_file());
}

#[test]
fn test_ingest_twice_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let config = IngestConfig::with_base(temp.path());
    write_corpus(&config);

    let tactics = TacticMap::from_attack_file(&config.attack_bundle_path()).unwrap();
    let service = IngestService::new(config.clone(), tactics);
    let first = service.ingest_corpus().unwrap();
    let second = service.ingest_corpus().unwrap();
    assert_eq!(first, second);

    // The payload is stored once, under its content-addressed name.
    let payloads: Vec<_> = fs::read_dir(&config.payloads_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(payloads.len(), 1);
}
