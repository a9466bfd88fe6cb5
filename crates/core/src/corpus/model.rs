use crate::error::{Error, Result};
use crate::types::{Dependency, Dialect, InputArgument, TestDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One technique file from the corpus (`atomics/T*/T*.yaml`), as authored
/// upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueRecord {
    pub attack_technique: String,
    pub display_name: String,
    #[serde(default)]
    pub atomic_tests: Vec<AtomicTest>,
}

/// One test block inside a technique file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicTest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supported_platforms: Vec<String>,
    #[serde(default)]
    pub executor: Option<ExecutorSpec>,
    #[serde(default)]
    pub input_arguments: BTreeMap<String, InputArgumentSpec>,
    #[serde(default)]
    pub dependency_executor_name: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorSpec {
    pub name: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub cleanup_command: Option<String>,
    #[serde(default)]
    pub elevation_required: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputArgumentSpec {
    #[serde(default, rename = "type")]
    pub arg_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Any YAML scalar; rendered to its string form at conversion.
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySpec {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prereq_command: Option<String>,
    #[serde(default)]
    pub get_prereq_command: Option<String>,
}

impl AtomicTest {
    /// Stable ability id derived from the test's canonical JSON form.
    pub fn ability_id(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        Ok(format!("{:x}", md5::compute(canonical.as_bytes())))
    }

    /// Flatten into the engine's view, validating required fields.
    pub fn to_definition(&self, technique: &TechniqueRecord) -> Result<TestDefinition> {
        if self.supported_platforms.is_empty() {
            return Err(Error::MalformedTestRecord(format!(
                "{} '{}': missing supported_platforms",
                technique.attack_technique, self.name
            )));
        }
        let executor = self.executor.as_ref().ok_or_else(|| {
            Error::MalformedTestRecord(format!(
                "{} '{}': missing executor",
                technique.attack_technique, self.name
            ))
        })?;

        let dialect = Dialect::from_executor(&executor.name);
        let raw_command = match &executor.command {
            Some(command) => command.clone(),
            // Manual tests carry operator steps instead of a command.
            None if dialect == Dialect::Manual => String::new(),
            None => {
                return Err(Error::MalformedTestRecord(format!(
                    "{} '{}': executor has no command",
                    technique.attack_technique, self.name
                )));
            }
        };

        let input_arguments = self
            .input_arguments
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    InputArgument {
                        arg_type: spec.arg_type.clone(),
                        default: spec.default.as_ref().and_then(scalar_to_string),
                    },
                )
            })
            .collect();

        let dependency_dialect = self
            .dependency_executor_name
            .as_deref()
            .map(Dialect::from_executor);
        let dependencies = self
            .dependencies
            .iter()
            .filter_map(|dep| match (&dep.prereq_command, &dep.get_prereq_command) {
                (Some(check), Some(install)) => Some(Dependency {
                    prereq_test: check.clone(),
                    install_command: install.clone(),
                    dialect: dependency_dialect,
                }),
                // A dependency without both halves cannot be staged.
                _ => None,
            })
            .collect();

        Ok(TestDefinition {
            technique_id: technique.attack_technique.clone(),
            display_name: technique.display_name.clone(),
            test_name: self.name.clone(),
            description: self.description.clone(),
            supported_platforms: self.supported_platforms.clone(),
            executor_dialect: dialect,
            raw_command,
            raw_cleanup: executor.cleanup_command.clone().unwrap_or_default(),
            input_arguments,
            dependencies,
        })
    }
}

/// String form of a YAML scalar default. Mappings and sequences have no
/// usable string form and resolve to nothing.
fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
