use std::collections::BTreeMap;

use super::platform::Dialect;

/// One platform/dialect-specific attack-technique test, flattened from the
/// corpus record format into what the normalization engine consumes.
///
/// Built once per record by the corpus loader and only read from there on.
#[derive(Debug, Clone)]
pub struct TestDefinition {
    pub technique_id: String,
    pub display_name: String,
    pub test_name: String,
    pub description: String,
    /// Raw platform tags as they appear in the record (`windows`, `macos`, ...).
    pub supported_platforms: Vec<String>,
    pub executor_dialect: Dialect,
    pub raw_command: String,
    pub raw_cleanup: String,
    pub input_arguments: BTreeMap<String, InputArgument>,
    pub dependencies: Vec<Dependency>,
}

/// A named input argument with its declared default, used for `#{name}`
/// placeholder substitution.
#[derive(Debug, Clone)]
pub struct InputArgument {
    pub arg_type: Option<String>,
    pub default: Option<String>,
}

/// A check-then-install step that must run before the main command if the
/// check does not already pass.
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Check expression expected to branch on an exit code.
    pub prereq_test: String,
    /// Command that satisfies the prerequisite when the check fails.
    pub install_command: String,
    /// Dialect of the check/install pair; defaults to the test's dialect.
    pub dialect: Option<Dialect>,
}
