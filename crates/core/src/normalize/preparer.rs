use super::comments::strip_line;
use super::joiner::join_lines;
use super::paths::PathResolver;
use super::variables::VariableResolver;
use super::{prereq, Resolved};
use crate::error::{Error, Result};
use crate::payload::PayloadStore;
use crate::types::{Dialect, Platform, PreparedCommand, TestDefinition};
use std::path::Path;
use tracing::debug;

/// Placeholders the execution agent fills in at run time; a command that
/// carries one must never go through default substitution.
pub const DEFAULT_RESERVED_TOKENS: &[&str] = &["#{paw}", "#{server}", "#{group}", "#{location}"];

/// Turns one raw `(command, cleanup)` pair plus its dependency list into
/// the final prepared command, cleanup, and payload list for one platform.
///
/// Holds only borrowed collaborators; nothing persists across calls.
pub struct CommandPreparer<'a> {
    corpus_root: &'a Path,
    store: &'a PayloadStore,
    reserved_tokens: Vec<String>,
}

impl<'a> CommandPreparer<'a> {
    pub fn new(corpus_root: &'a Path, store: &'a PayloadStore) -> Self {
        Self {
            corpus_root,
            store,
            reserved_tokens: DEFAULT_RESERVED_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_reserved_tokens(mut self, tokens: Vec<String>) -> Self {
        self.reserved_tokens = tokens;
        self
    }

    /// Prepare the command/cleanup pair of `test` for one platform.
    pub fn prepare(&self, test: &TestDefinition, platform: Platform) -> Result<PreparedCommand> {
        let dialect = test.executor_dialect;

        let mut command = test.raw_command.clone();
        // Fold right-to-left so the first declared dependency reads first
        // in the staged output.
        for dep in test.dependencies.iter().rev() {
            let prereq_dialect = dep.dialect.unwrap_or(dialect);
            match prereq::stage(
                &dep.prereq_test,
                &dep.install_command,
                prereq_dialect,
                dialect,
                &command,
            ) {
                Ok(staged) => command = staged,
                Err(Error::UnextractablePrerequisite(reason)) => {
                    debug!(%reason, technique = %test.technique_id, "skipping dependency");
                }
                Err(err) => return Err(err),
            }
        }

        let command = self.prepare_text(&command, test, platform, dialect);
        let cleanup = self.prepare_text(&test.raw_cleanup, test, platform, dialect);

        let mut payloads = command.payloads;
        payloads.extend(cleanup.payloads);
        Ok(PreparedCommand {
            command: command.text,
            cleanup: cleanup.text,
            payloads,
        })
    }

    /// Variables, then corpus paths, then comment stripping and line
    /// joining. Command and cleanup each go through this independently.
    fn prepare_text(
        &self,
        text: &str,
        test: &TestDefinition,
        platform: Platform,
        dialect: Dialect,
    ) -> Resolved {
        let paths = PathResolver::new(self.corpus_root, self.store);
        let vars = VariableResolver::new(&paths, &self.reserved_tokens);

        let resolved = vars.resolve(text, &test.input_arguments, platform);
        let mut after_paths = paths.resolve(&resolved.text, platform);

        let mut payloads = resolved.payloads;
        payloads.append(&mut after_paths.payloads);

        Resolved {
            text: flatten_command(&after_paths.text, dialect),
            payloads,
        }
    }
}

/// Strip comments and join a multi-line script into one command line.
/// Manual and unknown dialects pass through untouched.
pub fn flatten_command(command: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Cmd | Dialect::Sh | Dialect::Psh => {
            let lines: Vec<String> = command
                .lines()
                .filter_map(|line| strip_line(line, dialect))
                .collect();
            join_lines(&lines, dialect)
        }
        _ => command.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_cmd_drops_comment_lines() {
        let script = "command1\nREM a note\n:: another note\ncommand2\n@ REM quiet note\ncommand3";
        assert_eq!(
            flatten_command(script, Dialect::Cmd),
            "command1 && command2 && command3"
        );
    }

    #[test]
    fn test_flatten_sh_strips_and_joins() {
        let script = "# header\ncommand1 # trailing\ncommand2\n\ncommand3";
        assert_eq!(
            flatten_command(script, Dialect::Sh),
            "command1; command2; command3"
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        for dialect in [Dialect::Cmd, Dialect::Sh, Dialect::Psh] {
            let script = "command1\ncommand2\ncommand3";
            let once = flatten_command(script, dialect);
            assert_eq!(flatten_command(&once, dialect), once);
        }

        let looped = "for port in {1..65535};\ndo \ninner1;\ninner2\ndone";
        let once = flatten_command(looped, Dialect::Sh);
        assert_eq!(once, "for port in {1..65535}; do inner1; inner2; done");
        assert_eq!(flatten_command(&once, Dialect::Sh), once);
    }

    #[test]
    fn test_flatten_unknown_dialect_passes_through() {
        let script = "step one\nstep two";
        assert_eq!(flatten_command(script, Dialect::Unknown), script);
        assert_eq!(flatten_command(script, Dialect::Manual), script);
    }
}
