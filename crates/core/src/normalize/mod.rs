//! Command normalization: turns raw, loosely structured shell text from a
//! test record into a single executable command line per dialect.

mod comments;
mod joiner;
mod paths;
mod preparer;
mod prereq;
mod variables;

pub use comments::strip_line;
pub use joiner::join_lines;
pub use paths::{normalize_separators, PathResolver};
pub use preparer::{flatten_command, CommandPreparer, DEFAULT_RESERVED_TOKENS};
pub use prereq::stage;
pub use variables::VariableResolver;

/// Outcome of a resolution pass over one string: the possibly rewritten
/// text plus any payload names produced along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub payloads: Vec<String>,
}

impl Resolved {
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            payloads: Vec::new(),
        }
    }
}
