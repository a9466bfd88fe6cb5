use super::Resolved;
use crate::payload::PayloadStore;
use crate::types::Platform;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Matches the corpus-root marker followed by a relative path in either
/// POSIX or Windows style. Path segments stop at the first space or
/// newline, so surrounding shell text is never swallowed.
fn atomics_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$?PathToAtomicsFolder((?:/[^/ \n]+)+|(?:\\[^\\ \n]+)+)").unwrap()
    })
}

/// Replace `\` separators with `/` for windows paths; every other platform
/// keeps its path untouched.
pub fn normalize_separators(path: &str, platform: Platform) -> String {
    if platform == Platform::Windows {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

/// Resolves corpus-relative path expressions to ingested payload names.
pub struct PathResolver<'a> {
    corpus_root: &'a Path,
    store: &'a PayloadStore,
}

impl<'a> PathResolver<'a> {
    pub fn new(corpus_root: &'a Path, store: &'a PayloadStore) -> Self {
        Self { corpus_root, store }
    }

    /// Handle the first corpus-relative path expression in `input`.
    ///
    /// When the expression names an existing regular file under `atomics/`,
    /// the file is ingested and every occurrence of the matched expression
    /// is replaced by the returned payload name. A path that does not
    /// resolve is a no-op, not an error.
    pub fn resolve(&self, input: &str, platform: Platform) -> Resolved {
        if let Some(caps) = atomics_path_regex().captures(input) {
            let full = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let rel = normalize_separators(&caps[1], platform);

            // The captured path always begins with a separator.
            let candidate = self.corpus_root.join("atomics").join(&rel[1..]);
            if candidate.is_file() {
                match self.store.ingest(&candidate) {
                    Ok(name) => {
                        return Resolved {
                            text: input.replace(full, &name),
                            payloads: vec![name],
                        };
                    }
                    Err(err) => {
                        debug!(%err, path = %candidate.display(), "payload ingest failed");
                    }
                }
            }
        }
        Resolved::unchanged(input)
    }
}
