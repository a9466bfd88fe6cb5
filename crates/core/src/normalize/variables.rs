use super::paths::PathResolver;
use super::Resolved;
use crate::types::{InputArgument, Platform};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Matches `#{identifier}` placeholders; non-greedy and DOTALL so a stray
/// brace never swallows the rest of a multi-line script.
fn variable_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)#\{(.*?)\}").unwrap())
}

/// Substitutes `#{name}` placeholders with their declared default values.
///
/// Defaults are routed through [`PathResolver`] first, so a default that
/// names a corpus-relative file turns into a payload reference.
pub struct VariableResolver<'a> {
    paths: &'a PathResolver<'a>,
    reserved_tokens: &'a [String],
}

impl<'a> VariableResolver<'a> {
    pub fn new(paths: &'a PathResolver<'a>, reserved_tokens: &'a [String]) -> Self {
        Self {
            paths,
            reserved_tokens,
        }
    }

    /// Replace every resolvable placeholder in `input`.
    ///
    /// A string carrying any reserved token is returned unchanged: those
    /// placeholders are filled in at execution time by the agent, and
    /// expanding around them would corrupt the command. Placeholders with
    /// no declared default stay as literal text. The scan is bounded by
    /// the placeholder count found up front, so it always terminates.
    pub fn resolve(
        &self,
        input: &str,
        args: &BTreeMap<String, InputArgument>,
        platform: Platform,
    ) -> Resolved {
        if self.reserved_tokens.iter().any(|t| input.contains(t.as_str())) {
            return Resolved::unchanged(input);
        }

        let mut text = input.to_string();
        let mut payloads = Vec::new();
        let max_passes = variable_regex().find_iter(input).count();
        let mut unresolvable: HashSet<String> = HashSet::new();

        for _ in 0..max_passes {
            let Some((full, name)) = next_placeholder(&text, &unresolvable) else {
                break;
            };
            match args.get(&name).and_then(|arg| arg.default.as_deref()) {
                Some(default) => {
                    let resolved = self.paths.resolve(default, platform);
                    payloads.extend(resolved.payloads);
                    text = text.replace(&full, &resolved.text);
                }
                None => {
                    unresolvable.insert(name);
                }
            }
        }

        Resolved { text, payloads }
    }
}

/// First placeholder in `text` that has not already been ruled out.
fn next_placeholder(text: &str, unresolvable: &HashSet<String>) -> Option<(String, String)> {
    variable_regex()
        .captures_iter(text)
        .map(|caps| (caps[0].to_string(), caps[1].to_string()))
        .find(|(_, name)| !unresolvable.contains(name))
}
