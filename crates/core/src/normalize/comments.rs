use crate::types::Dialect;
use regex::Regex;
use std::sync::OnceLock;

/// Whole-line cmd comments: optional leading `@`, then `REM` or `::`,
/// each followed by whitespace.
fn cmd_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*@?\s*(rem|::)\s").unwrap())
}

/// Strip dialect-specific comments from one line of a multi-line command.
///
/// Returns `None` when the whole line is a comment (or blank) and should be
/// dropped, otherwise the line with any trailing comment removed. Quote
/// pairing is respected for sh/psh so a `#` inside a quoted string never
/// truncates the line.
pub fn strip_line(line: &str, dialect: Dialect) -> Option<String> {
    if line.trim().is_empty() {
        return None;
    }
    match dialect {
        Dialect::Cmd => {
            if cmd_comment_regex().is_match(line) {
                None
            } else {
                Some(line.to_string())
            }
        }
        Dialect::Sh | Dialect::Psh => strip_posix_style(line, dialect),
        _ => Some(line.to_string()),
    }
}

fn strip_posix_style(line: &str, dialect: Dialect) -> Option<String> {
    if line.trim_start().starts_with('#') {
        return None;
    }

    let mut search = 0;
    while let Some(idx) = comment_candidate(line, search) {
        let prefix = &line[..idx];
        if !inside_quotes(&remove_escaped_quotes(prefix, dialect)) {
            let kept = prefix.trim_end();
            if kept.is_empty() {
                return None;
            }
            return Some(kept.to_string());
        }
        // Candidate sits inside a quoted span, look for the next one.
        search = idx + 1;
    }
    Some(line.to_string())
}

/// Position of the next `#` that is preceded by `;` or whitespace.
fn comment_candidate(line: &str, from: usize) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (i, ch) in line.char_indices() {
        if i >= from
            && ch == '#'
            && matches!(prev, Some(p) if p == ';' || p.is_whitespace())
        {
            return Some(i);
        }
        prev = Some(ch);
    }
    None
}

/// Drop escaped-quote sequences so they cannot skew quote pairing.
fn remove_escaped_quotes(text: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Psh => text.replace("`'", "").replace("`\"", ""),
        _ => text.replace("\\'", "").replace("\\\"", ""),
    }
}

/// Pair single and double quotes left-to-right; an unterminated quote at
/// the end counts as inside, since a comment marker there must belong to
/// the quoted content.
fn inside_quotes(text: &str) -> bool {
    let mut open: Option<char> = None;
    for ch in text.chars() {
        match open {
            None if ch == '\'' || ch == '"' => open = Some(ch),
            Some(q) if ch == q => open = None,
            _ => {}
        }
    }
    open.is_some()
}
