use crate::types::Dialect;

/// Join comment-stripped lines into one executable command string.
///
/// cmd chains lines with `&&`. sh/psh use `;` statement separators, except
/// after a line that already ends in `;` or in a control-flow continuation
/// keyword (`do`, `then`), where a plain space keeps constructs like
/// `for ...; do ...; done` intact. Single-line input comes back unchanged.
pub fn join_lines(lines: &[String], dialect: Dialect) -> String {
    match dialect {
        Dialect::Cmd => lines.join(" && "),
        Dialect::Sh | Dialect::Psh => join_posix_style(lines),
        _ => lines.join("\n"),
    }
}

fn join_posix_style(lines: &[String]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push_str(line);
            continue;
        }
        if continues_statement(lines[i - 1].trim_end()) {
            if !out.ends_with(|c: char| c.is_whitespace()) {
                out.push(' ');
            }
        } else {
            while out.ends_with(|c: char| c.is_whitespace()) {
                out.pop();
            }
            out.push_str("; ");
        }
        out.push_str(line);
    }
    out
}

/// True when a right-trimmed line must not be followed by a `;` separator.
fn continues_statement(line: &str) -> bool {
    line.ends_with(';') || ends_with_keyword(line, "do") || ends_with_keyword(line, "then")
}

/// Trailing-token match: the keyword must be the whole last word, not a
/// substring of one (`sudo` does not end with the keyword `do`).
fn ends_with_keyword(line: &str, keyword: &str) -> bool {
    if !line.ends_with(keyword) {
        return false;
    }
    match line[..line.len() - keyword.len()].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || c == ';',
    }
}
