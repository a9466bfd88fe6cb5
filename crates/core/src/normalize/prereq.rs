use crate::error::{Error, Result};
use crate::types::Dialect;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Install commands that are only a quoted message to the operator, not
/// something an agent can run.
fn message_install_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)^\s*(echo|write-host)\s+["']"#).unwrap())
}

/// Synthesize a conditional preamble that installs a dependency before the
/// main command runs, bridging dialects where possible.
///
/// The rewriting is best-effort string surgery over the check expression's
/// branch tokens, not a shell parse. A check the heuristics cannot take
/// apart is reported as [`Error::UnextractablePrerequisite`] so the caller
/// can skip the dependency; an unsupported dialect bridge falls back to the
/// unmodified command.
pub fn stage(
    prereq_test: &str,
    install_command: &str,
    prereq_dialect: Dialect,
    target_dialect: Dialect,
    existing_command: &str,
) -> Result<String> {
    if !prereq_test.contains("exit") {
        return Err(Error::UnextractablePrerequisite(
            "check has no exit-code branch".to_string(),
        ));
    }
    if message_install_regex().is_match(install_command) {
        return Err(Error::UnextractablePrerequisite(
            "install command is only an operator message".to_string(),
        ));
    }

    let preamble = match prereq_dialect {
        Dialect::Sh => stage_sh(prereq_test, install_command)?,
        Dialect::Psh => stage_psh(prereq_test, install_command)?,
        Dialect::Cmd => stage_cmd(prereq_test, install_command)?,
        other => {
            return Err(Error::UnextractablePrerequisite(format!(
                "no staging rule for dialect {other}"
            )));
        }
    };

    Ok(bridge(
        &preamble,
        prereq_dialect,
        target_dialect,
        existing_command,
    ))
}

/// sh checks read `if <cond>; then exit X; else exit Y; fi`. The second
/// segment tells which branch signals a missing prerequisite.
fn stage_sh(check: &str, install: &str) -> Result<String> {
    let mut segments = check.splitn(3, ';');
    let head = segments.next().unwrap_or_default();
    let exit_branch = segments.next().ok_or_else(|| {
        Error::UnextractablePrerequisite("sh check has no branch after the condition".to_string())
    })?;

    if exit_branch.contains("exit 1") {
        Ok(format!("{head}; then {install}; fi;"))
    } else {
        Ok(format!("{head}; then : ; else {install}; fi;"))
    }
}

/// psh checks either wrap the probe in `Try {..} Catch {..}` with exit
/// markers, or read `if (<cond>) {exit X} else {exit Y}`.
fn stage_psh(check: &str, install: &str) -> Result<String> {
    if check.trim_start().to_ascii_lowercase().starts_with("try") {
        // Exit markers are replaced in place: the failure marker becomes
        // the install command, the success marker an empty continuation.
        return Ok(check.replace("exit 1", install).replace("exit 0", ""));
    }

    let shape_err =
        || Error::UnextractablePrerequisite("psh check has no condition/branch shape".to_string());
    let brace = check.find('{').ok_or_else(shape_err)?;
    let head_end = check[..brace].rfind(')').ok_or_else(shape_err)?;
    let head = &check[..head_end];
    let first_branch = match check[brace..].find('}') {
        Some(end) => &check[brace + 1..brace + end],
        None => return Err(shape_err()),
    };

    if first_branch.contains("exit 1") {
        Ok(format!("{head}) {{{install}}}"))
    } else {
        Ok(format!("{head}) {{ ; }} else {{{install}}}"))
    }
}

/// cmd checks read `if <cond> (exit /b X) else (exit /b Y)`.
fn stage_cmd(check: &str, install: &str) -> Result<String> {
    let paren = check.find('(').ok_or_else(|| {
        Error::UnextractablePrerequisite("cmd check has no branch parentheses".to_string())
    })?;
    let head = check[..paren].trim_end();
    let rest = &check[paren + 1..];
    let first_branch = match rest.to_ascii_lowercase().find("else") {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    if first_branch.contains("exit 1") || first_branch.contains("exit /b 1") {
        Ok(format!("{head} ({install})"))
    } else {
        Ok(format!("{head} ( call ) ELSE ( {install} )"))
    }
}

/// Prepend the staged preamble to the existing command, crossing dialects
/// only where the host shell allows it.
fn bridge(preamble: &str, prereq_dialect: Dialect, target_dialect: Dialect, existing: &str) -> String {
    if prereq_dialect == target_dialect {
        return format!("{preamble}\n{existing}");
    }
    match (prereq_dialect, target_dialect) {
        // cmd runs fine from a powershell session.
        (Dialect::Cmd, Dialect::Psh) => format!("{preamble}\n{existing}"),
        (Dialect::Psh, Dialect::Cmd) => {
            format!("powershell -command \"{preamble}\n{existing}\"")
        }
        (from, to) => {
            warn!(%from, %to, "unsupported prerequisite dialect bridge, dependency dropped");
            existing.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTALL_SH: &str = "apt-get install -y gcc";
    const EXISTING_SH: &str = "gcc demo.c";

    #[test]
    fn test_sh_falsy_check_installs_in_then_branch() {
        let check = "if [ ! -x /usr/bin/gcc ]; then exit 1; else exit 0; fi;";
        let staged = stage(check, INSTALL_SH, Dialect::Sh, Dialect::Sh, EXISTING_SH).unwrap();
        assert_eq!(
            staged,
            "if [ ! -x /usr/bin/gcc ]; then apt-get install -y gcc; fi;\ngcc demo.c"
        );
    }

    #[test]
    fn test_sh_truthy_check_installs_in_else_branch() {
        let check = "if [ -x /usr/bin/gcc ]; then exit 0; else exit 1; fi;";
        let staged = stage(check, INSTALL_SH, Dialect::Sh, Dialect::Sh, EXISTING_SH).unwrap();
        assert_eq!(
            staged,
            "if [ -x /usr/bin/gcc ]; then : ; else apt-get install -y gcc; fi;\ngcc demo.c"
        );
    }

    #[test]
    fn test_psh_try_check_substitutes_exit_markers() {
        let check = "Try { Get-Command curl | Out-Null; exit 0 } Catch { exit 1 }";
        let staged = stage(
            check,
            "choco install curl",
            Dialect::Psh,
            Dialect::Psh,
            "curl.exe example.com",
        )
        .unwrap();
        assert_eq!(
            staged,
            "Try { Get-Command curl | Out-Null;  } Catch { choco install curl }\ncurl.exe example.com"
        );
    }

    #[test]
    fn test_psh_if_check_truthy_branch() {
        let check = "if (Test-Path C:\\tool.exe) {exit 0} else {exit 1}";
        let staged = stage(
            check,
            "Invoke-Installer",
            Dialect::Psh,
            Dialect::Psh,
            "C:\\tool.exe /run",
        )
        .unwrap();
        assert_eq!(
            staged,
            "if (Test-Path C:\\tool.exe) { ; } else {Invoke-Installer}\nC:\\tool.exe /run"
        );
    }

    #[test]
    fn test_psh_if_check_falsy_branch() {
        let check = "if (-not (Test-Path C:\\tool.exe)) {exit 1} else {exit 0}";
        let staged = stage(
            check,
            "Invoke-Installer",
            Dialect::Psh,
            Dialect::Psh,
            "C:\\tool.exe /run",
        )
        .unwrap();
        assert_eq!(
            staged,
            "if (-not (Test-Path C:\\tool.exe)) {Invoke-Installer}\nC:\\tool.exe /run"
        );
    }

    #[test]
    fn test_cmd_check_branches() {
        let falsy = "if not exist C:\\tool.exe (exit /b 1) else (exit /b 0)";
        let staged = stage(falsy, "installer.exe /s", Dialect::Cmd, Dialect::Cmd, "tool").unwrap();
        assert_eq!(staged, "if not exist C:\\tool.exe (installer.exe /s)\ntool");

        let truthy = "if exist C:\\tool.exe (exit /b 0) else (exit /b 1)";
        let staged = stage(truthy, "installer.exe /s", Dialect::Cmd, Dialect::Cmd, "tool").unwrap();
        assert_eq!(
            staged,
            "if exist C:\\tool.exe ( call ) ELSE ( installer.exe /s )\ntool"
        );
    }

    #[test]
    fn test_check_without_exit_branch_is_unextractable() {
        let err = stage("which gcc", INSTALL_SH, Dialect::Sh, Dialect::Sh, EXISTING_SH).unwrap_err();
        assert!(matches!(err, Error::UnextractablePrerequisite(_)));
    }

    #[test]
    fn test_message_install_is_unextractable() {
        let check = "if [ -x /usr/bin/gcc ]; then exit 0; else exit 1; fi;";
        let err = stage(
            check,
            "echo \"Install gcc manually from your package manager\"",
            Dialect::Sh,
            Dialect::Sh,
            EXISTING_SH,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnextractablePrerequisite(_)));

        let check = "if (Get-Command git) {exit 0} else {exit 1}";
        let err = stage(
            check,
            "Write-Host 'Please install git'",
            Dialect::Psh,
            Dialect::Psh,
            "git --version",
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnextractablePrerequisite(_)));
    }

    #[test]
    fn test_cmd_prereq_prepends_into_psh_command() {
        let check = "if not exist C:\\tool.exe (exit /b 1) else (exit /b 0)";
        let staged = stage(check, "installer.exe /s", Dialect::Cmd, Dialect::Psh, "tool").unwrap();
        assert_eq!(staged, "if not exist C:\\tool.exe (installer.exe /s)\ntool");
    }

    #[test]
    fn test_psh_prereq_wraps_cmd_command() {
        let check = "if (Test-Path C:\\tool.exe) {exit 0} else {exit 1}";
        let staged = stage(check, "Invoke-Installer", Dialect::Psh, Dialect::Cmd, "tool").unwrap();
        assert_eq!(
            staged,
            "powershell -command \"if (Test-Path C:\\tool.exe) { ; } else {Invoke-Installer}\ntool\""
        );
    }

    #[test]
    fn test_unsupported_bridge_falls_back_to_existing_command() {
        let check = "if [ -x /usr/bin/gcc ]; then exit 0; else exit 1; fi;";
        let staged = stage(check, INSTALL_SH, Dialect::Sh, Dialect::Cmd, "tool").unwrap();
        assert_eq!(staged, "tool");
    }
}
