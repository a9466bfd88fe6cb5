use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

pub const DEFAULT_REPO_URL: &str = "https://github.com/redcanaryco/atomic-red-team.git";

/// Shallow-clone the corpus repository unless a non-empty checkout is
/// already present. A fork can be used via `repo_url`.
pub fn ensure_repo(repo_dir: &Path, repo_url: Option<&str>) -> Result<()> {
    if repo_dir.is_dir() && repo_dir.read_dir()?.next().is_some() {
        return Ok(());
    }

    let url = repo_url.unwrap_or(DEFAULT_REPO_URL);
    info!(%url, dir = %repo_dir.display(), "cloning corpus repository");
    let status = Command::new("git")
        .args(["clone", "--depth", "1", url])
        .arg(repo_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(Error::RepoError(format!(
            "git clone of {url} exited with {status}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_existing_checkout_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("atomic-red-team");
        fs::create_dir_all(repo.join("atomics")).unwrap();
        ensure_repo(&repo, None).unwrap();
        assert!(repo.join("atomics").is_dir());
    }
}
