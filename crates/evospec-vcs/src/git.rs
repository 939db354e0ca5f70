use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::{CommandSpec, VcsAdapter, VcsError};

/// Git adapter rooted at a working directory.
///
/// Git is located on `PATH` per call; a missing binary reports
/// [`VcsError::NotAvailable`] rather than a spawn failure.
#[derive(Debug, Clone)]
pub struct GitVcs {
    root: Utf8PathBuf,
}

impl GitVcs {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("git")
            .cwd(self.root.as_std_path())
            .env("GIT_TERMINAL_PROMPT", "0")
    }

    /// Run git and return trimmed stdout; non-zero exit becomes `CommandFailed`.
    async fn run(&self, spec: CommandSpec) -> Result<String, VcsError> {
        let git = which::which("git").map_err(|_| VcsError::NotAvailable)?;
        let spec = CommandSpec { program: git.into_os_string(), ..spec };
        let command = spec.display_args();

        debug!(root = %self.root, command = %command, "Running git");

        let output = spec
            .to_tokio_command()
            .output()
            .await
            .map_err(|e| VcsError::Spawn {
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(VcsError::CommandFailed { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VcsAdapter for GitVcs {
    async fn is_available(&self) -> bool {
        which::which("git").is_ok()
    }

    async fn is_repo(&self) -> bool {
        let spec = self.command().args(["rev-parse", "--is-inside-work-tree"]);
        matches!(self.run(spec).await.as_deref(), Ok("true"))
    }

    async fn init(&self) -> Result<(), VcsError> {
        self.run(self.command().arg("init")).await.map(|_| ())
    }

    async fn add(&self, path: &Utf8Path) -> Result<(), VcsError> {
        // git runs inside `root`, so a caller-relative path must be anchored first.
        let path = std::path::absolute(path).map_err(|e| VcsError::Spawn {
            reason: format!("cannot resolve {path}: {e}"),
        })?;
        let spec = self.command().args(["add", "--"]).arg(path);
        self.run(spec).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<String, VcsError> {
        self.run(self.command().args(["commit", "-m"]).arg(message))
            .await?;
        self.run(self.command().args(["rev-parse", "HEAD"])).await
    }

    async fn tag(&self, name: &str, message: &str) -> Result<(), VcsError> {
        let spec = self
            .command()
            .args(["tag", "-a"])
            .arg(name)
            .arg("-m")
            .arg(message);
        self.run(spec).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    async fn configured_repo(dir: &TempDir) -> GitVcs {
        let git = GitVcs::new(utf8(dir));
        git.init().await.unwrap();
        for (key, value) in [
            ("user.name", "evospec tests"),
            ("user.email", "tests@evospec.invalid"),
            ("commit.gpgsign", "false"),
            ("tag.gpgsign", "false"),
        ] {
            git.run(git.command().args(["config", key, value]))
                .await
                .unwrap();
        }
        git
    }

    #[tokio::test]
    async fn test_plain_directory_is_not_a_repo() {
        let dir = TempDir::new().unwrap();
        let git = GitVcs::new(utf8(&dir));
        assert_eq!(git.root(), utf8(&dir));
        if !git.is_available().await {
            return;
        }
        assert!(!git.is_repo().await);
    }

    #[tokio::test]
    async fn test_add_commit_tag() {
        let dir = TempDir::new().unwrap();
        if which::which("git").is_err() {
            return;
        }
        let git = configured_repo(&dir).await;
        assert!(git.is_repo().await);

        let file = utf8(&dir).join("shop.evospec.yaml");
        std::fs::write(&file, "spec: evospec/v1\n").unwrap();

        git.add(&file).await.unwrap();
        let commit = git.commit("Initial spec").await.unwrap();
        assert_eq!(commit.len(), 40);

        git.tag("v1.0.0", "Initial spec").await.unwrap();
        let tags = git.run(git.command().args(["tag", "--list"])).await.unwrap();
        assert_eq!(tags, "v1.0.0");
    }

    #[tokio::test]
    async fn test_commit_without_changes_fails() {
        let dir = TempDir::new().unwrap();
        if which::which("git").is_err() {
            return;
        }
        let git = configured_repo(&dir).await;

        match git.commit("nothing").await {
            Err(VcsError::CommandFailed { command, .. }) => {
                assert_eq!(command, "commit -m nothing");
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }
}
