//! Persist an accepted document, then best-effort VCS bookkeeping.
//!
//! Order is fixed: persist, stage, commit, tag. Only persistence can fail the
//! call. A VCS failure becomes a [`SideEffectWarning`] and skips the stages
//! after it; the written file is never rolled back.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};

use evospec_utils::atomic_write::write_file_atomic;
use evospec_utils::error::EvoSpecError;
use evospec_vcs::VcsAdapter;

/// VCS steps requested after persistence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcsPlan {
    /// Stage and commit with this message
    pub commit_message: Option<String>,
    /// Annotated tag created after the commit
    pub tag: Option<TagPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
    pub name: String,
    pub message: String,
}

impl VcsPlan {
    /// Persist only
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commit(message: impl Into<String>) -> Self {
        Self {
            commit_message: Some(message.into()),
            tag: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.tag = Some(TagPlan {
            name: name.into(),
            message: message.into(),
        });
        self
    }

    fn is_empty(&self) -> bool {
        self.commit_message.is_none() && self.tag.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsStage {
    Stage,
    Commit,
    Tag,
}

impl fmt::Display for VcsStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::Tag => "tag",
        })
    }
}

/// Non-fatal failure of one VCS stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideEffectWarning {
    pub stage: VcsStage,
    pub message: String,
}

impl fmt::Display for SideEffectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {} failed: {}", self.stage, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub path: Utf8PathBuf,
    pub bytes_written: usize,
    /// Why VCS steps were not attempted at all (no git, not a repository)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_skipped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub warnings: Vec<SideEffectWarning>,
}

impl MaterializeReport {
    fn persisted(path: &Utf8Path, bytes_written: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            bytes_written,
            vcs_skipped: None,
            commit_id: None,
            tag: None,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, stage: VcsStage, message: impl Into<String>) {
        let warning = SideEffectWarning {
            stage,
            message: message.into(),
        };
        warn!(stage = %stage, message = %warning.message, "VCS step failed");
        self.warnings.push(warning);
    }
}

/// Write `yaml` to `path`, then run the VCS steps in `plan`.
///
/// # Errors
///
/// Returns `EvoSpecError::PersistFailed` if the document cannot be written.
/// VCS failures never produce an `Err`.
pub async fn materialize(
    path: &Utf8Path,
    yaml: &str,
    vcs: Option<&dyn VcsAdapter>,
    plan: &VcsPlan,
) -> Result<MaterializeReport, EvoSpecError> {
    let persist_failed = |reason: String| EvoSpecError::PersistFailed {
        path: path.to_string(),
        reason,
    };

    let written = write_file_atomic(path, yaml).map_err(|e| persist_failed(format!("{e:#}")))?;
    info!(path = %path, bytes = written.bytes_written, "Document written");

    let mut report = MaterializeReport::persisted(path, written.bytes_written);
    if plan.is_empty() {
        return Ok(report);
    }

    let Some(vcs) = vcs else {
        report.vcs_skipped = Some("no version control adapter".to_string());
        return Ok(report);
    };
    if !vcs.is_available().await {
        report.vcs_skipped = Some("git is not installed".to_string());
        return Ok(report);
    }
    if !vcs.is_repo().await {
        report.vcs_skipped = Some("not a git repository".to_string());
        return Ok(report);
    }

    if let Some(message) = &plan.commit_message {
        if let Err(e) = vcs.add(path).await {
            report.warn(VcsStage::Stage, e.to_string());
            return Ok(report);
        }
        match vcs.commit(message).await {
            Ok(id) => {
                debug!(commit = %id, "Committed document");
                report.commit_id = Some(id);
            }
            Err(e) => {
                report.warn(VcsStage::Commit, e.to_string());
                return Ok(report);
            }
        }
    }

    if let Some(tag) = &plan.tag {
        match vcs.tag(&tag.name, &tag.message).await {
            Ok(()) => report.tag = Some(tag.name.clone()),
            Err(e) => report.warn(VcsStage::Tag, e.to_string()),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use evospec_vcs::VcsError;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ScriptedVcs {
        fail_stage: Option<VcsStage>,
        not_repo: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedVcs {
        fn failing(stage: VcsStage) -> Self {
            Self {
                fail_stage: Some(stage),
                ..Self::default()
            }
        }

        fn record(&self, call: &str, stage: VcsStage) -> Result<(), VcsError> {
            self.calls.lock().unwrap().push(call.to_string());
            if self.fail_stage == Some(stage) {
                return Err(VcsError::CommandFailed {
                    command: call.to_string(),
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VcsAdapter for ScriptedVcs {
        async fn is_available(&self) -> bool {
            true
        }
        async fn is_repo(&self) -> bool {
            !self.not_repo
        }
        async fn init(&self) -> Result<(), VcsError> {
            Ok(())
        }
        async fn add(&self, _path: &Utf8Path) -> Result<(), VcsError> {
            self.record("add", VcsStage::Stage)
        }
        async fn commit(&self, _message: &str) -> Result<String, VcsError> {
            self.record("commit", VcsStage::Commit)?;
            Ok("abc1234".to_string())
        }
        async fn tag(&self, _name: &str, _message: &str) -> Result<(), VcsError> {
            self.record("tag", VcsStage::Tag)
        }
    }

    fn target(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("shop.evospec.yaml")).unwrap()
    }

    fn full_plan() -> VcsPlan {
        VcsPlan::commit("Evolve spec: add orders").with_tag("v1.1.0", "add orders")
    }

    #[tokio::test]
    async fn test_full_sequence() {
        let dir = TempDir::new().unwrap();
        let vcs = ScriptedVcs::default();

        let report = materialize(&target(&dir), "spec: evospec/v1\n", Some(&vcs), &full_plan())
            .await
            .unwrap();

        assert_eq!(vcs.calls(), vec!["add", "commit", "tag"]);
        assert_eq!(report.commit_id.as_deref(), Some("abc1234"));
        assert_eq!(report.tag.as_deref(), Some("v1.1.0"));
        assert!(report.warnings.is_empty());
        assert_eq!(
            std::fs::read_to_string(target(&dir)).unwrap(),
            "spec: evospec/v1\n"
        );
    }

    #[tokio::test]
    async fn test_commit_failure_skips_tag_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let vcs = ScriptedVcs::failing(VcsStage::Commit);

        let report = materialize(&target(&dir), "spec: evospec/v1\n", Some(&vcs), &full_plan())
            .await
            .unwrap();

        assert_eq!(vcs.calls(), vec!["add", "commit"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].stage, VcsStage::Commit);
        assert!(report.commit_id.is_none());
        assert!(report.tag.is_none());
        assert!(target(&dir).exists());
    }

    #[tokio::test]
    async fn test_tag_failure_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let vcs = ScriptedVcs::failing(VcsStage::Tag);

        let report = materialize(&target(&dir), "x: 1\n", Some(&vcs), &full_plan())
            .await
            .unwrap();

        assert_eq!(report.commit_id.as_deref(), Some("abc1234"));
        assert_eq!(report.warnings[0].stage, VcsStage::Tag);
        assert!(report.warnings[0].to_string().starts_with("git tag failed"));
    }

    #[tokio::test]
    async fn test_outside_repository_skips_vcs() {
        let dir = TempDir::new().unwrap();
        let vcs = ScriptedVcs {
            not_repo: true,
            ..ScriptedVcs::default()
        };

        let report = materialize(&target(&dir), "x: 1\n", Some(&vcs), &full_plan())
            .await
            .unwrap();

        assert!(vcs.calls().is_empty());
        assert_eq!(report.vcs_skipped.as_deref(), Some("not a git repository"));
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("out/specs/shop.evospec.yaml"))
            .unwrap();

        let report = materialize(&path, "x: 1\n", None, &VcsPlan::none())
            .await
            .unwrap();
        assert_eq!(report.bytes_written, 5);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_persist_failure_is_the_only_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should go cannot be replaced by a file.
        let path = Utf8PathBuf::from_path_buf(dir.path().join("taken")).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let vcs = ScriptedVcs::default();
        let err = materialize(&path, "x: 1\n", Some(&vcs), &full_plan())
            .await
            .unwrap_err();

        assert!(matches!(err, EvoSpecError::PersistFailed { .. }));
        assert!(vcs.calls().is_empty());
    }
}
