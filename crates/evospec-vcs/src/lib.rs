//! Version control adapter for evospec
//!
//! The engine only sees [`VcsAdapter`]; [`GitVcs`] is the implementation the
//! CLI wires in. Every operation can fail independently of generation, and
//! callers treat those failures as warnings.

mod command_spec;
mod git;

pub use command_spec::CommandSpec;
pub use evospec_utils::error::VcsError;
pub use git::GitVcs;

use async_trait::async_trait;
use camino::Utf8Path;

/// Stage/commit/tag primitives over one working tree
#[async_trait]
pub trait VcsAdapter: Send + Sync {
    /// Whether the VCS tool is installed at all
    async fn is_available(&self) -> bool;

    /// Whether the working directory is inside a repository
    async fn is_repo(&self) -> bool;

    async fn init(&self) -> Result<(), VcsError>;

    /// Stage `path`. Relative paths are taken from the process working
    /// directory, not from the adapter's root.
    async fn add(&self, path: &Utf8Path) -> Result<(), VcsError>;

    /// Record staged changes; returns the new commit id.
    async fn commit(&self, message: &str) -> Result<String, VcsError>;

    /// Create an annotated tag on the current commit.
    async fn tag(&self, name: &str, message: &str) -> Result<(), VcsError>;
}
