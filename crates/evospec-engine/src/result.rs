//! Terminal value of one orchestration run

use serde::{Deserialize, Serialize};

use evospec_utils::types::ValidationError;

use crate::version::VersionTransition;

/// Outcome of a generation or evolution run.
///
/// Success and failure never mix: a succeeded run carries a document and no
/// errors, a failed run carries the last attempt's errors and no document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Succeeded {
        yaml: String,
        attempts: u32,
        /// Set for evolution runs
        transition: Option<VersionTransition>,
    },
    Failed {
        attempts: u32,
        /// Blocking errors of the final attempt only
        errors: Vec<ValidationError>,
    },
}

impl GenerationResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    #[must_use]
    pub fn yaml(&self) -> Option<&str> {
        match self {
            Self::Succeeded { yaml, .. } => Some(yaml),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { errors, .. } => Some(errors),
        }
    }

    #[must_use]
    pub fn transition(&self) -> Option<&VersionTransition> {
        match self {
            Self::Succeeded { transition, .. } => transition.as_ref(),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn previous_version(&self) -> Option<String> {
        self.transition().map(|t| t.previous.to_string())
    }

    #[must_use]
    pub fn new_version(&self) -> Option<String> {
        self.transition().map(|t| t.next.to_string())
    }

    /// Flat, serializable view used for `--json` output
    #[must_use]
    pub fn to_report(&self) -> GenerationReport {
        GenerationReport {
            success: self.is_success(),
            yaml: self.yaml().map(str::to_string),
            attempts: self.attempts(),
            errors: self.errors().map(<[ValidationError]>::to_vec),
            previous_version: self.previous_version(),
            new_version: self.new_version(),
        }
    }
}

/// Wire shape of a [`GenerationResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml: Option<String>,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
}
