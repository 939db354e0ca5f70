//! Version evolution manager
//!
//! Pure bookkeeping: read the current version, compute the next one, and
//! splice an updated `project.versioning.current` plus exactly one new
//! history entry into a candidate document. The rest of the document is
//! never inspected here.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use evospec_utils::error::DocumentError;

/// Semantic-version increment applied on a successful evolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Major,
    #[default]
    Minor,
    Patch,
    /// Keep the version; the ledger still records the change.
    None,
}

impl BumpKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::None => "none",
        }
    }

    /// Next version after `version`. Pre-release and build metadata are dropped
    /// by every bump except `None`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::MalformedVersion` when the bumped component is
    /// already `u64::MAX`.
    pub fn apply(self, version: &Version) -> Result<Version, DocumentError> {
        let overflow = || DocumentError::MalformedVersion {
            value: version.to_string(),
            reason: format!("{self} bump overflows"),
        };
        Ok(match self {
            Self::Major => Version::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            Self::Minor => Version::new(
                version.major,
                version.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            Self::Patch => Version::new(
                version.major,
                version.minor,
                version.patch.checked_add(1).ok_or_else(overflow)?,
            ),
            Self::None => version.clone(),
        })
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bump '{0}': expected major, minor, patch, or none")]
pub struct ParseBumpError(String);

impl FromStr for BumpKind {
    type Err = ParseBumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "none" => Ok(Self::None),
            _ => Err(ParseBumpError(s.to_string())),
        }
    }
}

/// Bump a version string.
///
/// ```rust
/// use evospec_engine::version::{BumpKind, bump};
///
/// assert_eq!(bump("1.2.3", BumpKind::Major).unwrap(), "2.0.0");
/// assert_eq!(bump("1.2.3", BumpKind::Minor).unwrap(), "1.3.0");
/// assert_eq!(bump("1.2.3", BumpKind::Patch).unwrap(), "1.2.4");
/// assert_eq!(bump("1.2.3", BumpKind::None).unwrap(), "1.2.3");
/// ```
///
/// # Errors
///
/// Returns `DocumentError::MalformedVersion` if `version` is not semver or
/// the bump overflows.
pub fn bump(version: &str, kind: BumpKind) -> Result<String, DocumentError> {
    Ok(kind.apply(&parse_version(version)?)?.to_string())
}

fn parse_version(raw: &str) -> Result<Version, DocumentError> {
    Version::parse(raw.trim()).map_err(|e| DocumentError::MalformedVersion {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Version change computed for one evolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTransition {
    pub previous: Version,
    pub next: Version,
    pub bump: BumpKind,
}

/// One entry of the append-only history ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(rename = "basedOn")]
    pub based_on: Option<String>,
    #[serde(default)]
    pub changes: Vec<String>,
    #[serde(default)]
    pub migrations: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl VersionEntry {
    /// Entry recording `change` on top of `transition.previous`.
    ///
    /// A blank change description yields an empty `changes` list.
    #[must_use]
    pub fn for_change(transition: &VersionTransition, change: &str) -> Self {
        let change = change.trim();
        Self {
            version: transition.next.to_string(),
            based_on: Some(transition.previous.to_string()),
            changes: if change.is_empty() {
                Vec::new()
            } else {
                vec![change.to_string()]
            },
            migrations: Vec::new(),
            notes: String::new(),
        }
    }
}

/// Everything needed to finalize candidates for one evolution run.
///
/// Built once from the input document before any model call, so a broken
/// input fails fast.
#[derive(Debug, Clone)]
pub struct EvolutionPlan {
    pub transition: VersionTransition,
    /// Ledger of the input document, carried over verbatim
    pub history: Vec<Value>,
    pub entry: VersionEntry,
}

impl EvolutionPlan {
    /// # Errors
    ///
    /// Any `DocumentError` means the input document cannot be evolved.
    pub fn new(document: &str, change: &str, bump: BumpKind) -> Result<Self, DocumentError> {
        let root = parse_mapping(document)?;
        let previous = current_version(&root)?;
        let history = match root.get("history") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(entries)) => entries.clone(),
            Some(_) => return Err(DocumentError::MalformedHistory),
        };
        check_ledger_head(&history, &previous)?;

        let transition = VersionTransition {
            next: bump.apply(&previous)?,
            previous,
            bump,
        };
        let entry = VersionEntry::for_change(&transition, change);

        Ok(Self {
            transition,
            history,
            entry,
        })
    }

    /// Stamp the planned version and ledger onto a candidate document.
    ///
    /// Whatever the candidate wrote under `history` is replaced by the input
    /// ledger plus the one planned entry, so the output ledger is always
    /// exactly one entry longer than the input's.
    ///
    /// # Errors
    ///
    /// Fails when the candidate is not a YAML mapping or its `project` block
    /// is not a mapping.
    pub fn finalize(&self, candidate: &str) -> Result<String, DocumentError> {
        let mut root = parse_mapping(candidate)?;

        let project = root
            .entry(Value::from("project"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        let Value::Mapping(project) = project else {
            return Err(DocumentError::MissingVersion);
        };
        let versioning = project
            .entry(Value::from("versioning"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        let Value::Mapping(versioning) = versioning else {
            return Err(DocumentError::MissingVersion);
        };
        versioning.insert(
            Value::from("current"),
            Value::from(self.transition.next.to_string()),
        );

        let entry = serde_yaml::to_value(&self.entry).map_err(|e| DocumentError::Unparseable {
            reason: e.to_string(),
        })?;
        let mut ledger = self.history.clone();
        ledger.push(entry);
        root.insert(Value::from("history"), Value::Sequence(ledger));

        serde_yaml::to_string(&Value::Mapping(root)).map_err(|e| DocumentError::Unparseable {
            reason: e.to_string(),
        })
    }
}

/// Read `project.versioning.current` from a document.
///
/// # Errors
///
/// - `Unparseable` / `NotAMapping` for broken documents
/// - `MissingVersion` when the field is absent
/// - `MalformedVersion` when it is not `MAJOR.MINOR.PATCH`
pub fn read_current_version(document: &str) -> Result<Version, DocumentError> {
    current_version(&parse_mapping(document)?)
}

/// The new entry is based on `current`, so the input ledger must already end there.
fn check_ledger_head(history: &[Value], current: &Version) -> Result<(), DocumentError> {
    let Some(last) = history.last() else {
        return Err(DocumentError::EmptyHistory {
            current: current.to_string(),
        });
    };
    let raw = match last.get("version") {
        Some(Value::String(raw)) => raw.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    match Version::parse(raw.trim()) {
        Ok(version) if version == *current => Ok(()),
        _ => Err(DocumentError::HistoryOutOfSync {
            current: current.to_string(),
            last: raw,
        }),
    }
}

fn parse_mapping(document: &str) -> Result<Mapping, DocumentError> {
    match serde_yaml::from_str::<Value>(document) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(_) => Err(DocumentError::NotAMapping),
        Err(e) => Err(DocumentError::Unparseable {
            reason: e.to_string(),
        }),
    }
}

fn current_version(root: &Mapping) -> Result<Version, DocumentError> {
    let current = root
        .get("project")
        .and_then(|p| p.get("versioning"))
        .and_then(|v| v.get("current"));

    match current {
        None | Some(Value::Null) => Err(DocumentError::MissingVersion),
        Some(Value::String(raw)) => parse_version(raw),
        Some(Value::Number(n)) => parse_version(&n.to_string()),
        Some(_) => Err(DocumentError::MalformedVersion {
            value: "<non-scalar>".to_string(),
            reason: "expected a MAJOR.MINOR.PATCH string".to_string(),
        }),
    }
}
