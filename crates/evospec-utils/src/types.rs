use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered validation phases of an EvoSpec document.
///
/// Phases are cumulative: a later phase is only meaningful once the earlier
/// phases pass. The numeric value is part of the wire format (`phase: 3`).
///
/// ```text
/// Structural → Referential → Semantic → Evolution → Generation → Verifiability
/// ```
///
/// # Example
///
/// ```rust
/// use evospec_utils::types::ValidationPhase;
///
/// let phase = ValidationPhase::Semantic;
/// assert_eq!(phase.as_u8(), 3);
/// assert_eq!(phase.name(), "Semantic");
/// assert_eq!(ValidationPhase::from_u8(3), Some(phase));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ValidationPhase {
    Structural = 1,
    Referential = 2,
    Semantic = 3,
    Evolution = 4,
    Generation = 5,
    Verifiability = 6,
}

impl ValidationPhase {
    /// All phases in execution order.
    pub const ALL: [ValidationPhase; 6] = [
        ValidationPhase::Structural,
        ValidationPhase::Referential,
        ValidationPhase::Semantic,
        ValidationPhase::Evolution,
        ValidationPhase::Generation,
        ValidationPhase::Verifiability,
    ];

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Structural),
            2 => Some(Self::Referential),
            3 => Some(Self::Semantic),
            4 => Some(Self::Evolution),
            5 => Some(Self::Generation),
            6 => Some(Self::Verifiability),
            _ => None,
        }
    }

    /// Human-readable phase name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Structural => "Structural",
            Self::Referential => "Referential",
            Self::Semantic => "Semantic",
            Self::Evolution => "Evolution",
            Self::Generation => "Generation",
            Self::Verifiability => "Verifiability",
        }
    }
}

impl fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<ValidationPhase> for u8 {
    fn from(phase: ValidationPhase) -> Self {
        phase.as_u8()
    }
}

impl TryFrom<u8> for ValidationPhase {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| format!("invalid validation phase {value} (expected 1-6)"))
    }
}

/// Severity of a validation finding.
///
/// `Hard` findings always block success; `Soft` findings block only in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Hard,
    Soft,
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hard => write!(f, "hard"),
            Self::Soft => write!(f, "soft"),
        }
    }
}

/// A single finding produced by the validator.
///
/// Serialized shape:
/// `{code, message, phase, level, location?, suggestion?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Stable error code (e.g. `E201`)
    pub code: String,
    pub message: String,
    pub phase: ValidationPhase,
    pub level: ValidationLevel,
    /// Path inside the document (e.g. `domain.nodes[2].id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        phase: ValidationPhase,
        level: ValidationLevel,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            phase,
            level,
            location: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn hard(code: impl Into<String>, message: impl Into<String>, phase: ValidationPhase) -> Self {
        Self::new(code, message, phase, ValidationLevel::Hard)
    }

    #[must_use]
    pub fn soft(code: impl Into<String>, message: impl Into<String>, phase: ValidationPhase) -> Self {
        Self::new(code, message, phase, ValidationLevel::Soft)
    }

    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn is_hard(&self) -> bool {
        self.level == ValidationLevel::Hard
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at: {location})")?;
        }
        Ok(())
    }
}

/// Outcome of one validator call.
///
/// `errors` holds every finding that blocks success under the requested
/// strictness; `warnings` holds the advisory rest. `ok` is true iff `errors`
/// is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    /// Highest phase attempted
    pub phase: ValidationPhase,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Build a result, deriving `ok` from the blocking error list.
    #[must_use]
    pub fn new(
        phase: ValidationPhase,
        errors: Vec<ValidationError>,
        warnings: Vec<ValidationError>,
    ) -> Self {
        Self {
            ok: errors.is_empty(),
            phase,
            errors,
            warnings,
        }
    }

    /// Blocking findings whose level is `hard`.
    pub fn hard_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|e| e.is_hard())
    }

    /// Errors and warnings reported for a single phase.
    #[must_use]
    pub fn findings_for(
        &self,
        phase: ValidationPhase,
    ) -> (Vec<&ValidationError>, Vec<&ValidationError>) {
        let errors = self.errors.iter().filter(|e| e.phase == phase).collect();
        let warnings = self.warnings.iter().filter(|e| e.phase == phase).collect();
        (errors, warnings)
    }
}

/// Source of a configuration value.
///
/// ```rust
/// use evospec_utils::types::ConfigSource;
///
/// let json = serde_json::to_string(&ConfigSource::Cli).unwrap();
/// assert_eq!(json, r#""cli""#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}
