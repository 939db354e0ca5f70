use thiserror::Error;

use evospec_utils::types::ValidationPhase;

/// Phase selection and strictness for one validator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Ordered, deduplicated phases; empty means all six
    pub phases: Vec<ValidationPhase>,
    /// Escalate soft findings into blocking errors
    pub strict: bool,
}

impl ValidationOptions {
    /// All six phases
    #[must_use]
    pub fn all(strict: bool) -> Self {
        Self {
            phases: ValidationPhase::ALL.to_vec(),
            strict,
        }
    }

    #[must_use]
    pub fn new(mut phases: Vec<ValidationPhase>, strict: bool) -> Self {
        phases.sort();
        phases.dedup();
        Self { phases, strict }
    }

    /// Requested phases in execution order
    #[must_use]
    pub fn effective_phases(&self) -> Vec<ValidationPhase> {
        if self.phases.is_empty() {
            ValidationPhase::ALL.to_vec()
        } else {
            self.phases.clone()
        }
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::all(false)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhaseRangeError {
    #[error("'{0}' is not a phase number")]
    NotANumber(String),

    #[error("phase {0} is outside 1-6")]
    OutOfRange(u32),

    #[error("range {start}-{end} is empty")]
    EmptyRange { start: u32, end: u32 },

    #[error("no phases given")]
    Empty,
}

fn parse_number(raw: &str) -> Result<u32, PhaseRangeError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| PhaseRangeError::NotANumber(raw.trim().to_string()))
}

fn to_phase(n: u32) -> Result<ValidationPhase, PhaseRangeError> {
    u8::try_from(n)
        .ok()
        .and_then(ValidationPhase::from_u8)
        .ok_or(PhaseRangeError::OutOfRange(n))
}

/// Parse `"1-3"` or `"1,2,3"` into ordered, deduplicated phases.
///
/// ```rust
/// use evospec_validation::parse_phases;
/// use evospec_utils::types::ValidationPhase;
///
/// assert_eq!(
///     parse_phases("3,1").unwrap(),
///     vec![ValidationPhase::Structural, ValidationPhase::Semantic]
/// );
/// assert_eq!(parse_phases("1-6").unwrap().len(), 6);
/// ```
pub fn parse_phases(input: &str) -> Result<Vec<ValidationPhase>, PhaseRangeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PhaseRangeError::Empty);
    }

    let mut phases = Vec::new();
    if let Some((start, end)) = input.split_once('-') {
        let (start, end) = (parse_number(start)?, parse_number(end)?);
        if start > end {
            return Err(PhaseRangeError::EmptyRange { start, end });
        }
        for n in start..=end {
            phases.push(to_phase(n)?);
        }
    } else {
        for part in input.split(',').filter(|p| !p.trim().is_empty()) {
            phases.push(to_phase(parse_number(part)?)?);
        }
    }

    if phases.is_empty() {
        return Err(PhaseRangeError::Empty);
    }
    phases.sort();
    phases.dedup();
    Ok(phases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_phases("1-3").unwrap(),
            vec![
                ValidationPhase::Structural,
                ValidationPhase::Referential,
                ValidationPhase::Semantic
            ]
        );
    }

    #[test]
    fn test_parse_list_dedups_and_sorts() {
        assert_eq!(
            parse_phases("4, 2,2").unwrap(),
            vec![ValidationPhase::Referential, ValidationPhase::Evolution]
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_phases("0-2"), Err(PhaseRangeError::OutOfRange(0)));
        assert_eq!(parse_phases("7"), Err(PhaseRangeError::OutOfRange(7)));
        assert_eq!(
            parse_phases("5-2"),
            Err(PhaseRangeError::EmptyRange { start: 5, end: 2 })
        );
        assert!(matches!(parse_phases("x"), Err(PhaseRangeError::NotANumber(_))));
        assert_eq!(parse_phases(" "), Err(PhaseRangeError::Empty));
    }

    #[test]
    fn test_empty_options_mean_all_phases() {
        let options = ValidationOptions::new(vec![], true);
        assert_eq!(options.effective_phases().len(), 6);
    }
}
