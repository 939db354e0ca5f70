use serde_yaml::Value;

use evospec_utils::types::{ValidationError, ValidationPhase, ValidationResult};

use crate::{ValidationOptions, Validator, rules};

/// Built-in six-phase validator.
///
/// Phases run in order over the requested subset. A phase that produces
/// blocking errors stops the run; `phase` in the result is the last phase
/// attempted. Without strict mode soft findings are reported as warnings;
/// with it they block, keeping `level: soft`.
///
/// ```rust
/// use evospec_validation::{DocumentValidator, ValidationOptions, Validator};
///
/// let result = DocumentValidator.validate("project: [", &ValidationOptions::default());
/// assert!(!result.ok);
/// assert_eq!(result.errors[0].code, "E100");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentValidator;

impl DocumentValidator {
    fn run_phase(phase: ValidationPhase, doc: &Value) -> Vec<ValidationError> {
        match phase {
            ValidationPhase::Structural => rules::structural(doc),
            ValidationPhase::Referential => rules::referential(doc),
            ValidationPhase::Semantic => rules::semantic(doc),
            ValidationPhase::Evolution => rules::evolution(doc),
            ValidationPhase::Generation => rules::generation(doc),
            ValidationPhase::Verifiability => rules::verifiability(doc),
        }
    }
}

impl Validator for DocumentValidator {
    fn validate(&self, document: &str, options: &ValidationOptions) -> ValidationResult {
        let doc: Value = match serde_yaml::from_str(document) {
            Ok(doc) => doc,
            Err(e) => {
                let error = ValidationError::hard(
                    "E100",
                    format!("Document is not valid YAML: {e}"),
                    ValidationPhase::Structural,
                )
                .with_suggestion("Return a single YAML document starting with 'spec: evospec/v1'");
                return ValidationResult::new(ValidationPhase::Structural, vec![error], vec![]);
            }
        };

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut highest = ValidationPhase::Structural;

        for phase in options.effective_phases() {
            highest = phase;
            let mut blocked = false;
            for finding in Self::run_phase(phase, &doc) {
                if finding.is_hard() || options.strict {
                    blocked = true;
                    errors.push(finding);
                } else {
                    warnings.push(finding);
                }
            }
            if blocked {
                break;
            }
        }

        ValidationResult::new(highest, errors, warnings)
    }
}
