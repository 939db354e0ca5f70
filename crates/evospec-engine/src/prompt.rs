//! Prompt construction for the repair loop

use std::fmt::Write as _;

use evospec_utils::types::ValidationError;

use crate::version::VersionTransition;

/// System message sent with every model call
pub const SYSTEM_PROMPT: &str = r#"You write EvoSpec documents: YAML specifications of a software system's domain model, contracts, and version history.

Rules:
- Reply with exactly one YAML document inside a ```yaml fenced block. No other fenced blocks.
- The document starts with `spec: evospec/v1`.
- `project` has `id`, `name`, and `versioning: {strategy: semver, current: "MAJOR.MINOR.PATCH"}`.
- `structure.root` is `NodeRef(<id of the System node>)`.
- `domain.nodes` is a list. Each node has `kind`, a unique `id` (letters, digits, `.`, `_`, `-`), `meta.title`, and optionally `meta.description`, `spec`, `children`, and `contracts`.
- Node kinds: System, Module, Context, Entity, ValueObject, Aggregate, Enum, Event, Command, Query, Service, Workflow, Policy, Actor, UseCase, Api, Integration, Feature.
- The root is a single System node with `spec.goals`. Modules list their members under `children` as `NodeRef(<id>)`. Every NodeRef must name an existing node.
- Entity fields live under `spec.fields` as `<name>: {type: <type>, required: true|false}`.
- Contracts are `{invariant|rule|check: "<expression>", level: hard|soft}`.
- `history` is a list of `{version, basedOn, changes, migrations, notes}`; its last version equals `project.versioning.current`.

Example:
```yaml
spec: evospec/v1
project:
  id: library
  name: "Library"
  versioning:
    strategy: semver
    current: "1.0.0"
structure:
  root: NodeRef(system.library)
domain:
  nodes:
    - kind: System
      id: system.library
      meta:
        title: "Library"
      spec:
        goals:
          - "Lend books to members"
      children:
        - NodeRef(mod.lending)
    - kind: Module
      id: mod.lending
      meta:
        title: "Lending"
      children:
        - NodeRef(entity.loan)
    - kind: Entity
      id: entity.loan
      meta:
        title: "Loan"
      spec:
        fields:
          id: {type: uuid, required: true}
          due: {type: date, required: true}
      contracts:
        - invariant: "due is after the loan start"
          level: hard
history:
  - version: "1.0.0"
    basedOn: null
    changes: ["Initial version"]
    migrations: []
    notes: ""
```"#;

/// Base instruction for first-time generation
#[must_use]
pub fn generation_prompt(description: &str) -> String {
    format!(
        "Create a complete EvoSpec document at version 1.0.0 for the following system.\n\n\
         System description:\n{}\n",
        description.trim()
    )
}

/// Base instruction for evolving `document`.
///
/// The model returns the whole updated document; version and ledger are
/// stamped afterwards, but stating them keeps the model's output consistent.
#[must_use]
pub fn evolution_prompt(document: &str, change: &str, transition: &VersionTransition) -> String {
    format!(
        "Update the EvoSpec document below to implement the requested change. \
         Return the complete updated document, not a diff. Keep every node, reference, \
         and history entry that the change does not affect.\n\n\
         Requested change:\n{change}\n\n\
         Set project.versioning.current to \"{next}\" and append a history entry \
         with version \"{next}\" based on \"{previous}\".\n\n\
         Current document:\n```yaml\n{document}\n```\n",
        change = change.trim(),
        next = transition.next,
        previous = transition.previous,
        document = document.trim_end(),
    )
}

/// Repair section listing the hard errors of the previous attempt.
///
/// Soft findings are never included, even when strict mode made them block.
/// Returns `None` when there is nothing to feed back.
#[must_use]
pub fn repair_feedback(errors: &[ValidationError]) -> Option<String> {
    let mut hard = errors.iter().filter(|e| e.is_hard()).peekable();
    hard.peek()?;

    let mut out = String::from(
        "The previous attempt was rejected by the validator. \
         Fix every error below and return the complete corrected document.\n\nErrors:\n",
    );
    for error in hard {
        let _ = write!(out, "- [{}] {}", error.code, error.message);
        if let Some(location) = &error.location {
            let _ = write!(out, " (at: {location})");
        }
        out.push('\n');
    }
    Some(out)
}

/// Full user message for one attempt
#[must_use]
pub fn attempt_prompt(base: &str, prior_errors: &[ValidationError]) -> String {
    match repair_feedback(prior_errors) {
        Some(feedback) => format!("{base}\n{feedback}"),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evospec_utils::types::ValidationPhase;

    fn findings() -> Vec<ValidationError> {
        vec![
            ValidationError::hard("E202", "Unresolved NodeRef(entity.order)", ValidationPhase::Referential)
                .at("domain.nodes[1].children[0]"),
            ValidationError::soft("E501", "Node has no meta.title", ValidationPhase::Generation)
                .at("domain.nodes[2].meta.title"),
            ValidationError::hard("E201", "Duplicate id 'mod.catalog'", ValidationPhase::Referential),
            ValidationError::soft("E503", "Module has no children", ValidationPhase::Generation),
            ValidationError::soft("E602", "Entity declares no contracts", ValidationPhase::Verifiability),
        ]
    }

    #[test]
    fn test_feedback_lists_only_hard_errors() {
        let feedback = repair_feedback(&findings()).unwrap();

        assert!(feedback.contains("[E202] Unresolved NodeRef(entity.order)"));
        assert!(feedback.contains("(at: domain.nodes[1].children[0])"));
        assert!(feedback.contains("[E201] Duplicate id 'mod.catalog'"));
        for soft in ["E501", "E503", "E602", "meta.title"] {
            assert!(!feedback.contains(soft), "soft finding {soft} leaked");
        }
        assert_eq!(feedback.lines().filter(|l| l.starts_with("- ")).count(), 2);
    }

    #[test]
    fn test_no_feedback_without_hard_errors() {
        let soft_only: Vec<_> = findings().into_iter().filter(|e| !e.is_hard()).collect();
        assert!(repair_feedback(&soft_only).is_none());
        assert_eq!(attempt_prompt("base", &soft_only), "base");
        assert_eq!(attempt_prompt("base", &[]), "base");
    }

    #[test]
    fn test_generation_prompt_embeds_description() {
        let prompt = generation_prompt("  A bookshop with orders \n");
        assert!(prompt.contains("A bookshop with orders\n"));
        assert!(prompt.contains("1.0.0"));
    }
}
