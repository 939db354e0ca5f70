//! Per-phase rules over a parsed document.
//!
//! Every rule tolerates missing or mistyped fields: absence is reported by the
//! structural phase, so later phases simply skip what they cannot read.

use regex::Regex;
use serde_yaml::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use evospec_utils::types::{ValidationError, ValidationPhase};

pub(crate) const SPEC_VERSION: &str = "evospec/v1";

/// Node kinds the DSL defines
pub(crate) const KNOWN_KINDS: &[&str] = &[
    "System",
    "Module",
    "Context",
    "Entity",
    "ValueObject",
    "Aggregate",
    "Enum",
    "Event",
    "Command",
    "Query",
    "Service",
    "Workflow",
    "Policy",
    "Actor",
    "UseCase",
    "Api",
    "Integration",
    "Feature",
];

static NODE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NodeRef\(\s*([^)\s]+)\s*\)").expect("static regex"));

static NODE_REF_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^NodeRef\(\s*([^)\s]+)\s*\)$").expect("static regex"));

static NODE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").expect("static regex"));

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// `(index, node)` for every entry of `domain.nodes`
pub(crate) fn nodes(doc: &Value) -> Vec<(usize, &Value)> {
    lookup(doc, &["domain", "nodes"])
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().enumerate().collect())
        .unwrap_or_default()
}

fn node_id(node: &Value) -> Option<String> {
    node.get("id").and_then(scalar)
}

fn node_kind(node: &Value) -> Option<&str> {
    node.get("kind").and_then(Value::as_str)
}

fn node_path(index: usize) -> String {
    format!("domain.nodes[{index}]")
}

/// Target id if `value` is exactly `NodeRef(<id>)`
pub(crate) fn node_ref_target(value: &Value) -> Option<String> {
    let text = value.as_str()?;
    NODE_REF_EXACT
        .captures(text.trim())
        .map(|c| c[1].to_string())
}

fn collect_strings<'a>(value: &'a Value, path: &str, out: &mut Vec<(String, &'a str)>) {
    match value {
        Value::String(s) => out.push((path.to_string(), s.as_str())),
        Value::Sequence(seq) => {
            for (i, item) in seq.iter().enumerate() {
                collect_strings(item, &format!("{path}[{i}]"), out);
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                let key = scalar(key).unwrap_or_else(|| "?".to_string());
                let child = if path.is_empty() {
                    key
                } else {
                    format!("{path}.{key}")
                };
                collect_strings(item, &child, out);
            }
        }
        Value::Tagged(tagged) => collect_strings(&tagged.value, path, out),
        _ => {}
    }
}

fn contracts(node: &Value) -> Vec<(usize, &Value)> {
    node.get("contracts")
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().enumerate().collect())
        .unwrap_or_default()
}

fn history(doc: &Value) -> Vec<(usize, &Value)> {
    doc.get("history")
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().enumerate().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Phase 1: Structural
// ---------------------------------------------------------------------------

pub(crate) fn structural(doc: &Value) -> Vec<ValidationError> {
    const PHASE: ValidationPhase = ValidationPhase::Structural;
    let mut out = Vec::new();

    if !doc.is_mapping() {
        out.push(
            ValidationError::hard("E101", "Document root must be a mapping", PHASE)
                .with_suggestion("Start the document with 'spec: evospec/v1'"),
        );
        return out;
    }

    match doc.get("spec").and_then(Value::as_str) {
        None => out.push(
            ValidationError::hard("E102", "Missing 'spec' version marker", PHASE)
                .at("spec")
                .with_suggestion(format!("Add 'spec: {SPEC_VERSION}'")),
        ),
        Some(v) if v != SPEC_VERSION => out.push(
            ValidationError::hard(
                "E103",
                format!("Unsupported spec version '{v}' (expected '{SPEC_VERSION}')"),
                PHASE,
            )
            .at("spec"),
        ),
        Some(_) => {}
    }

    match doc.get("project") {
        Some(project) if project.is_mapping() => {
            for (field, code) in [("id", "E105"), ("name", "E106")] {
                if is_blank(project.get(field)) {
                    out.push(
                        ValidationError::hard(
                            code,
                            format!("Missing project.{field}"),
                            PHASE,
                        )
                        .at(format!("project.{field}")),
                    );
                }
            }
            if is_blank(lookup(project, &["versioning", "current"])) {
                out.push(
                    ValidationError::hard("E107", "Missing project.versioning.current", PHASE)
                        .at("project.versioning.current")
                        .with_suggestion("Set current to a MAJOR.MINOR.PATCH version such as \"1.0.0\""),
                );
            }
        }
        _ => out.push(
            ValidationError::hard("E104", "Missing 'project' block", PHASE).at("project"),
        ),
    }

    match lookup(doc, &["domain", "nodes"]) {
        Some(Value::Sequence(seq)) => {
            for (i, node) in seq.iter().enumerate() {
                let path = node_path(i);
                if !node.is_mapping() {
                    out.push(
                        ValidationError::hard("E110", "Node must be a mapping", PHASE).at(path),
                    );
                    continue;
                }
                if node_kind(node).is_none() {
                    out.push(
                        ValidationError::hard("E111", "Node is missing 'kind'", PHASE)
                            .at(format!("{path}.kind")),
                    );
                }
                if is_blank(node.get("id")) {
                    out.push(
                        ValidationError::hard("E112", "Node is missing 'id'", PHASE)
                            .at(format!("{path}.id")),
                    );
                }
            }
        }
        _ => out.push(
            ValidationError::hard("E108", "'domain.nodes' must be a sequence", PHASE)
                .at("domain.nodes"),
        ),
    }

    if !matches!(doc.get("history"), Some(Value::Sequence(_))) {
        out.push(
            ValidationError::hard("E109", "'history' must be a sequence", PHASE)
                .at("history")
                .with_suggestion("Add a history ledger with an entry for the current version"),
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Phase 2: Referential
// ---------------------------------------------------------------------------

pub(crate) fn referential(doc: &Value) -> Vec<ValidationError> {
    const PHASE: ValidationPhase = ValidationPhase::Referential;
    let mut out = Vec::new();

    let mut ids: HashMap<String, usize> = HashMap::new();
    for (i, node) in nodes(doc) {
        let Some(id) = node_id(node) else { continue };
        if let Some(first) = ids.get(&id) {
            out.push(
                ValidationError::hard(
                    "E201",
                    format!("Duplicate node id '{id}' (first defined at domain.nodes[{first}])"),
                    PHASE,
                )
                .at(format!("{}.id", node_path(i))),
            );
        } else {
            ids.insert(id, i);
        }
    }

    if let Some(root) = lookup(doc, &["structure", "root"])
        && node_ref_target(root).is_none()
    {
        out.push(
            ValidationError::hard("E204", "structure.root must be a NodeRef(<id>)", PHASE)
                .at("structure.root"),
        );
    }

    let mut strings = Vec::new();
    collect_strings(doc, "", &mut strings);
    for (path, text) in strings {
        for capture in NODE_REF.captures_iter(text) {
            let target = &capture[1];
            if ids.contains_key(target) {
                continue;
            }
            let code = if path == "structure.root" { "E203" } else { "E202" };
            out.push(
                ValidationError::hard(
                    code,
                    format!("NodeRef({target}) does not resolve to any node"),
                    PHASE,
                )
                .at(path.clone())
                .with_suggestion(format!("Define a node with id '{target}' or fix the reference")),
            );
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Phase 3: Semantic
// ---------------------------------------------------------------------------

pub(crate) fn semantic(doc: &Value) -> Vec<ValidationError> {
    const PHASE: ValidationPhase = ValidationPhase::Semantic;
    let mut out = Vec::new();
    let all_nodes = nodes(doc);

    for &(i, node) in &all_nodes {
        let path = node_path(i);

        if let Some(kind) = node_kind(node)
            && !KNOWN_KINDS.contains(&kind)
        {
            out.push(
                ValidationError::hard("E301", format!("Unknown node kind '{kind}'"), PHASE)
                    .at(format!("{path}.kind"))
                    .with_suggestion(format!("Use one of: {}", KNOWN_KINDS.join(", "))),
            );
        }

        if let Some(id) = node_id(node)
            && !NODE_ID.is_match(&id)
        {
            out.push(
                ValidationError::hard(
                    "E307",
                    format!("Node id '{id}' must start with a letter and use only letters, digits, '.', '_' or '-'"),
                    PHASE,
                )
                .at(format!("{path}.id")),
            );
        }

        if let Some(Value::Mapping(fields)) = lookup(node, &["spec", "fields"]) {
            for (name, field) in fields {
                let name = scalar(name).unwrap_or_else(|| "?".to_string());
                if is_blank(field.get("type")) {
                    out.push(
                        ValidationError::hard(
                            "E302",
                            format!("Field '{name}' has no type"),
                            PHASE,
                        )
                        .at(format!("{path}.spec.fields.{name}.type")),
                    );
                }
            }
        }

        if let Some(Value::Sequence(children)) = node.get("children") {
            for (c, child) in children.iter().enumerate() {
                if node_ref_target(child).is_none() {
                    out.push(
                        ValidationError::hard(
                            "E306",
                            "Child entries must be NodeRef(<id>)",
                            PHASE,
                        )
                        .at(format!("{path}.children[{c}]")),
                    );
                }
            }
        }

        for (c, contract) in contracts(node) {
            let contract_path = format!("{path}.contracts[{c}]");
            match contract.get("level").and_then(Value::as_str) {
                None => out.push(
                    ValidationError::soft("E303", "Contract has no level", PHASE)
                        .at(contract_path)
                        .with_suggestion("Add 'level: hard' or 'level: soft'"),
                ),
                Some("hard" | "soft") => {}
                Some(other) => out.push(
                    ValidationError::hard(
                        "E304",
                        format!("Contract level '{other}' must be 'hard' or 'soft'"),
                        PHASE,
                    )
                    .at(format!("{contract_path}.level")),
                ),
            }
        }
    }

    if let Some(root_id) = lookup(doc, &["structure", "root"]).and_then(node_ref_target)
        && let Some(&(i, root)) = all_nodes
            .iter()
            .find(|(_, node)| node_id(node).as_deref() == Some(root_id.as_str()))
        && let Some(kind) = node_kind(root)
        && kind != "System"
    {
        out.push(
            ValidationError::hard(
                "E305",
                format!("Root node '{root_id}' must be a System, found {kind}"),
                PHASE,
            )
            .at(format!("{}.kind", node_path(i))),
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Phase 4: Evolution
// ---------------------------------------------------------------------------

fn parse_semver(raw: &str) -> Option<semver::Version> {
    semver::Version::parse(raw.trim()).ok()
}

pub(crate) fn evolution(doc: &Value) -> Vec<ValidationError> {
    const PHASE: ValidationPhase = ValidationPhase::Evolution;
    let mut out = Vec::new();

    let current_raw = lookup(doc, &["project", "versioning", "current"]).and_then(scalar);
    let current = current_raw.as_deref().and_then(parse_semver);
    if let Some(raw) = &current_raw
        && current.is_none()
    {
        out.push(
            ValidationError::hard(
                "E401",
                format!("Current version '{raw}' is not a semantic version"),
                PHASE,
            )
            .at("project.versioning.current"),
        );
    }

    let mut seen: Vec<semver::Version> = Vec::new();
    let entries = history(doc);
    for &(i, entry) in &entries {
        let path = format!("history[{i}]");
        let Some(raw) = entry.get("version").and_then(scalar) else {
            out.push(
                ValidationError::hard("E402", "History entry has no version", PHASE)
                    .at(format!("{path}.version")),
            );
            continue;
        };
        let Some(version) = parse_semver(&raw) else {
            out.push(
                ValidationError::hard(
                    "E402",
                    format!("History version '{raw}' is not a semantic version"),
                    PHASE,
                )
                .at(format!("{path}.version")),
            );
            continue;
        };

        if let Some(previous) = seen.last()
            && version < *previous
        {
            out.push(
                ValidationError::hard(
                    "E404",
                    format!("History version {version} is lower than the preceding {previous}"),
                    PHASE,
                )
                .at(format!("{path}.version")),
            );
        }

        match entry.get("basedOn") {
            None | Some(Value::Null) => {
                if i > 0 {
                    out.push(
                        ValidationError::soft(
                            "E406",
                            "Only the first history entry may omit basedOn",
                            PHASE,
                        )
                        .at(format!("{path}.basedOn")),
                    );
                }
            }
            Some(based_on) => {
                let target = scalar(based_on).and_then(|raw| parse_semver(&raw));
                let known = target.as_ref().is_some_and(|t| seen.contains(t));
                if !known {
                    out.push(
                        ValidationError::hard(
                            "E405",
                            format!(
                                "basedOn '{}' does not name an earlier history entry",
                                scalar(based_on).unwrap_or_default()
                            ),
                            PHASE,
                        )
                        .at(format!("{path}.basedOn")),
                    );
                }
            }
        }

        seen.push(version);
    }

    if let Some(current) = &current {
        let last = entries
            .last()
            .and_then(|(_, e)| e.get("version"))
            .and_then(scalar)
            .and_then(|raw| parse_semver(&raw));
        if last.as_ref() != Some(current) {
            out.push(
                ValidationError::hard(
                    "E403",
                    format!("The last history entry must record the current version {current}"),
                    PHASE,
                )
                .at("history")
                .with_suggestion("Append a history entry for the current version"),
            );
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Phase 5: Generation
// ---------------------------------------------------------------------------

pub(crate) fn generation(doc: &Value) -> Vec<ValidationError> {
    const PHASE: ValidationPhase = ValidationPhase::Generation;
    let mut out = Vec::new();

    for (i, node) in nodes(doc) {
        let path = node_path(i);
        if is_blank(lookup(node, &["meta", "title"])) {
            out.push(
                ValidationError::soft("E501", "Node has no meta.title", PHASE)
                    .at(format!("{path}.meta.title")),
            );
        }
        match node_kind(node) {
            Some("System") => {
                let has_goals = lookup(node, &["spec", "goals"])
                    .and_then(Value::as_sequence)
                    .is_some_and(|goals| !goals.is_empty());
                if !has_goals {
                    out.push(
                        ValidationError::soft("E502", "System node declares no goals", PHASE)
                            .at(format!("{path}.spec.goals")),
                    );
                }
            }
            Some("Module") => {
                let has_children = node
                    .get("children")
                    .and_then(Value::as_sequence)
                    .is_some_and(|children| !children.is_empty());
                if !has_children {
                    out.push(
                        ValidationError::soft("E503", "Module has no children", PHASE)
                            .at(format!("{path}.children")),
                    );
                }
            }
            _ => {}
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Phase 6: Verifiability
// ---------------------------------------------------------------------------

pub(crate) fn verifiability(doc: &Value) -> Vec<ValidationError> {
    const PHASE: ValidationPhase = ValidationPhase::Verifiability;
    let mut out = Vec::new();

    for (i, node) in nodes(doc) {
        let path = node_path(i);
        let node_contracts = contracts(node);

        if node_kind(node) == Some("Entity") && node_contracts.is_empty() {
            out.push(
                ValidationError::soft("E602", "Entity declares no contracts", PHASE)
                    .at(format!("{path}.contracts")),
            );
        }

        for (c, contract) in node_contracts {
            let checkable = ["invariant", "rule", "check"]
                .iter()
                .any(|key| !is_blank(contract.get(*key)));
            if !checkable {
                out.push(
                    ValidationError::soft(
                        "E601",
                        "Contract states no invariant, rule, or check",
                        PHASE,
                    )
                    .at(format!("{path}.contracts[{c}]")),
                );
            }
        }
    }

    out
}
