//! Built-in starting document for new projects

/// Version every new project starts at
pub const INITIAL_VERSION: &str = "1.0.0";

/// Identifier-safe form of a project name: lowercase ASCII letters, digits,
/// and single dashes, always starting with a letter.
///
/// ```rust
/// use evospec_engine::template::project_slug;
///
/// assert_eq!(project_slug("My Shop 2"), "my-shop-2");
/// assert_eq!(project_slug("42 things"), "project-42-things");
/// ```
#[must_use]
pub fn project_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    match slug.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => slug.to_string(),
        Some(_) => format!("project-{slug}"),
        None => "project".to_string(),
    }
}

/// Minimal valid document: one System, one Module, one Entity.
#[must_use]
pub fn spec_template(name: &str, description: Option<&str>) -> String {
    let slug = project_slug(name);
    let name = quote(name);
    let goal = quote(
        description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("Describe the primary goal of the system"),
    );

    format!(
        r#"spec: evospec/v1
project:
  id: {slug}
  name: {name}
  versioning:
    strategy: semver
    current: "{INITIAL_VERSION}"
structure:
  root: NodeRef(system.{slug})
domain:
  nodes:
    - kind: System
      id: system.{slug}
      meta:
        title: {name}
      spec:
        goals:
          - {goal}
      children:
        - NodeRef(mod.core)
    - kind: Module
      id: mod.core
      meta:
        title: "Core"
        description: "Starting module; rename or split as the domain grows"
      children:
        - NodeRef(entity.example)
    - kind: Entity
      id: entity.example
      meta:
        title: "Example"
      spec:
        fields:
          id:
            type: uuid
            required: true
          name:
            type: string
            required: true
      contracts:
        - invariant: "name is not empty"
          level: hard
history:
  - version: "{INITIAL_VERSION}"
    basedOn: null
    changes:
      - "Initial specification"
    migrations: []
    notes: ""
"#
    )
}

// JSON string literals are valid YAML double-quoted scalars.
fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
