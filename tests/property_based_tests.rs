//! Property-based tests for version arithmetic, the ledger, and extraction.
//!
//! Case counts follow `PROPTEST_CASES` (default 64).

use proptest::prelude::*;
use semver::Version;
use std::env;

use evospec::{BumpKind, DocumentValidator, ValidationOptions, Validator};
use evospec_engine::template::{project_slug, spec_template};
use evospec_engine::version::{EvolutionPlan, bump};
use evospec_extraction::extract_document;

const DEFAULT_PROPTEST_CASES: u32 = 64;

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn arb_version() -> impl Strategy<Value = Version> {
    (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| Version::new(a, b, c))
}

fn arb_bump() -> impl Strategy<Value = BumpKind> {
    prop_oneof![
        Just(BumpKind::Major),
        Just(BumpKind::Minor),
        Just(BumpKind::Patch),
        Just(BumpKind::None),
    ]
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn prop_bumps_never_go_backwards(version in arb_version(), kind in arb_bump()) {
        let next = kind.apply(&version).unwrap();
        if kind == BumpKind::None {
            prop_assert_eq!(next, version);
        } else {
            prop_assert!(next > version);
            prop_assert!(next.pre.is_empty());
        }
    }

    #[test]
    fn prop_bump_resets_lower_components(version in arb_version()) {
        let major = BumpKind::Major.apply(&version).unwrap();
        prop_assert_eq!((major.major, major.minor, major.patch), (version.major + 1, 0, 0));

        let minor = BumpKind::Minor.apply(&version).unwrap();
        prop_assert_eq!((minor.major, minor.minor, minor.patch), (version.major, version.minor + 1, 0));

        let patch = BumpKind::Patch.apply(&version).unwrap();
        prop_assert_eq!(patch.patch, version.patch + 1);
    }

    #[test]
    fn prop_string_bump_matches_typed_bump(version in arb_version(), kind in arb_bump()) {
        let text = bump(&version.to_string(), kind).unwrap();
        prop_assert_eq!(text, kind.apply(&version).unwrap().to_string());
    }

    #[test]
    fn prop_bump_kind_parses_any_case(kind in arb_bump(), upper in any::<bool>()) {
        let text = if upper { kind.as_str().to_uppercase() } else { kind.to_string() };
        prop_assert_eq!(text.parse::<BumpKind>().unwrap(), kind);
    }

    #[test]
    fn prop_finalized_template_stays_valid(kind in arb_bump(), change in "[A-Za-z][A-Za-z ]{0,40}") {
        let doc = spec_template("Shop", None);
        let plan = EvolutionPlan::new(&doc, &change, kind).unwrap();
        let finalized = plan.finalize(&doc).unwrap();

        let result = DocumentValidator.validate(&finalized, &ValidationOptions::all(true));
        prop_assert!(result.ok, "findings: {:?}", result.errors);

        let parsed: serde_yaml::Value = serde_yaml::from_str(&finalized).unwrap();
        let history = parsed["history"].as_sequence().unwrap();
        prop_assert_eq!(history.len(), 2);
        prop_assert_eq!(
            parsed["project"]["versioning"]["current"].as_str().unwrap(),
            plan.transition.next.to_string()
        );
    }

    #[test]
    fn prop_extraction_ignores_surrounding_prose(
        before in "[A-Za-z ,.]{0,80}",
        after in "[A-Za-z ,.]{0,80}",
    ) {
        let doc = spec_template("Shop", None);
        let answer = format!("{before}\n```yaml\n{doc}```\n{after}");
        let extracted = extract_document(&answer).unwrap();
        prop_assert_eq!(extracted.trim_end(), doc.trim_end());
    }

    #[test]
    fn prop_slug_is_identifier_safe(name in "\\PC{0,30}") {
        let slug = project_slug(&name);
        prop_assert!(slug.starts_with(|c: char| c.is_ascii_lowercase()));
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.contains("--"));
        prop_assert!(!slug.ends_with('-'));
    }
}
