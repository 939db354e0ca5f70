//! Evolution runs: version bump, history ledger, and input checks.

mod test_support;

use serde_yaml::Value;

use evospec::{
    BumpKind, DocumentValidator, EvolutionOrchestrator, EvolutionRequest, OrchestrationError,
};
use test_support::{ScriptedModel, fenced, fixture};

fn parse(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

fn history(doc: &Value) -> Vec<Value> {
    doc["history"].as_sequence().cloned().unwrap_or_default()
}

fn current(doc: &Value) -> String {
    doc["project"]["versioning"]["current"]
        .as_str()
        .unwrap()
        .to_string()
}

/// The input shop with one more entity, as a model would return it.
fn evolved_answer() -> String {
    let doc = fixture("shop.evospec.yaml")
        .replace(
            "        - NodeRef(entity.product)\n",
            "        - NodeRef(entity.product)\n        - NodeRef(entity.review)\n",
        )
        .replace(
            "history:\n",
            "    - kind: Entity\n      id: entity.review\n      meta:\n        title: \"Review\"\n      contracts:\n        - invariant: \"rating between 1 and 5\"\n          level: hard\nhistory:\n",
        );
    fenced(&doc)
}

#[tokio::test]
async fn test_minor_bump_appends_one_entry() {
    let input = fixture("shop.evospec.yaml");
    let model = ScriptedModel::answering(&[evolved_answer()]);
    let validator = DocumentValidator;
    let request = EvolutionRequest::new(input.as_str(), "Add product reviews");

    let result = EvolutionOrchestrator::new(&model, &validator)
        .evolve(&request, &())
        .await
        .unwrap();

    assert!(result.is_success(), "errors: {:?}", result.errors());
    assert_eq!(result.previous_version().as_deref(), Some("1.1.0"));
    assert_eq!(result.new_version().as_deref(), Some("1.2.0"));

    let before = parse(&input);
    let after = parse(result.yaml().unwrap());
    assert_eq!(current(&after), "1.2.0");

    let old = history(&before);
    let new = history(&after);
    assert_eq!(new.len(), old.len() + 1);
    assert_eq!(&new[..old.len()], &old[..]);

    let entry = new.last().unwrap();
    assert_eq!(entry["version"].as_str(), Some("1.2.0"));
    assert_eq!(entry["basedOn"].as_str(), Some("1.1.0"));
    assert_eq!(entry["changes"][0].as_str(), Some("Add product reviews"));
    assert_eq!(entry["migrations"].as_sequence().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_model_written_history_is_replaced() {
    let input = fixture("shop.evospec.yaml");
    let tampered = evolved_answer().replace("notes: \"Initial version\"", "notes: \"rewritten\"");
    let model = ScriptedModel::answering(&[tampered]);
    let validator = DocumentValidator;

    let result = EvolutionOrchestrator::new(&model, &validator)
        .evolve(
            &EvolutionRequest::new(input.as_str(), "Add reviews").with_bump(BumpKind::Patch),
            &(),
        )
        .await
        .unwrap();

    let after = parse(result.yaml().unwrap());
    assert_eq!(history(&after)[0]["notes"].as_str(), Some("Initial version"));
    assert_eq!(current(&after), "1.1.1");
}

#[tokio::test]
async fn test_no_bump_with_empty_change_keeps_domain() {
    let input = fixture("shop.evospec.yaml");
    let model = ScriptedModel::answering(&[fenced(&input)]);
    let validator = DocumentValidator;

    let result = EvolutionOrchestrator::new(&model, &validator)
        .evolve(
            &EvolutionRequest::new(input.as_str(), "").with_bump(BumpKind::None),
            &(),
        )
        .await
        .unwrap();

    assert!(result.is_success(), "errors: {:?}", result.errors());
    assert_eq!(result.previous_version(), result.new_version());

    let before = parse(&input);
    let after = parse(result.yaml().unwrap());
    assert_eq!(before["domain"], after["domain"]);
    assert_eq!(current(&after), "1.1.0");

    let new = history(&after);
    assert_eq!(new.len(), history(&before).len() + 1);
    let entry = new.last().unwrap();
    assert_eq!(entry["version"].as_str(), Some("1.1.0"));
    assert_eq!(entry["changes"].as_sequence().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_major_bump() {
    let input = fixture("shop.evospec.yaml");
    let model = ScriptedModel::answering(&[evolved_answer()]);
    let validator = DocumentValidator;

    let result = EvolutionOrchestrator::new(&model, &validator)
        .evolve(
            &EvolutionRequest::new(input.as_str(), "Rework catalog").with_bump(BumpKind::Major),
            &(),
        )
        .await
        .unwrap();

    assert_eq!(result.new_version().as_deref(), Some("2.0.0"));
}

#[tokio::test]
async fn test_unversioned_input_is_rejected_before_any_model_call() {
    let input = fixture("shop.evospec.yaml").replace("    current: \"1.1.0\"\n", "");
    let model = ScriptedModel::answering(&[evolved_answer()]);
    let validator = DocumentValidator;

    let err = EvolutionOrchestrator::new(&model, &validator)
        .evolve(&EvolutionRequest::new(input.as_str(), "Add reviews"), &())
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestrationError::InvalidDocument(_)));
    assert!(err.is_configuration());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_evolution_prompt_carries_change_and_versions() {
    let input = fixture("shop.evospec.yaml");
    let model = ScriptedModel::answering(&[evolved_answer()]);
    let validator = DocumentValidator;

    EvolutionOrchestrator::new(&model, &validator)
        .evolve(&EvolutionRequest::new(input.as_str(), "Add product reviews"), &())
        .await
        .unwrap();

    let prompt = &model.prompts()[0];
    assert!(prompt.contains("Add product reviews"));
    assert!(prompt.contains("1.1.0"));
    assert!(prompt.contains("1.2.0"));
    assert!(prompt.contains("entity.product"));
}

#[tokio::test]
async fn test_ledger_out_of_step_with_current_version_fails_before_any_model_call() {
    let shop = fixture("shop.evospec.yaml");
    let head = shop.split("history:").next().unwrap();
    let inputs = [
        format!("{head}history: []\n"),
        shop.replace("  - version: \"1.1.0\"", "  - version: \"1.0.5\""),
    ];

    for input in inputs {
        let model = ScriptedModel::answering(&[evolved_answer(), evolved_answer(), evolved_answer()]);
        let validator = DocumentValidator;

        let err = EvolutionOrchestrator::new(&model, &validator)
            .evolve(
                &EvolutionRequest::new(input.as_str(), "Add reviews").with_max_retries(3),
                &(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestrationError::InvalidDocument(_)));
        assert!(err.is_configuration());
        assert_eq!(model.calls(), 0);
    }
}
