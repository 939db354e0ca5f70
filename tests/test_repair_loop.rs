//! Generate-validate-repair loop driven through the public API with the
//! built-in validator and a scripted model.

mod test_support;

use std::sync::Mutex;
use std::time::Duration;

use evospec::{
    DocumentValidator, GenerationOrchestrator, GenerationRequest, GenerationResult, LlmError,
    OrchestrationError, ProgressObserver, ValidationError,
};
use evospec_engine::NO_DOCUMENT_CODE;
use test_support::{ScriptedModel, fenced, fixture};

#[derive(Default)]
struct Progress {
    attempts: Mutex<Vec<u32>>,
    rejected: Mutex<Vec<Vec<String>>>,
}

impl ProgressObserver for Progress {
    fn on_attempt(&self, attempt: u32, _max_attempts: u32) {
        self.attempts.lock().unwrap().push(attempt);
    }

    fn on_validation_error(&self, _attempt: u32, errors: &[ValidationError]) {
        self.rejected
            .lock()
            .unwrap()
            .push(errors.iter().map(|e| e.code.clone()).collect());
    }
}

fn request(max_retries: u32) -> GenerationRequest {
    GenerationRequest::new("An online shop with a product catalog").with_max_retries(max_retries)
}

#[tokio::test]
async fn test_repair_feeds_validator_errors_back() {
    let model = ScriptedModel::answering(&[
        fenced(&fixture("dangling_ref.evospec.yaml")),
        fenced(&fixture("shop.evospec.yaml")),
    ]);
    let validator = DocumentValidator;
    let progress = Progress::default();

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(3), &progress)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.attempts(), 2);
    assert_eq!(*progress.attempts.lock().unwrap(), vec![1, 2]);
    assert_eq!(*progress.rejected.lock().unwrap(), vec![vec!["E202".to_string()]]);

    let prompts = model.prompts();
    assert!(!prompts[0].contains("E202"));
    assert!(prompts[1].contains("[E202]"));
    assert!(prompts[1].contains("NodeRef(entity.order)"));
}

#[tokio::test]
async fn test_accepted_document_is_the_extracted_text() {
    let doc = fixture("shop.evospec.yaml");
    let model = ScriptedModel::answering(&[fenced(&doc)]);
    let validator = DocumentValidator;

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(1), &())
        .await
        .unwrap();

    let yaml = result.yaml().unwrap();
    assert!(yaml.starts_with("spec: evospec/v1"));
    assert!(!yaml.contains("```"));
    assert!(!yaml.contains("Let me know"));
}

#[tokio::test]
async fn test_exhaustion_reports_only_last_attempt() {
    let broken_root = fixture("shop.evospec.yaml").replace(
        "root: NodeRef(system.root)",
        "root: NodeRef(system.gone)",
    );
    let model = ScriptedModel::answering(&[
        fenced(&fixture("dangling_ref.evospec.yaml")),
        fenced(&broken_root),
    ]);
    let validator = DocumentValidator;

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(2), &())
        .await
        .unwrap();

    match result {
        GenerationResult::Failed { attempts, errors } => {
            assert_eq!(attempts, 2);
            let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
            assert!(codes.contains(&"E203"));
            assert!(!codes.contains(&"E202"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_prose_answer_consumes_an_attempt() {
    let model = ScriptedModel::answering(&[
        "I'm sorry, I need more details about the shop.".to_string(),
        fenced(&fixture("shop.evospec.yaml")),
    ]);
    let validator = DocumentValidator;
    let progress = Progress::default();

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(3), &progress)
        .await
        .unwrap();

    assert_eq!(result.attempts(), 2);
    assert_eq!(
        *progress.rejected.lock().unwrap(),
        vec![vec![NO_DOCUMENT_CODE.to_string()]]
    );
}

#[tokio::test]
async fn test_strict_mode_blocks_soft_findings_without_feeding_them_back() {
    let soft = fenced(&fixture("soft_only.evospec.yaml"));
    let model = ScriptedModel::answering(&[soft.clone(), soft]);
    let validator = DocumentValidator;

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(2).with_strict(true), &())
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors().unwrap()[0].code, "E303");
    assert!(!model.prompts()[1].contains("E303"));
}

#[tokio::test]
async fn test_lenient_mode_accepts_soft_findings() {
    let model = ScriptedModel::answering(&[fenced(&fixture("soft_only.evospec.yaml"))]);
    let validator = DocumentValidator;

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(1), &())
        .await
        .unwrap();
    assert!(result.is_success());
}

#[tokio::test]
async fn test_provider_failure_aborts_without_retry() {
    let model = ScriptedModel::new(vec![
        Err(LlmError::ProviderQuota("rate limited".to_string())),
        Ok(fenced(&fixture("shop.evospec.yaml"))),
    ]);
    let validator = DocumentValidator;

    let err = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(3), &())
        .await
        .unwrap_err();

    match err {
        OrchestrationError::Provider { attempts, source } => {
            assert_eq!(attempts, 1);
            assert!(matches!(source, LlmError::ProviderQuota(_)));
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_slow_model_times_out() {
    let model = ScriptedModel::slow(Duration::from_secs(5));
    let validator = DocumentValidator;

    let err = GenerationOrchestrator::new(&model, &validator)
        .with_timeout(Duration::from_millis(50))
        .generate(&request(3), &())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestrationError::Provider {
            attempts: 1,
            source: LlmError::Timeout { .. }
        }
    ));
}

#[tokio::test]
async fn test_report_shape() {
    let model = ScriptedModel::answering(&[fenced(&fixture("shop.evospec.yaml"))]);
    let validator = DocumentValidator;

    let result = GenerationOrchestrator::new(&model, &validator)
        .generate(&request(1), &())
        .await
        .unwrap();

    let json = serde_json::to_value(result.to_report()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["attempts"], 1);
    assert!(json["yaml"].is_string());
    assert!(json.get("errors").is_none());
    assert!(json.get("newVersion").is_none());
}
