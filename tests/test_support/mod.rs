//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use evospec::{LlmBackend, LlmError, LlmInvocation, LlmResult};
use evospec_llm::Role;

pub(crate) fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub(crate) fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

/// Wrap a document the way chat models usually answer.
pub(crate) fn fenced(doc: &str) -> String {
    format!("Sure, here is the specification:\n\n```yaml\n{doc}```\n\nLet me know if you need changes.")
}

/// Model stand-in that replays canned answers and records what it was asked.
pub(crate) struct ScriptedModel {
    answers: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub(crate) fn new(answers: Vec<Result<String, LlmError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub(crate) fn answering(answers: &[String]) -> Self {
        Self::new(answers.iter().cloned().map(Ok).collect())
    }

    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(Vec::new())
        }
    }

    /// User prompts in call order
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmBackend for ScriptedModel {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let prompt = inv
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("no scripted answer left".to_string())));
        answer.map(|text| LlmResult::new(text, "scripted", "scripted-1"))
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}
