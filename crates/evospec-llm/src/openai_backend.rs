//! OpenAI-compatible chat completions backend
//!
//! Serves three providers that share the wire format: OpenAI, OpenRouter, and
//! a local Ollama server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use evospec_config::{Config, LlmProvider};

use crate::http_client::HttpClient;
use crate::types::{LlmBackend, LlmInvocation, LlmResult, Message};
use crate::{HttpParams, LlmError, read_api_key};

const OPENROUTER_TITLE: &str = "evospec";
const OPENROUTER_REFERER: &str = "https://github.com/evospec/evospec";

pub(crate) fn default_base_url(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
        LlmProvider::Ollama => "http://localhost:11434/v1/chat/completions",
        LlmProvider::OpenRouter | LlmProvider::Anthropic => {
            "https://openrouter.ai/api/v1/chat/completions"
        }
    }
}

pub(crate) fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "gpt-4o",
        LlmProvider::Ollama => "llama3.1",
        LlmProvider::OpenRouter | LlmProvider::Anthropic => "anthropic/claude-sonnet-4",
    }
}

#[derive(Clone)]
pub(crate) struct OpenAiCompatibleBackend {
    provider: LlmProvider,
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    default_params: HttpParams,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        provider: LlmProvider,
        api_key: Option<String>,
        base_url: Option<String>,
        default_model: String,
        default_params: HttpParams,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            provider,
            client: HttpClient::new()?,
            base_url: base_url.unwrap_or_else(|| default_base_url(provider).to_string()),
            api_key,
            default_model,
            default_params,
        })
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if a required API key variable is unset.
    pub fn new_from_config(config: &Config, provider: LlmProvider) -> Result<Self, LlmError> {
        let table = config.provider_config(provider);
        Self::new(
            provider,
            read_api_key(config, provider)?,
            table.and_then(|t| t.base_url.clone()),
            config
                .model_for(provider)
                .unwrap_or_else(|| default_model(provider).to_string()),
            HttpParams::from_config(config, provider),
        )
    }

    fn resolve_params(&self, inv: &LlmInvocation) -> (String, HttpParams) {
        let model = if inv.model.is_empty() {
            self.default_model.clone()
        } else {
            inv.model.clone()
        };
        let params = HttpParams {
            max_tokens: inv.max_tokens().unwrap_or(self.default_params.max_tokens),
            temperature: inv.temperature().unwrap_or(self.default_params.temperature),
        };
        (model, params)
    }

    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|msg| ChatMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let provider = self.provider.as_str();
        let (model, params) = self.resolve_params(&inv);

        debug!(
            provider,
            model = %model,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking chat completions backend"
        );

        let request_body = ChatRequest {
            model: model.clone(),
            messages: Self::convert_messages(&inv.messages),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: false,
        };

        let mut request = self.client.post(&self.base_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if self.provider == LlmProvider::OpenRouter {
            request = request
                .header("HTTP-Referer", OPENROUTER_REFERER)
                .header("X-Title", OPENROUTER_TITLE);
        }

        let response = self.client.send(request, inv.timeout, provider).await?;

        let body: ChatResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("Failed to parse {provider} response: {e}"))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                LlmError::Transport(format!("{provider} response missing message content"))
            })?;

        let mut result = LlmResult::new(content, provider, model);
        if let Some(usage) = body.usage {
            result = result.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        debug!(
            provider,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Chat completions invocation completed"
        );

        Ok(result)
    }

    fn provider(&self) -> &str {
        self.provider.as_str()
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
