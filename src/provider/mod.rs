//! Reasoning/completion service boundary and its implementations.

pub mod http;
pub mod local;
#[cfg(feature = "openai")]
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, Backend};
use crate::error::InventoryError;
use crate::interpret::InterpretationPolicy;
use crate::tools::ToolDescriptor;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a completion service: the prompt and running context as
/// messages, plus the tools the service may ask for.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolDescriptor>,
    pub settings: GenerationSettings,
}

/// Raw response from a completion service.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
    pub usage: Usage,
}

/// What a response asks the agent to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Run these tools and call the service again with their results.
    ToolInvocation { text: String, calls: Vec<AgentToolCall> },
    /// The turn's answer.
    FinalAnswer(String),
}

impl ProviderResponse {
    pub fn final_answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    pub fn tool_call(call: AgentToolCall) -> Self {
        Self {
            tool_calls: vec![call],
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }
    }

    pub fn completion(&self) -> Completion {
        if self.tool_calls.is_empty() {
            Completion::FinalAnswer(self.text.clone())
        } else {
            Completion::ToolInvocation {
                text: self.text.clone(),
                calls: self.tool_calls.clone(),
            }
        }
    }
}

/// Core trait implemented by every completion backend.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai", "local").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Run one completion.
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, InventoryError>;
}

/// Create the provider selected by `config`.
pub fn create_provider(
    config: &AppConfig,
    policy: Arc<dyn InterpretationPolicy>,
) -> Result<Arc<dyn ModelProvider>, InventoryError> {
    match config.backend {
        #[cfg(feature = "openai")]
        Backend::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| InventoryError::Configuration("Missing OPENAI_API_KEY".into()))?;
            Ok(Arc::new(openai::OpenAiProvider::new(
                config.model.clone(),
                api_key,
                config.base_url.clone(),
                config.request_timeout,
            )?))
        }
        #[cfg(not(feature = "openai"))]
        Backend::OpenAi => Err(InventoryError::Configuration(
            "OpenAI backend not enabled via feature flags".into(),
        )),
        Backend::Local => Ok(Arc::new(local::LocalProvider::new(policy))),
    }
}
