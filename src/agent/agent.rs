//! Query agent: one conversational turn with a bounded tool loop.

use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use tracing::{debug, info, warn};

use super::session::SessionState;
use crate::config::{AppConfig, DEFAULT_MAX_STEPS, DEFAULT_TIMEOUT_SECS};
use crate::error::{InventoryError, Result};
use crate::interpret::{normalize_line_breaks, InterpretationPolicy};
use crate::provider::{Completion, ModelProvider, ProviderRequest, ProviderResponse};
use crate::tools::{Tool, ToolArguments, ToolDescriptor, ToolExecutionContext};
use crate::types::{AgentToolCall, GenerationSettings, ModelMessage, Usage};
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

const ROLE_PROMPT: &str = "You are an inventory assistant for a facility. Answer questions about \
    materials, their locations and quantities using only the data returned by your tools. \
    Never invent items, locations or quantities.";

/// Knobs for a single turn.
#[derive(Debug, Clone, Builder)]
pub struct AgentSettings {
    /// Completion calls allowed per turn before the turn is cut short.
    #[builder(default = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,
    /// Bound on each completion call.
    #[builder(default = Duration::from_secs(DEFAULT_TIMEOUT_SECS))]
    pub timeout: Duration,
    #[builder(default)]
    pub retry: RetryPolicy,
    #[builder(default = GenerationSettings::deterministic())]
    pub generation: GenerationSettings,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AgentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::builder()
            .max_steps(config.max_steps)
            .timeout(config.request_timeout)
            .build()
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub answer: String,
    /// Answer replayed from the previous identical query.
    pub duplicate: bool,
    /// The step bound was reached; `answer` is a partial answer.
    pub exhausted: bool,
    /// Completion calls made.
    pub steps: usize,
    pub usage: Usage,
}

/// Answers inventory questions by driving a completion service and its tools.
pub struct QueryAgent {
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
    system_prompt: String,
    settings: AgentSettings,
}

impl QueryAgent {
    /// Agent whose system prompt carries `policy`'s answer guidance.
    pub fn new(provider: Arc<dyn ModelProvider>, policy: &dyn InterpretationPolicy) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            system_prompt: format!("{ROLE_PROMPT}\n\n{}", policy.guidance()),
            settings: AgentSettings::default(),
        }
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Run one turn against `session`.
    ///
    /// The session is only touched once the turn completes. A service
    /// failure returns [`InventoryError::ReasoningService`] and leaves it
    /// as it was, so the same query can be resubmitted.
    pub async fn handle_query(&self, session: &mut SessionState, query: &str) -> Result<TurnOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(InventoryError::EmptyQuery);
        }

        if let Some(answer) = session.guard().check(query) {
            debug!(query, "duplicate query, replaying previous answer");
            return Ok(TurnOutcome {
                answer: answer.to_string(),
                duplicate: true,
                exhausted: false,
                steps: 0,
                usage: Usage::default(),
            });
        }

        info!(
            query,
            provider = self.provider.provider_name(),
            model = self.provider.model_id(),
            "handling query"
        );

        let mut messages = Vec::with_capacity(session.memory().len() * 2 + 2);
        messages.push(ModelMessage::system(self.system_prompt.clone()));
        messages.extend(session.memory().as_messages());
        messages.push(ModelMessage::user(query));

        let tool_defs: Vec<ToolDescriptor> = self.tools.iter().map(|t| t.descriptor()).collect();
        let max_steps = self.settings.max_steps.max(1);
        let mut usage = Usage::default();
        let mut partial = String::new();
        let mut final_answer = None;
        let mut steps = 0;

        while steps < max_steps {
            let request = ProviderRequest {
                messages: messages.clone(),
                tools: tool_defs.clone(),
                settings: self.settings.generation.clone(),
            };
            debug!(step = steps, messages = request.messages.len(), "calling completion service");

            let response = self.complete(&request).await.map_err(|e| {
                warn!(query, error = %e, "completion service failed, turn aborted");
                InventoryError::reasoning_service(e)
            })?;
            steps += 1;
            usage.merge(&response.usage);

            match response.completion() {
                Completion::FinalAnswer(text) => {
                    final_answer = Some(text);
                    break;
                }
                Completion::ToolInvocation { text, calls } => {
                    if !text.trim().is_empty() {
                        partial = text.clone();
                    }
                    messages.push(ModelMessage::assistant_tool_calls(&text, &calls));
                    let ctx = ToolExecutionContext {
                        query: query.to_string(),
                        step: steps - 1,
                    };
                    // One at a time, in the order requested.
                    for call in &calls {
                        let (value, is_error) = self.run_tool(call, &ctx).await;
                        messages.push(ModelMessage::tool_result(call.id.clone(), value, is_error));
                    }
                }
            }
        }

        let exhausted = final_answer.is_none();
        let answer = match final_answer {
            Some(text) => normalize_line_breaks(&text),
            None => {
                warn!(query, max_steps, "reasoning step bound reached");
                exhausted_answer(&partial, max_steps)
            }
        };

        session.commit(query, &answer);
        info!(
            steps,
            exhausted,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "turn complete"
        );

        Ok(TurnOutcome {
            answer,
            duplicate: false,
            exhausted,
            steps,
            usage,
        })
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let provider = &self.provider;
        let timeout = self.settings.timeout;
        self.settings
            .retry
            .execute(move || with_timeout(timeout, provider.generate(request)))
            .await
    }

    /// Execute one tool call. Failures become error results for the service.
    async fn run_tool(&self, call: &AgentToolCall, ctx: &ToolExecutionContext) -> (serde_json::Value, bool) {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            warn!(tool = %call.name, "tool not found");
            return (
                serde_json::json!({ "error": format!("Tool '{}' not found", call.name) }),
                true,
            );
        };

        debug!(tool = %call.name, step = ctx.step, "executing tool");
        let args = ToolArguments::new(call.arguments.clone());
        match tool.execute(&args, ctx).await {
            Ok(value) => (value, false),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                (serde_json::json!({ "error": e.to_string() }), true)
            }
        }
    }
}

fn exhausted_answer(partial: &str, max_steps: usize) -> String {
    let notice = format!("I could not finish answering within {max_steps} reasoning steps.");
    if partial.trim().is_empty() {
        notice
    } else {
        format!("{}\n\n{notice}", normalize_line_breaks(partial.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_builder_fills_defaults() {
        let settings = AgentSettings::builder().max_steps(3).build();
        assert_eq!(settings.max_steps, 3);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.generation.temperature, Some(0.0));
    }

    #[test]
    fn exhausted_answer_keeps_partial_text() {
        assert_eq!(
            exhausted_answer("Checking shelves", 2),
            "Checking shelves\n\nI could not finish answering within 2 reasoning steps."
        );
        assert_eq!(
            exhausted_answer("  ", 2),
            "I could not finish answering within 2 reasoning steps."
        );
    }
}
