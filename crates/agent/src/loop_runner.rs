//! The agent reasoning loop implementation.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uigen_config::AppConfig;
use uigen_core::context::RequestContext;
use uigen_core::error::{Result, ToolError};
use uigen_core::message::{ContentBlock, Conversation, Turn};
use uigen_core::provider::{Provider, ProviderRequest};
use uigen_core::tool::{ToolCall, ToolRegistry};

use crate::prompt::GENERATION_PROMPT;
use crate::stream_event::AgentStreamEvent;

/// Why the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// The model reported `end_turn` or `max_tokens`.
    Finished,
    /// The model answered without calling a tool.
    NoToolUse,
    /// The iteration cap was reached.
    IterationCap,
    /// The model asked for a tool that is not registered.
    UnknownTool(String),
    /// The event receiver was dropped.
    Cancelled,
}

/// Summary of one loop run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// All text blocks the model produced, concatenated in order.
    pub text: String,
    /// Number of model calls made.
    pub iterations: usize,
    /// Number of tools executed.
    pub tool_calls: usize,
    pub stop: LoopStop,
}

/// The loop that alternates model calls with tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Max tokens per response
    max_tokens: u32,

    /// Temperature setting; provider default when unset
    temperature: Option<f32>,

    /// System prompt sent with every call
    system_prompt: String,

    /// Maximum model calls per request
    max_iterations: usize,
}

impl AgentLoop {
    pub const DEFAULT_MAX_ITERATIONS: usize = 40;
    pub const DEFAULT_MAX_TOKENS: u32 = 8192;

    /// Create a new agent loop with the default prompt and limits.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: None,
            system_prompt: GENERATION_PROMPT.to_string(),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Build a loop from the `[agent]` section and model settings.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let mut agent = Self::new(provider, &config.model)
            .with_max_tokens(config.max_tokens)
            .with_max_iterations(config.agent.max_iterations);
        if let Some(temperature) = config.temperature {
            agent = agent.with_temperature(temperature);
        }
        if let Some(prompt) = &config.agent.system_prompt_override {
            agent = agent.with_system_prompt(prompt.clone());
        }
        agent
    }

    /// Set the maximum number of model calls per request.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the loop until the model is done, the cap is hit, or the
    /// receiving end of `events` goes away.
    ///
    /// Text blocks go out on `events` as soon as each response arrives. Only
    /// the first tool-use block of a response is executed; whatever follows
    /// it in the same response is ignored. Provider failures abort the loop
    /// with `Err`; everything else ends it with a [`LoopStop`].
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        tools: &ToolRegistry,
        events: &mpsc::Sender<AgentStreamEvent>,
        ctx: &RequestContext,
    ) -> Result<LoopOutcome> {
        info!(
            request_id = %ctx.request_id,
            turns = conversation.len(),
            tools = tools.len(),
            "Processing conversation"
        );

        let definitions = tools.definitions();
        let mut text = String::new();
        let mut iterations = 0;
        let mut tool_calls = 0;

        let stop = 'turn: loop {
            if events.is_closed() {
                break LoopStop::Cancelled;
            }
            if iterations >= self.max_iterations {
                warn!(iterations, "Max iterations reached, ending turn");
                break LoopStop::IterationCap;
            }
            iterations += 1;
            debug!(iteration = iterations, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                system: Some(self.system_prompt.clone()),
                messages: conversation.turns().to_vec(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                tools: definitions.clone(),
            };

            let response = tokio::select! {
                biased;
                _ = events.closed() => break 'turn LoopStop::Cancelled,
                result = self.provider.complete(request) => result?,
            };

            if let Some(usage) = response.usage {
                debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    stop_reason = ?response.stop_reason,
                    "Model responded"
                );
            }

            // The assistant turn replays only what was acted on: non-empty
            // text up to and including the first tool use. Every replayed
            // tool use must be answered by a tool result.
            let mut replay = Vec::with_capacity(response.content.len());
            let mut invoked = None;
            for block in response.content {
                match block {
                    ContentBlock::Text { text: chunk } => {
                        if chunk.is_empty() {
                            continue;
                        }
                        text.push_str(&chunk);
                        if events.send(AgentStreamEvent::Text(chunk.clone())).await.is_err() {
                            break 'turn LoopStop::Cancelled;
                        }
                        replay.push(ContentBlock::Text { text: chunk });
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        invoked = Some(ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            arguments: input.clone(),
                        });
                        replay.push(ContentBlock::ToolUse { id, name, input });
                        break;
                    }
                    ContentBlock::ToolResult { .. } => {}
                }
            }

            let Some(call) = invoked else {
                let stop = if response.stop_reason.is_terminal() {
                    LoopStop::Finished
                } else {
                    LoopStop::NoToolUse
                };
                if !replay.is_empty() {
                    conversation.push(Turn::assistant_blocks(replay));
                }
                break stop;
            };

            if events.is_closed() {
                break LoopStop::Cancelled;
            }

            let result = match tools.dispatch(&call).await {
                Ok(result) => result,
                Err(ToolError::NotFound(name)) => {
                    warn!(tool = %name, "Model requested an unknown tool, ending turn");
                    break LoopStop::UnknownTool(name);
                }
                Err(e) => return Err(e.into()),
            };
            tool_calls += 1;
            debug!(tool = %call.name, success = result.success, "Tool executed");

            conversation.push(Turn::assistant_blocks(replay));
            conversation.push(Turn::tool_result(call.id, result.output, !result.success));

            if response.stop_reason.is_terminal() {
                break LoopStop::Finished;
            }
        };

        info!(iterations, tool_calls, stop = ?stop, "Agent loop finished");
        Ok(LoopOutcome {
            text,
            iterations,
            tool_calls,
            stop,
        })
    }
}
