use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use tendero_core::config::{LlmConfig, LlmProviderKind};

use crate::provider::{
    check_required_keys, ChatOptions, ChatOutcome, ChatProvider, ProviderError, Result, Tool,
    ToolError, ToolInvocation,
};

/// Maximum tool rounds per chat turn, to keep a confused model from
/// spinning.
const MAX_TOOL_ROUNDS: usize = 8;

/// Client for any OpenAI-compatible chat-completions endpoint.
///
/// OpenAI natively, Anthropic and Gemini through their compatibility
/// surfaces. The endpoint is resolved from config; the credential comes
/// from config or the provider's conventional env var.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    provider_name: &'static str,
}

impl OpenAiCompatProvider {
    /// Build from config. Returns `None` when no credential can be found —
    /// callers treat that as "LLM not available" and fall back.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let (name, endpoint, key_var) = match config.provider {
            LlmProviderKind::Openai => (
                "openai",
                "https://api.openai.com/v1/chat/completions",
                "OPENAI_API_KEY",
            ),
            LlmProviderKind::Anthropic => (
                "anthropic",
                "https://api.anthropic.com/v1/chat/completions",
                "ANTHROPIC_API_KEY",
            ),
            LlmProviderKind::Gemini => (
                "gemini",
                "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                "GEMINI_API_KEY",
            ),
        };
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(key_var).ok())?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: endpoint.to_string(),
            model: config.model.clone(),
            provider_name: name,
        })
    }

    async fn post_chat(&self, body: &Value, options: &ChatOptions) -> Result<Value> {
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send();

        let bounded = tokio::time::timeout(Duration::from_millis(options.timeout_ms), request);
        let outcome = match &options.cancel {
            Some(cancel) => tokio::select! {
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                outcome = bounded => outcome,
            },
            None => bounded.await,
        };
        let resp = outcome
            .map_err(|_| ProviderError::Timeout {
                ms: options.timeout_ms,
            })??;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "chat completions API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let parsed = tokio::time::timeout(Duration::from_millis(options.timeout_ms), resp.json())
            .await
            .map_err(|_| ProviderError::Timeout {
                ms: options.timeout_ms,
            })?
            .map_err(|e: reqwest::Error| ProviderError::Parse(e.to_string()))?;
        Ok(parsed)
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        self.provider_name
    }

    async fn ask_with_tools(
        &self,
        instructions: &str,
        question: &str,
        tools: &[Box<dyn Tool>],
        options: &ChatOptions,
    ) -> Result<ChatOutcome> {
        let tool_defs: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameter_schema(),
                    }
                })
            })
            .collect();

        let mut messages = vec![
            json!({"role": "system", "content": instructions}),
            json!({"role": "user", "content": question}),
        ];
        let mut invocations: Vec<ToolInvocation> = Vec::new();

        for round in 0..MAX_TOOL_ROUNDS {
            // A caller abort between tool rounds abandons the whole turn.
            if options.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            let mut body = json!({
                "model": self.model,
                "messages": messages,
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
            });
            if !tool_defs.is_empty() {
                body["tools"] = json!(tool_defs);
            }

            debug!(round, model = %self.model, "chat round");
            let raw = self.post_chat(&body, options).await?;

            let message = raw
                .pointer("/choices/0/message")
                .cloned()
                .ok_or_else(|| ProviderError::Parse("response has no message".to_string()))?;

            let tool_calls = message
                .get("tool_calls")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            if tool_calls.is_empty() {
                let content = message
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Ok(ChatOutcome {
                    content,
                    raw,
                    tool_invocations: invocations,
                });
            }

            messages.push(message.clone());
            for call in &tool_calls {
                let call_id = call
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("call_0")
                    .to_string();
                let name = call
                    .pointer("/function/name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let input: Value = call
                    .pointer("/function/arguments")
                    .and_then(Value::as_str)
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_else(|| json!({}));

                let output = dispatch_tool(tools, &name, input.clone()).await;
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call_id,
                    "content": output.to_string(),
                }));
                invocations.push(ToolInvocation {
                    name,
                    input,
                    output,
                });
            }
        }

        Err(ProviderError::Parse(format!(
            "tool loop exceeded {} rounds without a final reply",
            MAX_TOOL_ROUNDS
        )))
    }

    async fn ask_structured(
        &self,
        instructions: &str,
        prompt: &str,
        schema: &Value,
        options: &ChatOptions,
    ) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": instructions},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "reply",
                    "schema": schema,
                    "strict": true,
                },
            },
        });

        let raw = self.post_chat(&body, options).await?;
        let content = raw
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Parse("response has no content".to_string()))?;
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ProviderError::SchemaViolation(e.to_string()))?;
        check_required_keys(&value, schema)?;
        Ok(value)
    }
}

/// Find and execute the named tool; unknown names and tool failures are
/// reported to the LLM as error mappings rather than aborting the turn.
pub(crate) async fn dispatch_tool(tools: &[Box<dyn Tool>], name: &str, input: Value) -> Value {
    match tools.iter().find(|t| t.name() == name) {
        Some(tool) => {
            debug!(tool = name, "executing tool");
            match tool.execute(input).await {
                Ok(output) => output,
                Err(ToolError(message)) => json!({"error": message}),
            }
        }
        None => json!({"error": format!("unknown tool: {}", name)}),
    }
}
