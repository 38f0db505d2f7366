use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Tool definition sent to the LLM API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
}

/// A callable the LLM may invoke during a chat turn.
///
/// Instances are created fresh per turn and may close over a session
/// snapshot; the provider loop executes them when the model asks.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable snake_case identifier the LLM calls the tool by.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON-Schema-shaped parameter description.
    fn parameter_schema(&self) -> Value;
    /// Execute with the model-supplied parameters. The returned mapping is
    /// surfaced to the LLM; a `state_patch` key inside it is stripped and
    /// aggregated by the agent layer.
    async fn execute(&self, params: Value) -> std::result::Result<Value, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameter_schema: self.parameter_schema(),
        }
    }
}

/// Tool execution failure. Reported to the LLM as an error result; the
/// turn keeps going.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ToolError(pub String);

/// One executed tool call, captured in invocation order.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub name: String,
    pub input: Value,
    /// What the tool returned; error results are recorded as
    /// `{"error": "..."}`.
    pub output: Value,
}

/// The assistant's final reply plus everything that happened on the way.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Final assistant text (after any tool rounds).
    pub content: String,
    /// Raw provider response body of the final round.
    pub raw: Value,
    /// Tool calls executed during the turn, in order.
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Per-call bounds. Every LLM invocation is time-bounded; a timeout is a
/// recoverable failure for the caller.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub temperature: f64,
    pub timeout_ms: u64,
    pub max_tokens: u32,
    /// When set, the caller can abort the call mid-flight; providers report
    /// the abort as [`ProviderError::Cancelled`].
    pub cancel: Option<CancellationToken>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            timeout_ms: 900,
            max_tokens: 1024,
            cancel: None,
        }
    }
}

impl ChatOptions {
    /// True once the caller has asked for the call to be abandoned.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|token| token.is_cancelled())
    }
}

/// Common interface to a chat-capable LLM.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Run a chat turn with tool dispatch: the provider loops on tool
    /// calls, executing them against `tools` and feeding results back,
    /// until the model produces a final text reply.
    async fn ask_with_tools(
        &self,
        instructions: &str,
        question: &str,
        tools: &[Box<dyn Tool>],
        options: &ChatOptions,
    ) -> Result<ChatOutcome>;

    /// Ask for a reply conforming to the given JSON schema.
    async fn ask_structured(
        &self,
        instructions: &str,
        prompt: &str,
        schema: &Value,
        options: &ChatOptions,
    ) -> Result<Value>;
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Reply violates the requested schema: {0}")]
    SchemaViolation(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Check a structured reply against the schema's `required` key list.
///
/// Full JSON-Schema validation belongs to the provider; this is the cheap
/// guard that catches the common failure (missing fields) before a caller
/// trusts the value.
pub fn check_required_keys(value: &Value, schema: &Value) -> Result<()> {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Ok(());
    };
    let Some(object) = value.as_object() else {
        return Err(ProviderError::SchemaViolation(
            "reply is not an object".to_string(),
        ));
    };
    for key in required.iter().filter_map(Value::as_str) {
        if !object.contains_key(key) {
            return Err(ProviderError::SchemaViolation(format!(
                "missing required key: {}",
                key
            )));
        }
    }
    Ok(())
}
