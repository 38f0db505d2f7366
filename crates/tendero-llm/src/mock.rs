//! Scripted provider for tests: push the outcomes you want, in order.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::openai::dispatch_tool;
use crate::provider::{
    check_required_keys, ChatOptions, ChatOutcome, ChatProvider, ProviderError, Result, Tool,
    ToolInvocation,
};

/// One scripted provider behaviour, consumed per call.
#[derive(Debug, Clone)]
pub enum MockScript {
    /// Plain text reply, no tool calls.
    Reply(String),
    /// Execute the given tool calls against the registered tools, then
    /// reply with the text.
    ToolPass {
        calls: Vec<(String, Value)>,
        reply: String,
    },
    /// Structured-output reply (checked against the requested schema, like
    /// the real provider).
    Structured(Value),
    /// Simulate an exceeded deadline.
    Timeout,
    /// Simulate a transport failure.
    Fail(String),
}

/// A [`ChatProvider`] that replays a script.
///
/// Calls pop from the front; an empty script answers with a fixed default
/// reply so incidental calls don't fail tests that don't care about them.
#[derive(Debug, Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<MockScript>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: MockScript) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn with_script(steps: impl IntoIterator<Item = MockScript>) -> Self {
        let provider = Self::new();
        for step in steps {
            provider.push(step);
        }
        provider
    }

    fn pop(&self) -> Option<MockScript> {
        self.script.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ask_with_tools(
        &self,
        _instructions: &str,
        _question: &str,
        tools: &[Box<dyn Tool>],
        options: &ChatOptions,
    ) -> Result<ChatOutcome> {
        if options.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        match self.pop() {
            Some(MockScript::Reply(content)) => Ok(ChatOutcome {
                content,
                raw: json!({"mock": true}),
                tool_invocations: Vec::new(),
            }),
            Some(MockScript::ToolPass { calls, reply }) => {
                let mut invocations = Vec::new();
                for (name, input) in calls {
                    let output = dispatch_tool(tools, &name, input.clone()).await;
                    invocations.push(ToolInvocation {
                        name,
                        input,
                        output,
                    });
                }
                Ok(ChatOutcome {
                    content: reply,
                    raw: json!({"mock": true}),
                    tool_invocations: invocations,
                })
            }
            Some(MockScript::Timeout) => Err(ProviderError::Timeout {
                ms: options.timeout_ms,
            }),
            Some(MockScript::Fail(message)) => Err(ProviderError::Unavailable(message)),
            Some(MockScript::Structured(_)) => Err(ProviderError::Unavailable(
                "structured script step reached ask_with_tools".to_string(),
            )),
            None => Ok(ChatOutcome {
                content: "ok".to_string(),
                raw: json!({"mock": true}),
                tool_invocations: Vec::new(),
            }),
        }
    }

    async fn ask_structured(
        &self,
        _instructions: &str,
        _prompt: &str,
        schema: &Value,
        options: &ChatOptions,
    ) -> Result<Value> {
        if options.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        match self.pop() {
            Some(MockScript::Structured(value)) => {
                check_required_keys(&value, schema)?;
                Ok(value)
            }
            Some(MockScript::Timeout) => Err(ProviderError::Timeout {
                ms: options.timeout_ms,
            }),
            Some(MockScript::Fail(message)) => Err(ProviderError::Unavailable(message)),
            Some(other) => Err(ProviderError::Unavailable(format!(
                "unexpected script step for ask_structured: {:?}",
                other
            ))),
            None => Err(ProviderError::Unavailable("script exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolError;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the input back"
        }
        fn parameter_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, params: Value) -> std::result::Result<Value, ToolError> {
            Ok(json!({"echoed": params}))
        }
    }

    #[tokio::test]
    async fn tool_pass_executes_and_records() {
        let provider = MockProvider::with_script([MockScript::ToolPass {
            calls: vec![("echo".to_string(), json!({"x": 1}))],
            reply: "done".to_string(),
        }]);
        let tools: Vec<Box<dyn Tool>> = vec![Box::new(Echo)];
        let outcome = provider
            .ask_with_tools("sys", "q", &tools, &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.content, "done");
        assert_eq!(outcome.tool_invocations.len(), 1);
        assert_eq!(outcome.tool_invocations[0].output["echoed"]["x"], 1);
    }

    #[tokio::test]
    async fn structured_reply_is_schema_checked() {
        let schema = json!({"type": "object", "required": ["lane"]});
        let provider = MockProvider::with_script([MockScript::Structured(json!({"wrong": 1}))]);
        let err = provider
            .ask_structured("sys", "p", &schema, &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_the_script_runs() {
        let provider = MockProvider::with_script([MockScript::Reply("never".to_string())]);
        let cancel = tokio_util::sync::CancellationToken::new();
        cancel.cancel();
        let options = ChatOptions {
            cancel: Some(cancel),
            ..ChatOptions::default()
        };

        let err = provider
            .ask_with_tools("sys", "q", &[], &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
        // The scripted reply is still queued for the next (uncancelled) call.
        let outcome = provider
            .ask_with_tools("sys", "q", &[], &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.content, "never");
    }

    #[tokio::test]
    async fn timeout_script_reports_configured_deadline() {
        let provider = MockProvider::with_script([MockScript::Timeout]);
        let options = ChatOptions {
            timeout_ms: 900,
            ..ChatOptions::default()
        };
        let err = provider
            .ask_structured("sys", "p", &json!({}), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { ms: 900 }));
    }
}
