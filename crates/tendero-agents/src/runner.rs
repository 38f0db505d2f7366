use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use tendero_core::message::MAX_TEXT_BODY;
use tendero_core::{AgentResponse, OutgoingMessage, Turn};
use tendero_llm::{ChatOptions, ChatProvider, ToolInvocation};
use tendero_session::Session;

use crate::agent::LaneAgent;
use crate::context::TurnContext;

/// Executes one agent turn: fresh tools over a context snapshot, the
/// provider chat, patch aggregation, hooks, and error conversion.
///
/// The runner never lets an agent failure escape: any provider error
/// becomes a one-message error reply with an empty patch, so the
/// controller always gets a usable [`AgentResponse`].
pub struct AgentRunner {
    provider: Arc<dyn ChatProvider>,
    options: ChatOptions,
}

impl AgentRunner {
    pub fn new(provider: Arc<dyn ChatProvider>, options: ChatOptions) -> Self {
        Self { provider, options }
    }

    pub async fn run(
        &self,
        agent: &dyn LaneAgent,
        turn: &Turn,
        session: &Session,
        intent: &str,
    ) -> AgentResponse {
        // Deterministic gates (e.g. phone verification) skip the chat.
        if let Some(response) = agent.preflight(session, intent) {
            return response;
        }

        let ctx = TurnContext::new(session.clone(), intent);
        let tools = agent.build_tools(&ctx);

        let narrative = agent.build_context(session, intent);
        let prompt = if narrative.is_empty() {
            turn.text.clone()
        } else {
            format!("{}\n\nUser question: {}", narrative, turn.text)
        };

        let outcome = match self
            .provider
            .ask_with_tools(&agent.system_instructions(), &prompt, &tools, &self.options)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    event = "agent_failure",
                    lane = %agent.lane(),
                    err = %e,
                    "agent chat failed, returning error reply"
                );
                return AgentResponse::text(agent.error_message());
            }
        };

        log_tool_invocations(agent, &outcome.tool_invocations);

        // Shallow-merge tool patches in call order (later wins), then
        // overlay the agent-level patch on top.
        let tool_patch = aggregate_tool_patches(&outcome.tool_invocations);
        let mut patch = tool_patch.clone();
        for (key, value) in agent.build_state_patch(turn, session, intent, &outcome.content, &tool_patch)
        {
            patch.insert(key, value);
        }

        let messages = sanitize_messages(agent.build_messages(&outcome.content, &outcome.raw));

        let (patch, baton) =
            agent.post_process(turn, session, intent, &outcome.content, patch, &tool_patch);

        AgentResponse {
            messages,
            state_patch: patch,
            baton,
        }
    }
}

/// Collect `state_patch` mappings from tool outputs, in invocation order.
fn aggregate_tool_patches(invocations: &[ToolInvocation]) -> Map<String, Value> {
    let mut merged = Map::new();
    for invocation in invocations {
        if let Some(Value::Object(patch)) = invocation.output.get("state_patch") {
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

fn log_tool_invocations(agent: &dyn LaneAgent, invocations: &[ToolInvocation]) {
    for invocation in invocations {
        info!(
            event = "agent_tool_invoked",
            lane = %agent.lane(),
            tool = %invocation.name,
            "tool invoked"
        );
        info!(
            event = "agent_tool_result",
            lane = %agent.lane(),
            tool = %invocation.name,
            is_error = invocation.output.get("error").is_some(),
            "tool result"
        );
    }
}

/// Enforce the outbound shape limits before the controller sees the
/// messages: long text is truncated, invalid interactive shapes dropped.
fn sanitize_messages(messages: Vec<OutgoingMessage>) -> Vec<OutgoingMessage> {
    messages
        .into_iter()
        .filter_map(|msg| match msg {
            OutgoingMessage::Text { body } => {
                if body.chars().count() > MAX_TEXT_BODY {
                    Some(OutgoingMessage::Text {
                        body: body.chars().take(MAX_TEXT_BODY).collect(),
                    })
                } else {
                    Some(OutgoingMessage::Text { body })
                }
            }
            other => {
                if let Err(e) = other.validate() {
                    warn!(err = %e, "dropping invalid interactive message");
                    None
                } else {
                    Some(other)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tendero_core::Lane;
    use tendero_llm::mock::{MockProvider, MockScript};
    use tendero_llm::{Tool, ToolError};

    struct PatchingTool;

    #[async_trait]
    impl Tool for PatchingTool {
        fn name(&self) -> &str {
            "patcher"
        }
        fn description(&self) -> &str {
            "Returns a state patch"
        }
        fn parameter_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, params: Value) -> Result<Value, ToolError> {
            Ok(json!({
                "ok": true,
                "state_patch": {"commerce_state": params["state"], "vip": false}
            }))
        }
    }

    struct PlainAgent;

    impl LaneAgent for PlainAgent {
        fn lane(&self) -> Lane {
            Lane::Info
        }
        fn system_instructions(&self) -> String {
            "You are a test agent.".to_string()
        }
        fn build_tools(&self, _ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>> {
            vec![Box::new(PatchingTool)]
        }
        fn error_message(&self) -> String {
            "something went wrong".to_string()
        }
    }

    fn turn() -> Turn {
        Turn {
            tenant_id: "t1".to_string(),
            wa_id: "57300111".to_string(),
            message_id: "m1".to_string(),
            text: "hola".to_string(),
            payload: None,
            timestamp: "2025-01-15T10:00:00Z".to_string(),
        }
    }

    fn session() -> Session {
        tendero_session::builder::new_session("t1", "57300111", None, None)
    }

    #[tokio::test]
    async fn tool_patches_merge_in_call_order() {
        let provider = Arc::new(MockProvider::with_script([MockScript::ToolPass {
            calls: vec![
                ("patcher".to_string(), json!({"state": "cart_active"})),
                ("patcher".to_string(), json!({"state": "checkout"})),
            ],
            reply: "listo".to_string(),
        }]));
        let runner = AgentRunner::new(provider, ChatOptions::default());
        let response = runner.run(&PlainAgent, &turn(), &session(), "greeting").await;

        // Later call wins the shared key.
        assert_eq!(response.state_patch["commerce_state"], json!("checkout"));
        assert_eq!(response.messages, vec![OutgoingMessage::text("listo")]);
        assert!(response.baton.is_none());
    }

    #[tokio::test]
    async fn provider_failure_becomes_error_reply() {
        let provider = Arc::new(MockProvider::with_script([MockScript::Fail(
            "boom".to_string(),
        )]));
        let runner = AgentRunner::new(provider, ChatOptions::default());
        let response = runner.run(&PlainAgent, &turn(), &session(), "greeting").await;

        assert_eq!(
            response.messages,
            vec![OutgoingMessage::text("something went wrong")]
        );
        assert!(response.state_patch.is_empty());
        assert!(response.baton.is_none());
    }

    #[tokio::test]
    async fn oversized_reply_is_truncated_not_dropped() {
        let provider = Arc::new(MockProvider::with_script([MockScript::Reply(
            "x".repeat(MAX_TEXT_BODY + 50),
        )]));
        let runner = AgentRunner::new(provider, ChatOptions::default());
        let response = runner.run(&PlainAgent, &turn(), &session(), "greeting").await;

        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].body().chars().count(), MAX_TEXT_BODY);
    }
}
