use std::sync::Arc;

use serde_json::{Map, Value};

use tendero_core::{AgentResponse, Baton, Lane, OutgoingMessage, Turn};
use tendero_llm::Tool;
use tendero_session::Session;

use crate::context::TurnContext;

/// Contract of a concrete lane agent.
///
/// Implementations are re-entrant: the registry shares one instance across
/// all sessions, so hooks receive everything they need as arguments and
/// keep nothing between turns.
pub trait LaneAgent: Send + Sync {
    fn lane(&self) -> Lane;

    /// Lane-specific system prompt: personality, policies, tool-use
    /// guidelines, escalation triggers. Free of per-turn data.
    fn system_instructions(&self) -> String;

    /// Fresh tool instances for this turn, closing over the context
    /// snapshot as needed.
    fn build_tools(&self, ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>>;

    /// Optional narrative context prepended to the user question (cart
    /// summary, case status, recent turns).
    fn build_context(&self, _session: &Session, _intent: &str) -> String {
        String::new()
    }

    /// Optional deterministic short-circuit evaluated before any LLM call.
    /// Returning `Some` skips the chat entirely (e.g. an unverified user
    /// asking for order status).
    fn preflight(&self, _session: &Session, _intent: &str) -> Option<AgentResponse> {
        None
    }

    /// Optional agent-level patch, overlaid on the aggregated tool patch.
    fn build_state_patch(
        &self,
        _turn: &Turn,
        _session: &Session,
        _intent: &str,
        _reply: &str,
        _tool_patch: &Map<String, Value>,
    ) -> Map<String, Value> {
        Map::new()
    }

    /// Final hook: refine the patch and decide on a handoff.
    fn post_process(
        &self,
        _turn: &Turn,
        _session: &Session,
        _intent: &str,
        _reply: &str,
        patch: Map<String, Value>,
        _tool_patch: &Map<String, Value>,
    ) -> (Map<String, Value>, Option<Baton>) {
        (patch, None)
    }

    /// Turn the assistant text into outgoing messages. Defaults to one
    /// text message.
    fn build_messages(&self, reply: &str, _raw: &Value) -> Vec<OutgoingMessage> {
        vec![OutgoingMessage::text(reply)]
    }

    /// User-facing copy when the turn cannot be completed.
    fn error_message(&self) -> String;
}
