use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::OutgoingMessage;

/// The closed set of conversation domains. Every turn is handled by the
/// agent owning exactly one of these lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Info,
    Product,
    Commerce,
    Support,
    OrderStatus,
}

impl Lane {
    /// All lanes, in registry order.
    pub const ALL: [Lane; 5] = [
        Lane::Info,
        Lane::Product,
        Lane::Commerce,
        Lane::Support,
        Lane::OrderStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Info => "info",
            Lane::Product => "product",
            Lane::Commerce => "commerce",
            Lane::Support => "support",
            Lane::OrderStatus => "order_status",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Lane {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "info" => Ok(Lane::Info),
            "product" => Ok(Lane::Product),
            "commerce" => Ok(Lane::Commerce),
            "support" => Ok(Lane::Support),
            "order_status" => Ok(Lane::OrderStatus),
            other => Err(format!("unknown lane: {}", other)),
        }
    }
}

/// Canonical, provider-neutral view of one inbound user message.
///
/// Built once by the turn builder and never mutated afterwards; `text` is
/// already distilled from the provider message type (body, caption,
/// transcription or a typed placeholder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub tenant_id: String,
    pub wa_id: String,
    /// Provider-scoped unique message id — the idempotency key.
    pub message_id: String,
    pub text: String,
    /// Opaque interactive-element id (button/list row), when present.
    pub payload: Option<String>,
    /// RFC3339 UTC timestamp.
    pub timestamp: String,
}

/// Output of the router: which lane handles the turn and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterDecision {
    pub lane: Lane,
    /// Free-form, lane-scoped intent label (e.g. "greeting", "view_cart").
    pub intent: String,
    /// Clamped into [0, 1].
    pub confidence: f64,
    /// Short human-readable clauses explaining the decision.
    pub reasoning: Vec<String>,
}

/// A handoff request: an agent asking the controller to re-dispatch the
/// turn to another lane within the same turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baton {
    pub to_lane: Lane,
    /// Flat state overlay merged into the session snapshot for the next agent.
    pub carry_state: Map<String, Value>,
    pub intent: String,
}

/// What one agent invocation produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Messages for the user, in send order. May be empty.
    pub messages: Vec<OutgoingMessage>,
    /// Flat session patch, applied by shallow overlay (new keys win).
    pub state_patch: Map<String, Value>,
    pub baton: Option<Baton>,
}

impl AgentResponse {
    /// A single-text-message response with no patch and no baton.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            messages: vec![OutgoingMessage::text(body)],
            state_patch: Map::new(),
            baton: None,
        }
    }
}

/// Final outcome of one `handle_turn` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub success: bool,
    /// Messages flattened across the whole baton chain, in send order.
    pub messages: Vec<OutgoingMessage>,
    /// The final lane after any baton handoffs. `None` when the turn never
    /// reached routing (duplicate, lock failure, reset).
    pub lane: Option<Lane>,
    pub error: Option<String>,
}

impl TurnResult {
    pub fn ok(messages: Vec<OutgoingMessage>, lane: Lane) -> Self {
        Self {
            success: true,
            messages,
            lane: Some(lane),
            error: None,
        }
    }

    /// A replayed delivery: success, no messages, no side effects.
    pub fn duplicate() -> Self {
        Self {
            success: true,
            messages: Vec::new(),
            lane: None,
            error: Some("duplicate_turn".to_string()),
        }
    }

    pub fn lock_unavailable() -> Self {
        Self::failed("lock_unavailable")
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: Vec::new(),
            lane: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn lane_roundtrips_through_str() {
        for lane in Lane::ALL {
            assert_eq!(Lane::from_str(lane.as_str()).unwrap(), lane);
        }
    }

    #[test]
    fn lane_rejects_unknown_tag() {
        assert!(Lane::from_str("billing").is_err());
    }

    #[test]
    fn lane_serde_uses_snake_case() {
        let json = serde_json::to_string(&Lane::OrderStatus).unwrap();
        assert_eq!(json, "\"order_status\"");
    }

    #[test]
    fn duplicate_result_is_success_with_no_messages() {
        let r = TurnResult::duplicate();
        assert!(r.success);
        assert!(r.messages.is_empty());
        assert_eq!(r.error.as_deref(), Some("duplicate_turn"));
        assert!(r.lane.is_none());
    }
}
