use std::sync::Arc;

use serde_json::Value;

use tendero_session::Session;

/// Immutable per-turn snapshot handed to tool factories.
///
/// Agents are shared across sessions by the registry and must not stash
/// per-turn state in their own fields; everything a tool needs for one
/// turn lives here, and the whole value is dropped when the turn ends.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub session: Session,
    pub intent: String,
}

impl TurnContext {
    pub fn new(session: Session, intent: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            session,
            intent: intent.into(),
        })
    }

    /// Cart accessor for commerce tools: the items as stored, possibly empty.
    pub fn cart_items(&self) -> Vec<Value> {
        self.session
            .get(tendero_session::contract::CART_ITEMS)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn cart_subtotal_cents(&self) -> u64 {
        self.session
            .u64_field(tendero_session::contract::CART_SUBTOTAL_CENTS)
    }

    pub fn cart_currency(&self) -> String {
        self.session
            .str_field(tendero_session::contract::CART_CURRENCY)
            .unwrap_or(tendero_session::contract::DEFAULT_CART_CURRENCY)
            .to_string()
    }
}
