//! The two-tier lane router: an LLM intent classifier when enabled and
//! reachable, a regex rule table otherwise. Routing is infallible — every
//! failure path degrades to a decision, never an error.

pub mod rules;
pub mod summary;

use std::str::FromStr;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use tendero_core::config::LlmConfig;
use tendero_core::{Lane, RouterDecision, Turn};
use tendero_llm::{ChatOptions, ChatProvider, ProviderError};
use tendero_session::Session;

/// How much of the user text the rule tier and the LLM summary see.
const DEFAULT_MAX_TEXT: usize = 200;

pub struct Router {
    provider: Option<Arc<dyn ChatProvider>>,
    config: LlmConfig,
    max_dialogue_text: usize,
}

impl Router {
    pub fn new(provider: Option<Arc<dyn ChatProvider>>, config: LlmConfig) -> Self {
        Self {
            provider,
            config,
            max_dialogue_text: DEFAULT_MAX_TEXT,
        }
    }

    pub fn with_max_dialogue_text(mut self, max: usize) -> Self {
        self.max_dialogue_text = max;
        self
    }

    /// Pick the entry lane for this turn. Always returns a decision.
    pub async fn route(&self, turn: &Turn, session: &Session) -> RouterDecision {
        if self.config.routing_enabled {
            if let Some(provider) = &self.provider {
                match self.llm_route(provider.as_ref(), turn, session).await {
                    Ok(decision) => {
                        debug!(
                            event = "llm_structured_reply",
                            lane = %decision.lane,
                            intent = %decision.intent,
                            confidence = decision.confidence,
                            "router LLM decision"
                        );
                        return decision;
                    }
                    Err(e) => {
                        warn!(event = "llm_fallback_used", err = %e, "routing LLM unavailable");
                    }
                }
            } else {
                warn!(
                    event = "llm_fallback_used",
                    err = "no provider credentials",
                    "routing LLM unavailable"
                );
            }
        }
        self.rule_route(turn, session)
    }

    async fn llm_route(
        &self,
        provider: &dyn ChatProvider,
        turn: &Turn,
        session: &Session,
    ) -> Result<RouterDecision, ProviderError> {
        let options = ChatOptions {
            temperature: self.config.temperature,
            timeout_ms: self.config.timeout_ms,
            max_tokens: 256,
            cancel: None,
        };
        let prompt = format!(
            "State:\n{}\n\nMessage: {}",
            summary::state_summary(session, self.max_dialogue_text),
            tendero_core::telemetry::digest(&turn.text, self.max_dialogue_text),
        );

        let value = provider
            .ask_structured(SYSTEM_PROMPT, &prompt, &decision_schema(), &options)
            .await?;
        parse_decision(value)
    }

    fn rule_route(&self, turn: &Turn, session: &Session) -> RouterDecision {
        if let Some(decision) = rules::match_text(&turn.text) {
            return decision;
        }
        // Sticky lane: an ambiguous message mid-conversation stays where
        // the conversation already is.
        if let Some(lane) = session.current_lane() {
            if lane != Lane::Info && session.turns_len() > 0 {
                debug!(lane = %lane, "sticky lane kept for ambiguous message");
                return RouterDecision {
                    lane,
                    intent: "general_follow_up".to_string(),
                    confidence: 0.5,
                    reasoning: vec!["sticky_lane".to_string()],
                };
            }
        }
        rules::fallback()
    }
}

const SYSTEM_PROMPT: &str = "\
You route WhatsApp messages for Tendero, a Colombian artisanal food store, \
to exactly one lane:
- info: greetings, hours, locations, shipping/payment/return policy
- product: what is for sale, prices, stock, comparisons
- commerce: add to cart, view cart, place an order, checkout
- support: complaints, refunds, open cases, talking to a human
- order_status: where is my order, delivery estimates

Examples:
- \"hola\" -> info / greeting
- \"tienen cafe descafeinado?\" -> product / product_inquiry
- \"agrega dos al carrito\" -> commerce / add_to_cart
- \"mi pedido llego incompleto\" -> support / complaint
- \"donde va mi pedido?\" -> order_status / order_status

Reply with the structured decision only. Do not address the customer.";

fn decision_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "lane": {
                "type": "string",
                "enum": Lane::ALL.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            },
            "intent": {"type": "string"},
            "confidence": {"type": "number"},
            "reasoning": {"type": "array", "items": {"type": "string"}},
        },
        "required": ["lane", "intent", "confidence", "reasoning"],
        "additionalProperties": false,
    })
}

fn parse_decision(value: Value) -> Result<RouterDecision, ProviderError> {
    let lane_tag = value
        .get("lane")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::SchemaViolation("lane missing".to_string()))?;
    let lane = Lane::from_str(lane_tag).map_err(ProviderError::SchemaViolation)?;
    let intent = value
        .get("intent")
        .and_then(Value::as_str)
        .unwrap_or("general_info")
        .to_string();
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.5)
        .clamp(0.0, 1.0);
    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(RouterDecision {
        lane,
        intent,
        confidence,
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendero_llm::mock::{MockProvider, MockScript};
    use tendero_session::builder;

    fn turn(text: &str) -> Turn {
        Turn {
            tenant_id: "t1".to_string(),
            wa_id: "57300111".to_string(),
            message_id: "m1".to_string(),
            text: text.to_string(),
            payload: None,
            timestamp: "2025-01-15T10:00:00Z".to_string(),
        }
    }

    fn session() -> Session {
        builder::new_session("t1", "57300111", None, None)
    }

    fn enabled_config() -> LlmConfig {
        LlmConfig {
            routing_enabled: true,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn disabled_llm_goes_straight_to_rules() {
        let router = Router::new(None, LlmConfig::default());
        let d = router.route(&turn("hola"), &session()).await;
        assert_eq!(d.lane, Lane::Info);
        assert_eq!(d.reasoning, vec!["rule_based"]);
    }

    #[tokio::test]
    async fn llm_decision_is_used_when_valid() {
        let provider = Arc::new(MockProvider::with_script([MockScript::Structured(json!({
            "lane": "product",
            "intent": "product_inquiry",
            "confidence": 0.92,
            "reasoning": ["asks about stock"],
        }))]));
        let router = Router::new(Some(provider), enabled_config());
        let d = router.route(&turn("tienen miel?"), &session()).await;
        assert_eq!(d.lane, Lane::Product);
        assert_eq!(d.confidence, 0.92);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let provider = Arc::new(MockProvider::with_script([MockScript::Structured(json!({
            "lane": "info",
            "intent": "greeting",
            "confidence": 1.7,
            "reasoning": [],
        }))]));
        let router = Router::new(Some(provider), enabled_config());
        let d = router.route(&turn("hola"), &session()).await;
        assert_eq!(d.confidence, 1.0);
    }

    #[tokio::test]
    async fn timeout_falls_back_to_rules() {
        let provider = Arc::new(MockProvider::with_script([MockScript::Timeout]));
        let router = Router::new(Some(provider), enabled_config());
        let d = router.route(&turn("hola"), &session()).await;
        assert_eq!(d.lane, Lane::Info);
        assert_eq!(d.reasoning, vec!["rule_based"]);
    }

    #[tokio::test]
    async fn unknown_lane_from_llm_falls_back() {
        let provider = Arc::new(MockProvider::with_script([MockScript::Structured(json!({
            "lane": "billing",
            "intent": "invoice",
            "confidence": 0.9,
            "reasoning": [],
        }))]));
        let router = Router::new(Some(provider), enabled_config());
        let d = router.route(&turn("factura"), &session()).await;
        assert_eq!(d.reasoning, vec!["fallback"]);
    }

    #[tokio::test]
    async fn missing_credentials_fall_back() {
        let router = Router::new(None, enabled_config());
        let d = router.route(&turn("hola"), &session()).await;
        assert_eq!(d.reasoning, vec!["rule_based"]);
    }

    #[tokio::test]
    async fn ambiguous_message_sticks_to_current_lane() {
        let mut s = session();
        s.set_current_lane(Lane::Commerce);
        s.push_user_entry("agrega cafe", "m0", "2025-01-15T09:59:00Z")
            .unwrap();
        let router = Router::new(None, LlmConfig::default());
        let d = router.route(&turn("y dos mas"), &s).await;
        assert_eq!(d.lane, Lane::Commerce);
        assert_eq!(d.reasoning, vec!["sticky_lane"]);
    }

    #[tokio::test]
    async fn ambiguous_first_contact_falls_back_to_info() {
        let router = Router::new(None, LlmConfig::default());
        let d = router.route(&turn("mmmm"), &session()).await;
        assert_eq!(d.lane, Lane::Info);
        assert_eq!(d.reasoning, vec!["fallback"]);
    }
}
