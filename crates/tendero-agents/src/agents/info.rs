use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Map, Value};

use tendero_core::{Baton, Lane, Turn};
use tendero_llm::Tool;
use tendero_session::Session;

use crate::agent::LaneAgent;
use crate::context::TurnContext;
use crate::tools::faq::GeneralFaq;
use crate::tools::hours::BusinessHours;
use crate::tools::locations::Locations;

/// Signals that the customer wants to buy something mid-conversation, in
/// which case this agent hands the turn to the commerce lane.
static SHOPPING_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(comprar|compra|pedir|carrito|cart|shop|buy)\b")
        .expect("shopping intent pattern is valid")
});

/// General storefront questions: hours, locations, FAQs, greetings.
pub struct InfoAgent;

impl LaneAgent for InfoAgent {
    fn lane(&self) -> Lane {
        Lane::Info
    }

    fn system_instructions(&self) -> String {
        "Eres el asistente de WhatsApp de Tendero, una tienda colombiana de \
         café y despensa artesanal. Respondes en el idioma del cliente \
         (español por defecto), con calidez y en mensajes cortos.\n\
         - Usa business_hours para horarios, locations para direcciones y \
           general_faq para políticas (envíos, pagos, devoluciones).\n\
         - No inventes datos: si no está en las herramientas, dilo y ofrece \
           el contacto de soporte.\n\
         - Si el cliente quiere comprar, dile que con gusto lo atiendes y \
           menciona los productos."
            .to_string()
    }

    fn build_tools(&self, _ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(BusinessHours),
            Box::new(Locations),
            Box::new(GeneralFaq),
        ]
    }

    fn build_context(&self, session: &Session, _intent: &str) -> String {
        if session.turns_len() <= 1 {
            "This is the customer's first contact; greet them briefly before answering."
                .to_string()
        } else {
            String::new()
        }
    }

    fn post_process(
        &self,
        turn: &Turn,
        _session: &Session,
        _intent: &str,
        _reply: &str,
        patch: Map<String, Value>,
        _tool_patch: &Map<String, Value>,
    ) -> (Map<String, Value>, Option<Baton>) {
        // A shopping request that still landed in the info lane gets handed
        // to commerce so the customer is not asked to repeat themselves.
        if SHOPPING_INTENT.is_match(&turn.text) {
            let mut carry = Map::new();
            carry.insert("initiated_from".to_string(), json!("info"));
            return (
                patch,
                Some(Baton {
                    to_lane: Lane::Commerce,
                    carry_state: carry,
                    intent: "view_cart".to_string(),
                }),
            );
        }
        (patch, None)
    }

    fn error_message(&self) -> String {
        "Lo siento, tuve un problema procesando tu mensaje. ¿Puedes intentarlo de nuevo?"
            .to_string()
    }
}
