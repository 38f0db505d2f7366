use std::sync::Arc;

use tendero_core::{AgentResponse, Lane};
use tendero_llm::Tool;
use tendero_session::{contract, Session};

use crate::agent::LaneAgent;
use crate::context::TurnContext;
use crate::tools::orders::OrderLookup;

/// Order tracking. Requires a phone-verified session; unverified customers
/// get a verification prompt instead of a lookup.
pub struct OrderStatusAgent;

impl LaneAgent for OrderStatusAgent {
    fn lane(&self) -> Lane {
        Lane::OrderStatus
    }

    fn system_instructions(&self) -> String {
        "Eres el asistente de seguimiento de pedidos de Tendero.\n\
         - Usa order_lookup para consultar el estado; nunca inventes fechas.\n\
         - Da el número de pedido, el estado y la entrega estimada cuando \
           exista.\n\
         - Si no aparece el pedido, pide el número exacto (empieza por ORD-)."
            .to_string()
    }

    fn build_tools(&self, ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>> {
        vec![Box::new(OrderLookup::new(ctx.clone()))]
    }

    fn preflight(&self, session: &Session, _intent: &str) -> Option<AgentResponse> {
        if session.bool_field(contract::PHONE_VERIFIED) {
            return None;
        }
        Some(AgentResponse::text(
            "Para darte información de tus pedidos primero necesito verificar tu número. \
             Te enviaremos un código por SMS; respóndelo aquí cuando te llegue.",
        ))
    }

    fn build_context(&self, session: &Session, _intent: &str) -> String {
        match session.str_field(contract::LAST_ORDER_ID) {
            Some(order_id) => format!("The customer's most recent order is {}.", order_id),
            None => String::new(),
        }
    }

    fn error_message(&self) -> String {
        "Lo siento, no pude consultar tu pedido en este momento. Inténtalo de nuevo en unos \
         minutos."
            .to_string()
    }
}
