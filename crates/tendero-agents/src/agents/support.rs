use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::info;

use tendero_core::{Baton, Lane, Turn};
use tendero_llm::Tool;
use tendero_session::{contract, Session};

use crate::agent::LaneAgent;
use crate::context::TurnContext;
use crate::tools::support::{CaseManager, ContactSupport, RefundPolicy};

/// Words that mark a user message as frustrated. Spanish first, the
/// English terms bilingual customers actually use.
const NEGATIVE_MARKERS: &[&str] = &[
    "pésimo", "pesimo", "terrible", "horrible", "furioso", "furiosa", "molesto", "molesta",
    "indignado", "estafa", "queja", "reclamo", "nunca más", "inaceptable", "awful", "angry",
    "worst", "scam", "unacceptable",
];

/// How many of the last entries to scan, and how many frustrated user
/// messages inside that window trip the human handoff.
const FRUSTRATION_WINDOW: usize = 10;
const FRUSTRATION_THRESHOLD: usize = 3;

/// Complaints, refunds and support cases, with automatic human handoff
/// when the conversation is going badly.
pub struct SupportAgent;

impl SupportAgent {
    fn frustrated_entries(session: &Session) -> usize {
        session
            .recent_turns(FRUSTRATION_WINDOW)
            .iter()
            .filter_map(|entry| entry.user_text())
            .filter(|text| {
                let lower = text.to_lowercase();
                NEGATIVE_MARKERS.iter().any(|marker| lower.contains(marker))
            })
            .count()
    }
}

impl LaneAgent for SupportAgent {
    fn lane(&self) -> Lane {
        Lane::Support
    }

    fn system_instructions(&self) -> String {
        "Eres el agente de soporte de Tendero. Atiendes quejas, devoluciones \
         y casos abiertos con empatía y sin excusas.\n\
         - Consulta refund_policy antes de prometer reembolsos.\n\
         - Abre un caso con case_manager cuando el problema requiera \
           seguimiento; dale el número de caso al cliente.\n\
         - Escala con case_manager si el cliente lo pide o el problema es \
           grave.\n\
         - Usa contact_support cuando el cliente prefiera hablar con una \
           persona."
            .to_string()
    }

    fn build_tools(&self, ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(RefundPolicy),
            Box::new(CaseManager::new(ctx.clone())),
            Box::new(ContactSupport),
        ]
    }

    fn build_context(&self, session: &Session, _intent: &str) -> String {
        match session.str_field(contract::ACTIVE_CASE_ID) {
            Some(case_id) => format!(
                "The customer has an open case: {} (escalation level {}).",
                case_id,
                session.u64_field("case_escalation_level")
            ),
            None => String::new(),
        }
    }

    fn post_process(
        &self,
        _turn: &Turn,
        session: &Session,
        _intent: &str,
        _reply: &str,
        mut patch: Map<String, Value>,
        tool_patch: &Map<String, Value>,
    ) -> (Map<String, Value>, Option<Baton>) {
        let escalation_level = tool_patch
            .get("case_escalation_level")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| session.u64_field("case_escalation_level"));
        let frustrated = Self::frustrated_entries(session);

        if frustrated >= FRUSTRATION_THRESHOLD || escalation_level >= 2 {
            info!(
                event = "human_handoff_triggered",
                frustrated_entries = frustrated,
                escalation_level,
                "flagging session for human handoff"
            );
            patch.insert(contract::HUMAN_HANDOFF.to_string(), json!(true));
        }
        (patch, None)
    }

    fn error_message(&self) -> String {
        "Lo siento, no pude registrar tu solicitud. Escríbenos de nuevo o llama al \
         +57 601 745 0000."
            .to_string()
    }
}
