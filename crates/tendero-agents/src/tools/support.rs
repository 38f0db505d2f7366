use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use tendero_llm::{Tool, ToolError};
use tendero_session::contract;

use crate::context::TurnContext;

/// Refund and exchange policy by purchase category.
pub struct RefundPolicy;

#[async_trait]
impl Tool for RefundPolicy {
    fn name(&self) -> &str {
        "refund_policy"
    }

    fn description(&self) -> &str {
        "The refund/exchange policy, overall or for a category (alimentos, otros)."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"category": {"type": "string"}}
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let category = params.get("category").and_then(Value::as_str);
        let policy = match category {
            Some("alimentos") => {
                "Por ser alimentos, solo aceptamos devolución por producto dañado o \
                 vencido, reportado dentro de 48 horas con foto del empaque."
            }
            _ => {
                "15 días calendario para cambios y devoluciones con empaque original. \
                 El reembolso sale por el mismo medio de pago en 5-8 días hábiles."
            }
        };
        Ok(json!({"policy": policy}))
    }
}

/// Create, check and escalate support cases.
///
/// Case ids are derived from the session so retries of the same turn
/// cannot mint duplicates.
pub struct CaseManager {
    ctx: Arc<TurnContext>,
}

impl CaseManager {
    pub fn new(ctx: Arc<TurnContext>) -> Self {
        Self { ctx }
    }

    fn active_case(&self) -> Option<String> {
        self.ctx
            .session
            .str_field(contract::ACTIVE_CASE_ID)
            .map(String::from)
    }
}

#[async_trait]
impl Tool for CaseManager {
    fn name(&self) -> &str {
        "case_manager"
    }

    fn description(&self) -> &str {
        "Open a support case, check the active one, or escalate it to a human team."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["create", "status", "escalate"]
                },
                "summary": {"type": "string"}
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let action = params
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError("action is required".to_string()))?;

        match action {
            "create" => {
                if let Some(case_id) = self.active_case() {
                    return Ok(json!({"case_id": case_id, "already_open": true}));
                }
                let wa_tail: String = self
                    .ctx
                    .session
                    .wa_id()
                    .unwrap_or_default()
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<String>()
                    .chars()
                    .rev()
                    .collect();
                let case_id = format!("CASE-{}-{}", wa_tail, self.ctx.session.turns_len());

                let mut patch = Map::new();
                patch.insert(contract::ACTIVE_CASE_ID.to_string(), json!(case_id));
                patch.insert("case_escalation_level".to_string(), json!(0));
                Ok(json!({
                    "case_id": case_id,
                    "summary": params.get("summary").cloned().unwrap_or(Value::Null),
                    "state_patch": patch,
                }))
            }
            "status" => match self.active_case() {
                Some(case_id) => Ok(json!({
                    "case_id": case_id,
                    "escalation_level": self.ctx.session.u64_field("case_escalation_level"),
                    "status": "open",
                })),
                None => Ok(json!({"status": "no_active_case"})),
            },
            "escalate" => {
                let Some(case_id) = self.active_case() else {
                    return Err(ToolError("no active case to escalate".to_string()));
                };
                let level = self.ctx.session.u64_field("case_escalation_level") + 1;
                let mut patch = Map::new();
                patch.insert("case_escalation_level".to_string(), json!(level));
                Ok(json!({
                    "case_id": case_id,
                    "escalation_level": level,
                    "state_patch": patch,
                }))
            }
            other => Err(ToolError(format!("unknown action: {}", other))),
        }
    }
}

/// Human support contact channels.
pub struct ContactSupport;

#[async_trait]
impl Tool for ContactSupport {
    fn name(&self) -> &str {
        "contact_support"
    }

    fn description(&self) -> &str {
        "Phone, email and hours for reaching the human support team."
    }

    fn parameter_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value) -> Result<Value, ToolError> {
        Ok(json!({
            "phone": "+57 601 745 0000",
            "email": "ayuda@tendero.co",
            "hours": "Lunes a viernes, 8am a 6pm",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendero_session::builder;

    fn ctx(active_case: Option<&str>, level: u64) -> Arc<TurnContext> {
        let mut session = builder::new_session("t1", "573001234567", None, None);
        if let Some(case_id) = active_case {
            session.set(contract::ACTIVE_CASE_ID, json!(case_id));
            session.set("case_escalation_level", json!(level));
        }
        TurnContext::new(session, "complaint")
    }

    #[tokio::test]
    async fn create_patches_active_case_id() {
        let manager = CaseManager::new(ctx(None, 0));
        let result = manager
            .execute(json!({"action": "create", "summary": "pedido incompleto"}))
            .await
            .unwrap();
        let case_id = result["case_id"].as_str().unwrap();
        assert!(case_id.starts_with("CASE-4567-"));
        assert_eq!(result["state_patch"]["active_case_id"], case_id);
    }

    #[tokio::test]
    async fn create_with_open_case_does_not_duplicate() {
        let manager = CaseManager::new(ctx(Some("CASE-4567-2"), 0));
        let result = manager.execute(json!({"action": "create"})).await.unwrap();
        assert_eq!(result["already_open"], true);
        assert!(result.get("state_patch").is_none());
    }

    #[tokio::test]
    async fn escalate_bumps_level() {
        let manager = CaseManager::new(ctx(Some("CASE-4567-2"), 1));
        let result = manager
            .execute(json!({"action": "escalate"}))
            .await
            .unwrap();
        assert_eq!(result["state_patch"]["case_escalation_level"], 2);
    }

    #[tokio::test]
    async fn escalate_without_case_is_an_error() {
        let manager = CaseManager::new(ctx(None, 0));
        assert!(manager.execute(json!({"action": "escalate"})).await.is_err());
    }
}
