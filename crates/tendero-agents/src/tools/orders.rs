use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use tendero_llm::{Tool, ToolError};
use tendero_session::contract;

use crate::context::TurnContext;

struct OrderFixture {
    order_id: &'static str,
    wa_id: &'static str,
    status: &'static str,
    eta_days: Option<u32>,
    items: &'static str,
}

const ORDERS: &[OrderFixture] = &[
    OrderFixture {
        order_id: "ORD-10231",
        wa_id: "573001234567",
        status: "in_transit",
        eta_days: Some(2),
        items: "Café de origen 500g x2",
    },
    OrderFixture {
        order_id: "ORD-10198",
        wa_id: "573001234567",
        status: "delivered",
        eta_days: None,
        items: "Chocolate 80% cacao x3",
    },
    OrderFixture {
        order_id: "ORD-10240",
        wa_id: "573009876543",
        status: "preparing",
        eta_days: Some(4),
        items: "Arequipe artesanal 200g x1",
    },
];

/// Order status and ETA lookup, scoped to the verified customer's number.
///
/// Without an explicit order id, falls back to the session's last order,
/// then to the customer's most recent order on file.
pub struct OrderLookup {
    ctx: Arc<TurnContext>,
}

impl OrderLookup {
    pub fn new(ctx: Arc<TurnContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for OrderLookup {
    fn name(&self) -> &str {
        "order_lookup"
    }

    fn description(&self) -> &str {
        "Status and delivery estimate for an order. Pass order_id, or omit it \
         for the customer's most recent order."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"order_id": {"type": "string"}}
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let wa_id = self.ctx.session.wa_id().unwrap_or_default().to_string();
        let requested = params
            .get("order_id")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| {
                self.ctx
                    .session
                    .str_field(contract::LAST_ORDER_ID)
                    .map(String::from)
            });

        let order = match requested {
            Some(order_id) => ORDERS
                .iter()
                .find(|o| o.order_id.eq_ignore_ascii_case(&order_id) && o.wa_id == wa_id),
            None => ORDERS.iter().find(|o| o.wa_id == wa_id),
        };

        let Some(order) = order else {
            return Ok(json!({"found": false}));
        };

        let mut patch = Map::new();
        patch.insert(contract::LAST_ORDER_ID.to_string(), json!(order.order_id));

        let mut result = json!({
            "found": true,
            "order_id": order.order_id,
            "status": order.status,
            "items": order.items,
            "state_patch": patch,
        });
        if let Some(days) = order.eta_days {
            result["eta_days"] = json!(days);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendero_session::builder;

    fn ctx(wa_id: &str, last_order: Option<&str>) -> Arc<TurnContext> {
        let mut session = builder::new_session("t1", wa_id, None, None);
        if let Some(order_id) = last_order {
            session.set(contract::LAST_ORDER_ID, json!(order_id));
        }
        TurnContext::new(session, "order_status")
    }

    #[tokio::test]
    async fn explicit_order_id_wins() {
        let lookup = OrderLookup::new(ctx("573001234567", Some("ORD-10198")));
        let result = lookup
            .execute(json!({"order_id": "ORD-10231"}))
            .await
            .unwrap();
        assert_eq!(result["order_id"], "ORD-10231");
        assert_eq!(result["eta_days"], 2);
        assert_eq!(result["state_patch"]["last_order_id"], "ORD-10231");
    }

    #[tokio::test]
    async fn session_last_order_is_the_fallback() {
        let lookup = OrderLookup::new(ctx("573001234567", Some("ORD-10198")));
        let result = lookup.execute(json!({})).await.unwrap();
        assert_eq!(result["order_id"], "ORD-10198");
        assert_eq!(result["status"], "delivered");
    }

    #[tokio::test]
    async fn other_customers_orders_are_invisible() {
        let lookup = OrderLookup::new(ctx("573001234567", None));
        let result = lookup
            .execute(json!({"order_id": "ORD-10240"}))
            .await
            .unwrap();
        assert_eq!(result["found"], false);
    }
}
