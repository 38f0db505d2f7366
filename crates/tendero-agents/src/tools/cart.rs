use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use tendero_llm::{Tool, ToolError};
use tendero_session::contract;

use crate::context::TurnContext;

use super::catalog;

/// Add, remove, clear and view operations over the session cart.
///
/// Bound to the turn's session snapshot; the new cart goes back through
/// `state_patch`, never by writing to the store.
pub struct CartManager {
    ctx: Arc<TurnContext>,
}

impl CartManager {
    pub fn new(ctx: Arc<TurnContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CartManager {
    fn name(&self) -> &str {
        "cart_manager"
    }

    fn description(&self) -> &str {
        "Manage the customer's cart: add or remove a product by SKU, clear the cart, or view it."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["add", "remove", "clear", "view"]
                },
                "sku": {"type": "string"},
                "qty": {"type": "integer", "minimum": 1}
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let action = params
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError("action is required".to_string()))?;

        let mut items = self.ctx.cart_items();

        match action {
            "view" => {
                return Ok(json!({
                    "items": items,
                    "subtotal": catalog::format_price(subtotal_cents(&items)),
                    "currency": self.ctx.cart_currency(),
                }));
            }
            "clear" => items.clear(),
            "add" => {
                let sku = params
                    .get("sku")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError("sku is required to add".to_string()))?;
                let qty = params.get("qty").and_then(Value::as_u64).unwrap_or(1);
                let item = catalog::by_sku(sku)
                    .ok_or_else(|| ToolError(format!("unknown sku: {}", sku)))?;
                if item.stock == 0 {
                    return Ok(json!({"added": false, "reason": "out_of_stock", "sku": item.sku}));
                }

                match items.iter_mut().find(|i| i["sku"] == item.sku) {
                    Some(existing) => {
                        let current = existing["qty"].as_u64().unwrap_or(0);
                        existing["qty"] = json!(current + qty);
                    }
                    None => items.push(json!({
                        "sku": item.sku,
                        "name": item.name,
                        "qty": qty,
                        "unit_price_cents": item.price_cents,
                    })),
                }
            }
            "remove" => {
                let sku = params
                    .get("sku")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError("sku is required to remove".to_string()))?;
                items.retain(|i| i["sku"] != sku);
            }
            other => return Err(ToolError(format!("unknown action: {}", other))),
        }

        let subtotal = subtotal_cents(&items);
        let state = if items.is_empty() {
            contract::COMMERCE_BROWSING
        } else {
            contract::COMMERCE_CART_ACTIVE
        };

        let mut patch = Map::new();
        patch.insert(contract::CART_ITEMS.to_string(), json!(items));
        patch.insert(contract::CART_SUBTOTAL_CENTS.to_string(), json!(subtotal));
        patch.insert(contract::COMMERCE_STATE.to_string(), json!(state));

        Ok(json!({
            "items": items,
            "subtotal": catalog::format_price(subtotal),
            "currency": self.ctx.cart_currency(),
            "state_patch": patch,
        }))
    }
}

fn subtotal_cents(items: &[Value]) -> u64 {
    items
        .iter()
        .map(|i| {
            i["unit_price_cents"].as_u64().unwrap_or(0) * i["qty"].as_u64().unwrap_or(0)
        })
        .sum()
}

/// Catalog listing for the commerce conversation.
pub struct ProductCatalog;

#[async_trait]
impl Tool for ProductCatalog {
    fn name(&self) -> &str {
        "product_catalog"
    }

    fn description(&self) -> &str {
        "List everything currently for sale, with prices and availability."
    }

    fn parameter_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value) -> Result<Value, ToolError> {
        let products: Vec<Value> = catalog::CATALOG
            .iter()
            .map(|item| {
                json!({
                    "sku": item.sku,
                    "name": item.name,
                    "price": catalog::format_price(item.price_cents),
                    "in_stock": item.stock > 0,
                })
            })
            .collect();
        Ok(json!({"products": products}))
    }
}

/// Pre-checkout validation: a non-empty cart whose items are all still in
/// stock.
pub struct CheckoutValidator {
    ctx: Arc<TurnContext>,
}

impl CheckoutValidator {
    pub fn new(ctx: Arc<TurnContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CheckoutValidator {
    fn name(&self) -> &str {
        "checkout_validator"
    }

    fn description(&self) -> &str {
        "Check whether the cart is ready for checkout and report any blocking issues."
    }

    fn parameter_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value) -> Result<Value, ToolError> {
        let items = self.ctx.cart_items();
        let mut issues: Vec<String> = Vec::new();

        if items.is_empty() {
            issues.push("cart is empty".to_string());
        }
        for item in &items {
            let sku = item["sku"].as_str().unwrap_or_default();
            match catalog::by_sku(sku) {
                Some(product) => {
                    let wanted = item["qty"].as_u64().unwrap_or(0);
                    if u64::from(product.stock) < wanted {
                        issues.push(format!("insufficient stock for {}", sku));
                    }
                }
                None => issues.push(format!("unknown product in cart: {}", sku)),
            }
        }

        if issues.is_empty() {
            let mut patch = Map::new();
            patch.insert(
                contract::COMMERCE_STATE.to_string(),
                json!(contract::COMMERCE_CHECKOUT),
            );
            Ok(json!({"ready": true, "state_patch": patch}))
        } else {
            Ok(json!({"ready": false, "issues": issues}))
        }
    }
}
