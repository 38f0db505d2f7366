use std::sync::Arc;

use tendero_core::Lane;
use tendero_llm::Tool;
use tendero_session::{contract, Session};

use crate::agent::LaneAgent;
use crate::context::TurnContext;
use crate::tools::cart::{CartManager, CheckoutValidator, ProductCatalog};
use crate::tools::catalog;

/// The buying flow: cart management and checkout readiness.
pub struct CommerceAgent;

impl LaneAgent for CommerceAgent {
    fn lane(&self) -> Lane {
        Lane::Commerce
    }

    fn system_instructions(&self) -> String {
        "Eres el asistente de compras de Tendero. Gestionas el carrito del \
         cliente por WhatsApp.\n\
         - Usa cart_manager para agregar, quitar o mostrar el carrito; \
           product_catalog para listar lo disponible.\n\
         - Antes de confirmar un pedido ejecuta checkout_validator y explica \
           cualquier problema que reporte.\n\
         - Confirma cada cambio del carrito con el subtotal actualizado.\n\
         - Nunca inventes precios ni stock."
            .to_string()
    }

    fn build_tools(&self, ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(CartManager::new(ctx.clone())),
            Box::new(ProductCatalog),
            Box::new(CheckoutValidator::new(ctx.clone())),
        ]
    }

    fn build_context(&self, session: &Session, _intent: &str) -> String {
        let items = session
            .get(contract::CART_ITEMS)
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();
        if items.is_empty() {
            return "The customer's cart is currently empty.".to_string();
        }
        let subtotal = session.u64_field(contract::CART_SUBTOTAL_CENTS);
        let lines: Vec<String> = items
            .iter()
            .map(|item| {
                format!(
                    "{} x{}",
                    item["name"].as_str().unwrap_or("?"),
                    item["qty"].as_u64().unwrap_or(0)
                )
            })
            .collect();
        format!(
            "Cart: {} — subtotal {}.",
            lines.join(", "),
            catalog::format_price(subtotal)
        )
    }

    fn error_message(&self) -> String {
        "Lo siento, no pude actualizar tu carrito. Tus productos siguen guardados; \
         inténtalo de nuevo."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_summarises_cart_contents() {
        let mut session = tendero_session::builder::new_session("t1", "57300111", None, None);
        session.set(
            contract::CART_ITEMS,
            json!([{"sku": "CAFE-250", "name": "Café de origen 250g", "qty": 2,
                    "unit_price_cents": 3_200_000}]),
        );
        session.set(contract::CART_SUBTOTAL_CENTS, json!(6_400_000));

        let context = CommerceAgent.build_context(&session, "view_cart");
        assert!(context.contains("Café de origen 250g x2"));
        assert!(context.contains("$64000 COP"));
    }

    #[test]
    fn empty_cart_is_stated_plainly() {
        let session = tendero_session::builder::new_session("t1", "57300111", None, None);
        let context = CommerceAgent.build_context(&session, "view_cart");
        assert!(context.contains("empty"));
    }
}
