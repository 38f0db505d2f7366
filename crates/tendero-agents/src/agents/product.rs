use std::sync::Arc;

use tendero_core::Lane;
use tendero_llm::Tool;
use tendero_session::Session;

use crate::agent::LaneAgent;
use crate::context::TurnContext;
use crate::tools::catalog;
use crate::tools::products::{
    ProductAvailability, ProductComparison, ProductDetails, ProductSearch,
};

/// Product discovery: search, details, availability, comparisons.
pub struct ProductAgent;

impl LaneAgent for ProductAgent {
    fn lane(&self) -> Lane {
        Lane::Product
    }

    fn system_instructions(&self) -> String {
        "Eres el asesor de productos de Tendero. Ayudas a elegir café, \
         chocolate y despensa artesanal.\n\
         - Busca siempre con product_search antes de afirmar que algo existe.\n\
         - Usa product_details para describir, product_availability para \
           stock y product_comparison cuando el cliente duda entre opciones.\n\
         - Cita precios exactamente como los devuelven las herramientas.\n\
         - Si el cliente decide comprar, confirma el producto y dile que \
           puedes agregarlo al carrito."
            .to_string()
    }

    fn build_tools(&self, _ctx: &Arc<TurnContext>) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(ProductSearch),
            Box::new(ProductDetails),
            Box::new(ProductAvailability),
            Box::new(ProductComparison),
        ]
    }

    /// Surface the products mentioned in recent turns so the model can
    /// resolve anaphora ("the other one", "el primero").
    fn build_context(&self, session: &Session, _intent: &str) -> String {
        let mut referenced: Vec<&'static str> = Vec::new();
        for entry in session.recent_turns(6) {
            let Some(text) = entry.user_text() else {
                continue;
            };
            let lower = text.to_lowercase();
            for item in catalog::CATALOG {
                let mentioned = lower.contains(&item.sku.to_lowercase())
                    || lower.contains(&item.name.to_lowercase());
                if mentioned && !referenced.contains(&item.sku) {
                    referenced.push(item.sku);
                }
            }
        }
        if referenced.is_empty() {
            String::new()
        } else {
            format!(
                "Products referenced in the recent conversation: {}.",
                referenced.join(", ")
            )
        }
    }

    fn error_message(&self) -> String {
        "Lo siento, no pude consultar el catálogo en este momento. Inténtalo de nuevo en un rato."
            .to_string()
    }
}
