use async_trait::async_trait;
use serde_json::{json, Value};

use tendero_llm::{Tool, ToolError};

struct FaqEntry {
    category: &'static str,
    keywords: &'static [&'static str],
    answer: &'static str,
}

const FAQS: &[FaqEntry] = &[
    FaqEntry {
        category: "envios",
        keywords: &["envio", "envío", "domicilio", "entrega", "shipping"],
        answer: "Hacemos envíos a todo el país. En Bogotá entregamos el mismo día para pedidos antes de las 2pm; a otras ciudades en 2-4 días hábiles.",
    },
    FaqEntry {
        category: "pagos",
        keywords: &["pago", "tarjeta", "nequi", "pse", "efectivo", "payment"],
        answer: "Aceptamos tarjetas, PSE, Nequi y pago contra entrega en Bogotá.",
    },
    FaqEntry {
        category: "devoluciones",
        keywords: &["devolucion", "devolución", "cambio", "garantia", "garantía", "return"],
        answer: "Tienes 15 días para cambios y devoluciones con el empaque original. Escríbenos por este chat y generamos la guía de recogida.",
    },
    FaqEntry {
        category: "mayoristas",
        keywords: &["mayorista", "al por mayor", "distribuidor", "wholesale"],
        answer: "Para pedidos mayoristas (desde 50 unidades) manejamos lista de precios aparte; pide hablar con un asesor.",
    },
];

/// Category/keyword search over the general FAQ.
pub struct GeneralFaq;

#[async_trait]
impl Tool for GeneralFaq {
    fn name(&self) -> &str {
        "general_faq"
    }

    fn description(&self) -> &str {
        "Search frequently asked questions by free text or category \
         (envios, pagos, devoluciones, mayoristas)."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "category": {"type": "string"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let query = params
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError("query is required".to_string()))?
            .to_lowercase();
        let category = params.get("category").and_then(Value::as_str);

        let matches: Vec<Value> = FAQS
            .iter()
            .filter(|entry| category.map_or(true, |c| entry.category.eq_ignore_ascii_case(c)))
            .filter(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|k| query.contains(k) || k.contains(query.as_str()))
            })
            .map(|entry| json!({"category": entry.category, "answer": entry.answer}))
            .collect();

        Ok(json!({"matches": matches}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyword_match_finds_shipping_answer() {
        let result = GeneralFaq
            .execute(json!({"query": "hacen domicilio?"}))
            .await
            .unwrap();
        assert_eq!(result["matches"][0]["category"], "envios");
    }

    #[tokio::test]
    async fn category_filter_narrows_results() {
        let result = GeneralFaq
            .execute(json!({"query": "pago", "category": "devoluciones"}))
            .await
            .unwrap();
        assert!(result["matches"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_query_is_an_error() {
        assert!(GeneralFaq.execute(json!({})).await.is_err());
    }
}
