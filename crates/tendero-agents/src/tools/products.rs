use async_trait::async_trait;
use serde_json::{json, Value};

use tendero_llm::{Tool, ToolError};

use super::catalog::{self, CatalogItem};

fn item_json(item: &CatalogItem) -> Value {
    json!({
        "sku": item.sku,
        "name": item.name,
        "category": item.category,
        "price": catalog::format_price(item.price_cents),
        "price_cents": item.price_cents,
        "in_stock": item.stock > 0,
    })
}

/// Free-text product search over the catalog.
pub struct ProductSearch;

#[async_trait]
impl Tool for ProductSearch {
    fn name(&self) -> &str {
        "product_search"
    }

    fn description(&self) -> &str {
        "Search products by name, category or description."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let query = params
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError("query is required".to_string()))?;
        let results: Vec<Value> = catalog::search(query).into_iter().map(item_json).collect();
        Ok(json!({"results": results}))
    }
}

/// Full detail for one product.
pub struct ProductDetails;

#[async_trait]
impl Tool for ProductDetails {
    fn name(&self) -> &str {
        "product_details"
    }

    fn description(&self) -> &str {
        "Full details for a product by SKU."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"sku": {"type": "string"}},
            "required": ["sku"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let sku = params
            .get("sku")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError("sku is required".to_string()))?;
        let item = catalog::by_sku(sku).ok_or_else(|| ToolError(format!("unknown sku: {}", sku)))?;
        let mut detail = item_json(item);
        detail["description"] = json!(item.description);
        Ok(detail)
    }
}

/// Stock check for one product.
pub struct ProductAvailability;

#[async_trait]
impl Tool for ProductAvailability {
    fn name(&self) -> &str {
        "product_availability"
    }

    fn description(&self) -> &str {
        "Current stock for a product by SKU."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"sku": {"type": "string"}},
            "required": ["sku"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let sku = params
            .get("sku")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError("sku is required".to_string()))?;
        let item = catalog::by_sku(sku).ok_or_else(|| ToolError(format!("unknown sku: {}", sku)))?;
        Ok(json!({
            "sku": item.sku,
            "in_stock": item.stock > 0,
            "units": item.stock,
        }))
    }
}

/// Side-by-side comparison of up to four products.
pub struct ProductComparison;

#[async_trait]
impl Tool for ProductComparison {
    fn name(&self) -> &str {
        "product_comparison"
    }

    fn description(&self) -> &str {
        "Compare two to four products by SKU: price, category and availability."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skus": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 2,
                    "maxItems": 4
                }
            },
            "required": ["skus"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let skus = params
            .get("skus")
            .and_then(Value::as_array)
            .ok_or_else(|| ToolError("skus is required".to_string()))?;
        if skus.len() < 2 {
            return Err(ToolError("need at least two skus to compare".to_string()));
        }
        let mut rows = Vec::new();
        for sku in skus.iter().filter_map(Value::as_str).take(4) {
            let item =
                catalog::by_sku(sku).ok_or_else(|| ToolError(format!("unknown sku: {}", sku)))?;
            let mut row = item_json(item);
            row["description"] = json!(item.description);
            rows.push(row);
        }
        Ok(json!({"comparison": rows}))
    }
}
