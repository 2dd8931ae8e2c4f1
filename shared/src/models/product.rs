//! Product and Label models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unique stock-keeping unit
    pub sku: String,
    pub price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Label attached to products (many-to-many)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

/// Create product request
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock: i64,
}

/// Update product request (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
}

/// Create label request
#[derive(Debug, Clone, Deserialize)]
pub struct LabelCreate {
    pub name: String,
}

/// Update label request
#[derive(Debug, Clone, Deserialize)]
pub struct LabelUpdate {
    pub name: String,
}

/// Attach a label to a product, by id or by name (created if absent)
#[derive(Debug, Clone, Deserialize)]
pub struct LabelAttach {
    pub label_id: Option<i64>,
    pub label_name: Option<String>,
}

/// Product as serialized in responses.
///
/// The projection is explicit per role: `stock` is omitted entirely from
/// the JSON when the reader is not allowed to see inventory counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    pub labels: Vec<Label>,
}

impl Product {
    /// Project this product for a response, hiding `stock` when the
    /// reader's role may not see inventory counts.
    pub fn to_response(&self, stock_visible: bool) -> ProductResponse {
        ProductResponse {
            id: self.id,
            name: self.name.clone(),
            sku: self.sku.clone(),
            price: self.price,
            stock: stock_visible.then_some(self.stock),
            labels: self.labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse() -> Product {
        Product {
            id: 1,
            name: "Mouse".to_string(),
            sku: "MOUSE-1".to_string(),
            price: Decimal::from(100),
            stock: 10,
            labels: vec![Label {
                id: 1,
                name: "peripherals".to_string(),
            }],
        }
    }

    #[test]
    fn test_projection_keeps_stock_when_visible() {
        let json = serde_json::to_value(mouse().to_response(true)).unwrap();
        assert_eq!(json["stock"], 10);
        assert_eq!(json["sku"], "MOUSE-1");
    }

    #[test]
    fn test_projection_omits_stock_key_when_hidden() {
        let json = serde_json::to_value(mouse().to_response(false)).unwrap();
        // The key must be absent, not null
        assert!(json.as_object().unwrap().get("stock").is_none());
        assert_eq!(json["price"], serde_json::json!("100"));
    }
}
