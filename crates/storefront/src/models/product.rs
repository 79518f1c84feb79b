//! Product records.

use serde::{Deserialize, Serialize};

use larkspur_core::{Price, ProductId};

/// A product as stored in the `products` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_wire_json() {
        let product: Product = serde_json::from_value(json!({
            "id": "p-1",
            "name": "Juniper Hand Balm",
            "category": "apothecary",
            "price": { "amount": "9.00", "currencyCode": "USD" },
        }))
        .unwrap();

        assert_eq!(product.name, "Juniper Hand Balm");
        assert!(product.description.is_empty());
        assert!(product.image_url.is_none());
    }
}
