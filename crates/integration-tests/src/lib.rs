//! Integration tests for Larkspur Mercantile.
//!
//! These run the storefront services against the in-memory document
//! store, which reproduces the one hosted-store behavior the read path
//! depends on: a filtered + sorted query fails with a missing-index
//! error unless a matching composite index has been registered.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p larkspur-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use serde_json::{Map, Value, json};

use larkspur_core::{Email, UserId};
use larkspur_storefront::models::CurrentCustomer;
use larkspur_storefront::store::MemoryStore;

/// A signed-in customer fixture with an id derived from the email, the
/// way the login handler derives it.
#[must_use]
pub fn customer(email: &str) -> CurrentCustomer {
    CurrentCustomer {
        id: UserId::new(email.to_lowercase()),
        email: Email::parse(email).unwrap(),
        display_name: "Test Customer".to_string(),
    }
}

/// Field-map fixture from a JSON object literal.
#[must_use]
pub fn fields(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

/// Seed a review with an arbitrary `createdAt` wire shape.
pub fn seed_review(
    store: &MemoryStore,
    id: &str,
    product_id: &str,
    author_id: &str,
    created_at: Value,
) {
    store.seed(
        "reviews",
        id,
        fields(json!({
            "productId": product_id,
            "author": {
                "id": author_id,
                "email": "reviewer@example.com",
                "displayName": "Reviewer",
            },
            "rating": 4,
            "comment": "Well made.",
            "createdAt": created_at,
        })),
    );
}

/// Seed a product fixture.
pub fn seed_product(store: &MemoryStore, id: &str, name: &str) {
    store.seed(
        "products",
        id,
        fields(json!({
            "name": name,
            "description": "A sturdy staple.",
            "category": "homeware",
            "price": { "amount": "24.00", "currencyCode": "USD" },
        })),
    );
}

/// Seed an order fixture belonging to a user.
pub fn seed_order(store: &MemoryStore, id: &str, user_id: &str, created_at: Value) {
    store.seed(
        "orders",
        id,
        fields(json!({
            "userId": user_id,
            "items": [{
                "productId": "p-1",
                "name": "Enamel Mug",
                "unitPrice": { "amount": "12.00", "currencyCode": "USD" },
                "quantity": 1,
            }],
            "status": "DELIVERED",
            "paymentMethod": "card",
            "paymentStatus": "PAID",
            "subtotal": { "amount": "12.00", "currencyCode": "USD" },
            "total": { "amount": "12.00", "currencyCode": "USD" },
            "createdAt": created_at,
        })),
    );
}
