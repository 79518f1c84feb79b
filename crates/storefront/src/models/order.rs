//! Order records.
//!
//! Orders are created and mutated by an external order-placement process;
//! this storefront only reads them.

use serde::{Deserialize, Serialize};

use larkspur_core::{
    CouponId, OrderId, OrderStatus, PaymentStatus, Price, ProductId, Timestamp, UserId,
};

/// An order as stored in the `orders` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub subtotal: Price,
    #[serde(default)]
    pub discount: Option<Price>,
    pub total: Price,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub coupon: Option<CouponRef>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// A single line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Shipping address attached to an order, when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: String,
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Reference to a coupon applied at order placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRef {
    pub id: CouponId,
    pub code: String,
}
