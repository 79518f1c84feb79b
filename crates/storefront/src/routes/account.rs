//! Account route handlers: order history and order detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use tracing::warn;

use larkspur_core::{OrderId, Price};

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::{Address, Order, OrderItem};
use crate::state::AppState;

use super::display_date;

/// Order summary row for the history table.
pub struct OrderSummaryView {
    pub id: String,
    pub placed_at: String,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub item_count: u32,
    pub total: String,
}

impl OrderSummaryView {
    fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            placed_at: display_date(order.created_at.as_ref()),
            status: order.status.label(),
            payment_status: order.payment_status.label(),
            item_count: order.items.iter().map(|i| i.quantity).sum(),
            total: order.total.display(),
        }
    }
}

/// Line item display data for the order detail page.
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl OrderItemView {
    fn from_item(item: &OrderItem) -> Self {
        let line_total = Price::new(
            item.unit_price.amount * Decimal::from(item.quantity),
            item.unit_price.currency_code,
        );
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.display(),
            line_total: line_total.display(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub customer_name: String,
    pub orders: Vec<OrderSummaryView>,
    pub load_failed: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub id: String,
    pub placed_at: String,
    pub status: &'static str,
    pub payment_method: String,
    pub payment_status: &'static str,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub discount: Option<String>,
    pub total: String,
    pub address_lines: Vec<String>,
    pub coupon_code: Option<String>,
}

/// Display the signed-in customer's order history, newest first.
///
/// A store failure renders the page with an inline message rather than an
/// error response.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> OrdersTemplate {
    let (orders, load_failed) = match state.orders().list_for_user(&customer.id).await {
        Ok(orders) => (orders, false),
        Err(e) => {
            warn!(error = %e, "failed to load order history");
            (Vec::new(), true)
        }
    };

    OrdersTemplate {
        customer_name: customer.display_name,
        orders: orders.iter().map(OrderSummaryView::from_order).collect(),
        load_failed,
    }
}

/// Display a single order.
///
/// An order belonging to a different customer renders as not found, so
/// the response does not reveal whether the id exists.
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<String>,
) -> Result<OrderDetailTemplate, AppError> {
    let order_id = OrderId::new(id);
    let order = state
        .orders()
        .get(&order_id)
        .await?
        .filter(|o| o.user_id == customer.id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(OrderDetailTemplate {
        id: order.id.to_string(),
        placed_at: display_date(order.created_at.as_ref()),
        status: order.status.label(),
        payment_method: order.payment_method.clone(),
        payment_status: order.payment_status.label(),
        items: order.items.iter().map(OrderItemView::from_item).collect(),
        subtotal: order.subtotal.display(),
        discount: order.discount.map(|d| d.display()),
        total: order.total.display(),
        address_lines: order.address.as_ref().map_or_else(Vec::new, address_lines),
        coupon_code: order.coupon.map(|c| c.code),
    })
}

fn address_lines(address: &Address) -> Vec<String> {
    let mut lines = vec![address.line1.clone()];
    if let Some(line2) = &address.line2 {
        lines.push(line2.clone());
    }
    let mut locality = address.city.clone();
    if !address.region.is_empty() {
        locality.push_str(", ");
        locality.push_str(&address.region);
    }
    locality.push(' ');
    locality.push_str(&address.postal_code);
    lines.push(locality);
    if !address.country.is_empty() {
        lines.push(address.country.clone());
    }
    lines
}
