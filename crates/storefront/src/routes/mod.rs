//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Redirect to product listing
//! GET  /health                         - Health check
//!
//! # Products
//! GET  /products                       - Product listing (?category= filter)
//! GET  /products/:id                   - Product detail with reviews
//! POST /products/:id/reviews           - Create or update the signed-in
//!                                        customer's review (requires auth)
//! POST /products/:id/reviews/delete    - Delete the signed-in customer's
//!                                        review (requires auth)
//!
//! # Account (requires auth)
//! GET  /account/orders                 - Order history
//! GET  /account/orders/:id             - Order detail
//!
//! # Auth
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Login action
//! POST /auth/logout                    - Logout action
//! ```

pub mod account;
pub mod auth;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use larkspur_core::Timestamp;

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(reviews::submit))
        .route("/{id}/reviews/delete", post(reviews::delete))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .nest("/products", product_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
}

/// Human-readable date for templates, e.g. "Mar 1, 2024".
///
/// A record with no timestamp renders as an empty string rather than a
/// fabricated date.
pub(crate) fn display_date(ts: Option<&Timestamp>) -> String {
    ts.map_or_else(String::new, |t| {
        t.normalize().format("%b %-d, %Y").to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_formats_normalized_time() {
        let ts = Timestamp::EpochMillis(1_709_294_400_000); // 2024-03-01
        assert_eq!(display_date(Some(&ts)), "Mar 1, 2024");
    }

    #[test]
    fn test_display_date_missing_is_blank() {
        assert_eq!(display_date(None), "");
    }
}
