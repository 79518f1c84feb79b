//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{OrderService, ProductService, ReviewService};
use crate::store::StoreClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: configuration and the services over the hosted
/// document store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    reviews: ReviewService<StoreClient>,
    orders: OrderService<StoreClient>,
    products: ProductService<StoreClient>,
}

impl AppState {
    /// Create a new application state over the hosted document store.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let client = StoreClient::new(&config.docstore);

        Self {
            inner: Arc::new(AppStateInner {
                reviews: ReviewService::new(client.clone()),
                orders: OrderService::new(client.clone()),
                products: ProductService::new(client),
                config,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the review service.
    #[must_use]
    pub fn reviews(&self) -> &ReviewService<StoreClient> {
        &self.inner.reviews
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService<StoreClient> {
        &self.inner.orders
    }

    /// Get a reference to the product service.
    #[must_use]
    pub fn products(&self) -> &ProductService<StoreClient> {
        &self.inner.products
    }
}
