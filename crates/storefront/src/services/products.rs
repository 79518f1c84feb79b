//! Product reads.

use tracing::instrument;

use larkspur_core::ProductId;

use crate::models::Product;
use crate::store::{DocumentStore, Query, StoreError, collections};

/// Read-only product access.
#[derive(Clone)]
pub struct ProductService<S> {
    store: S,
}

impl<S: DocumentStore> ProductService<S> {
    /// Create a product service over a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// A single product by id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on fetch failure.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let doc = self.store.get(collections::PRODUCTS, id.as_str()).await?;
        doc.map(|d| d.to_record()).transpose()
    }

    /// All products, optionally restricted to a category.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on query failure.
    #[instrument(skip(self))]
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let mut query = Query::collection(collections::PRODUCTS);
        if let Some(category) = category {
            query = query.filter("category", category);
        }
        let docs = self.store.run_query(query).await?;
        docs.iter().map(|d| d.to_record()).collect()
    }
}
