//! Order reads.
//!
//! Orders are written by an external order-placement process; this
//! service only reads them back for the account screens.

use tracing::instrument;

use larkspur_core::{OrderId, UserId, order_key};

use crate::models::Order;
use crate::store::{DocumentStore, Query, StoreError, collections};

/// Read-only order access.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: DocumentStore> OrderService<S> {
    /// Create an order service over a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// All orders belonging to a user, newest first.
    ///
    /// The sort happens client-side over the normalized creation
    /// timestamp; order volume per user is small enough that no
    /// server-side sort (and therefore no composite index) is asked for.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on query failure.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let query = Query::collection(collections::ORDERS).filter("userId", user_id.as_str());
        let docs = self.store.run_query(query).await?;

        let mut orders = docs
            .iter()
            .map(crate::store::Document::to_record)
            .collect::<Result<Vec<Order>, _>>()?;
        orders.sort_by(|a, b| {
            order_key(b.created_at.as_ref())
                .cmp(&order_key(a.created_at.as_ref()))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(orders)
    }

    /// A single order by id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on fetch failure.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let doc = self.store.get(collections::ORDERS, id.as_str()).await?;
        doc.map(|d| d.to_record()).transpose()
    }
}
