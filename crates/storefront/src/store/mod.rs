//! Document store abstraction.
//!
//! # Architecture
//!
//! - The hosted database is the source of truth - NO local sync, direct
//!   API calls per request
//! - [`DocumentStore`] is the seam between services and the wire: the
//!   hosted REST client ([`StoreClient`]) implements it in production,
//!   the in-memory store ([`MemoryStore`]) implements it in tests
//! - Documents cross this boundary as plain JSON field maps; the hosted
//!   client owns the conversion to and from the store's typed value
//!   encoding
//!
//! # Error signaling
//!
//! Query failures surface as [`StoreError`] variants. A filtered + sorted
//! query that the server cannot satisfy because its composite index does
//! not exist fails with [`StoreError::MissingIndex`] - callers that want
//! to fall back to an in-memory sort match on that variant, never on
//! message text.

mod firestore;
mod memory;

pub use firestore::StoreClient;
pub use memory::MemoryStore;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Collection names used by the storefront.
pub mod collections {
    pub const REVIEWS: &str = "reviews";
    pub const ORDERS: &str = "orders";
    pub const PRODUCTS: &str = "products";
}

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A filtered + sorted query requires a composite index that does
    /// not exist server-side. Recoverable: refetch unordered and sort
    /// locally.
    #[error("missing composite index: {0}")]
    MissingIndex(String),

    /// Document or collection not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store's access rules rejected the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other error status reported by the store.
    #[error("store rejected request ({code}): {message}")]
    Rejected { code: String, message: String },
}

/// A document as the services see it: a store-generated identifier plus
/// a plain JSON field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Deserialize the document into a typed record.
    ///
    /// The document id is injected as an `id` field so record types can
    /// carry their identifier without the store persisting it twice.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` if the fields do not match the record
    /// type.
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Sort direction for an ordered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// An equality filter on a document field.
///
/// Nested fields use dotted paths (e.g. `author.id`).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// A server-side sort on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A collection query: equality filters plus an optional server-side sort.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: &'static str,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    /// Start a query against a collection.
    #[must_use]
    pub const fn collection(collection: &'static str) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
        }
    }

    /// Add an equality filter.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Request a server-side sort. Filter + sort combinations need a
    /// composite index server-side; without one the query fails with
    /// [`StoreError::MissingIndex`].
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// The same query with any server-side sort removed.
    #[must_use]
    pub fn unordered(mut self) -> Self {
        self.order_by = None;
        self
    }
}

/// The document store seam.
///
/// All futures are `Send` so implementations can be driven from axum
/// handlers.
pub trait DocumentStore: Send + Sync {
    /// Run a collection query.
    fn run_query(
        &self,
        query: Query,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Fetch a single document by id. `Ok(None)` when it does not exist.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Create a document with a store-generated id.
    fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Overwrite the named fields of an existing document.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Remove a document. Succeeds whether or not it existed.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let q = Query::collection(collections::REVIEWS)
            .filter("productId", "p-1")
            .order_by("createdAt", Direction::Descending);
        assert_eq!(q.collection, "reviews");
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.filters[0].value, json!("p-1"));
        assert_eq!(q.order_by.as_ref().unwrap().field, "createdAt");
    }

    #[test]
    fn test_query_unordered_drops_sort() {
        let q = Query::collection(collections::REVIEWS)
            .filter("productId", "p-1")
            .order_by("createdAt", Direction::Descending)
            .unordered();
        assert!(q.order_by.is_none());
        assert_eq!(q.filters.len(), 1);
    }

    #[test]
    fn test_document_to_record_injects_id() {
        #[derive(Deserialize)]
        struct Rec {
            id: String,
            name: String,
        }

        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("widget"));
        let doc = Document {
            id: "d-1".to_string(),
            fields,
        };
        let rec: Rec = doc.to_record().unwrap();
        assert_eq!(rec.id, "d-1");
        assert_eq!(rec.name, "widget");
    }

    #[test]
    fn test_missing_index_display() {
        let err = StoreError::MissingIndex("reviews by productId, createdAt".to_string());
        assert_eq!(
            err.to_string(),
            "missing composite index: reviews by productId, createdAt"
        );
    }
}
