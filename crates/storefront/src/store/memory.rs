//! In-memory document store.
//!
//! Backs tests and local development. Behaves like the hosted store in
//! the one way that matters to the read path: a filtered + sorted query
//! fails with [`StoreError::MissingIndex`] unless a matching composite
//! index has been registered, so both the primary and the fallback read
//! path can be exercised without network access.
//!
//! Ordered queries sort by the named field's normalized timestamp value,
//! mirroring the server's typed comparison of timestamp fields.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use uuid::Uuid;

use larkspur_core::Timestamp;

use super::{Direction, Document, DocumentStore, Query, StoreError};

/// A composite index over one filter field and one order field.
type IndexKey = (String, String, String);

#[derive(Default)]
struct MemoryStoreInner {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    composite_indexes: HashSet<IndexKey>,
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    /// Create an empty store with no composite indexes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a composite index so that queries filtering on
    /// `filter_field` and ordering by `order_field` succeed server-side.
    pub fn register_composite_index(
        &self,
        collection: &str,
        filter_field: &str,
        order_field: &str,
    ) {
        let mut inner = self.lock();
        inner.composite_indexes.insert((
            collection.to_string(),
            filter_field.to_string(),
            order_field.to_string(),
        ));
    }

    /// Insert a document with a chosen id, bypassing id generation.
    /// Useful for seeding fixtures.
    pub fn seed(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        let mut inner = self.lock();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        // Critical sections are short and never panic while held.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Look up a possibly dotted field path (`author.id`) in a field map.
fn field_value<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Normalized sort key for an ordered query, mirroring the server's typed
/// timestamp comparison. A missing or unparseable field keys as the epoch.
fn timestamp_key(fields: &Map<String, Value>, path: &str) -> chrono::DateTime<chrono::Utc> {
    field_value(fields, path)
        .and_then(|v| serde_json::from_value::<Timestamp>(v.clone()).ok())
        .map_or(chrono::DateTime::UNIX_EPOCH, |ts| ts.normalize())
}

impl DocumentStore for MemoryStore {
    async fn run_query(&self, query: Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.lock();

        if let Some(order) = &query.order_by
            && !query.filters.is_empty()
        {
            let indexed = query.filters.iter().all(|f| {
                inner.composite_indexes.contains(&(
                    query.collection.to_string(),
                    f.field.clone(),
                    order.field.clone(),
                ))
            });
            if !indexed {
                return Err(StoreError::MissingIndex(format!(
                    "query on {} requires a composite index over ({}, {})",
                    query.collection,
                    query
                        .filters
                        .iter()
                        .map(|f| f.field.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    order.field,
                )));
            }
        }

        let mut matches: Vec<Document> = inner
            .collections
            .get(query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| {
                        query
                            .filters
                            .iter()
                            .all(|f| field_value(fields, &f.field) == Some(&f.value))
                    })
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            // Documents tie-break by id, the way the server orders by
            // resource name after the requested field.
            matches.sort_by(|a, b| {
                let ka = timestamp_key(&a.fields, &order.field);
                let kb = timestamp_key(&b.fields, &order.field);
                match order.direction {
                    Direction::Ascending => ka.cmp(&kb).then_with(|| a.id.cmp(&b.id)),
                    Direction::Descending => kb.cmp(&ka).then_with(|| a.id.cmp(&b.id)),
                }
            });
        }

        Ok(matches)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut inner = self.lock();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document { id, fields })
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut inner = self.lock();
        let existing = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;

        for (key, value) in fields {
            existing.insert(key, value);
        }

        Ok(Document {
            id: id.to_string(),
            fields: existing.clone(),
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id);
        }
        // Removing an absent document is not an error, matching the
        // hosted store.
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::collections;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_ordered_query_without_index_fails() {
        let store = MemoryStore::new();
        store.seed(
            collections::REVIEWS,
            "r-1",
            fields(json!({ "productId": "p-1" })),
        );

        let q = Query::collection(collections::REVIEWS)
            .filter("productId", "p-1")
            .order_by("createdAt", Direction::Descending);
        let err = store.run_query(q).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingIndex(_)));
    }

    #[tokio::test]
    async fn test_ordered_query_with_registered_index_sorts() {
        let store = MemoryStore::new();
        store.register_composite_index(collections::REVIEWS, "productId", "createdAt");
        store.seed(
            collections::REVIEWS,
            "r-old",
            fields(json!({ "productId": "p-1", "createdAt": "2024-01-01T00:00:00Z" })),
        );
        store.seed(
            collections::REVIEWS,
            "r-new",
            fields(json!({ "productId": "p-1", "createdAt": "2024-03-01T00:00:00Z" })),
        );

        let q = Query::collection(collections::REVIEWS)
            .filter("productId", "p-1")
            .order_by("createdAt", Direction::Descending);
        let docs = store.run_query(q).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["r-new", "r-old"]);
    }

    #[tokio::test]
    async fn test_unordered_query_never_needs_index() {
        let store = MemoryStore::new();
        store.seed(
            collections::REVIEWS,
            "r-1",
            fields(json!({ "productId": "p-1" })),
        );
        store.seed(
            collections::REVIEWS,
            "r-2",
            fields(json!({ "productId": "p-2" })),
        );

        let q = Query::collection(collections::REVIEWS).filter("productId", "p-1");
        let docs = store.run_query(q).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "r-1");
    }

    #[tokio::test]
    async fn test_dotted_path_filter() {
        let store = MemoryStore::new();
        store.seed(
            collections::REVIEWS,
            "r-1",
            fields(json!({ "productId": "p-1", "author": { "id": "u-1" } })),
        );
        store.seed(
            collections::REVIEWS,
            "r-2",
            fields(json!({ "productId": "p-1", "author": { "id": "u-2" } })),
        );

        let q = Query::collection(collections::REVIEWS)
            .filter("author.id", "u-1")
            .filter("productId", "p-1");
        let docs = store.run_query(q).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "r-1");
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let store = MemoryStore::new();
        let doc = store
            .create(collections::REVIEWS, fields(json!({ "rating": 5 })))
            .await
            .unwrap();

        let fetched = store.get(collections::REVIEWS, &doc.id).await.unwrap();
        assert!(fetched.is_some());

        let updated = store
            .update(collections::REVIEWS, &doc.id, fields(json!({ "rating": 3 })))
            .await
            .unwrap();
        assert_eq!(updated.fields.get("rating"), Some(&json!(3)));

        store.delete(collections::REVIEWS, &doc.id).await.unwrap();
        assert!(
            store
                .get(collections::REVIEWS, &doc.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_absent_document_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete(collections::REVIEWS, "ghost").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_absent_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update(collections::REVIEWS, "ghost", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
