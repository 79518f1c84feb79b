//! Hosted document database REST client.
//!
//! Speaks the store's document API directly: structured queries for
//! filtered/ordered reads, and single-document create/patch/delete. The
//! wire format encodes every field as a typed value object
//! (`stringValue`, `integerValue`, `mapValue`, ...); this module converts
//! between that encoding and the plain JSON maps the rest of the crate
//! works with.
//!
//! Error statuses come back as structured RPC errors. `FAILED_PRECONDITION`
//! on a query is how the server reports a missing composite index, and is
//! mapped to [`StoreError::MissingIndex`] so callers can branch on the
//! variant.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::instrument;

use crate::config::DocStoreConfig;

use super::{Direction, Document, DocumentStore, Query, StoreError};

// =============================================================================
// StoreClient
// =============================================================================

/// Client for the hosted document store.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    /// Base URL of the documents resource, no trailing slash.
    documents_url: String,
    api_token: String,
}

impl StoreClient {
    /// Create a new document store client.
    #[must_use]
    pub fn new(config: &DocStoreConfig) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            config.endpoint.trim_end_matches('/'),
            config.project_id,
            config.database,
        );

        Self {
            inner: Arc::new(StoreClientInner {
                client: reqwest::Client::new(),
                documents_url,
                api_token: config.api_token.expose_secret().to_string(),
            }),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.inner.documents_url)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.inner.documents_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.inner.api_token))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(map_rpc_error(status, &body));
        }

        Ok(body)
    }
}

// =============================================================================
// DocumentStore implementation
// =============================================================================

impl DocumentStore for StoreClient {
    #[instrument(skip(self), fields(collection = query.collection))]
    async fn run_query(&self, query: Query) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.inner.documents_url);
        let body = json!({ "structuredQuery": build_structured_query(&query) });

        let text = self.send(self.inner.client.post(&url).json(&body)).await?;

        let elements: Vec<RunQueryElement> = match serde_json::from_str(&text) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse query response"
                );
                return Err(StoreError::Parse(e));
            }
        };

        Ok(elements
            .into_iter()
            .filter_map(|e| e.document)
            .map(WireDocument::into_document)
            .collect())
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        match self.send(self.inner.client.get(&url)).await {
            Ok(text) => {
                let wire: WireDocument = serde_json::from_str(&text)?;
                Ok(Some(wire.into_document()))
            }
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, fields))]
    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let url = self.collection_url(collection);
        let body = json!({ "fields": encode_fields(&fields) });

        let text = self.send(self.inner.client.post(&url).json(&body)).await?;
        let wire: WireDocument = serde_json::from_str(&text)?;
        Ok(wire.into_document())
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let url = self.document_url(collection, id);
        // Only the named fields are overwritten; the rest of the document
        // is left untouched.
        let mask: Vec<(&str, &String)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k))
            .collect();
        let body = json!({ "fields": encode_fields(&fields) });

        let text = self
            .send(self.inner.client.patch(&url).query(&mask).json(&body))
            .await?;
        let wire: WireDocument = serde_json::from_str(&text)?;
        Ok(wire.into_document())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        // The store treats deleting an absent document as success, so no
        // existence check is made here either.
        self.send(self.inner.client.delete(&url)).await?;
        Ok(())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RunQueryElement {
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    /// Full resource name; the document id is the last path segment.
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl WireDocument {
    fn into_document(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or(self.name.as_str())
            .to_string();
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), decode_value(v)))
            .collect();
        Document { id, fields }
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    error: RpcError,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn map_rpc_error(http_status: reqwest::StatusCode, body: &str) -> StoreError {
    let Ok(parsed) = serde_json::from_str::<RpcErrorBody>(body) else {
        tracing::error!(
            status = %http_status,
            body = %body.chars().take(500).collect::<String>(),
            "Store returned non-success status with unparseable body"
        );
        return StoreError::Rejected {
            code: http_status.as_u16().to_string(),
            message: body.chars().take(200).collect(),
        };
    };

    let RpcError { message, status } = parsed.error;

    match status.as_str() {
        // The server reports an unsatisfiable filter+sort query with this
        // status; the message names the index it wanted.
        "FAILED_PRECONDITION" => StoreError::MissingIndex(message),
        "NOT_FOUND" => StoreError::NotFound(message),
        "PERMISSION_DENIED" => StoreError::PermissionDenied(message),
        _ => StoreError::Rejected {
            code: if status.is_empty() {
                http_status.as_u16().to_string()
            } else {
                status
            },
            message,
        },
    }
}

// =============================================================================
// Structured query construction
// =============================================================================

fn build_structured_query(query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": query.collection }]),
    );

    let mut field_filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": "EQUAL",
                    "value": encode_value(&f.value),
                }
            })
        })
        .collect();

    match field_filters.len() {
        0 => {}
        1 => {
            if let Some(only) = field_filters.pop() {
                structured.insert("where".to_string(), only);
            }
        }
        _ => {
            structured.insert(
                "where".to_string(),
                json!({
                    "compositeFilter": { "op": "AND", "filters": field_filters }
                }),
            );
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".to_string(),
            json!([{ "field": { "fieldPath": order.field }, "direction": direction }]),
        );
    }

    Value::Object(structured)
}

// =============================================================================
// Typed value encoding
// =============================================================================

fn encode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Encode plain JSON into the store's typed value representation.
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => n.as_i64().map_or_else(
            || json!({ "doubleValue": n.as_f64() }),
            // Integers travel as strings on this wire.
            |i| json!({ "integerValue": i.to_string() }),
        ),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode the store's typed value representation into plain JSON.
///
/// `timestampValue` decodes to its RFC 3339 string, which is one of the
/// shapes `larkspur_core::Timestamp` accepts. Unknown value kinds decode
/// to null rather than failing the whole document.
fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map_or_else(|| inner.clone(), |i| json!(i)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vs| vs.iter().map(decode_value).collect())
                .unwrap_or_default();
            Value::Array(items)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fs| {
                    fs.iter()
                        .map(|(k, v)| (k.clone(), decode_value(v)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Object(fields)
        }
        "geoPointValue" => inner.clone(),
        _ => Value::Null,
    }
}
