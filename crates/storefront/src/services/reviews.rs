//! Review reads and writes.
//!
//! The one read path with real decision logic in this storefront lives
//! here: reviews for a product are fetched with a server-sorted query,
//! and when the server reports the composite index as missing the query
//! is reissued unordered and sorted in memory over the normalized
//! timestamp field.

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{instrument, warn};

use larkspur_core::{ProductId, ReviewId, Timestamp, UserId, order_key};

use crate::models::{CurrentCustomer, Review};
use crate::store::{Direction, DocumentStore, Query, StoreError, collections};

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Rating outside 1-5. Caught before any store call.
    #[error("rating must be between 1 and 5")]
    InvalidRating,

    /// Empty or whitespace-only comment. Caught before any store call.
    #[error("review comment cannot be empty")]
    EmptyComment,

    /// The store call itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// User-provided review content.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub rating: u8,
    pub comment: String,
}

impl ReviewInput {
    /// Check the input without touching the store. Create and update run
    /// this themselves; handlers call it first so an invalid submission
    /// makes no store round trips at all.
    ///
    /// # Errors
    ///
    /// `InvalidRating` when the rating is outside 1-5, `EmptyComment`
    /// when the comment is blank.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ReviewError::InvalidRating);
        }
        if self.comment.trim().is_empty() {
            return Err(ReviewError::EmptyComment);
        }
        Ok(())
    }
}

/// Review operations over a document store.
#[derive(Clone)]
pub struct ReviewService<S> {
    store: S,
}

impl<S: DocumentStore> ReviewService<S> {
    /// Create a review service over a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// All reviews for a product, newest first.
    ///
    /// Primary path: server-side filter + sort, which needs a composite
    /// index over (productId, createdAt). When the server reports that
    /// index missing, the query is reissued unordered and sorted here by
    /// normalized creation time; records with a missing or unparseable
    /// timestamp sort last.
    ///
    /// # Errors
    ///
    /// Any store error other than the missing index surfaces unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Review>, ReviewError> {
        let ordered = Query::collection(collections::REVIEWS)
            .filter("productId", product_id.as_str())
            .order_by("createdAt", Direction::Descending);

        let docs = match self.store.run_query(ordered.clone()).await {
            Ok(docs) => docs,
            Err(StoreError::MissingIndex(detail)) => {
                warn!(detail = %detail, "composite index unavailable, sorting reviews in memory");
                let docs = self.store.run_query(ordered.unordered()).await?;
                let mut reviews = parse_reviews(docs)?;
                sort_newest_first(&mut reviews);
                return Ok(reviews);
            }
            Err(e) => return Err(e.into()),
        };

        parse_reviews(docs)
    }

    /// The acting user's review of a product, if any.
    ///
    /// Point lookup by (author, product); first match wins. Callers use
    /// this to decide create-vs-edit. Because the eventual write is a
    /// separate round trip, two concurrent submissions from the same user
    /// can still race past this check and both create.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on query failure.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn user_review_for_product(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<Review>, ReviewError> {
        let query = Query::collection(collections::REVIEWS)
            .filter("author.id", user_id.as_str())
            .filter("productId", product_id.as_str());

        let docs = self.store.run_query(query).await?;
        docs.first().map(|d| Ok(d.to_record()?)).transpose()
    }

    /// Create a review, stamping creation and update time to now.
    ///
    /// No duplicate check happens here; callers are expected to call
    /// [`Self::user_review_for_product`] first.
    ///
    /// # Errors
    ///
    /// Validation failures return before any store call.
    #[instrument(skip(self, author, input), fields(product_id = %product_id))]
    pub async fn create(
        &self,
        author: &CurrentCustomer,
        product_id: &ProductId,
        input: &ReviewInput,
    ) -> Result<Review, ReviewError> {
        input.validate()?;

        let now = Timestamp::now();
        let fields = review_fields(author, product_id, input, &now, &now);
        let doc = self.store.create(collections::REVIEWS, fields).await?;
        Ok(doc.to_record()?)
    }

    /// Overwrite a review's rating and comment, stamping update time to
    /// now. Authorship is not re-verified here; the store's access rules
    /// own that.
    ///
    /// # Errors
    ///
    /// Validation failures return before any store call.
    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: &ReviewId, input: &ReviewInput) -> Result<Review, ReviewError> {
        input.validate()?;

        let mut fields = Map::new();
        fields.insert("rating".to_string(), json!(input.rating));
        fields.insert("comment".to_string(), json!(input.comment.trim()));
        fields.insert(
            "updatedAt".to_string(),
            serde_json::to_value(Timestamp::now()).unwrap_or(Value::Null),
        );

        let doc = self
            .store
            .update(collections::REVIEWS, id.as_str(), fields)
            .await?;
        Ok(doc.to_record()?)
    }

    /// Remove a review unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on failure.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &ReviewId) -> Result<(), ReviewError> {
        self.store.delete(collections::REVIEWS, id.as_str()).await?;
        Ok(())
    }
}

fn review_fields(
    author: &CurrentCustomer,
    product_id: &ProductId,
    input: &ReviewInput,
    created_at: &Timestamp,
    updated_at: &Timestamp,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("productId".to_string(), json!(product_id.as_str()));
    fields.insert(
        "author".to_string(),
        json!({
            "id": author.id.as_str(),
            "email": author.email.as_str(),
            "displayName": author.display_name,
        }),
    );
    fields.insert("rating".to_string(), json!(input.rating));
    fields.insert("comment".to_string(), json!(input.comment.trim()));
    fields.insert(
        "createdAt".to_string(),
        serde_json::to_value(created_at).unwrap_or(Value::Null),
    );
    fields.insert(
        "updatedAt".to_string(),
        serde_json::to_value(updated_at).unwrap_or(Value::Null),
    );
    fields
}

fn parse_reviews(docs: Vec<crate::store::Document>) -> Result<Vec<Review>, ReviewError> {
    docs.iter()
        .map(|d| Ok(d.to_record()?))
        .collect::<Result<Vec<_>, ReviewError>>()
}

/// Descending by normalized creation time, ties broken by ascending
/// review id so repeated calls return the same order.
fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| {
        order_key(b.created_at.as_ref())
            .cmp(&order_key(a.created_at.as_ref()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use larkspur_core::Email;

    fn review(id: &str, created_at: Option<Timestamp>) -> Review {
        Review {
            id: ReviewId::new(id),
            product_id: ProductId::new("p-1"),
            author: crate::models::ReviewAuthor {
                id: UserId::new("u-1"),
                email: Email::parse("u@example.com").unwrap(),
                display_name: "U".to_string(),
            },
            rating: 4,
            comment: "ok".to_string(),
            created_at,
            updated_at: None,
        }
    }

    fn rfc(s: &str) -> Timestamp {
        Timestamp::Rfc3339(s.parse().unwrap())
    }

    #[test]
    fn test_sort_newest_first_mixed_shapes() {
        let jan = review("a", Some(rfc("2024-01-01T00:00:00Z")));
        let mar = review(
            "b",
            Some(Timestamp::Wrapper {
                seconds: 1_709_251_200, // 2024-03-01
                nanos: 0,
            }),
        );
        let feb = review("c", Some(Timestamp::EpochMillis(1_706_745_600_000))); // 2024-02-01

        let mut v = vec![jan, mar, feb];
        sort_newest_first(&mut v);
        let ids: Vec<_> = v.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_missing_timestamp_last() {
        let missing = review("zzz", None);
        let unparseable = review("aaa", Some(Timestamp::Unparsed("soon".into())));
        let present = review("mmm", Some(rfc("2024-01-01T00:00:00Z")));

        let mut v = vec![missing, unparseable, present];
        sort_newest_first(&mut v);
        let ids: Vec<_> = v.iter().map(|r| r.id.as_str()).collect();
        // Present timestamp first, then the epoch-keyed pair by id.
        assert_eq!(ids, vec!["mmm", "aaa", "zzz"]);
    }

    #[test]
    fn test_sort_equal_timestamps_tie_break_by_id() {
        let t = rfc("2024-01-01T00:00:00Z");
        let mut v = vec![
            review("b", Some(t.clone())),
            review("a", Some(t.clone())),
            review("c", Some(t)),
        ];
        sort_newest_first(&mut v);
        let ids: Vec<_> = v.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let zero = ReviewInput {
            rating: 0,
            comment: "fine".to_string(),
        };
        assert!(matches!(zero.validate(), Err(ReviewError::InvalidRating)));

        let six = ReviewInput {
            rating: 6,
            comment: "fine".to_string(),
        };
        assert!(matches!(six.validate(), Err(ReviewError::InvalidRating)));

        let blank = ReviewInput {
            rating: 3,
            comment: "   ".to_string(),
        };
        assert!(matches!(blank.validate(), Err(ReviewError::EmptyComment)));
    }
}
