//! Review records.

use serde::{Deserialize, Serialize};

use larkspur_core::{Email, ProductId, ReviewId, Timestamp, UserId};

/// A product review as stored in the `reviews` collection.
///
/// Timestamps are optional: records written by older clients can lack
/// them entirely, and the shapes vary (see `larkspur_core::Timestamp`).
/// At most one review per (author, product) pair is expected, but that is
/// enforced only by a client-side lookup before create; the store itself
/// carries no uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author: ReviewAuthor,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// The identity a review was written under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub display_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_review_from_wire_json() {
        let review: Review = serde_json::from_value(json!({
            "id": "r-1",
            "productId": "p-1",
            "author": { "id": "u-1", "email": "ada@example.com", "displayName": "Ada" },
            "rating": 4,
            "comment": "Solid",
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": { "seconds": 1709294400, "nanos": 0 },
        }))
        .unwrap();

        assert_eq!(review.rating, 4);
        assert_eq!(review.author.display_name, "Ada");
        assert_eq!(
            review.created_at.unwrap().normalize(),
            review.updated_at.unwrap().normalize()
        );
    }

    #[test]
    fn test_review_tolerates_missing_timestamps_and_comment() {
        let review: Review = serde_json::from_value(json!({
            "id": "r-2",
            "productId": "p-1",
            "author": { "id": "u-1", "email": "ada@example.com" },
            "rating": 5,
        }))
        .unwrap();

        assert!(review.created_at.is_none());
        assert!(review.comment.is_empty());
        assert!(review.author.display_name.is_empty());
    }
}
