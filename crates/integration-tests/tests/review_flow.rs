//! Integration tests for the review write flow: create, look up by
//! (author, product), update, and delete.

use serde_json::json;

use larkspur_core::ProductId;
use larkspur_storefront::services::{ReviewError, ReviewInput, ReviewService};
use larkspur_storefront::store::MemoryStore;

use larkspur_integration_tests::{customer, seed_review};

fn input(rating: u8, comment: &str) -> ReviewInput {
    ReviewInput {
        rating,
        comment: comment.to_string(),
    }
}

// =============================================================================
// Create and Look Up
// =============================================================================

#[tokio::test]
async fn test_create_then_find_own_review() {
    let service = ReviewService::new(MemoryStore::new());
    let author = customer("shopper@example.com");
    let product = ProductId::new("p-1");

    let created = service
        .create(&author, &product, &input(5, "Lovely."))
        .await
        .unwrap();
    assert_eq!(created.rating, 5);
    assert!(created.created_at.is_some());

    let found = service
        .user_review_for_product(&author.id, &product)
        .await
        .unwrap()
        .expect("own review should be found");
    assert_eq!(found.id, created.id);
    assert_eq!(found.author.id, author.id);
}

#[tokio::test]
async fn test_no_review_yields_none() {
    let store = MemoryStore::new();
    seed_review(
        &store,
        "r-other",
        "p-1",
        "someone-else@example.com",
        json!("2024-01-01T00:00:00Z"),
    );

    let service = ReviewService::new(store);
    let author = customer("shopper@example.com");

    let found = service
        .user_review_for_product(&author.id, &ProductId::new("p-1"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_lookup_is_scoped_to_both_author_and_product() {
    let store = MemoryStore::new();
    // Same author, different product.
    seed_review(
        &store,
        "r-elsewhere",
        "p-2",
        "shopper@example.com",
        json!("2024-01-01T00:00:00Z"),
    );

    let service = ReviewService::new(store);
    let author = customer("shopper@example.com");

    let found = service
        .user_review_for_product(&author.id, &ProductId::new("p-1"))
        .await
        .unwrap();
    assert!(found.is_none());
}

// =============================================================================
// Update and Delete
// =============================================================================

#[tokio::test]
async fn test_update_overwrites_rating_and_comment() {
    let service = ReviewService::new(MemoryStore::new());
    let author = customer("shopper@example.com");
    let product = ProductId::new("p-1");

    let created = service
        .create(&author, &product, &input(2, "Arrived dented."))
        .await
        .unwrap();

    let updated = service
        .update(&created.id, &input(4, "Replacement arrived fast."))
        .await
        .unwrap();
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.comment, "Replacement arrived fast.");
    // Creation time survives the update.
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_delete_then_lookup_yields_none() {
    let service = ReviewService::new(MemoryStore::new());
    let author = customer("shopper@example.com");
    let product = ProductId::new("p-1");

    let created = service
        .create(&author, &product, &input(3, "Fine."))
        .await
        .unwrap();
    service.delete(&created.id).await.unwrap();

    let found = service
        .user_review_for_product(&author.id, &product)
        .await
        .unwrap();
    assert!(found.is_none());
}

// =============================================================================
// Validation Happens Before the Store
// =============================================================================

#[tokio::test]
async fn test_invalid_input_never_reaches_the_store() {
    let service = ReviewService::new(MemoryStore::new());
    let author = customer("shopper@example.com");
    let product = ProductId::new("p-1");

    let err = service
        .create(&author, &product, &input(0, "Fine."))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::InvalidRating));

    let err = service
        .create(&author, &product, &input(3, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::EmptyComment));

    // Nothing was written.
    let found = service
        .user_review_for_product(&author.id, &product)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_update_validation_also_precedes_the_store() {
    let service = ReviewService::new(MemoryStore::new());
    let author = customer("shopper@example.com");
    let product = ProductId::new("p-1");

    let created = service
        .create(&author, &product, &input(4, "Good."))
        .await
        .unwrap();

    let err = service.update(&created.id, &input(6, "Better!")).await.unwrap_err();
    assert!(matches!(err, ReviewError::InvalidRating));

    // The stored review is untouched.
    let found = service
        .user_review_for_product(&author.id, &product)
        .await
        .unwrap()
        .expect("review still present");
    assert_eq!(found.rating, 4);
    assert_eq!(found.comment, "Good.");
}
