//! Integration tests for the review listing read path.
//!
//! The same dataset is read twice: once with the composite index
//! registered (server-side sort) and once without (missing-index error,
//! unordered refetch, in-memory sort). Both paths must return the same
//! order.

use serde_json::json;

use larkspur_core::ProductId;
use larkspur_storefront::services::ReviewService;
use larkspur_storefront::store::MemoryStore;

use larkspur_integration_tests::seed_review;

// =============================================================================
// Indexed / Fallback Parity
// =============================================================================

/// One review per wire shape the `createdAt` field appears in.
fn seed_mixed_shapes(store: &MemoryStore) {
    // RFC 3339 string, 2024-01-01
    seed_review(store, "r-jan", "p-1", "u-1", json!("2024-01-01T00:00:00Z"));
    // Seconds/nanos wrapper, 2024-03-01
    seed_review(
        store,
        "r-mar",
        "p-1",
        "u-2",
        json!({ "seconds": 1_709_251_200i64, "nanos": 0 }),
    );
    // Epoch milliseconds, 2024-02-01
    seed_review(store, "r-feb", "p-1", "u-3", json!(1_706_745_600_000i64));
}

#[tokio::test]
async fn test_indexed_and_fallback_paths_agree() {
    let product = ProductId::new("p-1");

    let indexed = MemoryStore::new();
    indexed.register_composite_index("reviews", "productId", "createdAt");
    seed_mixed_shapes(&indexed);

    let unindexed = MemoryStore::new();
    seed_mixed_shapes(&unindexed);

    let via_index = ReviewService::new(indexed)
        .list_for_product(&product)
        .await
        .unwrap();
    let via_fallback = ReviewService::new(unindexed)
        .list_for_product(&product)
        .await
        .unwrap();

    let indexed_ids: Vec<_> = via_index.iter().map(|r| r.id.as_str()).collect();
    let fallback_ids: Vec<_> = via_fallback.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(indexed_ids, vec!["r-mar", "r-feb", "r-jan"]);
    assert_eq!(indexed_ids, fallback_ids);
}

#[tokio::test]
async fn test_fallback_sorts_mixed_shapes_newest_first() {
    let store = MemoryStore::new();
    seed_mixed_shapes(&store);

    let reviews = ReviewService::new(store)
        .list_for_product(&ProductId::new("p-1"))
        .await
        .unwrap();

    let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r-mar", "r-feb", "r-jan"]);
}

#[tokio::test]
async fn test_fallback_puts_missing_and_unparseable_timestamps_last() {
    let store = MemoryStore::new();
    // No createdAt field at all.
    store.seed(
        "reviews",
        "r-missing",
        larkspur_integration_tests::fields(json!({
            "productId": "p-1",
            "author": { "id": "u-1", "email": "a@example.com", "displayName": "A" },
            "rating": 3,
            "comment": "Fine.",
        })),
    );
    // A string the server stored but nothing can parse as a time.
    seed_review(&store, "r-garbled", "p-1", "u-2", json!("sometime last spring"));
    // A real timestamp.
    seed_review(&store, "r-dated", "p-1", "u-3", json!("2024-01-01T00:00:00Z"));

    let reviews = ReviewService::new(store)
        .list_for_product(&ProductId::new("p-1"))
        .await
        .unwrap();

    let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
    // The dated review leads; the epoch-keyed pair follows in id order.
    assert_eq!(ids, vec!["r-dated", "r-garbled", "r-missing"]);
}

#[tokio::test]
async fn test_one_garbled_timestamp_never_poisons_the_listing() {
    let store = MemoryStore::new();
    // Fractional epoch millis, as a client storing raw doubles writes.
    seed_review(&store, "r-float", "p-1", "u-1", json!(1_706_745_600_000.5));
    // Outright garbage.
    seed_review(&store, "r-null", "p-1", "u-2", json!(null));
    seed_review(&store, "r-dated", "p-1", "u-3", json!("2024-03-01T00:00:00Z"));

    let reviews = ReviewService::new(store)
        .list_for_product(&ProductId::new("p-1"))
        .await
        .unwrap();

    let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
    // The float keys at its real instant (2024-02-01); null keys at the
    // epoch and sorts last.
    assert_eq!(ids, vec!["r-dated", "r-float", "r-null"]);
}

#[tokio::test]
async fn test_equal_timestamps_tie_break_by_id() {
    let store = MemoryStore::new();
    seed_review(&store, "r-b", "p-1", "u-1", json!("2024-06-01T12:00:00Z"));
    seed_review(&store, "r-a", "p-1", "u-2", json!("2024-06-01T12:00:00Z"));
    seed_review(&store, "r-c", "p-1", "u-3", json!("2024-06-01T12:00:00Z"));

    let reviews = ReviewService::new(store)
        .list_for_product(&ProductId::new("p-1"))
        .await
        .unwrap();

    let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r-a", "r-b", "r-c"]);
}

#[tokio::test]
async fn test_listing_is_scoped_to_the_product() {
    let store = MemoryStore::new();
    seed_review(&store, "r-mine", "p-1", "u-1", json!("2024-01-01T00:00:00Z"));
    seed_review(&store, "r-other", "p-2", "u-1", json!("2024-01-02T00:00:00Z"));

    let reviews = ReviewService::new(store)
        .list_for_product(&ProductId::new("p-1"))
        .await
        .unwrap();

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id.as_str(), "r-mine");
}
