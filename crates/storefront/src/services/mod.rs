//! Services layered over the document store.
//!
//! Each service is generic over [`crate::store::DocumentStore`] and takes
//! the acting identity as an explicit argument - no ambient auth or cart
//! state is consulted, so every service is testable against the in-memory
//! store without a UI in front of it.

pub mod orders;
pub mod products;
pub mod reviews;

pub use orders::OrderService;
pub use products::ProductService;
pub use reviews::{ReviewError, ReviewInput, ReviewService};
