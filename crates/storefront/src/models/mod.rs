//! Domain records as stored in the document database.

pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use order::{Address, CouponRef, Order, OrderItem};
pub use product::Product;
pub use review::{Review, ReviewAuthor};
pub use user::{CurrentCustomer, session_keys};
