//! The signed-in customer identity.

use serde::{Deserialize, Serialize};

use larkspur_core::{Email, UserId};

/// Session keys used by the storefront.
pub mod session_keys {
    /// The currently signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";
}

/// The identity of the currently signed-in customer, held in the session.
///
/// Identity verification belongs to the external authentication context;
/// this storefront only carries the identity through to review writes and
/// order reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
}
