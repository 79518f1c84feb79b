//! Authentication extractors.
//!
//! The signed-in customer lives in the session; these extractors pull it
//! out for route handlers. Identity verification happens outside this
//! storefront, so "authenticated" here means exactly "the session carries
//! a [`CurrentCustomer`]".

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Extractor for handlers that need a signed-in customer.
///
/// A request without one is redirected to the login page, carrying the
/// original path so login can send the customer back.
///
/// ```rust,ignore
/// async fn orders(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("orders for {}", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// No signed-in customer; redirect to login and come back to `next`.
    SignInAt { next: String },
    /// No session at all, meaning the session layer is not installed on
    /// this route. A configuration fault, not a customer state.
    NoSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::SignInAt { next } => {
                Redirect::to(&format!("/auth/login?next={next}")).into_response()
            }
            Self::NoSessionLayer => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSessionLayer)?;

        match session.get(session_keys::CURRENT_CUSTOMER).await {
            Ok(Some(customer)) => Ok(Self(customer)),
            // A session read failure is treated the same as no identity;
            // the customer signs in again.
            Ok(None) | Err(_) => Err(AuthRejection::SignInAt {
                next: parts.uri.path().to_string(),
            }),
        }
    }
}

/// Extractor for handlers that render differently for signed-in
/// customers but serve everyone. Never rejects.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Record the signed-in customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Remove the signed-in customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
