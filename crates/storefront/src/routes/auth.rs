//! Auth route handlers.
//!
//! There is no password or credential check here: identity verification
//! belongs to the external authentication context, and this storefront
//! only needs a stable customer identity for review writes and order
//! reads. Signing in records that identity in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use larkspur_core::{Email, UserId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::{clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
    pub display_name: String,
    pub next: String,
}

/// Login page query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub next: String,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        error: None,
        email: String::new(),
        display_name: String::new(),
        next: safe_next(query.next.as_deref().unwrap_or_default()),
    }
}

/// Sign the customer in and redirect back to where they came from.
///
/// The customer id is derived from the lowercased email, so the same
/// email always maps to the same identity across sessions.
pub async fn login(session: Session, Form(form): Form<LoginForm>) -> Result<Response, AppError> {
    let email = match Email::parse(form.email.trim()) {
        Ok(email) => email,
        Err(e) => {
            return Ok(LoginTemplate {
                error: Some(e.to_string()),
                email: form.email,
                display_name: form.display_name,
                next: safe_next(&form.next),
            }
            .into_response());
        }
    };

    let display_name = {
        let trimmed = form.display_name.trim();
        if trimmed.is_empty() {
            email.as_str().split('@').next().unwrap_or_default().to_string()
        } else {
            trimmed.to_string()
        }
    };

    let customer = CurrentCustomer {
        id: UserId::new(email.as_str().to_lowercase()),
        email,
        display_name,
    };

    set_current_customer(&session, &customer)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Redirect::to(&safe_next(&form.next)).into_response())
}

/// Sign the customer out.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_customer(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Redirect::to("/products"))
}

/// Restrict the post-login redirect to same-site paths.
///
/// Anything that is not a plain absolute path (`//host` included) falls
/// back to the product listing.
fn safe_next(next: &str) -> String {
    if next.starts_with('/') && !next.starts_with("//") {
        next.to_string()
    } else {
        "/products".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_keeps_local_paths() {
        assert_eq!(safe_next("/products/p-1"), "/products/p-1");
    }

    #[test]
    fn test_safe_next_rejects_external_targets() {
        assert_eq!(safe_next("https://evil.example"), "/products");
        assert_eq!(safe_next("//evil.example"), "/products");
        assert_eq!(safe_next(""), "/products");
    }
}
