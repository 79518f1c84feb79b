//! Review write route handlers.
//!
//! Both handlers follow the same shape: look up whether the signed-in
//! customer already reviewed this product, act, and on failure re-render
//! the product page with an inline message instead of an error response.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::warn;

use larkspur_core::ProductId;

use crate::error::AppError;
use crate::middleware::auth::RequireAuth;
use crate::services::{ReviewError, ReviewInput};
use crate::state::AppState;

use super::products::build_show_template;

/// Review form fields.
///
/// `rating` arrives as a string so an unselected rating deserializes
/// cleanly and fails validation instead of failing form parsing.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

impl ReviewForm {
    fn into_input(self) -> ReviewInput {
        ReviewInput {
            rating: self.rating.trim().parse().unwrap_or(0),
            comment: self.comment,
        }
    }
}

/// Create or update the signed-in customer's review of a product.
///
/// Which one happens is decided by a lookup first; the write is a
/// separate round trip, so two concurrent submissions from the same
/// customer can race the check and both create.
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(id);
    let input = form.into_input();

    // Invalid input re-renders without any store round trip.
    if let Err(e) = input.validate() {
        let page = build_show_template(
            &state,
            Some(&customer),
            &product_id,
            Some(e.to_string()),
            Some(&input),
        )
        .await?;
        return Ok(page.into_response());
    }

    let existing = state
        .reviews()
        .user_review_for_product(&customer.id, &product_id)
        .await?;

    let result = match &existing {
        Some(review) => state.reviews().update(&review.id, &input).await,
        None => state.reviews().create(&customer, &product_id, &input).await,
    };

    match result {
        Ok(_) => Ok(Redirect::to(&format!("/products/{product_id}")).into_response()),
        Err(e @ (ReviewError::InvalidRating | ReviewError::EmptyComment)) => {
            let page = build_show_template(
                &state,
                Some(&customer),
                &product_id,
                Some(e.to_string()),
                Some(&input),
            )
            .await?;
            Ok(page.into_response())
        }
        Err(ReviewError::Store(e)) => {
            sentry::capture_error(&e);
            warn!(error = %e, "review write failed");
            let page = build_show_template(
                &state,
                Some(&customer),
                &product_id,
                Some("Your review could not be saved. Please try again.".to_string()),
                Some(&input),
            )
            .await?;
            Ok(page.into_response())
        }
    }
}

/// Delete the signed-in customer's review of a product.
///
/// Resolves the review through the same (author, product) lookup the
/// submit path uses, so the customer can only ever delete their own.
/// Deleting when no review exists is a no-op redirect.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(id);

    let existing = state
        .reviews()
        .user_review_for_product(&customer.id, &product_id)
        .await?;

    if let Some(review) = existing
        && let Err(e) = state.reviews().delete(&review.id).await
    {
        sentry::capture_error(&e);
        warn!(error = %e, "review delete failed");
        let page = build_show_template(
            &state,
            Some(&customer),
            &product_id,
            Some("Your review could not be deleted. Please try again.".to_string()),
            None,
        )
        .await?;
        return Ok(page.into_response());
    }

    Ok(Redirect::to(&format!("/products/{product_id}")).into_response())
}
