//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::warn;

use larkspur_core::ProductId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::OptionalAuth;
use crate::models::{CurrentCustomer, Product, Review};
use crate::services::ReviewInput;
use crate::state::AppState;

use super::display_date;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl ProductView {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Review display data for templates.
#[derive(Clone)]
pub struct ReviewView {
    pub id: String,
    pub author_name: String,
    pub rating: u8,
    pub comment: String,
    pub posted_at: String,
    pub is_own: bool,
}

impl ReviewView {
    fn from_review(review: &Review, customer: Option<&CurrentCustomer>) -> Self {
        Self {
            id: review.id.to_string(),
            author_name: review.author.display_name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            posted_at: display_date(review.created_at.as_ref()),
            is_own: customer.is_some_and(|c| c.id == review.author.id),
        }
    }
}

/// Category filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub category: Option<String>,
    pub load_failed: bool,
    pub signed_in: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub reviews: Vec<ReviewView>,
    pub reviews_failed: bool,
    pub signed_in: bool,
    pub has_own_review: bool,
    pub form_rating: u8,
    pub form_comment: String,
    pub review_error: Option<String>,
}

/// Display the product listing page.
///
/// A store failure renders the page with an inline message rather than an
/// error response.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<CategoryQuery>,
) -> ProductsIndexTemplate {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let (products, load_failed) = match state.products().list(category.as_deref()).await {
        Ok(products) => (products, false),
        Err(e) => {
            warn!(error = %e, "failed to load product listing");
            (Vec::new(), true)
        }
    };

    ProductsIndexTemplate {
        products: products.iter().map(ProductView::from_product).collect(),
        category,
        load_failed,
        signed_in: customer.is_some(),
    }
}

/// Display the product detail page with its reviews and review form.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(customer): OptionalAuth,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate, AppError> {
    let product_id = ProductId::new(id);
    build_show_template(&state, customer.as_ref(), &product_id, None, None).await
}

/// Assemble the product detail page.
///
/// The review submit and delete handlers reuse this to re-render the page
/// with an inline `review_error` and the customer's attempted input, so a
/// failed write never loses what they typed.
///
/// The product fetch is the only hard failure here: without the product
/// there is no page. A review listing failure renders the page with
/// `reviews_failed` set, and a failed own-review lookup just means the
/// form starts blank.
pub(crate) async fn build_show_template(
    state: &AppState,
    customer: Option<&CurrentCustomer>,
    product_id: &ProductId,
    review_error: Option<String>,
    attempted: Option<&ReviewInput>,
) -> Result<ProductShowTemplate, AppError> {
    let product = state
        .products()
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let (reviews, reviews_failed) = match state.reviews().list_for_product(product_id).await {
        Ok(reviews) => (reviews, false),
        Err(e) => {
            warn!(error = %e, "failed to load reviews for product page");
            (Vec::new(), true)
        }
    };

    let own_review = match customer {
        Some(c) => match state
            .reviews()
            .user_review_for_product(&c.id, product_id)
            .await
        {
            Ok(review) => review,
            Err(e) => {
                warn!(error = %e, "failed to look up customer's own review");
                None
            }
        },
        None => None,
    };

    let (form_rating, form_comment) = match (attempted, &own_review) {
        (Some(input), _) => (input.rating, input.comment.clone()),
        (None, Some(own)) => (own.rating, own.comment.clone()),
        (None, None) => (0, String::new()),
    };

    Ok(ProductShowTemplate {
        product: ProductView::from_product(&product),
        reviews: reviews
            .iter()
            .map(|r| ReviewView::from_review(r, customer))
            .collect(),
        reviews_failed,
        signed_in: customer.is_some(),
        has_own_review: own_review.is_some(),
        form_rating,
        form_comment,
        review_error,
    })
}
