//! Product catalog routes.

use axum::Json;
use axum::extract::{Path, State};
use vinyasa_core::CommerceError;
use vinyasa_core::catalog::Product;

use crate::error::ApiError;
use crate::state::SharedState;

/// `GET /products` — the full product list.
pub async fn list_products(State(state): State<SharedState>) -> Json<Vec<Product>> {
    Json(state.products.all().to_vec())
}

/// `GET /products/{id}` — a single product.
///
/// # Errors
///
/// Returns 404 for an unknown product id.
pub async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .get(&id)
        .ok_or_else(CommerceError::product_not_found)?;
    Ok(Json(product.clone()))
}
