use axum::{
    Extension, Json,
    extract::{Path, State},
};
use vitrine::catalog::Product;

use crate::{
    error::ApiError,
    middleware::session::AppUser,
    routes::{MutationResponse, require_price, require_text},
    state::AppState,
};

fn validate(product: &Product) -> Result<(), ApiError> {
    require_text(&product.name, "O nome do produto é obrigatório")?;
    require_price(product.price)
}

/// GET /admin/products - Every product, inactive ones included
#[tracing::instrument(name = "GET /admin/products", skip(state, user))]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<Vec<Product>>, ApiError> {
    user.admin(&state)?;

    let products = state
        .products
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar produtos", e))?;
    Ok(Json(products))
}

#[tracing::instrument(name = "POST /admin/products", skip(state, user, body))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(body): Json<Product>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    validate(&body)?;

    let id = state
        .products
        .create(&body)
        .await
        .map_err(|e| ApiError::storage("Erro ao criar produto", e))?;

    tracing::info!(product = %id, "Product created");
    Ok(Json(MutationResponse::with_id(id)))
}

#[tracing::instrument(name = "PUT /admin/products/{product_id}", skip(state, user, body))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
    Json(body): Json<Product>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    validate(&body)?;

    state
        .products
        .update(&product_id, &body)
        .await
        .map_err(|e| ApiError::storage("Erro ao atualizar produto", e))?;

    Ok(Json(MutationResponse::with_id(product_id)))
}

#[tracing::instrument(name = "DELETE /admin/products/{product_id}", skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    state
        .products
        .delete(&product_id)
        .await
        .map_err(|e| ApiError::storage("Erro ao excluir produto", e))?;

    Ok(Json(MutationResponse::done()))
}
