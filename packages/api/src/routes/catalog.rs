use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use vitrine::catalog::{Category, Page, Product, ProductQuery, query_products, sort_categories};

use crate::error::ApiError;
use crate::middleware::session::AppUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{product_id}", get(get_product))
        .route("/categories", get(list_categories))
}

/// GET /catalog/products - Search, filter, sort and paginate the catalog
#[tracing::instrument(name = "GET /catalog/products", skip(state, user))]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(mut query): Query<ProductQuery>,
) -> Result<Json<Page<Product>>, ApiError> {
    if !user.is_admin() {
        query.include_inactive = false;
    }

    let favorites = if query.favorites_only {
        let user = user.user()?;
        state
            .favorites
            .get(&user.id)
            .await
            .map_err(|e| ApiError::storage("Erro ao carregar favoritos", e))?
    } else {
        None
    };

    let products = state
        .products
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar produtos", e))?;

    Ok(Json(query_products(products, &query, favorites.as_ref())))
}

/// GET /catalog/products/{product_id}
#[tracing::instrument(name = "GET /catalog/products/{product_id}", skip(state, user))]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .get(&product_id)
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar produto", e))?
        .filter(|product| product.active || user.is_admin())
        .ok_or_else(|| ApiError::not_found("Produto não encontrado"))?;

    Ok(Json(product))
}

/// GET /catalog/categories - Categories in display order
#[tracing::instrument(name = "GET /catalog/categories", skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let mut categories = state
        .categories
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar categorias", e))?;
    sort_categories(&mut categories);
    Ok(Json(categories))
}
