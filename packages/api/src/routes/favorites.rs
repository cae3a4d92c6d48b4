use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use vitrine::catalog::Favorites;

use crate::error::ApiError;
use crate::middleware::session::AppUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/{product_id}", post(toggle_favorite))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub product_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub favorite: bool,
    pub product_ids: Vec<String>,
}

#[tracing::instrument(name = "GET /favorites", skip(state, user))]
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let user = user.user()?;
    let favorites = state
        .favorites
        .get(&user.id)
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar favoritos", e))?
        .unwrap_or_else(|| Favorites::for_user(&user.id));

    Ok(Json(FavoritesResponse {
        product_ids: favorites.product_ids,
    }))
}

/// POST /favorites/{product_id} - Adds or removes one favorite
#[tracing::instrument(name = "POST /favorites/{product_id}", skip(state, user))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let user = user.user()?;
    let stored = state
        .favorites
        .get(&user.id)
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar favoritos", e))?;
    let exists = stored.is_some();
    let mut favorites = stored.unwrap_or_else(|| Favorites::for_user(&user.id));

    // removing a favorite of a deleted product must still work
    if !favorites.contains(&product_id) {
        let product = state
            .products
            .get(&product_id)
            .await
            .map_err(|e| ApiError::storage("Erro ao carregar produto", e))?;
        if product.is_none() {
            return Err(ApiError::not_found("Produto não encontrado"));
        }
    }

    let favorite = favorites.toggle(&product_id);
    let saved = if exists {
        state.favorites.update(&user.id, &favorites).await
    } else {
        state.favorites.create(&favorites).await.map(|_| ())
    };
    saved.map_err(|e| ApiError::storage("Erro ao salvar favoritos", e))?;

    Ok(Json(ToggleResponse {
        success: true,
        favorite,
        product_ids: favorites.product_ids,
    }))
}
