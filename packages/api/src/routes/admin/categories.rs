use axum::{
    Extension, Json,
    extract::{Path, State},
};
use vitrine::catalog::{Category, sort_categories};

use crate::{
    error::ApiError,
    middleware::session::AppUser,
    routes::{MutationResponse, require_text},
    state::AppState,
};

const NAME_REQUIRED: &str = "O nome da categoria é obrigatório";

#[tracing::instrument(name = "GET /admin/categories", skip(state, user))]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<Vec<Category>>, ApiError> {
    user.admin(&state)?;

    let mut categories = state
        .categories
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar categorias", e))?;
    sort_categories(&mut categories);
    Ok(Json(categories))
}

#[tracing::instrument(name = "POST /admin/categories", skip(state, user))]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(body): Json<Category>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    require_text(&body.name, NAME_REQUIRED)?;

    let id = state
        .categories
        .create(&body)
        .await
        .map_err(|e| ApiError::storage("Erro ao criar categoria", e))?;
    Ok(Json(MutationResponse::with_id(id)))
}

#[tracing::instrument(name = "PUT /admin/categories/{category_id}", skip(state, user))]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(category_id): Path<String>,
    Json(body): Json<Category>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    require_text(&body.name, NAME_REQUIRED)?;

    state
        .categories
        .update(&category_id, &body)
        .await
        .map_err(|e| ApiError::storage("Erro ao atualizar categoria", e))?;
    Ok(Json(MutationResponse::with_id(category_id)))
}

/// Products keep the dangling category id and show up as uncategorized
#[tracing::instrument(name = "DELETE /admin/categories/{category_id}", skip(state, user))]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(category_id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    state
        .categories
        .delete(&category_id)
        .await
        .map_err(|e| ApiError::storage("Erro ao excluir categoria", e))?;
    Ok(Json(MutationResponse::done()))
}
