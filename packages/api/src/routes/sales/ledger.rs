use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use vitrine::sales::{LedgerFilter, LedgerSale, LedgerSummary, filter_sales, summarize};

use crate::{
    error::ApiError,
    middleware::session::AppUser,
    routes::{MutationResponse, require_text},
    state::AppState,
};

fn validate(sale: &LedgerSale) -> Result<(), ApiError> {
    require_text(&sale.seller, "O vendedor é obrigatório")?;
    if !sale.amount.is_finite() {
        return Err(ApiError::bad_request("Valor inválido"));
    }
    Ok(())
}

async fn load_sales(state: &AppState, filter: &LedgerFilter) -> Result<Vec<LedgerSale>, ApiError> {
    let sales = state
        .ledger
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar vendas", e))?;
    Ok(filter_sales(sales, filter))
}

/// GET /sales/ledger - Matching sales, newest first
#[tracing::instrument(name = "GET /sales/ledger", skip(state, user))]
pub async fn list_sales(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(filter): Query<LedgerFilter>,
) -> Result<Json<Vec<LedgerSale>>, ApiError> {
    user.admin(&state)?;
    Ok(Json(load_sales(&state, &filter).await?))
}

#[tracing::instrument(name = "GET /sales/ledger/summary", skip(state, user))]
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(filter): Query<LedgerFilter>,
) -> Result<Json<LedgerSummary>, ApiError> {
    user.admin(&state)?;
    let sales = load_sales(&state, &filter).await?;
    Ok(Json(summarize(&sales)))
}

#[tracing::instrument(name = "POST /sales/ledger", skip(state, user))]
pub async fn create_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(body): Json<LedgerSale>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    validate(&body)?;

    let id = state
        .ledger
        .create(&body)
        .await
        .map_err(|e| ApiError::storage("Erro ao registrar venda", e))?;
    Ok(Json(MutationResponse::with_id(id)))
}

#[tracing::instrument(name = "PUT /sales/ledger/{sale_id}", skip(state, user))]
pub async fn update_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(sale_id): Path<String>,
    Json(body): Json<LedgerSale>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    validate(&body)?;

    state
        .ledger
        .update(&sale_id, &body)
        .await
        .map_err(|e| ApiError::storage("Erro ao atualizar venda", e))?;
    Ok(Json(MutationResponse::with_id(sale_id)))
}

#[tracing::instrument(name = "DELETE /sales/ledger/{sale_id}", skip(state, user))]
pub async fn delete_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(sale_id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    state
        .ledger
        .delete(&sale_id)
        .await
        .map_err(|e| ApiError::storage("Erro ao excluir venda", e))?;
    Ok(Json(MutationResponse::done()))
}
