use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use vitrine::sales::{Channel, UserEntry};

use crate::{
    error::ApiError, middleware::session::AppUser, routes::MutationResponse, state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    #[serde(default)]
    pub channel: Option<String>,
}

/// Empty means every channel
pub(crate) fn parse_channel(channel: Option<&str>) -> Result<Option<Channel>, ApiError> {
    match channel.map(str::trim).filter(|c| !c.is_empty()) {
        Some(channel) => channel
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Canal inválido: {channel}"))),
        None => Ok(None),
    }
}

pub(crate) async fn load_goals(state: &AppState) -> Result<Vec<UserEntry>, ApiError> {
    state
        .goals
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar metas", e))
}

#[tracing::instrument(name = "GET /sales/goals", skip(state, user))]
pub async fn list_goals(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(query): Query<ChannelQuery>,
) -> Result<Json<Vec<UserEntry>>, ApiError> {
    user.admin(&state)?;

    let channel = parse_channel(query.channel.as_deref())?;
    let goals = load_goals(&state)
        .await?
        .into_iter()
        .filter(|entry| channel.is_none_or(|channel| entry.sector == channel))
        .collect();
    Ok(Json(goals))
}

/// Amounts are stored as entered, negative values included
#[tracing::instrument(name = "POST /sales/goals", skip(state, user))]
pub async fn create_goal(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(body): Json<UserEntry>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    let id = state
        .goals
        .create(&body)
        .await
        .map_err(|e| ApiError::storage("Erro ao salvar meta", e))?;
    Ok(Json(MutationResponse::with_id(id)))
}

#[tracing::instrument(name = "PUT /sales/goals/{goal_id}", skip(state, user))]
pub async fn update_goal(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(goal_id): Path<String>,
    Json(body): Json<UserEntry>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    state
        .goals
        .update(&goal_id, &body)
        .await
        .map_err(|e| ApiError::storage("Erro ao atualizar meta", e))?;
    Ok(Json(MutationResponse::with_id(goal_id)))
}

#[tracing::instrument(name = "DELETE /sales/goals/{goal_id}", skip(state, user))]
pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(goal_id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    state
        .goals
        .delete(&goal_id)
        .await
        .map_err(|e| ApiError::storage("Erro ao excluir meta", e))?;
    Ok(Json(MutationResponse::done()))
}
