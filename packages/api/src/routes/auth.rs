use axum::extract::{Query, State};
use axum::http::{HeaderMap, header::USER_AGENT};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use vitrine::user::LoginRecord;

use crate::auth::{AuthUser, Session};
use crate::error::ApiError;
use crate::middleware::session::AppUser;
use crate::routes::{LimitParams, MutationResponse};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/history", get(history))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "identifier")]
    pub email: String,
    #[serde(alias = "secret")]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[tracing::instrument(name = "POST /auth/login", skip(state, headers))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let session = state
        .auth
        .login(&body.email, &body.password, user_agent)
        .await?;
    Ok(Json(session))
}

#[tracing::instrument(name = "POST /auth/logout", skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<MutationResponse>, ApiError> {
    let session = user.session()?;
    state.auth.logout(&session.access_token).await?;
    Ok(Json(MutationResponse::done()))
}

#[tracing::instrument(name = "GET /auth/me", skip(user))]
pub async fn me(Extension(user): Extension<AppUser>) -> Result<Json<AuthUser>, ApiError> {
    Ok(Json(user.user()?.clone()))
}

#[tracing::instrument(name = "GET /auth/history", skip(state, user))]
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<LoginRecord>>, ApiError> {
    user.admin(&state)?;

    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    Ok(Json(state.auth.login_history(limit).await?))
}
