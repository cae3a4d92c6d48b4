use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use vitrine::user::{Role, UserProfile};
use vitrine_types::utils::normalize_email;

use crate::{
    error::ApiError,
    middleware::session::AppUser,
    routes::{MutationResponse, require_email, require_text},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    /// Also creates a login when present
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

fn validate(email: &str, name: &str) -> Result<(), ApiError> {
    require_text(name, "O nome do usuário é obrigatório")?;
    require_email(email)
}

async fn load_users(state: &AppState) -> Result<Vec<UserProfile>, ApiError> {
    state
        .users
        .list()
        .await
        .map_err(|e| ApiError::storage("Erro ao carregar usuários", e))
}

#[tracing::instrument(name = "GET /admin/users", skip(state, user))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    user.admin(&state)?;
    Ok(Json(load_users(&state).await?))
}

#[tracing::instrument(name = "POST /admin/users", skip(state, user))]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    validate(&body.email, &body.name)?;

    let email = normalize_email(&body.email);
    let taken = load_users(&state)
        .await?
        .iter()
        .any(|profile| normalize_email(&profile.email) == email);
    if taken {
        return Err(ApiError::conflict("E-mail já cadastrado"));
    }

    let id = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => state
            .auth
            .register(&email, password, &body.name, body.role)
            .await?
            .id
            .unwrap_or_default(),
        None => {
            let profile = UserProfile {
                id: None,
                email,
                name: body.name.trim().to_string(),
                role: body.role,
                created_at: None,
            };
            state
                .users
                .create(&profile)
                .await
                .map_err(|e| ApiError::storage("Erro ao criar usuário", e))?
        }
    };

    tracing::info!(user = %id, "User created");
    Ok(Json(MutationResponse::with_id(id)))
}

#[tracing::instrument(name = "PUT /admin/users/{user_id}", skip(state, user))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(user_id): Path<String>,
    Json(mut body): Json<UserProfile>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;
    validate(&body.email, &body.name)?;
    body.email = normalize_email(&body.email);

    state
        .users
        .update(&user_id, &body)
        .await
        .map_err(|e| ApiError::storage("Erro ao atualizar usuário", e))?;
    Ok(Json(MutationResponse::with_id(user_id)))
}

#[tracing::instrument(name = "DELETE /admin/users/{user_id}", skip(state, user))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(user_id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    user.admin(&state)?;

    state
        .users
        .delete(&user_id)
        .await
        .map_err(|e| ApiError::storage("Erro ao excluir usuário", e))?;
    Ok(Json(MutationResponse::done()))
}
