use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: AuthUser,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub enum AppUser {
    Authenticated(SessionUser),
    Anonymous,
}

impl AppUser {
    pub fn session(&self) -> Result<&SessionUser, ApiError> {
        match self {
            AppUser::Authenticated(session) => Ok(session),
            AppUser::Anonymous => Err(ApiError::unauthorized("Faça login para continuar")),
        }
    }

    pub fn user(&self) -> Result<&AuthUser, ApiError> {
        self.session().map(|session| &session.user)
    }

    pub fn admin(&self, state: &AppState) -> Result<&AuthUser, ApiError> {
        let user = self.user()?;
        if state.auth.is_admin(user) {
            Ok(user)
        } else {
            Err(ApiError::forbidden("Acesso restrito a administradores"))
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AppUser::Authenticated(session) if session.user.is_admin())
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves the bearer token into an [`AppUser`] request extension.
/// Unknown or expired tokens are treated as anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response<Body>, ApiError> {
    let mut request = request;

    let token = bearer_token(&request).map(str::to_string);
    let user = match token {
        Some(token) => match state.auth.current_user(&token).await? {
            Some(user) => AppUser::Authenticated(SessionUser {
                user,
                access_token: token,
            }),
            None => AppUser::Anonymous,
        },
        None => AppUser::Anonymous,
    };

    request.extensions_mut().insert::<AppUser>(user);
    Ok(next.run(request).await)
}
