//! Auth gateway
//!
//! Login, logout and current-user resolution over a pluggable
//! [`IdentityProvider`]. Roles and login history live in the storage gateway,
//! the provider only proves who someone is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vitrine::entity::Collection;
use vitrine::user::{LoginRecord, Role, UserProfile, latest_logins};
use vitrine_storage::{StorageBackend, StorageError};
use vitrine_types::async_trait;
use vitrine_types::utils::normalize_email;

mod hosted;
mod local;

pub use hosted::HostedIdentity;
pub use local::LocalIdentity;

/// How long a resolved token is trusted without asking the provider again
const SESSION_CACHE_TTL: Duration = Duration::from_secs(240);

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("E-mail ou senha inválidos")]
    InvalidCredentials,

    #[error("Sessão expirada, faça login novamente")]
    SessionExpired,

    #[error("E-mail já cadastrado: {0}")]
    AlreadyRegistered(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Provider(err.to_string())
    }
}

/// What an identity provider knows about a signed-in user
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;

    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;

    /// `None` for unknown, expired or revoked tokens
    async fn resolve(&self, access_token: &str) -> AuthResult<Option<Identity>>;

    /// Creates a login for the address and returns the new user id
    async fn register(&self, email: &str, password: &str) -> AuthResult<String>;

    /// Undoes `register` when the matching profile could not be stored
    async fn unregister(&self, user_id: &str, email: &str) -> AuthResult<()>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct AuthGateway {
    identity: Arc<dyn IdentityProvider>,
    users: Collection<UserProfile>,
    history: Collection<LoginRecord>,
    /// Token to identity only. Roles are read fresh so a profile change applies
    /// on the next request.
    sessions: moka::sync::Cache<String, Identity>,
}

impl AuthGateway {
    pub fn new(identity: Arc<dyn IdentityProvider>, storage: Arc<dyn StorageBackend>) -> Self {
        let sessions = moka::sync::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(SESSION_CACHE_TTL)
            .build();

        Self {
            identity,
            users: Collection::new(storage.clone()),
            history: Collection::new(storage),
            sessions,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.identity.name()
    }

    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        user_agent: &str,
    ) -> AuthResult<Session> {
        let email = normalize_email(identifier);
        if email.is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = self.identity.sign_in(&email, secret).await?;
        let user = self.user_for(&identity).await?;

        let record = LoginRecord {
            id: None,
            user_email: email.clone(),
            timestamp: Utc::now(),
            user_agent: user_agent.to_string(),
        };
        if let Err(e) = self.history.create(&record).await {
            tracing::warn!(email = %email, error = %e, "Failed to record login");
        }

        tracing::info!(user = %user.id, provider = self.identity.name(), "User logged in");
        self.sessions
            .insert(identity.access_token.clone(), identity.clone());

        Ok(Session {
            access_token: identity.access_token,
            user,
            expires_at: identity.expires_at,
        })
    }

    pub async fn logout(&self, access_token: &str) -> AuthResult<()> {
        self.sessions.invalidate(access_token);
        self.identity.sign_out(access_token).await
    }

    pub async fn current_user(&self, access_token: &str) -> AuthResult<Option<AuthUser>> {
        let identity = match self.sessions.get(access_token) {
            Some(identity) if identity.is_expired(Utc::now()) => {
                self.sessions.invalidate(access_token);
                return Ok(None);
            }
            Some(identity) => identity,
            None => {
                let Some(identity) = self.identity.resolve(access_token).await? else {
                    return Ok(None);
                };
                self.sessions.insert(access_token.to_string(), identity.clone());
                identity
            }
        };

        Ok(Some(self.user_for(&identity).await?))
    }

    pub fn is_admin(&self, user: &AuthUser) -> bool {
        user.is_admin()
    }

    /// Newest first
    pub async fn login_history(&self, limit: usize) -> AuthResult<Vec<LoginRecord>> {
        Ok(latest_logins(self.history.list().await?, limit))
    }

    /// Registers a login with the identity provider and stores the matching profile.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> AuthResult<UserProfile> {
        let email = normalize_email(email);
        let user_id = self.identity.register(&email, password).await?;

        let mut profile = UserProfile {
            id: Some(user_id.clone()),
            email: email.clone(),
            name: name.trim().to_string(),
            role,
            created_at: None,
        };
        match self.users.create(&profile).await {
            Ok(id) => {
                profile.id = Some(id);
                Ok(profile)
            }
            Err(e) => {
                if let Err(rollback) = self.identity.unregister(&user_id, &email).await {
                    tracing::error!(email = %email, error = %rollback, "Failed to remove login without profile");
                }
                Err(e.into())
            }
        }
    }

    /// Seeds the first admin. Returns whether a new account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AuthResult<bool> {
        let email = normalize_email(email);
        if self.profile_by_email(&email).await?.is_some() {
            return Ok(false);
        }

        match self.register(&email, password, "Administrador", Role::Admin).await {
            Ok(_) => {
                tracing::info!(email = %email, "Seeded admin account");
                Ok(true)
            }
            Err(AuthError::AlreadyRegistered(_)) => {
                tracing::warn!(email = %email, "Admin login exists without a profile");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn profile_by_email(&self, email: &str) -> AuthResult<Option<UserProfile>> {
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .find(|profile| normalize_email(&profile.email) == email))
    }

    /// A login without a stored profile is an ordinary user
    async fn user_for(&self, identity: &Identity) -> AuthResult<AuthUser> {
        let email = normalize_email(&identity.email);
        let profile = self.profile_by_email(&email).await?;

        Ok(match profile {
            Some(profile) => AuthUser {
                id: identity.user_id.clone(),
                email,
                name: profile.name,
                role: profile.role,
            },
            None => AuthUser {
                id: identity.user_id.clone(),
                email,
                name: String::new(),
                role: Role::User,
            },
        })
    }
}
