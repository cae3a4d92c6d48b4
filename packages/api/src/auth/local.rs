use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vitrine::entity::Collection;
use vitrine::user::Credential;
use vitrine_storage::StorageBackend;
use vitrine_types::{async_trait, create_id};

use super::{AuthError, AuthResult, Identity, IdentityProvider};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    jti: String,
    iat: i64,
    exp: i64,
}

/// Credentials kept in the storage gateway, sessions as signed HS256 tokens.
pub struct LocalIdentity {
    credentials: Collection<Credential>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    hash_cost: u32,
    /// Token ids revoked by logout, kept until the token would expire anyway
    revoked: moka::sync::Cache<String, ()>,
}

impl LocalIdentity {
    pub fn new(storage: Arc<dyn StorageBackend>, secret: &str, session_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            credentials: Collection::new(storage),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            session_ttl,
            hash_cost: bcrypt::DEFAULT_COST,
            revoked: moka::sync::Cache::builder()
                .max_capacity(100_000)
                .time_to_live(session_ttl)
                .build(),
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn issue(&self, user_id: &str, email: &str) -> AuthResult<Identity> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::hours(12));
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            jti: create_id(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(Identity {
            user_id: user_id.to_string(),
            email: email.to_string(),
            access_token: token,
            expires_at: Some(expires_at),
        })
    }

    fn decode(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                None
            }
        }
    }
}

/// Runs bcrypt on the blocking pool
async fn hashing<T, F>(work: F) -> AuthResult<T>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Provider(format!("hashing task failed: {e}")))?
        .map_err(AuthError::from)
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let Some(credential) = self.credentials.get(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let hash = credential.password_hash;
        if !hashing(move || bcrypt::verify(password, &hash)).await? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(&credential.user_id, email)
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        if let Some(claims) = self.decode(access_token) {
            self.revoked.insert(claims.jti, ());
        }
        Ok(())
    }

    async fn resolve(&self, access_token: &str) -> AuthResult<Option<Identity>> {
        let Some(claims) = self.decode(access_token) else {
            return Ok(None);
        };
        if self.revoked.contains_key(&claims.jti) {
            return Ok(None);
        }

        Ok(Some(Identity {
            user_id: claims.sub,
            email: claims.email,
            access_token: access_token.to_string(),
            expires_at: DateTime::from_timestamp(claims.exp, 0),
        }))
    }

    async fn register(&self, email: &str, password: &str) -> AuthResult<String> {
        if self.credentials.get(email).await?.is_some() {
            return Err(AuthError::AlreadyRegistered(email.to_string()));
        }

        let password = password.to_string();
        let cost = self.hash_cost;
        let password_hash = hashing(move || bcrypt::hash(password, cost)).await?;

        let user_id = create_id();
        let credential = Credential {
            id: Some(email.to_string()),
            user_id: user_id.clone(),
            password_hash,
        };
        self.credentials.create(&credential).await?;
        Ok(user_id)
    }

    async fn unregister(&self, user_id: &str, email: &str) -> AuthResult<()> {
        match self.credentials.get(email).await? {
            Some(credential) if credential.user_id == user_id => {
                self.credentials.delete(email).await?;
                tracing::info!(email = %email, "Removed login");
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
