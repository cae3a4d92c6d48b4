use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use vitrine_storage::HostedConfig;
use vitrine_types::{Value, async_trait, json::json};

use super::{AuthError, AuthResult, Identity, IdentityProvider};

#[derive(Debug, Deserialize)]
struct HostedUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: HostedUser,
}

/// Identity service of the hosted backend project
pub struct HostedIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HostedIdentity {
    pub fn new(config: &HostedConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &HostedConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.api_key)
    }

    async fn failure(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Identity provider rejected request");
        AuthError::Provider(format!("{status}: {body}"))
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let response = self
            .with_key(self.client.post(self.endpoint("token?grant_type=password")))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(AuthError::InvalidCredentials);
            }
            _ => return Err(Self::failure(response).await),
        }

        let token: TokenResponse = response.json().await?;
        Ok(Identity {
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            user_id: token.user.id,
            access_token: token.access_token,
            expires_at: token
                .expires_at
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        })
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .with_key(self.client.post(self.endpoint("logout")))
            .bearer_auth(access_token)
            .send()
            .await?;

        // an already invalid token is as logged out as it gets
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
            _ => Err(Self::failure(response).await),
        }
    }

    async fn resolve(&self, access_token: &str) -> AuthResult<Option<Identity>> {
        let response = self
            .with_key(self.client.get(self.endpoint("user")))
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Ok(None),
            _ => return Err(Self::failure(response).await),
        }

        let user: HostedUser = response.json().await?;
        Ok(Some(Identity {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            access_token: access_token.to_string(),
            expires_at: None,
        }))
    }

    async fn register(&self, email: &str, password: &str) -> AuthResult<String> {
        let response = self
            .with_key(self.client.post(self.endpoint("signup")))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNPROCESSABLE_ENTITY => {
                return Err(AuthError::AlreadyRegistered(email.to_string()));
            }
            _ => return Err(Self::failure(response).await),
        }

        // with auto-confirm the answer is a session, otherwise the bare user
        let body: Value = response.json().await?;
        body.pointer("/user/id")
            .or_else(|| body.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuthError::Provider("signup answer without a user id".to_string()))
    }

    /// Needs a service key; the public key is refused by the admin endpoint
    async fn unregister(&self, user_id: &str, _email: &str) -> AuthResult<()> {
        let response = self
            .with_key(self.client.delete(self.endpoint(&format!("admin/users/{user_id}"))))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::failure(response).await),
        }
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_ignore_trailing_slashes() {
        let identity = HostedIdentity::new(&HostedConfig {
            url: "https://project.example.com/".to_string(),
            api_key: "anon".to_string(),
        });
        assert_eq!(
            identity.endpoint("token?grant_type=password"),
            "https://project.example.com/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn token_answers_parse() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1717200000,
            "user": {"id": "5f1c", "email": "ana@loja.com", "role": "authenticated"}
        }))
        .unwrap();
        assert_eq!(token.user.id, "5f1c");
        assert_eq!(token.expires_at, Some(1717200000));
    }
}
