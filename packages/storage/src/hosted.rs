//! Hosted relational store
//!
//! Talks to the backend-as-a-service table API (PostgREST contract):
//! `GET/POST {url}/rest/v1/{table}` and `PATCH/DELETE ...?id=eq.{id}`.
//! No timeouts or retries are configured; the transport defaults apply.

use reqwest::{Client, RequestBuilder, Response};
use vitrine_types::{Record, async_trait};

use crate::config::HostedConfig;
use crate::helper::record_id;
use crate::traits::{EntityKind, StorageBackend, StorageError, StorageResult};

pub struct HostedStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedStore {
    pub fn new(config: &HostedConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &HostedConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Hosted store rejected request");
        Err(StorageError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

const RETURN_REPRESENTATION: &str = "return=representation";

/// Rows come back unordered unless asked; oldest first matches the local stores
const LIST_QUERY: [(&str, &str); 2] = [("select", "*"), ("order", "created_at.asc,id.asc")];

#[async_trait]
impl StorageBackend for HostedStore {
    async fn list(&self, kind: EntityKind) -> StorageResult<Vec<Record>> {
        let request = self.client.get(self.table_url(kind)).query(&LIST_QUERY);
        let response = Self::check(self.authorize(request).send().await?).await?;
        Ok(response.json::<Vec<Record>>().await?)
    }

    async fn create(&self, kind: EntityKind, fields: Record) -> StorageResult<String> {
        let request = self
            .client
            .post(self.table_url(kind))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&fields);
        let response = Self::check(self.authorize(request).send().await?).await?;
        let rows: Vec<Record> = response.json().await?;

        rows.first().and_then(record_id).ok_or_else(|| {
            StorageError::InvalidRecord(format!("{kind} insert returned no id"))
        })
    }

    async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> StorageResult<()> {
        let request = self
            .client
            .patch(self.table_url(kind))
            .query(&id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&fields);
        let response = Self::check(self.authorize(request).send().await?).await?;
        let rows: Vec<Record> = response.json().await?;

        if rows.is_empty() {
            return Err(StorageError::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> StorageResult<()> {
        let request = self.client.delete(self.table_url(kind)).query(&id_filter(id));
        Self::check(self.authorize(request).send().await?).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
