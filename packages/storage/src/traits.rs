//! Storage trait definitions

use serde::{Deserialize, Serialize};
use vitrine_types::{Record, async_trait};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{kind} record not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Backend rejected request ({status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Transport(err.to_string())
    }
}

/// Every kind of entity the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Products,
    Categories,
    Users,
    SalesGoals,
    SalesLedger,
    LoginHistory,
    Favorites,
    Credentials,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Products,
        EntityKind::Categories,
        EntityKind::Users,
        EntityKind::SalesGoals,
        EntityKind::SalesLedger,
        EntityKind::LoginHistory,
        EntityKind::Favorites,
        EntityKind::Credentials,
    ];

    /// Table name on the hosted relational store
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Products => "products",
            EntityKind::Categories => "categories",
            EntityKind::Users => "users",
            EntityKind::SalesGoals => "sales_goals",
            EntityKind::SalesLedger => "sales_ledger",
            EntityKind::LoginHistory => "login_history",
            EntityKind::Favorites => "favorites",
            EntityKind::Credentials => "credentials",
        }
    }

    /// Fixed key the local store persists this kind under
    pub fn storage_key(&self) -> String {
        format!("vitrine_{}", self.table())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Create/read/update/delete over a table-like abstraction.
///
/// Concurrent writers are not coordinated; the last write wins.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// All rows of a kind, in insertion order
    async fn list(&self, kind: EntityKind) -> StorageResult<Vec<Record>>;

    /// Insert a row and return its id
    async fn create(&self, kind: EntityKind, fields: Record) -> StorageResult<String>;

    /// Shallow-merge `fields` into the row with the given id
    async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> StorageResult<()>;

    /// Remove the row with the given id. Unknown ids are not an error.
    async fn delete(&self, kind: EntityKind, id: &str) -> StorageResult<()>;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;
}
