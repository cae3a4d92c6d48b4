//! In-memory storage backend
//!
//! Used by tests and throwaway instances. Same semantics as the local store,
//! nothing survives the process.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use vitrine_types::{Record, async_trait};

use crate::helper::{insert_row, merge_row, remove_row};
use crate::traits::{EntityKind, StorageBackend, StorageResult};

pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<EntityKind, Vec<Record>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Preload rows for a kind, replacing whatever was there
    pub fn seed(&self, kind: EntityKind, rows: Vec<Record>) {
        self.tables.write().insert(kind, rows);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStore {
    async fn list(&self, kind: EntityKind) -> StorageResult<Vec<Record>> {
        let tables = self.tables.read();
        Ok(tables.get(&kind).cloned().unwrap_or_default())
    }

    async fn create(&self, kind: EntityKind, fields: Record) -> StorageResult<String> {
        let mut tables = self.tables.write();
        insert_row(tables.entry(kind).or_default(), fields)
    }

    async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> StorageResult<()> {
        let mut tables = self.tables.write();
        merge_row(tables.entry(kind).or_default(), kind, id, fields)
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if let Some(rows) = tables.get_mut(&kind) {
            remove_row(rows, id);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
