//! Local persistent key-value store
//!
//! Fallback used when no hosted backend is configured. Each entity kind is a
//! JSON array stored under its fixed key as `<dir>/<key>.json`.

use std::path::{Path, PathBuf};
use tokio::fs;
use vitrine_types::{Record, async_trait, sync::Mutex};

use crate::helper::{insert_row, merge_row, remove_row};
use crate::traits::{EntityKind, StorageBackend, StorageResult};

#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.storage_key()))
    }

    async fn read(&self, kind: EntityKind) -> StorageResult<Vec<Record>> {
        let path = self.path_for(kind);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write(&self, kind: EntityKind, rows: &[Record]) -> StorageResult<()> {
        let path = self.path_for(kind);
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(rows)?;
        fs::write(&tmp, raw).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStore {
    async fn list(&self, kind: EntityKind) -> StorageResult<Vec<Record>> {
        self.read(kind).await
    }

    async fn create(&self, kind: EntityKind, fields: Record) -> StorageResult<String> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read(kind).await?;
        let id = insert_row(&mut rows, fields)?;
        self.write(kind, &rows).await?;
        tracing::debug!(kind = %kind, id = %id, "Created local record");
        Ok(id)
    }

    async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read(kind).await?;
        merge_row(&mut rows, kind, id, fields)?;
        self.write(kind, &rows).await
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read(kind).await?;
        if remove_row(&mut rows, id) {
            self.write(kind, &rows).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
