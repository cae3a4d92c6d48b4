use serde::de::{self, DeserializeOwned, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use vitrine_storage::{EntityKind, StorageBackend, StorageError, StorageResult};
use vitrine_types::{Record, Value};

/// A persisted domain type, bound to the entity kind it is stored under.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> Option<&str>;
}

/// Typed view over one entity kind of a storage backend.
pub struct Collection<T> {
    backend: Arc<dyn StorageBackend>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// Rows that do not deserialize are skipped with a warning.
    pub async fn list(&self) -> StorageResult<Vec<T>> {
        let rows = self.backend.list(T::KIND).await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<T>(Value::Object(row)) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(kind = %T::KIND, error = %e, "Skipping malformed record");
                }
            }
        }
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|item| item.id() == Some(id)))
    }

    pub async fn create(&self, item: &T) -> StorageResult<String> {
        self.backend.create(T::KIND, to_record(item)?).await
    }

    pub async fn update(&self, id: &str, item: &T) -> StorageResult<()> {
        let mut fields = to_record(item)?;
        fields.remove("id");
        fields.remove("created_at");
        self.backend.update(T::KIND, id, fields).await
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.backend.delete(T::KIND, id).await
    }
}

fn to_record<T: Serialize>(item: &T) -> StorageResult<Record> {
    match serde_json::to_value(item)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StorageError::InvalidRecord(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Hosted tables may use numeric keys; ids are always handled as strings here.
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    match opt {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Err(de::Error::invalid_type(Unexpected::Bool(b), &"string or number id")),
        Some(other) => Err(de::Error::custom(format!(
            "invalid type for id: expected string or number, got {other}"
        ))),
    }
}

pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use serde_json::json;
    use vitrine_storage::InMemoryStore;

    #[tokio::test]
    async fn typed_round_trip_through_backend() {
        let store = Arc::new(InMemoryStore::new());
        let categories: Collection<Category> = Collection::new(store.clone());

        let id = categories
            .create(&Category {
                id: None,
                name: "Laticínios".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let loaded = categories.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Laticínios");
        assert_eq!(loaded.id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn update_clears_optional_fields() {
        let store = Arc::new(InMemoryStore::new());
        let categories: Collection<Category> = Collection::new(store.clone());

        let id = categories
            .create(&Category {
                id: None,
                name: "Bebidas".to_string(),
                description: Some("Sucos e refrigerantes".to_string()),
            })
            .await
            .unwrap();

        categories
            .update(
                &id,
                &Category {
                    id: None,
                    name: "Bebidas".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let loaded = categories.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.description, None);
        assert_eq!(store.list(EntityKind::Categories).await.unwrap()[0]["description"], Value::Null);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            EntityKind::Categories,
            vec![
                json!({"id": 7, "name": "Numeric id"}).as_object().cloned().unwrap(),
                json!({"id": "x", "name": 12}).as_object().cloned().unwrap(),
            ],
        );

        let categories: Collection<Category> = Collection::new(store);
        let items = categories.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some("7"));
    }
}
