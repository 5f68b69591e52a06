//! Whole-document JSON storage
//!
//! Plots and profiles are kept as one JSON document per user and are read and
//! written whole. Concurrent writers for the same key are last-write-wins.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Document key holding a user's plot collection
pub fn plots_key(user_id: Uuid) -> String {
    format!("agrilens_plots:{}", user_id)
}

/// Document key holding a user's profile
pub fn profile_key(user_id: Uuid) -> String {
    format!("agl_user:{}", user_id)
}

#[axum::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, key: &str) -> AppResult<Option<Value>>;

    async fn save(&self, key: &str, body: Value) -> AppResult<()>;
}

/// Load and decode a document; a missing key is `None`
pub async fn load_typed<T, S>(store: &S, key: &str) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    match store.load(key).await? {
        Some(body) => serde_json::from_value(body)
            .map(Some)
            .map_err(|e| AppError::Internal(format!("Corrupt document {}: {}", key, e))),
        None => Ok(None),
    }
}

pub async fn save_typed<T, S>(store: &S, key: &str, value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
    S: DocumentStore + ?Sized,
{
    let body = serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", key, e)))?;
    store.save(key, body).await
}

/// Postgres-backed store over the `documents` table
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl DocumentStore for PgDocumentStore {
    async fn load(&self, key: &str) -> AppResult<Option<Value>> {
        let body = sqlx::query_scalar::<_, Value>("SELECT body FROM documents WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(body)
    }

    async fn save(&self, key: &str, body: Value) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (key, body, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(body)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryDocumentStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Value;
    use tokio::sync::RwLock;

    use super::DocumentStore;
    use crate::error::AppResult;

    /// In-memory store that counts writes
    #[derive(Default)]
    pub struct MemoryDocumentStore {
        docs: RwLock<HashMap<String, Value>>,
        writes: AtomicUsize,
    }

    impl MemoryDocumentStore {
        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[axum::async_trait]
    impl DocumentStore for MemoryDocumentStore {
        async fn load(&self, key: &str) -> AppResult<Option<Value>> {
            Ok(self.docs.read().await.get(key).cloned())
        }

        async fn save(&self, key: &str, body: Value) -> AppResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.docs.write().await.insert(key.to_string(), body);
            Ok(())
        }
    }

    // Repositories borrow a shared store in tests
    #[axum::async_trait]
    impl DocumentStore for std::sync::Arc<MemoryDocumentStore> {
        async fn load(&self, key: &str) -> AppResult<Option<Value>> {
            self.as_ref().load(key).await
        }

        async fn save(&self, key: &str, body: Value) -> AppResult<()> {
            self.as_ref().save(key, body).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_scoped_per_user() {
        let id = Uuid::nil();
        assert_eq!(plots_key(id), "agrilens_plots:00000000-0000-0000-0000-000000000000");
        assert_eq!(profile_key(id), "agl_user:00000000-0000-0000-0000-000000000000");
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let store = MemoryDocumentStore::default();
        assert_eq!(load_typed::<Vec<u32>, _>(&store, "k").await.unwrap(), None);
        save_typed(&store, "k", &vec![1u32, 2, 3]).await.unwrap();
        assert_eq!(load_typed::<Vec<u32>, _>(&store, "k").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.writes(), 1);
    }
}
