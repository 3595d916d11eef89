//! In-process document store with fault injection

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Document, DocumentStore, Fields};
use crate::error::{Error, Result};

type Collection = BTreeMap<String, Fields>;

/// Document store kept in memory
///
/// Every operation first consults the injected faults (`set_offline`,
/// `fail_next`) and the artificial latency, so callers can exercise their
/// failure paths without a network.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    offline: AtomicBool,
    pending_failures: Mutex<VecDeque<String>>,
    latency: Mutex<Option<Duration>>,
    operations: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every following operation fails until switched back on
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The next operation fails with `message`; calls queue up
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut failures) = self.pending_failures.lock() {
            failures.push_back(message.into());
        }
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.latency.lock() {
            *slot = latency;
        }
    }

    /// Number of operations attempted so far, failed ones included
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Insert raw fields directly, bypassing faults
    pub async fn insert_raw(&self, collection: &str, id: &str, fields: Fields) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    async fn enter(&self, operation: &'static str, collection: &str, id: &str) -> Result<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency.lock().ok().and_then(|slot| *slot);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            tracing::debug!(operation, collection, id, "Store offline, rejecting");
            return Err(Error::Backend("Network unavailable".to_string()));
        }

        let injected = self
            .pending_failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.pop_front());
        if let Some(message) = injected {
            tracing::debug!(operation, collection, id, %message, "Injected store failure");
            return Err(Error::Backend(message));
        }

        Ok(())
    }
}

fn string_array(fields: &mut Fields, field: &str) -> Result<Vec<Value>> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => {
            // put it back untouched so a failed op leaves the document as it was
            fields.insert(field.to_string(), other);
            Err(Error::Backend(format!("Field '{}' is not an array", field)))
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.enter("get", collection, id).await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.enter("list", collection, "*").await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>> {
        self.enter("query", collection, field).await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.enter("set", collection, id).await?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.enter("update", collection, id).await?;
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::not_found(collection, id))?;
        for (key, value) in fields {
            document.insert(key, value);
        }
        Ok(())
    }

    async fn array_union(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<()> {
        self.enter("array_union", collection, id).await?;
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::not_found(collection, id))?;
        let mut items = string_array(document, field)?;
        if !items.contains(&value) {
            items.push(value);
        }
        document.insert(field.to_string(), Value::Array(items));
        Ok(())
    }

    async fn array_remove(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<()> {
        self.enter("array_remove", collection, id).await?;
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::not_found(collection, id))?;
        let mut items = string_array(document, field)?;
        items.retain(|item| item != &value);
        document.insert(field.to_string(), Value::Array(items));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.enter("delete", collection, id).await?;
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    #[tokio::test]
    async fn test_set_get_update() {
        let store = InMemoryStore::new();
        store
            .set("users", "u1", fields(json!({ "username": "budi", "total_xp": 10 })))
            .await
            .unwrap();
        store
            .update("users", "u1", fields(json!({ "total_xp": 25 })))
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.fields["username"], json!("budi"));
        assert_eq!(doc.fields["total_xp"], json!(25));
        assert!(store.get("users", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.update("users", "ghost", Fields::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_array_union_and_remove() {
        let store = InMemoryStore::new();
        store.set("users", "u1", Fields::new()).await.unwrap();

        store.array_union("users", "u1", "favs", json!("a")).await.unwrap();
        store.array_union("users", "u1", "favs", json!("b")).await.unwrap();
        store.array_union("users", "u1", "favs", json!("a")).await.unwrap();
        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.fields["favs"], json!(["a", "b"]));

        store.array_remove("users", "u1", "favs", json!("a")).await.unwrap();
        store.array_remove("users", "u1", "favs", json!("zzz")).await.unwrap();
        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.fields["favs"], json!(["b"]));
    }

    #[tokio::test]
    async fn test_query_eq_filters() {
        let store = InMemoryStore::new();
        store.insert_raw("animals", "a", fields(json!({ "category": "mammal" }))).await;
        store.insert_raw("animals", "b", fields(json!({ "category": "bird" }))).await;
        store.insert_raw("animals", "c", fields(json!({ "category": "mammal" }))).await;

        let mammals = store.query_eq("animals", "category", &json!("mammal")).await.unwrap();
        let ids: Vec<_> = mammals.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = InMemoryStore::new();
        store.fail_next("boom");
        assert_eq!(store.list("animals").await, Err(Error::Backend("boom".into())));
        assert!(store.list("animals").await.is_ok());

        store.set_offline(true);
        assert!(store.get("animals", "a").await.is_err());
        store.set_offline(false);
        assert!(store.get("animals", "a").await.is_ok());
        assert_eq!(store.operation_count(), 4);
    }
}
