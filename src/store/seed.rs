//! Loading the bundled animal catalogue into a store

use std::path::Path;

use serde_json::Value;

use super::{DocumentStore, Fields, ANIMALS};
use crate::error::{Error, Result};

/// Catalogue shipped with the crate, keyed by slug
pub const BUNDLED_ANIMALS: &str = include_str!("../../data/animals.json");

/// Parse a seed file: a JSON object mapping document id to its fields
pub fn parse_seed(json: &str) -> Result<Vec<(String, Fields)>> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| Error::Backend(format!("Invalid seed data: {}", e)))?;
    let Value::Object(entries) = root else {
        return Err(Error::Backend("Seed data must be a JSON object".to_string()));
    };

    entries
        .into_iter()
        .map(|(id, value)| match value {
            Value::Object(fields) => Ok((id, fields)),
            _ => Err(Error::malformed(&id, "*", "seed entry is not an object")),
        })
        .collect()
}

/// Write every seed entry into the `animals` collection, returning the count
pub async fn seed_animals(store: &dyn DocumentStore, json: &str) -> Result<usize> {
    let entries = parse_seed(json)?;
    let count = entries.len();
    for (id, fields) in entries {
        store.set(ANIMALS, &id, fields).await?;
        tracing::debug!(animal_id = %id, "Seeded animal");
    }
    tracing::info!(count, "Animal catalogue seeded");
    Ok(count)
}

/// Seed from `path` when given, otherwise from the bundled catalogue
pub async fn seed_from(store: &dyn DocumentStore, path: Option<&Path>) -> Result<usize> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                Error::Backend(format!("Failed to read seed file '{}': {}", path.display(), e))
            })?;
            seed_animals(store, &json).await
        }
        None => seed_animals(store, BUNDLED_ANIMALS).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn test_bundled_catalogue_parses() {
        let entries = parse_seed(BUNDLED_ANIMALS).unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().any(|(id, _)| id == "komodo_dragon"));
    }

    #[test]
    fn test_rejects_non_object_entries() {
        assert!(parse_seed(r#"{ "a": 1 }"#).is_err());
        assert!(parse_seed("[]").is_err());
    }

    #[tokio::test]
    async fn test_seed_into_store() {
        let store = InMemoryStore::new();
        let count = seed_animals(&store, BUNDLED_ANIMALS).await.unwrap();
        assert_eq!(count, 5);
        assert_eq!(store.list(ANIMALS).await.unwrap().len(), 5);
    }
}
