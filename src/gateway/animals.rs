//! Animal catalogue reads

use std::sync::Arc;

use serde_json::Value;

use super::Listing;
use crate::error::{Error, Result};
use crate::model::Animal;
use crate::store::{ANIMALS, DocumentStore};

#[derive(Clone)]
pub struct AnimalGateway {
    store: Arc<dyn DocumentStore>,
}

impl AnimalGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn fetch_by_id(&self, animal_id: &str) -> Result<Animal> {
        tracing::debug!(animal_id, "Fetching animal");
        let document = self
            .store
            .get(ANIMALS, animal_id)
            .await
            .inspect_err(|e| tracing::error!(animal_id, error = %e, "Animal fetch failed"))?
            .ok_or_else(|| Error::not_found(ANIMALS, animal_id))?;

        let animal = Animal::from_document(&document)?;
        tracing::debug!(animal_id, name = %animal.name, "Animal loaded");
        Ok(animal)
    }

    pub async fn fetch_all(&self) -> Result<Vec<Animal>> {
        Ok(self.fetch_all_report().await?.records)
    }

    /// Like [`fetch_all`](Self::fetch_all) but also reports dropped records
    pub async fn fetch_all_report(&self) -> Result<Listing<Animal>> {
        let documents = self
            .store
            .list(ANIMALS)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Listing animals failed"))?;

        let listing = Listing::decode(ANIMALS, documents, Animal::from_document);
        tracing::info!(
            count = listing.records.len(),
            dropped = listing.dropped.len(),
            "Animals listed"
        );
        Ok(listing)
    }

    pub async fn fetch_by_category(&self, category: &str) -> Result<Vec<Animal>> {
        let documents = self
            .store
            .query_eq(ANIMALS, "category", &Value::String(category.to_string()))
            .await
            .inspect_err(|e| tracing::error!(category, error = %e, "Category query failed"))?;

        Ok(Listing::decode(ANIMALS, documents, Animal::from_document).records)
    }
}
