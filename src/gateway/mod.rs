//! Typed access to the `animals` and `users` collections
//!
//! Single-record reads are strict: a missing document or a field of the
//! wrong type is an error. List reads are lenient: a record that fails to
//! decode is dropped and logged, and the rest is returned.

mod animals;
mod users;

pub use animals::AnimalGateway;
pub use users::UserGateway;

use crate::error::{Error, Result};
use crate::store::Document;

/// Records decoded from a list read plus the ids that were dropped
#[derive(Debug)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub dropped: Vec<(String, Error)>,
}

impl<T> Listing<T> {
    pub fn decode(collection: &str, documents: Vec<Document>, decode: impl Fn(&Document) -> Result<T>) -> Self {
        let mut records = Vec::with_capacity(documents.len());
        let mut dropped = Vec::new();

        for document in documents {
            match decode(&document) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(collection, id = %document.id, error = %e, "Dropping undecodable document");
                    dropped.push((document.id, e));
                }
            }
        }

        Self { records, dropped }
    }
}
