//! Document store collaborator
//!
//! The hosted database is modelled as named collections of JSON field maps
//! keyed by opaque ids. [`DocumentStore`] is the seam; [`InMemoryStore`] is
//! the bundled implementation used by the binary and by tests.

mod memory;
pub mod seed;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

pub use memory::InMemoryStore;

pub type Fields = serde_json::Map<String, Value>;

pub const ANIMALS: &str = "animals";
pub const USERS: &str = "users";

/// A stored document: its id plus the raw field map
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    fn present(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn wrong_type(&self, field: &str, expected: &str, found: &Value) -> Error {
        Error::malformed(&self.id, field, format!("expected {}, found {}", expected, type_name(found)))
    }

    pub fn get_str(&self, field: &str) -> Result<Option<&str>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.wrong_type(field, "string", other)),
        }
    }

    /// String field, empty when absent
    pub fn string_or_default(&self, field: &str) -> Result<String> {
        Ok(self.get_str(field)?.unwrap_or_default().to_string())
    }

    pub fn get_i64(&self, field: &str) -> Result<Option<i64>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| Error::malformed(&self.id, field, format!("expected integer, found {}", n))),
            Some(other) => Err(self.wrong_type(field, "integer", other)),
        }
    }

    pub fn get_f64(&self, field: &str) -> Result<Option<f64>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(self.wrong_type(field, "number", other)),
        }
    }

    pub fn get_bool(&self, field: &str) -> Result<Option<bool>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(field, "boolean", other)),
        }
    }

    pub fn get_string_list(&self, field: &str) -> Result<Vec<String>> {
        match self.present(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.wrong_type(field, "array of strings", other)),
                })
                .collect(),
            Some(other) => Err(self.wrong_type(field, "array", other)),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read/write access to a hosted document collection store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// Documents whose `field` equals `value`
    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>>;

    /// Replace the whole document, creating it when absent
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Merge `fields` into an existing document
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Atomically add `value` to the array `field` if not already present
    async fn array_union(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<()>;

    /// Atomically remove every occurrence of `value` from the array `field`
    async fn array_remove(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<()>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
