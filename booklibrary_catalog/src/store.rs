pub use in_memory_document_store::InMemoryDocumentStore;
pub use postgres_document_store::{PostgresDocumentStore, PostgresDocumentStoreConfig};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_postgres::error::SqlState;

use crate::api::DocumentId;

#[cfg(test)]
pub(crate) mod counting_document_store;
#[cfg(test)]
pub(crate) mod failing_document_store;
mod in_memory_document_store;
mod postgres_document_store;

/// Largest id set accepted by [`DocumentStore::query_by_ids`], callers chunk bigger sets
pub const MAX_IN_QUERY_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Books,
    Authors,
    Genres,
    UserCollections,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Books,
        Collection::Authors,
        Collection::Genres,
        Collection::UserCollections,
    ];

    /// Logical collection name
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Authors => "authors",
            Collection::Genres => "genres",
            Collection::UserCollections => "userCollections",
        }
    }

    /// Table backing the collection in postgres
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Authors => "authors",
            Collection::Genres => "genres",
            Collection::UserCollections => "user_collections",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field value equals the given value
    Equal,
    /// Field is an array containing the given value
    ArrayContains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn equal(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::Equal,
            value: value.into(),
        }
    }

    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Value) -> bool {
        match (self.op, record.get(&self.field)) {
            (FilterOp::Equal, Some(field)) => field == &self.value,
            (FilterOp::ArrayContains, Some(Value::Array(items))) => items.contains(&self.value),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A stored record and the id the store assigned to it
pub struct Document {
    pub id: DocumentId,
    pub data: Value,
}

impl Document {
    pub fn decode<T: DeserializeOwned>(self) -> Result<Record<T>, StoreError> {
        Ok(Record {
            id: self.id,
            fields: serde_json::from_value(self.data)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: DocumentId,
    #[serde(flatten)]
    pub fields: T,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Document {id} not found in {collection}")]
    NotFound {
        collection: Collection,
        id: DocumentId,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query for {0} ids exceeds the limit of {MAX_IN_QUERY_SIZE}")]
    TooManyIds(usize),

    #[error("Failed to deserialize document: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.code() {
            Some(code) if code == &SqlState::INSUFFICIENT_PRIVILEGE => {
                StoreError::PermissionDenied(err.to_string())
            }
            _ => StoreError::StoreUnavailable(err.to_string()),
        }
    }
}

/// Collection-level access to the hosted document store.
/// Implementations never retry, failed calls are reported to the caller as they are.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Adds record to collection, returns an id assigned to it
    async fn create(&self, collection: Collection, record: Value)
        -> Result<DocumentId, StoreError>;
    /// Retrieves single record, fails with NotFound if it does not exist
    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError>;
    /// Merges top level fields of the patch into the record, fails with NotFound if it does not exist
    async fn update(&self, collection: Collection, id: &str, patch: Value)
        -> Result<(), StoreError>;
    /// Deletes the record, deleting a missing record is not an error
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
    async fn list_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;
    /// Lists records matching all of the filters
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError>;
    /// Lists records with one of the ids, at most MAX_IN_QUERY_SIZE ids per call
    async fn query_by_ids(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<Vec<Document>, StoreError>;
}
