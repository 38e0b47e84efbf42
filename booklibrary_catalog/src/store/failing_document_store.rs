use serde_json::Value;

use crate::api::DocumentId;
use crate::store::{Collection, Document, DocumentStore, Filter, InMemoryDocumentStore, StoreError};

/// In memory store refusing to create any record whose `name` equals `failing_name`
pub struct FailingDocumentStore {
    inner: InMemoryDocumentStore,
    failing_name: String,
}

impl FailingDocumentStore {
    pub fn new(failing_name: &str) -> Self {
        Self {
            inner: InMemoryDocumentStore::default(),
            failing_name: failing_name.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<DocumentId, StoreError> {
        if record.get("name").and_then(Value::as_str) == Some(self.failing_name.as_str()) {
            return Err(StoreError::StoreUnavailable(format!(
                "{} is unavailable",
                collection
            )));
        }
        self.inner.create(collection, record).await
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.inner.list_all(collection).await
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query(collection, filters).await
    }

    async fn query_by_ids(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_by_ids(collection, ids).await
    }
}
