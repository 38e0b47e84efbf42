use std::collections::HashMap;

use serde_json::Value;

use crate::api::DocumentId;
use crate::store::{Collection, Document, DocumentStore, Filter, InMemoryDocumentStore, StoreError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub reads: usize,
    pub writes: usize,
}

/// In memory store recording how many reads and writes hit every collection
#[derive(Default)]
pub struct CountingDocumentStore {
    inner: InMemoryDocumentStore,
    counts: parking_lot::Mutex<HashMap<Collection, CallCounts>>,
}

impl CountingDocumentStore {
    pub fn counts(&self, collection: Collection) -> CallCounts {
        self.counts
            .lock()
            .get(&collection)
            .copied()
            .unwrap_or_default()
    }

    fn read(&self, collection: Collection) {
        self.counts.lock().entry(collection).or_default().reads += 1;
    }

    fn write(&self, collection: Collection) {
        self.counts.lock().entry(collection).or_default().writes += 1;
    }
}

#[async_trait::async_trait]
impl DocumentStore for CountingDocumentStore {
    async fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<DocumentId, StoreError> {
        self.write(collection);
        self.inner.create(collection, record).await
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        self.read(collection);
        self.inner.get(collection, id).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        self.write(collection);
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.write(collection);
        self.inner.delete(collection, id).await
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.read(collection);
        self.inner.list_all(collection).await
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        self.read(collection);
        self.inner.query(collection, filters).await
    }

    async fn query_by_ids(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<Vec<Document>, StoreError> {
        self.read(collection);
        self.inner.query_by_ids(collection, ids).await
    }
}
