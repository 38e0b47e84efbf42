use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use serde_json::Value;

use crate::api::DocumentId;
use crate::store::{
    Collection, Document, DocumentStore, Filter, StoreError, MAX_IN_QUERY_SIZE,
};

type Documents = HashMap<DocumentId, Value>;

pub struct InMemoryDocumentStore {
    document_sequence_generator: AtomicI32,
    collections: parking_lot::RwLock<HashMap<Collection, Documents>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            document_sequence_generator: Default::default(),
            collections: Default::default(),
        }
    }
}

impl InMemoryDocumentStore {
    fn documents_matching(
        &self,
        collection: Collection,
        predicate: impl Fn(&DocumentId, &Value) -> bool,
    ) -> Vec<Document> {
        self.collections
            .read()
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(id, data)| predicate(id, data))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<DocumentId, StoreError> {
        let id = self
            .document_sequence_generator
            .fetch_add(1, Ordering::Relaxed)
            .to_string();
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        self.collections
            .read()
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        let mut locked_collections = self.collections.write();
        match locked_collections
            .get_mut(&collection)
            .and_then(|documents| documents.get_mut(id))
        {
            Some(document) => {
                json_patch::merge(document, &patch);
                Ok(())
            }
            None => Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            }),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        if let Some(documents) = self.collections.write().get_mut(&collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents_matching(collection, |_, _| true))
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents_matching(collection, |_, data| {
            filters.iter().all(|filter| filter.matches(data))
        }))
    }

    async fn query_by_ids(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<Vec<Document>, StoreError> {
        if ids.len() > MAX_IN_QUERY_SIZE {
            return Err(StoreError::TooManyIds(ids.len()));
        }
        Ok(self.documents_matching(collection, |id, _| ids.contains(id)))
    }
}
