use std::sync::Arc;

use crate::books::BookRepository;
use crate::catalog::{Catalog, CatalogKind};
use crate::collections::UserCollections;
use crate::store::{
    DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, PostgresDocumentStoreConfig,
};

#[derive(Debug, Clone)]
pub enum StoreConfig {
    InMemory,
    Postgres(PostgresDocumentStoreConfig),
}

/// Process wide handle to the document store.
/// Built once at startup, every repository handed out by it shares the same session.
#[derive(Clone)]
pub struct LibraryContext {
    store: Arc<dyn DocumentStore>,
}

impl LibraryContext {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn connect(config: StoreConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match config {
            StoreConfig::InMemory => {
                tracing::info!("Using in memory document store");
                Arc::new(InMemoryDocumentStore::default())
            }
            StoreConfig::Postgres(config) => Arc::new(PostgresDocumentStore::init(config).await?),
        };
        Ok(Self::new(store))
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.store.clone())
    }

    pub fn authors(&self) -> Catalog {
        Catalog::new(self.store.clone(), CatalogKind::Authors)
    }

    pub fn genres(&self) -> Catalog {
        Catalog::new(self.store.clone(), CatalogKind::Genres)
    }

    pub fn user_collections(&self) -> UserCollections {
        UserCollections::new(self.store.clone())
    }
}
