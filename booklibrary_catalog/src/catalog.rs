use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;
use serde::Deserialize;

use crate::api::{CatalogEntry, DocumentId};
use crate::store::{Collection, DocumentStore, Filter, StoreError};

const NAME_FIELD: &str = "name";

/// Genres seeded into an empty `genres` collection
pub const DEFAULT_GENRES: &[&str] = &[
    "Biography",
    "Children's",
    "Fantasy",
    "Fiction",
    "Graphic Novel",
    "Historical Fiction",
    "History",
    "Horror",
    "Memoir",
    "Mystery",
    "Non-Fiction",
    "Philosophy",
    "Poetry",
    "Romance",
    "Science",
    "Science Fiction",
    "Self-Help",
    "Thriller",
    "Travel",
    "Young Adult",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Authors,
    Genres,
}

impl CatalogKind {
    pub fn collection(&self) -> Collection {
        match self {
            CatalogKind::Authors => Collection::Authors,
            CatalogKind::Genres => Collection::Genres,
        }
    }

    /// Entries seeded the first time an empty catalog is listed
    pub fn default_entries(&self) -> &'static [&'static str] {
        match self {
            CatalogKind::Authors => &[],
            CatalogKind::Genres => DEFAULT_GENRES,
        }
    }
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

/// Known author or genre names, independent of the books referencing them.
///
/// Upserts are check-then-create without a transaction. Two concurrent calls with the
/// same new name can both miss and both create, leaving duplicate entries behind.
/// Duplicates are tolerated everywhere: lookups take the first match and listings keep them.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    kind: CatalogKind,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>, kind: CatalogKind) -> Self {
        Self { store, kind }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    /// Returns id of the entry with exactly this (trimmed) name, creating it when missing.
    /// Blank names are skipped and give None.
    pub async fn ensure_entity(&self, name: &str) -> Result<Option<DocumentId>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let collection = self.kind.collection();

        let existing = self
            .store
            .query(collection, &[Filter::equal(NAME_FIELD, name)])
            .await?;
        if let Some(document) = existing.into_iter().next() {
            tracing::debug!("{} entry {} already exists as {}", collection, name, document.id);
            return Ok(Some(document.id));
        }

        let entry = CatalogEntry {
            name: name.to_string(),
            date_added: Utc::now(),
        };
        let id = self
            .store
            .create(collection, serde_json::to_value(&entry)?)
            .await?;
        tracing::info!("Added {} entry {} with id {}", collection, name, id);
        Ok(Some(id))
    }

    /// Upserts all names concurrently. The first failure fails the whole batch,
    /// entries created before it are kept.
    pub async fn ensure_entities<S: AsRef<str>>(&self, names: &[S]) -> Result<(), StoreError> {
        try_join_all(names.iter().map(|name| self.ensure_entity(name.as_ref()))).await?;
        Ok(())
    }

    /// All names in ascending order, duplicates included
    pub async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let collection = self.kind.collection();
        let mut documents = self.store.list_all(collection).await?;

        let defaults = self.kind.default_entries();
        if documents.is_empty() && !defaults.is_empty() {
            tracing::info!("Seeding {} with {} default entries", collection, defaults.len());
            self.ensure_entities(defaults).await?;
            documents = self.store.list_all(collection).await?;
        }

        let mut names = documents
            .into_iter()
            .map(|document| Ok(document.decode::<Named>()?.fields.name))
            .collect::<Result<Vec<String>, StoreError>>()?;
        names.sort();
        Ok(names)
    }
}
