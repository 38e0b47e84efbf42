use std::sync::Arc;

use crate::api::{Book, BookDetails, BookDetailsPatch, BookId};
use crate::catalog::{Catalog, CatalogKind};
use crate::error::LibraryError;
use crate::store::{Collection, Document, DocumentStore, StoreError};

/// Returns list of problems that prevent the book from being saved, empty when valid
pub fn validate_book_details(details: &BookDetails) -> Vec<String> {
    let mut errors = vec![];
    if details.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }
    errors
}

pub(crate) fn document_to_book(document: Document) -> Result<Book, StoreError> {
    let record = document.decode::<BookDetails>()?;
    Ok(Book {
        id: record.id,
        details: record.fields,
    })
}

/// Books with author and genre names embedded, the names are registered in the catalogs on create
#[derive(Clone)]
pub struct BookRepository {
    store: Arc<dyn DocumentStore>,
    authors: Catalog,
    genres: Catalog,
}

impl BookRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            authors: Catalog::new(store.clone(), CatalogKind::Authors),
            genres: Catalog::new(store.clone(), CatalogKind::Genres),
            store,
        }
    }

    /// Adds book to the store, returns an id assigned to the book.
    /// All authors and genres of the book exist in the catalogs before the book is written.
    pub async fn create(&self, details: BookDetails) -> Result<BookId, LibraryError> {
        tokio::try_join!(
            self.authors.ensure_entities(&details.authors),
            self.genres.ensure_entities(&details.genres),
        )?;

        let record = serde_json::to_value(&details).map_err(StoreError::from)?;
        let book_id = self.store.create(Collection::Books, record).await?;
        tracing::info!("Added book {} with id {}", details.title, book_id);
        Ok(book_id)
    }

    pub async fn get(&self, book_id: &str) -> Result<Book, LibraryError> {
        let data = self.store.get(Collection::Books, book_id).await?;
        Ok(Book {
            id: book_id.to_string(),
            details: serde_json::from_value(data).map_err(StoreError::from)?,
        })
    }

    /// Merges supplied fields into the book.
    /// New author or genre names are not registered in the catalogs here.
    pub async fn update(&self, book_id: &str, patch: BookDetailsPatch) -> Result<(), LibraryError> {
        let patch = serde_json::to_value(&patch).map_err(StoreError::from)?;
        self.store.update(Collection::Books, book_id, patch).await?;
        tracing::info!("Updated book {}", book_id);
        Ok(())
    }

    /// Removes the book record only, collection entries pointing at it are left in place
    pub async fn delete(&self, book_id: &str) -> Result<(), LibraryError> {
        self.store.delete(Collection::Books, book_id).await?;
        tracing::info!("Deleted book {}", book_id);
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Book>, LibraryError> {
        let documents = self.store.list_all(Collection::Books).await?;
        Ok(documents
            .into_iter()
            .map(document_to_book)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Case insensitive substring search over titles and author names
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, LibraryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LibraryError::ValidationError(
                "Missing query parameter: q".to_string(),
            ));
        }
        let normalized = query.to_lowercase();

        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|book| {
                book.details.title.to_lowercase().contains(&normalized)
                    || book
                        .details
                        .authors
                        .iter()
                        .any(|author| author.to_lowercase().contains(&normalized))
            })
            .collect())
    }
}


#[cfg(test)]
mod book_repository_tests {
    use super::tests_support::book_details;
    use super::*;
    use crate::store::failing_document_store::FailingDocumentStore;
    use crate::store::InMemoryDocumentStore;

    fn repository() -> (Arc<InMemoryDocumentStore>, BookRepository) {
        let store = Arc::new(InMemoryDocumentStore::default());
        (store.clone(), BookRepository::new(store))
    }

    #[tokio::test]
    /// Book created on an empty store registers its author and genre
    async fn test_create_book_registers_authors_and_genres() {
        let (store, books) = repository();
        let authors = Catalog::new(store.clone(), CatalogKind::Authors);
        let genres = Catalog::new(store.clone(), CatalogKind::Genres);

        let details = book_details(
            "Notes on the Analytical Engine",
            &["Ada Lovelace"],
            &["Biography"],
        );
        let id = books.create(details.clone()).await.expect("Failed to add book");

        assert_eq!(authors.list_names().await.unwrap(), vec!["Ada Lovelace"]);
        assert!(genres
            .list_names()
            .await
            .unwrap()
            .contains(&"Biography".to_string()));

        let book = books.get(&id).await.expect("Failed to get book");
        assert_eq!(book.id, id);
        assert_eq!(book.details.authors, vec!["Ada Lovelace"]);
        assert_eq!(book.details.genres, vec!["Biography"]);
        assert_eq!(book.details, details);
    }

    #[tokio::test]
    async fn test_create_book_reuses_existing_catalog_entries() {
        let (store, books) = repository();

        books
            .create(book_details("title1", &["Ada Lovelace", "Charles Babbage"], &[]))
            .await
            .unwrap();
        books
            .create(book_details("title2", &["Ada Lovelace", " "], &["History"]))
            .await
            .unwrap();

        assert_eq!(store.list_all(Collection::Authors).await.unwrap().len(), 2);
        // the genre catalog was not empty so it is never seeded
        assert_eq!(
            Catalog::new(store.clone(), CatalogKind::Genres)
                .list_names()
                .await
                .unwrap(),
            vec!["History"]
        );
    }

    #[tokio::test]
    async fn test_get_missing_book() {
        let (_, books) = repository();
        let result = books.get("20000").await;
        assert!(matches!(result, Err(ref err) if err.is_not_found()));
    }

    #[tokio::test]
    /// Tests if update merges only supplied fields and skips the catalogs
    async fn test_update_book_patch() {
        let (store, books) = repository();
        let update_missing = books
            .update("20000", BookDetailsPatch::default())
            .await;
        assert!(matches!(update_missing, Err(ref err) if err.is_not_found()));

        let details = book_details("xx", &["sss"], &["Poetry"]);
        let id = books.create(details.clone()).await.unwrap();

        books
            .update(
                &id,
                BookDetailsPatch {
                    title: Some("patchedTitle".to_string()),
                    ..BookDetailsPatch::default()
                },
            )
            .await
            .expect("Failed to patch");
        assert_eq!(
            books.get(&id).await.unwrap().details,
            BookDetails {
                title: "patchedTitle".to_string(),
                ..details.clone()
            }
        );

        books
            .update(
                &id,
                BookDetailsPatch {
                    authors: Some(vec!["New Author".to_string()]),
                    isbn10: Some("0140449132".to_string()),
                    rating: Some(4.5),
                    page_count: Some(320),
                    ..BookDetailsPatch::default()
                },
            )
            .await
            .expect("Failed to patch");
        let patched = books.get(&id).await.unwrap().details;
        assert_eq!(patched.title, "patchedTitle");
        assert_eq!(patched.authors, vec!["New Author"]);
        assert_eq!(patched.isbn10.as_deref(), Some("0140449132"));
        assert_eq!(patched.rating, Some(4.5));
        assert_eq!(patched.page_count, 320);

        // edits do not register names
        assert_eq!(
            Catalog::new(store, CatalogKind::Authors)
                .list_names()
                .await
                .unwrap(),
            vec!["sss"]
        );
    }

    #[tokio::test]
    async fn test_delete_and_list_books() {
        let (_, books) = repository();
        assert_eq!(books.list_all().await.unwrap(), vec![]);

        let id_1 = books.create(book_details("title1", &[], &[])).await.unwrap();
        let id_2 = books.create(book_details("title2", &[], &[])).await.unwrap();

        let mut listed: Vec<_> = books
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|book| (book.id, book.details.title))
            .collect();
        listed.sort();
        assert_eq!(
            listed,
            vec![
                (id_1.clone(), "title1".to_string()),
                (id_2.clone(), "title2".to_string())
            ]
        );

        books.delete(&id_1).await.unwrap();
        let listed = books.list_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id_2);
        // deleting again is not an error
        books.delete(&id_1).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_books() {
        let (_, books) = repository();
        books
            .create(book_details("Good Omens", &["Terry Pratchett", "Neil Gaiman"], &[]))
            .await
            .unwrap();
        books
            .create(book_details("Mort", &["Terry Pratchett"], &[]))
            .await
            .unwrap();
        books
            .create(book_details("Beloved", &["Toni Morrison"], &[]))
            .await
            .unwrap();

        let titles = |found: Vec<Book>| {
            let mut titles: Vec<String> = found.into_iter().map(|b| b.details.title).collect();
            titles.sort();
            titles
        };

        assert_eq!(
            titles(books.search("pratchett").await.unwrap()),
            vec!["Good Omens", "Mort"]
        );
        assert_eq!(titles(books.search("  OMENS ").await.unwrap()), vec!["Good Omens"]);
        assert_eq!(titles(books.search("gaiman").await.unwrap()), vec!["Good Omens"]);
        assert!(books.search("dickens").await.unwrap().is_empty());
        assert!(matches!(
            books.search("   ").await,
            Err(LibraryError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_book_details() {
        assert!(validate_book_details(&book_details("A title", &[], &[])).is_empty());
        assert_eq!(
            validate_book_details(&book_details("  ", &[], &[])),
            vec!["Title is required".to_string()]
        );
    }

    #[tokio::test]
    /// Store errors of the catalog upsert surface untranslated and no book is written
    async fn test_create_fails_when_catalog_upsert_fails() {
        let store = Arc::new(FailingDocumentStore::new("Bad"));
        let books = BookRepository::new(store.clone());

        let result = books
            .create(book_details("Notes", &["Ada Lovelace", "Bad"], &["Biography"]))
            .await;
        assert!(matches!(
            result,
            Err(LibraryError::Store(StoreError::StoreUnavailable(_)))
        ));

        assert!(store.list_all(Collection::Books).await.unwrap().is_empty());
        let authors = Catalog::new(store.clone(), CatalogKind::Authors);
        assert_eq!(authors.list_names().await.unwrap(), vec!["Ada Lovelace"]);
    }
}
