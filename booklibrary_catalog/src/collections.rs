use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;

use crate::api::{Book, BookId, DocumentId, UserBookSummary};
use crate::books::document_to_book;
use crate::store::{Collection, DocumentStore, Filter, StoreError, MAX_IN_QUERY_SIZE};

const USER_ID_FIELD: &str = "userId";
const BOOK_ID_FIELD: &str = "bookId";

/// Many-to-many association between users and books, one join record per (user, book) pair.
///
/// Adding does not look for an existing pair, so a double submission leaves two records.
/// Deleting a book does not touch its join records either, stale ones are skipped when listing.
#[derive(Clone)]
pub struct UserCollections {
    store: Arc<dyn DocumentStore>,
}

impl UserCollections {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Adds book to the user's collection, returns id of the join record
    pub async fn add(
        &self,
        user_id: &str,
        book_id: &str,
        rating: Option<f64>,
    ) -> Result<DocumentId, StoreError> {
        let summary = UserBookSummary {
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            date_added_to_reading_list: Utc::now(),
            rating,
        };
        let id = self
            .store
            .create(Collection::UserCollections, serde_json::to_value(&summary)?)
            .await?;
        tracing::info!("Added book {} to collection of user {}", book_id, user_id);
        Ok(id)
    }

    /// Deletes every join record of the pair
    pub async fn remove(&self, user_id: &str, book_id: &str) -> Result<(), StoreError> {
        let matching = self
            .store
            .query(
                Collection::UserCollections,
                &[
                    Filter::equal(USER_ID_FIELD, user_id),
                    Filter::equal(BOOK_ID_FIELD, book_id),
                ],
            )
            .await?;

        let removed = matching.len();
        try_join_all(
            matching
                .iter()
                .map(|document| self.store.delete(Collection::UserCollections, &document.id)),
        )
        .await?;
        tracing::info!(
            "Removed book {} from collection of user {} ({} records)",
            book_id,
            user_id,
            removed
        );
        Ok(())
    }

    pub async fn list_book_ids_for_user(&self, user_id: &str) -> Result<Vec<BookId>, StoreError> {
        let documents = self
            .store
            .query(
                Collection::UserCollections,
                &[Filter::equal(USER_ID_FIELD, user_id)],
            )
            .await?;

        Ok(documents
            .iter()
            .filter_map(|document| document.data.get(BOOK_ID_FIELD)?.as_str())
            .filter(|book_id| !book_id.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Resolves the user's join records and fetches the books in chunks of MAX_IN_QUERY_SIZE.
    /// Chunks are fetched concurrently, the order of the result is not defined.
    pub async fn list_books_for_user(&self, user_id: &str) -> Result<Vec<Book>, StoreError> {
        let mut seen = HashSet::new();
        let book_ids: Vec<BookId> = self
            .list_book_ids_for_user(user_id)
            .await?
            .into_iter()
            .filter(|book_id| seen.insert(book_id.clone()))
            .collect();
        if book_ids.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!(
            "Fetching {} books of user {} in {} chunks",
            book_ids.len(),
            user_id,
            book_ids.len().div_ceil(MAX_IN_QUERY_SIZE)
        );
        let chunks = try_join_all(
            book_ids
                .chunks(MAX_IN_QUERY_SIZE)
                .map(|chunk| self.store.query_by_ids(Collection::Books, chunk)),
        )
        .await?;

        chunks.into_iter().flatten().map(document_to_book).collect()
    }
}

#[cfg(test)]
mod user_collections_tests {
    use serde_json::json;

    use super::*;
    use crate::books::tests_support::book_details;
    use crate::books::BookRepository;
    use crate::store::counting_document_store::CountingDocumentStore;
    use crate::store::InMemoryDocumentStore;

    #[tokio::test]
    /// Empty collection is answered without reading books
    async fn test_empty_collection_does_not_read_books() {
        let store = Arc::new(CountingDocumentStore::default());
        let collections = UserCollections::new(store.clone());

        assert_eq!(collections.list_books_for_user("user1").await.unwrap(), vec![]);
        assert_eq!(store.counts(Collection::Books).reads, 0);
        assert_eq!(store.counts(Collection::UserCollections).reads, 1);
    }

    #[tokio::test]
    /// 23 books are fetched in chunks of 10, 10 and 3
    async fn test_list_books_for_user_crosses_chunk_boundaries() {
        let store = Arc::new(CountingDocumentStore::default());
        let books = BookRepository::new(store.clone());
        let collections = UserCollections::new(store.clone());

        let mut expected = vec![];
        for i in 0..23 {
            let id = books
                .create(book_details(&format!("title{}", i), &[], &[]))
                .await
                .unwrap();
            collections.add("user1", &id, None).await.unwrap();
            expected.push(id);
        }
        // a book in another user's collection only
        let other = books.create(book_details("other", &[], &[])).await.unwrap();
        collections.add("user2", &other, Some(3.0)).await.unwrap();

        let reads_before = store.counts(Collection::Books).reads;
        let listed = collections.list_books_for_user("user1").await.unwrap();
        assert_eq!(store.counts(Collection::Books).reads - reads_before, 3);

        let mut listed_ids: Vec<BookId> = listed.into_iter().map(|book| book.id).collect();
        listed_ids.sort();
        let unique: HashSet<_> = listed_ids.iter().cloned().collect();
        assert_eq!(unique.len(), 23);
        expected.sort();
        assert_eq!(listed_ids, expected);
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let store = Arc::new(InMemoryDocumentStore::default());
        let books = BookRepository::new(store.clone());
        let collections = UserCollections::new(store.clone());

        let kept = books.create(book_details("kept", &[], &[])).await.unwrap();
        let removed = books.create(book_details("removed", &[], &[])).await.unwrap();
        collections.add("user1", &kept, Some(5.0)).await.unwrap();
        collections.add("user1", &removed, None).await.unwrap();
        // double submission
        collections.add("user1", &removed, None).await.unwrap();
        collections.add("user2", &removed, None).await.unwrap();

        let mut ids = collections.list_book_ids_for_user("user1").await.unwrap();
        ids.sort();
        let mut expected = vec![kept.clone(), removed.clone(), removed.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        collections.remove("user1", &removed).await.unwrap();

        let listed = collections.list_books_for_user("user1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept);

        // other users are not affected
        assert_eq!(
            collections.list_book_ids_for_user("user2").await.unwrap(),
            vec![removed.clone()]
        );

        let summaries = store.list_all(Collection::UserCollections).await.unwrap();
        assert_eq!(summaries.len(), 2);
        let kept_summary = summaries
            .into_iter()
            .map(|document| document.decode::<UserBookSummary>().unwrap().fields)
            .find(|summary| summary.user_id == "user1")
            .unwrap();
        assert_eq!(kept_summary.book_id, kept);
        assert_eq!(kept_summary.rating, Some(5.0));

        // removing a pair that does not exist is fine
        collections.remove("user3", &kept).await.unwrap();
    }

    #[tokio::test]
    /// Deleting the book leaves a stale join record that is skipped without failing
    async fn test_deleted_book_leaves_stale_join() {
        let store = Arc::new(InMemoryDocumentStore::default());
        let books = BookRepository::new(store.clone());
        let collections = UserCollections::new(store.clone());

        let id = books.create(book_details("gone", &[], &[])).await.unwrap();
        collections.add("user1", &id, None).await.unwrap();

        books.delete(&id).await.expect("Delete should not fail");

        assert_eq!(
            collections.list_book_ids_for_user("user1").await.unwrap(),
            vec![id.clone()]
        );
        assert!(collections
            .list_books_for_user("user1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_blank_book_ids_are_dropped() {
        let store = Arc::new(InMemoryDocumentStore::default());
        for book_id in [json!(""), json!(null), json!("7")] {
            store
                .create(
                    Collection::UserCollections,
                    json!({"userId": "user1", "bookId": book_id}),
                )
                .await
                .unwrap();
        }
        store
            .create(Collection::UserCollections, json!({"userId": "user1"}))
            .await
            .unwrap();

        let collections = UserCollections::new(store);
        assert_eq!(
            collections.list_book_ids_for_user("user1").await.unwrap(),
            vec!["7".to_string()]
        );
    }
}
