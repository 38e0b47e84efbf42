use anyhow::{bail, Context};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    AddToCollectionRequest, Book, BookDetails, BookDetailsPatch, BookId, GetAllBooksResponse,
    NamesResponse,
};

pub struct LibraryCatalogClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LibraryCatalogClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/book endpoint
    /// Returns book_id of added book taken from the location header
    pub async fn add_book(&self, book_details: BookDetails) -> anyhow::Result<BookId> {
        let response = self
            .client
            .post(format!("{}/api/book", self.url))
            .json(&book_details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add book {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        Ok(location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/book/")
            .context("Invalid location header")?
            .to_string())
    }

    /// Calls GET /api/book/{book_id} endpoint
    /// Returns None if book is not in the library
    pub async fn get_book(&self, book_id: &str) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/api/book/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get book {}", response.status())
        }
    }

    /// Calls PATCH /api/book/{book_id} endpoint
    /// Returns false if book is not in the library
    pub async fn update_book(&self, book_id: &str, patch: BookDetailsPatch) -> anyhow::Result<bool> {
        let response = self
            .client
            .patch(format!("{}/api/book/{}", self.url, book_id))
            .json(&patch)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to update book {}", response.status())
        }
    }

    /// Calls DELETE /api/book/{book_id} endpoint
    pub async fn delete_book(&self, book_id: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/book/{}", self.url, book_id))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to delete book {}", response.status())
        }
        Ok(())
    }

    /// Calls GET /api/books endpoint
    pub async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        self.get_books(&format!("{}/api/books", self.url)).await
    }

    /// Calls GET /api/books/search endpoint
    pub async fn search_books(&self, query: &str) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/api/books/search", self.url))
            .query(&[("q", query)])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json::<GetAllBooksResponse>().await?.books)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to search books {}", error)
        }
    }

    /// Calls GET /api/authors endpoint
    pub async fn list_author_names(&self) -> anyhow::Result<Vec<String>> {
        self.get_names(&format!("{}/api/authors", self.url)).await
    }

    /// Calls GET /api/genres endpoint
    pub async fn list_genre_names(&self) -> anyhow::Result<Vec<String>> {
        self.get_names(&format!("{}/api/genres", self.url)).await
    }

    /// Calls POST /api/user/{user_id}/book/{book_id} endpoint
    pub async fn add_to_collection(
        &self,
        user_id: &str,
        book_id: &str,
        rating: Option<f64>,
    ) -> anyhow::Result<()> {
        let response = self
            .client
            .post(format!("{}/api/user/{}/book/{}", self.url, user_id, book_id))
            .json(&AddToCollectionRequest { rating })
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to add book to collection {}", response.status())
        }
        Ok(())
    }

    /// Calls DELETE /api/user/{user_id}/book/{book_id} endpoint
    pub async fn remove_from_collection(&self, user_id: &str, book_id: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/user/{}/book/{}", self.url, user_id, book_id))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to remove book from collection {}", response.status())
        }
        Ok(())
    }

    /// Calls GET /api/user/{user_id}/books endpoint
    pub async fn list_user_books(&self, user_id: &str) -> anyhow::Result<Vec<Book>> {
        self.get_books(&format!("{}/api/user/{}/books", self.url, user_id))
            .await
    }

    async fn get_books(&self, url: &str) -> anyhow::Result<Vec<Book>> {
        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.json::<GetAllBooksResponse>().await?.books)
        } else {
            bail!("Failed to list books {}", response.status())
        }
    }

    async fn get_names(&self, url: &str) -> anyhow::Result<Vec<String>> {
        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.json::<NamesResponse>().await?.names)
        } else {
            bail!("Failed to list names {}", response.status())
        }
    }
}
