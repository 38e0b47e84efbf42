use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::OpenLibrarySearchResult;
use crate::error::LookupError;

pub const DEFAULT_OPEN_LIBRARY_URL: &str = "https://openlibrary.org";
const COVERS_URL: &str = "https://covers.openlibrary.org/b/isbn";
const SEARCH_LIMIT: usize = 10;
const EDITIONS_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i32>,
    #[serde(default)]
    isbn: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EditionPayload {
    #[serde(default)]
    isbn_10: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EditionsPayload {
    #[serde(default)]
    entries: Vec<EditionPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenLibraryKey {
    /// A single edition, /books/...
    Edition(String),
    /// A work grouping many editions, /works/...
    Work(String),
}

impl OpenLibraryKey {
    pub fn parse(key: &str) -> Result<Self, LookupError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LookupError::MissingParameter("key"));
        }
        let key = if key.starts_with('/') {
            key.to_string()
        } else {
            format!("/{}", key)
        };

        if key.starts_with("/books/") {
            Ok(OpenLibraryKey::Edition(key))
        } else if key.starts_with("/works/") {
            Ok(OpenLibraryKey::Work(key))
        } else {
            Err(LookupError::UnsupportedKey(key))
        }
    }
}

fn cover_url(isbn10: &str) -> String {
    format!("{}/{}-S.jpg", COVERS_URL, isbn10)
}

impl From<SearchDoc> for OpenLibrarySearchResult {
    fn from(doc: SearchDoc) -> Self {
        let isbn10 = doc.isbn.into_iter().find(|isbn| isbn.len() == 10);
        OpenLibrarySearchResult {
            cover_url: isbn10.as_deref().map(cover_url),
            key: doc.key,
            title: doc.title,
            authors: doc.author_name,
            first_publish_year: doc.first_publish_year,
            isbn10,
        }
    }
}

fn search_results(payload: SearchPayload) -> Vec<OpenLibrarySearchResult> {
    payload.docs.into_iter().map(Into::into).collect()
}

fn first_edition_isbn10(editions: EditionsPayload) -> Option<String> {
    editions
        .entries
        .into_iter()
        .find_map(|entry| entry.isbn_10.into_iter().next())
}

/// Proxy to the public Open Library catalog
pub struct OpenLibraryClient {
    base_url: String,
    client: ClientWithMiddleware,
}

impl OpenLibraryClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: crate::traced_client()?,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::UpstreamProxyError(format!(
                "Open Library request failed: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| LookupError::MalformedPayload(err.to_string()))
    }

    /// Searches the catalog by free text, at most 10 candidates are returned
    pub async fn search(&self, query: &str) -> Result<Vec<OpenLibrarySearchResult>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::MissingParameter("q"));
        }
        tracing::debug!("Searching Open Library for {}", query);

        let payload: SearchPayload = self
            .fetch_json(
                "/search.json",
                &[("q", query.to_string()), ("limit", SEARCH_LIMIT.to_string())],
            )
            .await?;
        Ok(search_results(payload))
    }

    /// Resolves ISBN-10 of an edition or of the first edition of a work that has one
    pub async fn isbn10_for_key(&self, key: &str) -> Result<Option<String>, LookupError> {
        match OpenLibraryKey::parse(key)? {
            OpenLibraryKey::Edition(key) => {
                let edition: EditionPayload =
                    self.fetch_json(&format!("{}.json", key), &[]).await?;
                Ok(edition.isbn_10.into_iter().next())
            }
            OpenLibraryKey::Work(key) => {
                let editions: EditionsPayload = self
                    .fetch_json(
                        &format!("{}/editions.json", key),
                        &[("limit", EDITIONS_LIMIT.to_string())],
                    )
                    .await?;
                Ok(first_edition_isbn10(editions))
            }
        }
    }
}
