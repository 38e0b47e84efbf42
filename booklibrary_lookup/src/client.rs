use anyhow::bail;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{
    ErrorResponse, Isbn10Response, OpenLibrarySearchResult, SearchResponse, SuggestGenresRequest,
    SuggestGenresResponse,
};

pub struct LibraryLookupClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LibraryLookupClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.to_string(),
            client: crate::traced_client()?,
        })
    }

    async fn read_response<T: DeserializeOwned>(
        operation: &str,
        response: reqwest::Response,
    ) -> anyhow::Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            bail!("{} failed {} {}", operation, status, error)
        }
        Ok(response.json().await?)
    }

    /// Calls GET /api/openlibrary/search endpoint
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<OpenLibrarySearchResult>> {
        let response = self
            .client
            .get(format!("{}/api/openlibrary/search", self.url))
            .query(&[("q", query)])
            .send()
            .await?;
        let body: SearchResponse = Self::read_response("Search", response).await?;
        Ok(body.results)
    }

    /// Calls GET /api/openlibrary/details endpoint
    pub async fn isbn10_for_key(&self, key: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/api/openlibrary/details", self.url))
            .query(&[("key", key)])
            .send()
            .await?;
        let body: Isbn10Response = Self::read_response("Get details", response).await?;
        Ok(body.isbn10)
    }

    /// Calls POST /api/suggest-genres endpoint
    pub async fn suggest_genres(
        &self,
        request: &SuggestGenresRequest,
    ) -> anyhow::Result<Vec<String>> {
        let response = self
            .client
            .post(format!("{}/api/suggest-genres", self.url))
            .json(request)
            .send()
            .await?;
        let body: SuggestGenresResponse = Self::read_response("Suggest genres", response).await?;
        Ok(body.genres)
    }
}
