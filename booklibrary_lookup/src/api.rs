use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Candidate book found in the Open Library catalog
pub struct OpenLibrarySearchResult {
    /// Open Library key, e.g. /works/OL45804W
    pub key: String,
    pub title: String,
    pub authors: Vec<String>,
    pub first_publish_year: Option<i32>,
    pub isbn10: Option<String>,
    /// Small cover image, present when an ISBN-10 is known
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct SearchResponse {
    pub results: Vec<OpenLibrarySearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct Isbn10Response {
    pub isbn10: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct SuggestGenresRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct SuggestGenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct DetailsQuery {
    pub key: Option<String>,
}
