use chrono::{DateTime, Utc};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type DocumentId = String;
pub type BookId = DocumentId;
pub type UserId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Struct representing details of the book, as stored in the `books` collection
pub struct BookDetails {
    pub title: String,
    /// Free text, partial dates such as "1843" are allowed
    #[serde(default)]
    pub date_published: String,
    pub date_added: DateTime<Utc>,
    /// Author names in insertion order
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Struct representing a patch to book details. Allows to specify only a few fields and patch the current details
pub struct BookDetailsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Book details together with the id assigned by the store
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub details: BookDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// An author or a genre, stored in the `authors` and `genres` collections
pub struct CatalogEntry {
    pub name: String,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// One user's association with one book, stored in the `userCollections` collection
pub struct UserBookSummary {
    pub user_id: UserId,
    pub book_id: BookId,
    pub date_added_to_reading_list: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Body of POST /api/user/{user_id}/book/{book_id}
pub struct AddToCollectionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
/// Path parameters of /api/user/{user_id}/book/{book_id}
pub struct CollectionEntryPath {
    pub user_id: UserId,
    pub book_id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct GetAllBooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct NamesResponse {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SearchQuery {
    pub q: Option<String>,
}
