use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use crate::api::SuggestGenresRequest;
use crate::error::LookupError;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 100;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

fn authors_list(authors: Option<&[String]>) -> Option<String> {
    authors
        .filter(|authors| !authors.is_empty())
        .map(|authors| authors.join(", "))
}

/// Prompt for a classifier reply, author clauses only when authors are known
pub fn build_prompt(title: &str, authors: Option<&[String]>) -> String {
    let authors = authors_list(authors);
    let authors_clause = authors
        .as_deref()
        .map(|authors| format!(" and author(s) ({})", authors))
        .unwrap_or_default();
    let by_clause = authors
        .as_deref()
        .map(|authors| format!(" by {}", authors))
        .unwrap_or_default();

    format!(
        "You are a book genre classifier. Given a book title{}, suggest 3-5 appropriate book genres or categories.\n\n\
         Book: \"{}\"{}\n\n\
         Respond with ONLY a JSON array of genre strings, nothing else. Example: [\"Fiction\", \"Mystery\", \"Drama\"]",
        authors_clause, title, by_clause
    )
}

/// Model output must be a JSON array of strings
pub fn parse_genres(content: &str) -> Result<Vec<String>, LookupError> {
    let genres: Vec<String> = serde_json::from_str(content.trim()).map_err(|err| {
        LookupError::MalformedPayload(format!("Expected a JSON array of genres: {}", err))
    })?;
    Ok(genres
        .into_iter()
        .map(|genre| genre.trim().to_string())
        .filter(|genre| !genre.is_empty())
        .collect())
}

/// Asks a chat completion model for likely genres of a book
pub struct GenreSuggester {
    api_url: String,
    api_key: Option<String>,
    client: ClientWithMiddleware,
}

impl GenreSuggester {
    pub fn new(api_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            client: crate::traced_client()?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn suggest(&self, request: &SuggestGenresRequest) -> Result<Vec<String>, LookupError> {
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or(LookupError::MissingParameter("title"))?;
        let api_key = self.api_key.as_deref().ok_or(LookupError::NotConfigured)?;
        let prompt = build_prompt(title, request.authors.as_deref());

        let body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::UpstreamProxyError(format!(
                "Genre suggestion request failed: {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        let completion: ChatResponse = serde_json::from_str(&text)
            .map_err(|err| LookupError::MalformedPayload(err.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LookupError::MalformedPayload("No completion choices".to_string()))?;

        let genres = parse_genres(&content)?;
        tracing::info!("Suggested {} genres", genres.len());
        Ok(genres)
    }
}
