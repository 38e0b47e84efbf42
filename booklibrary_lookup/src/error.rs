#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unsupported key type: {0}")]
    UnsupportedKey(String),

    #[error("Genre suggestions are not configured")]
    NotConfigured,

    #[error("Upstream request failed: {0}")]
    UpstreamProxyError(String),

    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Request(reqwest_middleware::Error::Reqwest(err))
    }
}

impl LookupError {
    /// True when the caller sent something we cannot look up
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            LookupError::MissingParameter(_) | LookupError::UnsupportedKey(_)
        )
    }
}
