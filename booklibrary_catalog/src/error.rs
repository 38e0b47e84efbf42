use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    /// Store failures are passed through untranslated
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl LibraryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LibraryError::Store(StoreError::NotFound { .. }))
    }
}
