use tourney_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is unreachable, the URI is invalid, or authentication failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A query or command was rejected by the store.
    #[error("Operation on '{collection}' failed: {message}")]
    Operation { collection: String, message: String },

    /// The named index does not exist. Callers dropping an index treat this
    /// as an expected condition rather than a failure.
    #[error("Index '{index}' does not exist on '{collection}'")]
    IndexNotFound { collection: String, index: String },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

impl StoreError {
    pub fn operation(collection: &str, message: impl std::fmt::Display) -> Self {
        Self::Operation {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this error reports something that is already gone.
    pub fn is_expected_absence(&self) -> bool {
        matches!(self, Self::IndexNotFound { .. })
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) | CoreError::Internal(msg) => Self::InvalidSelector(msg),
        }
    }
}
