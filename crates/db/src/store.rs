//! Store seams: how a runner connects, audits, mutates, and disconnects.

use std::future::Future;
use std::time::Duration;

use tourney_core::selector::Selector;
use tourney_core::types::Document;

use crate::error::StoreError;

/// URI schemes accepted by [`validate_uri`].
pub const SUPPORTED_SCHEMES: &[&str] = &["mongodb://", "mongodb+srv://"];

/// Default bound on how long a connection attempt waits for a server.
pub const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a connector needs to open a store handle.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub uri: String,
    pub database: String,
    pub server_selection_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            server_selection_timeout: DEFAULT_SERVER_SELECTION_TIMEOUT,
        }
    }
}

/// Reject URIs that are empty or use an unsupported scheme.
pub fn validate_uri(uri: &str) -> Result<(), StoreError> {
    let Some(scheme) = SUPPORTED_SCHEMES.iter().find(|s| uri.starts_with(*s)) else {
        return Err(StoreError::Connection(format!(
            "Unsupported connection URI; expected one of: {}",
            SUPPORTED_SCHEMES.join(", ")
        )));
    };
    if uri.len() == scheme.len() {
        return Err(StoreError::Connection(
            "Connection URI has no host".to_string(),
        ));
    }
    Ok(())
}

/// An open handle to a document store.
///
/// The handle is owned by exactly one task run. [`disconnect`] consumes it,
/// so a released handle cannot be used again.
///
/// [`disconnect`]: DocumentStore::disconnect
pub trait DocumentStore: Send + Sync {
    /// Return every document in `collection` matching `selector`. Read-only.
    fn find_matching(
        &self,
        collection: &str,
        selector: &Selector,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Delete every document matching `selector`, returning the count removed.
    fn delete_matching(
        &self,
        collection: &str,
        selector: &Selector,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Names of the indexes on `collection`. A missing collection has none.
    fn list_index_names(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Drop one index. Fails with [`StoreError::IndexNotFound`] when the
    /// index (or its collection) does not exist.
    fn drop_index(
        &self,
        collection: &str,
        index: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Release the connection.
    fn disconnect(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}

/// Opens [`DocumentStore`] handles.
pub trait StoreConnector: Send + Sync {
    type Store: DocumentStore;

    fn connect(
        &self,
        options: &ConnectOptions,
    ) -> impl Future<Output = Result<Self::Store, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
