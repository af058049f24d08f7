//! MongoDB backend.

use futures::TryStreamExt;
use mongodb::bson::{doc, Document as BsonDocument};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tourney_core::selector::Selector;
use tourney_core::types::Document;

use crate::error::StoreError;
use crate::filter::{to_filter, to_json};
use crate::store::{validate_uri, ConnectOptions, DocumentStore, StoreConnector};

/// Server error code for `IndexNotFound`.
pub const INDEX_NOT_FOUND_CODE: i32 = 27;

/// Server error code for `NamespaceNotFound` (the collection does not exist).
pub const NAMESPACE_NOT_FOUND_CODE: i32 = 26;

/// Application name reported to the server in the handshake.
const APP_NAME: &str = "tourney-maintenance";

/// Whether a server error code means the target was already gone.
pub fn is_absence_code(code: i32) -> bool {
    code == INDEX_NOT_FOUND_CODE || code == NAMESPACE_NOT_FOUND_CODE
}

fn command_error_code(err: &MongoError) -> Option<i32> {
    match *err.kind {
        ErrorKind::Command(ref cmd) => Some(cmd.code),
        _ => None,
    }
}

/// Opens [`MongoStore`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

impl StoreConnector for MongoConnector {
    type Store = MongoStore;

    async fn connect(&self, options: &ConnectOptions) -> Result<MongoStore, StoreError> {
        validate_uri(&options.uri)?;

        let mut client_options = ClientOptions::parse(&options.uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        client_options.server_selection_timeout = Some(options.server_selection_timeout);
        client_options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let database = client.database(&options.database);

        // The driver connects lazily; ping so an unreachable deployment or
        // bad credentials surface here rather than mid-task.
        if let Err(e) = database.run_command(doc! { "ping": 1 }).await {
            client.shutdown().await;
            return Err(StoreError::Connection(e.to_string()));
        }

        tracing::debug!(database = %options.database, "MongoDB ping succeeded");
        Ok(MongoStore { client, database })
    }
}

/// A connected MongoDB database.
#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection::<BsonDocument>(name)
    }
}

impl DocumentStore for MongoStore {
    async fn find_matching(
        &self,
        collection: &str,
        selector: &Selector,
    ) -> Result<Vec<Document>, StoreError> {
        let filter = to_filter(selector)?;
        let cursor = self
            .collection(collection)
            .find(filter)
            .await
            .map_err(|e| StoreError::operation(collection, e))?;
        let docs: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::operation(collection, e))?;
        Ok(docs.into_iter().map(to_json).collect())
    }

    async fn delete_matching(
        &self,
        collection: &str,
        selector: &Selector,
    ) -> Result<u64, StoreError> {
        let filter = to_filter(selector)?;
        let result = self
            .collection(collection)
            .delete_many(filter)
            .await
            .map_err(|e| StoreError::operation(collection, e))?;
        Ok(result.deleted_count)
    }

    async fn list_index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        match self.collection(collection).list_index_names().await {
            Ok(names) => Ok(names),
            Err(e) if command_error_code(&e) == Some(NAMESPACE_NOT_FOUND_CODE) => Ok(Vec::new()),
            Err(e) => Err(StoreError::operation(collection, e)),
        }
    }

    async fn drop_index(&self, collection: &str, index: &str) -> Result<(), StoreError> {
        match self.collection(collection).drop_index(index).await {
            Ok(()) => Ok(()),
            Err(e) if command_error_code(&e).is_some_and(is_absence_code) => {
                Err(StoreError::IndexNotFound {
                    collection: collection.to_string(),
                    index: index.to_string(),
                })
            }
            Err(e) => Err(StoreError::operation(collection, e)),
        }
    }

    async fn disconnect(self) {
        self.client.shutdown().await;
        tracing::debug!("MongoDB client shut down");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
