//! Integration tests against a live MongoDB deployment.
//!
//! Ignored by default. Run with a disposable server:
//!
//! ```sh
//! MONGODB_TEST_URI=mongodb://localhost:27017 cargo test -p tourney-db -- --ignored
//! ```

use std::time::Duration;

use assert_matches::assert_matches;
use tourney_core::selector::Selector;
use tourney_db::{ConnectOptions, DocumentStore, MongoConnector, StoreConnector, StoreError};

fn test_options() -> ConnectOptions {
    let uri = std::env::var("MONGODB_TEST_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    ConnectOptions {
        server_selection_timeout: Duration::from_secs(5),
        ..ConnectOptions::new(uri, "tourney_maintenance_test")
    }
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn drop_of_unknown_index_is_expected_absence() {
    let store = MongoConnector.connect(&test_options()).await.unwrap();

    let err = store
        .drop_index("teams", "tournament_1_teamName_1")
        .await
        .unwrap_err();
    assert!(err.is_expected_absence(), "unexpected error: {err}");

    store.disconnect().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn find_on_missing_collection_is_empty() {
    let store = MongoConnector.connect(&test_options()).await.unwrap();

    let found = store
        .find_matching("no_such_collection", &Selector::is_null("name"))
        .await
        .unwrap();
    assert!(found.is_empty());
    assert!(store
        .list_index_names("no_such_collection")
        .await
        .unwrap()
        .is_empty());

    store.disconnect().await;
}

/// Nothing listens on port 1, so the ping must fail within the timeout.
#[tokio::test]
#[ignore = "waits for server selection to time out"]
async fn unreachable_server_is_a_connection_error() {
    let options = ConnectOptions {
        server_selection_timeout: Duration::from_millis(500),
        ..ConnectOptions::new("mongodb://127.0.0.1:1", "tourney")
    };
    assert_matches!(
        MongoConnector.connect(&options).await,
        Err(StoreError::Connection(_))
    );
}
