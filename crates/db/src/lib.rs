//! Document store access for maintenance tasks.
//!
//! [`DocumentStore`] and [`StoreConnector`] are the seams the runner is
//! generic over. [`mongo`] is the production backend; [`memory`] keeps
//! everything in-process and records every call it receives.

pub mod error;
pub mod filter;
pub mod memory;
pub mod mongo;
pub mod store;

pub use error::StoreError;
pub use mongo::{MongoConnector, MongoStore};
pub use store::{ConnectOptions, DocumentStore, StoreConnector};

