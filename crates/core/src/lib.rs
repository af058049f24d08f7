//! Domain types for tournament store maintenance.
//!
//! Everything here is pure: no I/O, no async, no store handles. The `db`
//! crate translates these types to the wire, and the `maintenance` crate
//! drives them.

pub mod error;
pub mod index;
pub mod maintenance;
pub mod models;
pub mod selector;
pub mod types;
