//! Storage abstractions for service layer
//!
//! File-backed stores that persist small collections as a single JSON
//! document, for data where a database is overkill.

pub mod json_list_store;

pub use json_list_store::{Entry, JsonListStore};
