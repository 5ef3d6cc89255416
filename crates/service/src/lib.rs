//! Service layer for the product catalogue API.
//! - `storage`: JSON file-backed collection with serialised read-modify-write.
//! - `products`: CRUD rules and validation on top of the store.
//! - `auth`: bearer token issuing and verification.

pub mod errors;
pub mod auth;
pub mod runtime;
pub mod storage;
pub mod products;
