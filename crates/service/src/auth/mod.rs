//! Auth module: login against the configured admin account and HS256 bearer
//! tokens for the mutating catalogue routes.

pub mod domain;
pub mod errors;
pub mod service;

pub use service::{AuthConfig, AuthService};
