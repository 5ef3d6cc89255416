//! Product catalogue: record type, field validation, the file-backed
//! service and the trait the HTTP layer consumes.

pub mod catalog;
pub mod domain;
pub mod service;
pub mod validation;

pub use catalog::ProductCatalog;
pub use domain::{NewProduct, Product, ProductPatch, SaveStatus, Saved};
pub use service::ProductService;
