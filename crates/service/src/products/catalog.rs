use async_trait::async_trait;

use super::domain::{NewProduct, Product, ProductPatch, Saved};
use super::service::ProductService;
use crate::errors::ServiceError;

/// Trait abstraction for the product catalogue (list/get/create/update/delete).
/// Handlers hold an `Arc<dyn ProductCatalog>` so the backing store can change.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn list(&self, nombre: Option<&str>) -> Result<Vec<Product>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Product, ServiceError>;
    async fn create(&self, input: NewProduct) -> Result<Saved, ServiceError>;
    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Saved, ServiceError>;
    async fn delete(&self, id: &str) -> Result<String, ServiceError>;
}

#[async_trait]
impl ProductCatalog for ProductService {
    async fn list(&self, nombre: Option<&str>) -> Result<Vec<Product>, ServiceError> { self.list(nombre).await }
    async fn get(&self, id: &str) -> Result<Product, ServiceError> { self.get(id).await }
    async fn create(&self, input: NewProduct) -> Result<Saved, ServiceError> { self.create(input).await }
    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Saved, ServiceError> { self.update(id, patch).await }
    async fn delete(&self, id: &str) -> Result<String, ServiceError> { self.delete(id).await }
}
