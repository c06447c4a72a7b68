use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::{Category, Location};
use crate::domain::error::DomainError;

/// Read side of categories and locations. Both are maintained by operators
/// directly in the database.
#[async_trait]
pub(crate) trait CatalogRepository: Send + Sync {
    async fn list_published_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn find_published_category(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn list_published_locations(&self) -> Result<Vec<Location>, DomainError>;
}

#[async_trait]
impl<T: CatalogRepository + ?Sized> CatalogRepository for Arc<T> {
    async fn list_published_categories(&self) -> Result<Vec<Category>, DomainError> {
        (**self).list_published_categories().await
    }

    async fn find_published_category(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        (**self).find_published_category(slug).await
    }

    async fn list_published_locations(&self) -> Result<Vec<Location>, DomainError> {
        (**self).list_published_locations().await
    }
}
