//! Catalog services: request-level operations over a [`CatalogStore`].
//!
//! Handlers stay thin; everything here is transport-agnostic apart from the
//! error type, which the HTTP layer maps in `errors.rs`.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use storefront_catalog::{
    CatalogQuery, FilterParams, NewProduct, PageRequest, PaginationEnvelope, Product,
    ProductPatch,
};
use storefront_core::{DomainError, ProductId, UserId};
use storefront_infra::{CatalogStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Shared application services, injected into handlers as an `Extension`.
pub struct AppServices {
    store: Arc<dyn CatalogStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Filtered, sorted, paginated listing of active products.
    pub async fn list_products(
        &self,
        filter: &FilterParams,
        sort_by: Option<&str>,
        page: &PageRequest,
    ) -> ServiceResult<(Vec<Product>, PaginationEnvelope)> {
        let query = CatalogQuery::listing(filter, sort_by, page)?;
        let products = self.store.find(&query).await?;
        let total = self.store.count(&query.predicate).await?;
        Ok((products, page.envelope(total)))
    }

    /// Best text matches for `q`. No terms means no store round-trip.
    pub async fn search_suggestions(&self, q: Option<&str>) -> ServiceResult<Vec<Product>> {
        let Some(query) = CatalogQuery::suggestions(q) else {
            return Ok(Vec::new());
        };
        Ok(self.store.find(&query).await?)
    }

    pub async fn products_by_category(
        &self,
        category: &str,
        subcategory: Option<&str>,
        page: &PageRequest,
    ) -> ServiceResult<(Vec<Product>, PaginationEnvelope)> {
        let query = CatalogQuery::by_category(category, subcategory, page);
        let products = self.store.find(&query).await?;
        let total = self.store.count(&query.predicate).await?;
        Ok((products, page.envelope(total).without_navigation()))
    }

    pub async fn featured_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.store.find(&CatalogQuery::featured()).await?)
    }

    /// Lookup by id, including soft-deleted products.
    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        let id = parse_id(id)?;
        self.load(&id).await
    }

    pub async fn create_product(&self, input: NewProduct, caller: UserId) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), input, caller, Utc::now())?;

        match self.store.insert(product).await {
            Ok(created) => {
                tracing::info!(product_id = %created.id, vendor = %created.vendor, "product created");
                Ok(created)
            }
            Err(e) => Err(log_write_failure("create", e)),
        }
    }

    pub async fn update_product(&self, id: &str, patch: ProductPatch) -> ServiceResult<Product> {
        let id = parse_id(id)?;
        let mut product = self.load(&id).await?;
        product.apply_patch(patch, Utc::now())?;

        match self.store.replace(product).await {
            Ok(updated) => {
                tracing::info!(product_id = %updated.id, "product updated");
                Ok(updated)
            }
            Err(e) => Err(log_write_failure("update", e)),
        }
    }

    /// Soft delete: the record stays resolvable by id but leaves listings.
    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        let id = parse_id(id)?;
        let mut product = self.load(&id).await?;
        product.soft_delete(Utc::now());

        match self.store.replace(product).await {
            Ok(_) => {
                tracing::info!(product_id = %id, "product deactivated");
                Ok(())
            }
            Err(e) => Err(log_write_failure("delete", e)),
        }
    }

    async fn load(&self, id: &ProductId) -> ServiceResult<Product> {
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::NotFound))
    }
}

fn parse_id(raw: &str) -> Result<ProductId, DomainError> {
    raw.parse()
}

fn log_write_failure(op: &'static str, err: StoreError) -> ServiceError {
    match &err {
        StoreError::DuplicateSku(sku) => tracing::warn!(op, sku = %sku, "sku already taken"),
        StoreError::NotFound => tracing::warn!(op, "product vanished during write"),
        StoreError::Backend(_) | StoreError::Decode(_) => {
            tracing::error!(op, error = %err, "catalog store write failed")
        }
    }
    ServiceError::Store(err)
}
