use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_catalog::{text, CatalogQuery, Predicate, Product, SortSpec};
use storefront_core::ProductId;

use super::{CatalogStore, StoreError};

#[derive(Debug, Default)]
struct Catalog {
    products: HashMap<ProductId, Product>,
    /// Unique SKU index: sku -> owning product.
    skus: HashMap<String, ProductId>,
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Queries are full scans. The SKU index is updated
/// under the same write lock as the record, which gives the same atomic
/// uniqueness guarantee as a database unique index.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Catalog>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("catalog lock poisoned".to_string())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find(&self, query: &CatalogQuery) -> Result<Vec<Product>, StoreError> {
        let catalog = self.inner.read().map_err(|_| Self::poisoned())?;

        let mut matched: Vec<&Product> = catalog
            .products
            .values()
            .filter(|p| query.predicate.matches(p))
            .collect();

        match (query.sort, query.predicate.text_terms()) {
            (SortSpec::Relevance, Some(terms)) => {
                let mut scored: Vec<(u32, &Product)> =
                    matched.into_iter().map(|p| (text::relevance(p, terms), p)).collect();
                scored.sort_by(|(sa, a), (sb, b)| {
                    sb.cmp(sa).then_with(|| query.sort.compare(a, b))
                });
                matched = scored.into_iter().map(|(_, p)| p).collect();
            }
            (sort, _) => matched.sort_by(|a, b| sort.compare(a, b)),
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let catalog = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(catalog.products.values().filter(|p| predicate.matches(p)).count() as u64)
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let catalog = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(catalog.products.get(id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut catalog = self.inner.write().map_err(|_| Self::poisoned())?;

        if catalog.products.contains_key(&product.id) {
            return Err(StoreError::Backend(format!(
                "product id {} already exists",
                product.id
            )));
        }
        if let Some(sku) = &product.sku {
            if catalog.skus.contains_key(sku) {
                return Err(StoreError::DuplicateSku(sku.clone()));
            }
            catalog.skus.insert(sku.clone(), product.id);
        }

        catalog.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn replace(&self, product: Product) -> Result<Product, StoreError> {
        let mut catalog = self.inner.write().map_err(|_| Self::poisoned())?;

        let previous_sku = match catalog.products.get(&product.id) {
            Some(existing) => existing.sku.clone(),
            None => return Err(StoreError::NotFound),
        };

        if let Some(sku) = &product.sku {
            if let Some(owner) = catalog.skus.get(sku) {
                if *owner != product.id {
                    return Err(StoreError::DuplicateSku(sku.clone()));
                }
            }
        }

        if let Some(old) = previous_sku {
            catalog.skus.remove(&old);
        }
        if let Some(sku) = &product.sku {
            catalog.skus.insert(sku.clone(), product.id);
        }

        catalog.products.insert(product.id, product.clone());
        Ok(product)
    }
}
