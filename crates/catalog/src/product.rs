use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId, UserId};

/// Physical package dimensions (unit is up to the catalog owner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Review aggregate. Maintained outside this service; read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    pub average: f64,
    pub count: u32,
}

/// A catalog product record.
///
/// `is_active == false` marks a soft-deleted product: it is hidden from
/// listings but still resolvable by id. `category` is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub category: String,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub images: Vec<String>,
    pub stock: i64,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub is_featured: bool,
    pub is_active: bool,
    pub vendor: UserId,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub compare_price: Option<f64>,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub is_featured: bool,
    /// Owning vendor; the authenticated caller when omitted.
    #[serde(default)]
    pub vendor: Option<UserId>,
}

/// Partial update: every provided field replaces the stored one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub compare_price: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

impl Product {
    /// Build a new active product from creation input.
    pub fn create(
        id: ProductId,
        input: NewProduct,
        caller: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let product = Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            compare_price: input.compare_price,
            category: input.category.to_lowercase(),
            subcategory: input.subcategory,
            brand: input.brand,
            sku: normalize_sku(input.sku),
            images: input.images,
            stock: input.stock,
            tags: input.tags,
            features: input.features,
            specifications: input.specifications,
            weight: input.weight,
            dimensions: input.dimensions,
            is_featured: input.is_featured,
            is_active: true,
            vendor: input.vendor.unwrap_or(caller),
            rating: Rating::default(),
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        Ok(product)
    }

    /// Apply a partial update and re-validate the result.
    ///
    /// On error `self` is left untouched.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();

        if let Some(v) = patch.name {
            next.name = v;
        }
        if let Some(v) = patch.description {
            next.description = v;
        }
        if let Some(v) = patch.price {
            next.price = v;
        }
        if let Some(v) = patch.compare_price {
            next.compare_price = Some(v);
        }
        if let Some(v) = patch.category {
            next.category = v.to_lowercase();
        }
        if let Some(v) = patch.subcategory {
            next.subcategory = Some(v);
        }
        if let Some(v) = patch.brand {
            next.brand = Some(v);
        }
        if let Some(v) = patch.sku {
            next.sku = normalize_sku(Some(v));
        }
        if let Some(v) = patch.images {
            next.images = v;
        }
        if let Some(v) = patch.stock {
            next.stock = v;
        }
        if let Some(v) = patch.tags {
            next.tags = v;
        }
        if let Some(v) = patch.features {
            next.features = v;
        }
        if let Some(v) = patch.specifications {
            next.specifications = v;
        }
        if let Some(v) = patch.weight {
            next.weight = Some(v);
        }
        if let Some(v) = patch.dimensions {
            next.dimensions = Some(v);
        }
        if let Some(v) = patch.is_featured {
            next.is_featured = v;
        }
        if let Some(v) = patch.is_active {
            next.is_active = v;
        }

        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Mark the product inactive. Repeated calls keep it inactive.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation("price must be a non-negative number"));
        }
        if let Some(p) = self.compare_price {
            if !p.is_finite() || p < 0.0 {
                return Err(DomainError::validation(
                    "comparePrice must be a non-negative number",
                ));
            }
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        if let Some(w) = self.weight {
            if !w.is_finite() || w < 0.0 {
                return Err(DomainError::validation("weight must be a non-negative number"));
            }
        }
        Ok(())
    }
}

fn normalize_sku(sku: Option<String>) -> Option<String> {
    sku.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
