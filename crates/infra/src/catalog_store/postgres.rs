//! Postgres-backed catalog store.
//!
//! Predicates are translated condition-by-condition into a parameterized
//! `WHERE` clause with [`sqlx::QueryBuilder`]; nothing from the request is
//! interpolated into SQL text.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation on `products_sku_unique`) | `23505` | `DuplicateSku` | SKU already owned by another product |
//! | Database (other) | Any other | `Backend` | Check constraints, other unique keys, etc. |
//! | Row decode failure | N/A | `Decode` | Column type drift / corrupt JSON |
//! | Other | N/A | `Backend` | Pool closed, network errors, etc. |
//!
//! ## Text Search
//!
//! Free-text conditions use the `simple` text search configuration (no
//! stemming) over name, category, brand and description, with terms OR-ed
//! together. The expression matches the GIN index in the migration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use storefront_catalog::{
    CatalogQuery, Condition, Dimensions, Predicate, Product, Rating, SortSpec,
};
use storefront_core::{ProductId, UserId};

use super::{CatalogStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_products.sql");

const SKU_INDEX: &str = "products_sku_unique";

const SEARCH_VECTOR: &str = "to_tsvector('simple', \
     coalesce(name, '') || ' ' || coalesce(category, '') || ' ' || \
     coalesce(brand, '') || ' ' || coalesce(description, ''))";

const SELECT_COLUMNS: &str = "SELECT id, name, description, price, compare_price, category, \
     subcategory, brand, sku, images, stock, tags, features, specifications, weight, \
     dimensions, is_featured, is_active, vendor_id, rating_average, rating_count, \
     created_at, updated_at FROM products";

/// Postgres catalog store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`.
///
/// ## SKU Uniqueness
///
/// Enforced by the `products_sku_unique` index; concurrent writers racing on
/// the same SKU see exactly one success.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Apply the embedded schema (idempotent).
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(
        skip(self, query),
        fields(sort = ?query.sort, skip = query.skip, limit = ?query.limit, rows = tracing::field::Empty),
        err
    )]
    async fn find(&self, query: &CatalogQuery) -> Result<Vec<Product>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        push_predicate(&mut qb, &query.predicate);
        push_order(&mut qb, query.sort, query.predicate.text_terms());

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(to_i64(limit));
        }
        if query.skip > 0 {
            qb.push(" OFFSET ").push_bind(to_i64(query.skip));
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        tracing::Span::current().record("rows", rows.len());

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, predicate), err)]
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_predicate(&mut qb, predicate);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        qb.push(" WHERE id = ").push_bind(*id.as_uuid());

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, compare_price, category, subcategory,
                brand, sku, images, stock, tags, features, specifications, weight,
                dimensions, is_featured, is_active, vendor_id, rating_average,
                rating_count, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_price)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(&product.brand)
        .bind(&product.sku)
        .bind(Json(&product.images))
        .bind(product.stock)
        .bind(Json(&product.tags))
        .bind(Json(&product.features))
        .bind(Json(&product.specifications))
        .bind(product.weight)
        .bind(product.dimensions.map(Json))
        .bind(product.is_featured)
        .bind(product.is_active)
        .bind(product.vendor.as_uuid())
        .bind(product.rating.average)
        .bind(rating_count_to_db(product.rating.count))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("insert", e, product.sku.as_deref()))?;

        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn replace(&self, product: Product) -> Result<Product, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2,
                description = $3,
                price = $4,
                compare_price = $5,
                category = $6,
                subcategory = $7,
                brand = $8,
                sku = $9,
                images = $10,
                stock = $11,
                tags = $12,
                features = $13,
                specifications = $14,
                weight = $15,
                dimensions = $16,
                is_featured = $17,
                is_active = $18,
                vendor_id = $19,
                rating_average = $20,
                rating_count = $21,
                updated_at = $22
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_price)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(&product.brand)
        .bind(&product.sku)
        .bind(Json(&product.images))
        .bind(product.stock)
        .bind(Json(&product.tags))
        .bind(Json(&product.features))
        .bind(Json(&product.specifications))
        .bind(product.weight)
        .bind(product.dimensions.map(Json))
        .bind(product.is_featured)
        .bind(product.is_active)
        .bind(product.vendor.as_uuid())
        .bind(product.rating.average)
        .bind(rating_count_to_db(product.rating.count))
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("replace", e, product.sku.as_deref()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(product)
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    qb.push(" WHERE TRUE");

    for condition in predicate.conditions() {
        match condition {
            Condition::Active(active) => {
                qb.push(" AND is_active = ").push_bind(*active);
            }
            Condition::Text(terms) if terms.is_empty() => {
                qb.push(" AND FALSE");
            }
            Condition::Text(terms) => {
                qb.push(" AND ")
                    .push(SEARCH_VECTOR)
                    .push(" @@ to_tsquery('simple', ")
                    .push_bind(ts_query(terms))
                    .push(")");
            }
            Condition::Category(category) => {
                qb.push(" AND category = ").push_bind(category.clone());
            }
            Condition::Subcategory(subcategory) => {
                qb.push(" AND subcategory = ").push_bind(subcategory.clone());
            }
            Condition::Price(range) => {
                if let Some(min) = range.min {
                    qb.push(" AND price >= ").push_bind(min);
                }
                if let Some(max) = range.max {
                    qb.push(" AND price <= ").push_bind(max);
                }
            }
            Condition::BrandIn(brands) => {
                let brands: Vec<String> = brands.iter().cloned().collect();
                qb.push(" AND brand = ANY(").push_bind(brands).push(")");
            }
            Condition::InStock => {
                qb.push(" AND stock > 0");
            }
            Condition::Featured => {
                qb.push(" AND is_featured = TRUE");
            }
        }
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: SortSpec, terms: Option<&[String]>) {
    qb.push(" ORDER BY ");
    match (sort, terms) {
        (SortSpec::Relevance, Some(terms)) if !terms.is_empty() => {
            qb.push("ts_rank(")
                .push(SEARCH_VECTOR)
                .push(", to_tsquery('simple', ")
                .push_bind(ts_query(terms))
                .push(")) DESC, created_at DESC");
        }
        (SortSpec::PriceAsc, _) => {
            qb.push("price ASC");
        }
        (SortSpec::PriceDesc, _) => {
            qb.push("price DESC");
        }
        (SortSpec::RatingDesc, _) => {
            qb.push("rating_average DESC");
        }
        (SortSpec::NameAsc, _) => {
            qb.push("name ASC");
        }
        (SortSpec::Newest | SortSpec::Relevance, _) => {
            qb.push("created_at DESC");
        }
    }
    qb.push(", id ASC");
}

/// Disjunctive tsquery. Terms are already alphanumeric-only, so they carry no
/// tsquery operators.
fn ts_query(terms: &[String]) -> String {
    terms.join(" | ")
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn rating_count_to_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    decode_product(row).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode_product(row: &PgRow) -> Result<Product, sqlx::Error> {
    let id: uuid::Uuid = row.try_get("id")?;
    let vendor: uuid::Uuid = row.try_get("vendor_id")?;
    let images: Json<Vec<String>> = row.try_get("images")?;
    let tags: Json<Vec<String>> = row.try_get("tags")?;
    let features: Json<Vec<String>> = row.try_get("features")?;
    let specifications: Json<std::collections::BTreeMap<String, String>> =
        row.try_get("specifications")?;
    let dimensions: Option<Json<Dimensions>> = row.try_get("dimensions")?;
    let rating_count: i32 = row.try_get("rating_count")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Product {
        id: ProductId::from_uuid(id),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        compare_price: row.try_get("compare_price")?,
        category: row.try_get("category")?,
        subcategory: row.try_get("subcategory")?,
        brand: row.try_get("brand")?,
        sku: row.try_get("sku")?,
        images: images.0,
        stock: row.try_get("stock")?,
        tags: tags.0,
        features: features.0,
        specifications: specifications.0,
        weight: row.try_get("weight")?,
        dimensions: dimensions.map(|d| d.0),
        is_featured: row.try_get("is_featured")?,
        is_active: row.try_get("is_active")?,
        vendor: UserId::from_uuid(vendor),
        rating: Rating {
            average: row.try_get("rating_average")?,
            count: rating_count.max(0) as u32,
        },
        created_at,
        updated_at,
    })
}

fn map_write_error(operation: &str, err: sqlx::Error, sku: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(SKU_INDEX) {
            return StoreError::DuplicateSku(sku.unwrap_or_default().to_string());
        }
    }
    map_sqlx_error(operation, err)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {} (code {})",
            operation,
            db_err.message(),
            db_err.code().as_deref().unwrap_or("none")
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{} in {}", err, operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
