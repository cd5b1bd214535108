use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use storefront_catalog::{FilterParams, PageParams, PaginationEnvelope, Product};
use storefront_core::ProductId;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /api/products` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    #[serde(flatten)]
    pub filter: FilterParams,
    pub sort_by: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub subcategory: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

// -------------------------
// Response DTOs
// -------------------------

/// Suggestion projection: just enough to render a dropdown entry.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionView {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub images: Vec<String>,
    pub category: String,
}

impl From<Product> for SuggestionView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            images: p.images,
            category: p.category,
        }
    }
}

/// Product JSON as returned by listings: the vendor reference is expanded
/// to `{ "id": ... }`.
pub fn listed_product_to_json(p: &Product) -> Value {
    let mut value = product_to_json(p);
    value["vendor"] = json!({ "id": p.vendor });
    value
}

pub fn product_to_json(p: &Product) -> Value {
    serde_json::to_value(p).unwrap_or(Value::Null)
}

pub fn data(data: impl Serialize) -> Value {
    json!({
        "success": true,
        "data": data,
    })
}

pub fn paged(data: impl Serialize, pagination: PaginationEnvelope) -> Value {
    json!({
        "success": true,
        "data": data,
        "pagination": pagination,
    })
}

pub fn message(message: &str) -> Value {
    json!({
        "success": true,
        "message": message,
    })
}
