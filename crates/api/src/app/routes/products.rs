use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use storefront_auth::Permission;
use storefront_catalog::{NewProduct, PageRequest, ProductPatch};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::middleware::{self, AuthState};

/// Product routes, mounted under `/api/products`.
///
/// Reads are public; writes go through the bearer-token middleware.
pub fn router(auth_state: AuthState) -> Router {
    let public = Router::new()
        .route("/", get(list_products))
        .route("/search/suggestions", get(search_suggestions))
        .route("/category/:category", get(products_by_category))
        .route("/featured", get(featured_products))
        .route("/:id", get(get_product));

    let protected = Router::new()
        .route("/", axum::routing::post(create_product))
        .route(
            "/:id",
            axum::routing::put(update_product).delete(delete_product),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    public.merge(protected)
}

/// GET / - filtered, sorted, paginated listing
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListProductsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
    };
    let page = match PageRequest::from_params(&query.page) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .list_products(&query.filter, query.sort_by.as_deref(), &page)
        .await
    {
        Ok((products, pagination)) => {
            let data: Vec<_> = products.iter().map(dto::listed_product_to_json).collect();
            Json(dto::paged(data, pagination)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /search/suggestions?q=
pub async fn search_suggestions(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SuggestionsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
    };

    match services.search_suggestions(query.q.as_deref()).await {
        Ok(products) => {
            let data: Vec<dto::SuggestionView> = products.into_iter().map(Into::into).collect();
            Json(dto::data(data)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /category/:category
pub async fn products_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category): Path<String>,
    query: Result<Query<dto::CategoryQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
    };
    let page = match PageRequest::from_params(&query.page) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .products_by_category(&category, query.subcategory.as_deref(), &page)
        .await
    {
        Ok((products, pagination)) => Json(dto::paged(products, pagination)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /featured
pub async fn featured_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.featured_products().await {
        Ok(products) => Json(dto::data(products)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /:id
pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.get_product(&id).await {
        Ok(product) => Json(dto::data(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST / - create a product owned by the caller unless `vendor` is given
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_request(&principal, Permission::ProductsCreate) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
    };

    match services.create_product(input, principal.user_id()).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::data(product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// PUT /:id - merge the provided fields into the stored product
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_request(&principal, Permission::ProductsUpdate) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
    };

    match services.update_product(&id, patch).await {
        Ok(product) => Json(dto::data(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// DELETE /:id - soft delete
pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_request(&principal, Permission::ProductsDelete) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.delete_product(&id).await {
        Ok(()) => Json(dto::message("Product deleted successfully")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
