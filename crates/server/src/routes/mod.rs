//! HTTP surface of the catalog and comment feed.
//!
//! Product endpoints:
//! - `GET  /getAllProducts`
//! - `GET  /getProductsByName?name=`
//! - `GET  /getProduct?id=`
//! - `GET  /getProductsByBrand?brand=`
//! - `GET  /getProductsByModel?model=`
//! - `GET  /getProductsByType?tipo=`
//! - `GET  /products` with at most one of the parameters above
//! - `POST /addProduct`
//!
//! Taxonomy endpoints: `POST /addBrand`, `POST /addModel`, `POST /addProductType`.
//!
//! Comment endpoints: `POST /addComment`, `GET /getAllComments`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use racar_core::{ApplicationError, DomainError, ProductQueryParams};
use racar_db::{CommentRepository, DocumentStore, ProductRepository, TaxonomyRepository};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::ErrorBody;
use crate::health;

pub mod comments;
pub mod products;
pub mod taxonomy;

#[derive(Clone)]
pub struct AppState {
    products: ProductRepository,
    comments: CommentRepository,
    taxonomy: TaxonomyRepository,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            products: ProductRepository::new(store.clone()),
            comments: CommentRepository::new(store.clone()),
            taxonomy: TaxonomyRepository::new(store),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn router(store: Arc<dyn DocumentStore>) -> Router {
    Router::new()
        .route("/getAllProducts", get(products::get_all_products))
        .route("/getProductsByName", get(products::get_products_by_name))
        .route("/getProduct", get(products::get_product))
        .route("/getProductsByBrand", get(products::get_products_by_brand))
        .route("/getProductsByModel", get(products::get_products_by_model))
        .route("/getProductsByType", get(products::get_products_by_type))
        .route("/products", get(products::query_products))
        .route("/addProduct", post(products::add_product))
        .route("/addBrand", post(taxonomy::add_brand))
        .route("/addModel", post(taxonomy::add_model))
        .route("/addProductType", post(taxonomy::add_product_type))
        .route("/addComment", post(comments::add_comment))
        .route("/getAllComments", get(comments::get_all_comments))
        .with_state(AppState::new(store.clone()))
        .merge(health::router(store))
        .fallback(unknown_route)
        .method_not_allowed_fallback(wrong_method)
        .layer(TraceLayer::new_for_http())
}

async fn unknown_route() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody { error: "Ruta no encontrada".to_string() }))
}

async fn wrong_method() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::METHOD_NOT_ALLOWED, Json(ErrorBody { error: "Método no permitido".to_string() }))
}

pub(crate) type ProductQuery = Result<Query<ProductQueryParams>, QueryRejection>;

pub(crate) fn query_params(query: ProductQuery) -> Result<ProductQueryParams, ApplicationError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        debug!(event_name = "api.request.malformed_query", error = %rejection, "query rejected");
        DomainError::MalformedQuery.into()
    })
}

/// An empty body reads as an empty object so field validation reports what
/// is missing.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApplicationError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"{}" } else { body };
    serde_json::from_slice(raw).map_err(|error| {
        debug!(event_name = "api.request.malformed_body", error = %error, "body rejected");
        DomainError::MalformedBody.into()
    })
}
