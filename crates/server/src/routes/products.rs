use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use racar_core::{ApplicationError, DocumentRecord, FilterKind, ProductDraft, ProductFilter};

use super::{parse_body, query_params, AppState, CreatedResponse, ProductQuery};
use crate::error::{reject, ApiResult, Operation};

type Records = Json<Vec<DocumentRecord>>;

pub async fn get_all_products(State(state): State<AppState>) -> ApiResult<Records> {
    list(&state, Ok(ProductFilter::All)).await
}

pub async fn get_products_by_name(State(state): State<AppState>, query: ProductQuery) -> ApiResult<Records> {
    list(&state, required(FilterKind::Name, query)).await
}

pub async fn get_products_by_brand(State(state): State<AppState>, query: ProductQuery) -> ApiResult<Records> {
    list(&state, required(FilterKind::Brand, query)).await
}

pub async fn get_products_by_model(State(state): State<AppState>, query: ProductQuery) -> ApiResult<Records> {
    list(&state, required(FilterKind::Model, query)).await
}

pub async fn get_products_by_type(State(state): State<AppState>, query: ProductQuery) -> ApiResult<Records> {
    list(&state, required(FilterKind::ProductType, query)).await
}

/// Accepts any single filter, or none for the whole catalog.
pub async fn query_products(State(state): State<AppState>, query: ProductQuery) -> ApiResult<Records> {
    let filter = query_params(query)
        .and_then(|params| ProductFilter::from_params(&params).map_err(ApplicationError::from));
    list(&state, filter).await
}

pub async fn get_product(
    State(state): State<AppState>,
    query: ProductQuery,
) -> ApiResult<Json<DocumentRecord>> {
    let fail = |error: ApplicationError| reject(Operation::GetProduct, error);

    let params = query_params(query).map_err(fail)?;
    let id = params.required(FilterKind::Id).map_err(|error| fail(error.into()))?;
    let record = state.products.get(&id).await.map_err(fail)?;
    Ok(Json(record))
}

pub async fn add_product(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let fail = |error: ApplicationError| reject(Operation::AddProduct, error);

    let draft: ProductDraft = parse_body(&body).map_err(fail)?;
    let request = draft.validate().map_err(|error| fail(error.into()))?;
    let id = state.products.create(request).await.map_err(fail)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.0, message: "Producto agregado correctamente".to_string() }),
    ))
}

fn required(kind: FilterKind, query: ProductQuery) -> Result<ProductFilter, ApplicationError> {
    let params = query_params(query)?;
    Ok(ProductFilter::require(kind, &params)?)
}

async fn list(state: &AppState, filter: Result<ProductFilter, ApplicationError>) -> ApiResult<Records> {
    let fail = |error: ApplicationError| reject(Operation::ListProducts, error);

    let filter = filter.map_err(fail)?;
    let records = state.products.list(&filter).await.map_err(fail)?;
    Ok(Json(records))
}
