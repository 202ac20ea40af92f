use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use racar_core::{ApplicationError, EntityKind, TaxonomyDraft};

use super::{parse_body, AppState, CreatedResponse};
use crate::error::{reject, ApiResult, Operation};

type Created = (StatusCode, Json<CreatedResponse>);

pub async fn add_brand(State(state): State<AppState>, body: Bytes) -> ApiResult<Created> {
    add(&state, EntityKind::Brand, &body).await
}

pub async fn add_model(State(state): State<AppState>, body: Bytes) -> ApiResult<Created> {
    add(&state, EntityKind::Model, &body).await
}

pub async fn add_product_type(State(state): State<AppState>, body: Bytes) -> ApiResult<Created> {
    add(&state, EntityKind::ProductType, &body).await
}

fn created_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Brand => "Marca agregada correctamente",
        EntityKind::Model => "Modelo agregado correctamente",
        EntityKind::ProductType => "Tipo de producto agregado correctamente",
    }
}

async fn add(state: &AppState, kind: EntityKind, body: &Bytes) -> ApiResult<Created> {
    let fail = |error: ApplicationError| reject(Operation::AddTaxonomy(kind), error);

    let draft: TaxonomyDraft = parse_body(body).map_err(fail)?;
    let entry = draft.validate().map_err(|error| fail(error.into()))?;
    let id = state.taxonomy.add(kind, entry).await.map_err(fail)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.0, message: created_message(kind).to_string() }),
    ))
}
