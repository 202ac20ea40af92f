use axum::{body::Bytes, extract::State, Json};
use racar_core::{ApplicationError, CommentDraft, DocumentRecord};

use super::{parse_body, AppState, MessageResponse};
use crate::error::{reject, ApiResult, Operation};

/// The body's own `fecha`, if any, is ignored; the store stamps the comment.
pub async fn add_comment(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<MessageResponse>> {
    let fail = |error: ApplicationError| reject(Operation::AddComment, error);

    let draft: CommentDraft = parse_body(&body).map_err(fail)?;
    let comment = draft.validate().map_err(|error| fail(error.into()))?;
    state.comments.add(comment).await.map_err(fail)?;

    Ok(Json(MessageResponse { message: "Comentario agregado correctamente".to_string() }))
}

pub async fn get_all_comments(State(state): State<AppState>) -> ApiResult<Json<Vec<DocumentRecord>>> {
    let comments = state
        .comments
        .list_recent()
        .await
        .map_err(|error| reject(Operation::ListComments, error))?;
    Ok(Json(comments))
}
