use axum::{http::StatusCode, Json};
use racar_core::{ApplicationError, EntityKind};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<T, ApiError>;

/// Endpoint family a failure happened in; picks the generic 500 message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    ListProducts,
    GetProduct,
    AddProduct,
    AddComment,
    ListComments,
    AddTaxonomy(EntityKind),
}

impl Operation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListProducts => "list_products",
            Self::GetProduct => "get_product",
            Self::AddProduct => "add_product",
            Self::AddComment => "add_comment",
            Self::ListComments => "list_comments",
            Self::AddTaxonomy(_) => "add_taxonomy",
        }
    }

    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::ListProducts => "Error al obtener productos",
            Self::GetProduct => "Error al obtener producto",
            Self::AddProduct => "Error al agregar el producto",
            Self::AddComment => "Error al agregar el comentario",
            Self::ListComments => "Error al obtener comentarios",
            Self::AddTaxonomy(EntityKind::Brand) => "Error al agregar la marca",
            Self::AddTaxonomy(EntityKind::Model) => "Error al agregar el modelo",
            Self::AddTaxonomy(EntityKind::ProductType) => "Error al agregar el tipo de producto",
        }
    }
}

/// Maps an application error to the HTTP reply. Internal details go to the
/// log under a fresh correlation id and never into the body.
pub fn reject(operation: Operation, error: ApplicationError) -> ApiError {
    let interface = error.into_interface(Uuid::new_v4().simple().to_string());
    let status =
        StatusCode::from_u16(interface.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = match interface.public_message() {
        Some(message) => {
            info!(
                event_name = "api.request.rejected",
                operation = operation.name(),
                correlation_id = %interface.correlation_id(),
                status = status.as_u16(),
                reason = %message,
                "request rejected"
            );
            message.to_string()
        }
        None => {
            error!(
                event_name = "api.request.failed",
                operation = operation.name(),
                correlation_id = %interface.correlation_id(),
                error = %interface,
                "request failed"
            );
            operation.failure_message().to_string()
        }
    };

    (status, Json(ErrorBody { error: message }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use racar_core::{ApplicationError, DomainError, EntityKind, NotFound};

    use super::{reject, Operation};

    #[test]
    fn persistence_failures_hide_their_detail() {
        let (status, body) = reject(
            Operation::ListComments,
            ApplicationError::Persistence("database error: disk I/O error".into()),
        );

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0.error, "Error al obtener comentarios");
    }

    #[test]
    fn caller_errors_keep_their_message() {
        let (bad_request, missing) =
            reject(Operation::AddComment, DomainError::MissingFields.into());
        let (not_found, brand) = reject(
            Operation::ListProducts,
            NotFound::Brand { slug: "honda".into() }.into(),
        );
        let (conflict, _) = reject(
            Operation::AddTaxonomy(EntityKind::Brand),
            ApplicationError::Conflict("Ya existe una marca con el slug `toyota`".into()),
        );

        assert_eq!(bad_request, StatusCode::BAD_REQUEST);
        assert_eq!(missing.0.error, "Todos los campos son obligatorios");
        assert_eq!(not_found, StatusCode::NOT_FOUND);
        assert_eq!(brand.0.error, "Marca no encontrada: honda");
        assert_eq!(conflict, StatusCode::CONFLICT);
    }
}
