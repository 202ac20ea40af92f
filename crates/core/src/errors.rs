use thiserror::Error;

/// Input problems detected before any store access.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    MissingParameter { parameter: &'static str, message: &'static str },
    #[error("Todos los campos son obligatorios")]
    MissingFields,
    #[error("Falta el campo obligatorio: {0}")]
    MissingField(&'static str),
    #[error("El campo {field} no es válido: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("modelosSlug debe contener al menos un modelo")]
    EmptyModelList,
    #[error("Solo se permite un criterio de búsqueda, se recibieron: {0}")]
    ConflictingFilters(String),
    #[error("El slug `{0}` no es válido (use minúsculas, dígitos, '-' o '_')")]
    InvalidSlug(String),
    #[error("El cuerpo de la solicitud no es un JSON válido")]
    MalformedBody,
    #[error("Parámetros de consulta inválidos")]
    MalformedQuery,
}

/// Entity-specific not-found conditions. Display text is the user-facing message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("Marca no encontrada: {slug}")]
    Brand { slug: String },
    #[error("Modelo no encontrado: {slug}")]
    Model { slug: String },
    #[error("Tipo de producto no encontrado: {slug}")]
    ProductType { slug: String },
    #[error("Producto no encontrado")]
    Product { id: String },
    #[error("No se encontraron productos con ese nombre")]
    ProductsByName,
    #[error("No se encontraron productos de esta marca")]
    ProductsByBrand,
    #[error("No se encontraron productos de este modelo")]
    ProductsByModel,
    #[error("No se encontraron productos de este tipo")]
    ProductsByType,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("{0}")]
    Conflict(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Internal { .. } => 500,
        }
    }

    /// Message safe to return to a caller. Internal failures never expose
    /// their detail, callers substitute an operation-level message instead.
    pub fn public_message(&self) -> Option<&str> {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. } => Some(message),
            Self::Internal { .. } => None,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::NotFound(error) => {
                Self::NotFound { message: error.to_string(), correlation_id }
            }
            ApplicationError::Conflict(message) => Self::Conflict { message, correlation_id },
            ApplicationError::Persistence(message) => Self::Internal { message, correlation_id },
        }
    }
}
