pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;

pub use clock::{MonotonicClock, ServerTimestamp};
pub use domain::comment::{CommentDraft, NewComment};
pub use domain::document::{
    Collection, Document, DocumentData, DocumentId, DocumentRecord, DocumentRef,
};
pub use domain::product::{
    FilterKind, NewProduct, Product, ProductDraft, ProductFilter, ProductQueryParams,
};
pub use domain::taxonomy::{EntityKind, TaxonomyDraft, TaxonomyEntry};
pub use errors::{ApplicationError, DomainError, InterfaceError, NotFound};
