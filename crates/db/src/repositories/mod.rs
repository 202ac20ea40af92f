//! Catalog and feed repositories. Every repository talks to storage through
//! [`DocumentStore`](crate::store::DocumentStore) so the same code runs
//! against SQLite and the in-memory backend.

pub mod comment;
pub mod product;
pub mod resolver;
pub mod taxonomy;

pub use comment::CommentRepository;
pub use product::ProductRepository;
pub use resolver::ReferenceResolver;
pub use taxonomy::TaxonomyRepository;
