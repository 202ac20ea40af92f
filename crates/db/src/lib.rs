pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use connection::{connect, connect_existing, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeedDataset, SeedResult, VerificationResult};
pub use repositories::{CommentRepository, ProductRepository, ReferenceResolver, TaxonomyRepository};
pub use store::{
    DocumentStore, FieldFilter, FilterOp, InMemoryDocumentStore, SortDirection, SqliteDocumentStore,
    StoreError,
};
