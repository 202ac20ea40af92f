use std::sync::Arc;

use tracing::info;

use racar_core::domain::taxonomy::SLUG_FIELD;
use racar_core::{ApplicationError, Document, DocumentId, EntityKind, TaxonomyEntry};

use crate::store::{DocumentStore, FieldFilter, StoreError};

/// Brands, models and product types share one shape and one repository.
#[derive(Clone)]
pub struct TaxonomyRepository {
    store: Arc<dyn DocumentStore>,
}

impl TaxonomyRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn add(&self, kind: EntityKind, entry: TaxonomyEntry) -> Result<DocumentId, ApplicationError> {
        let slug = entry.slug.clone();
        let id = self
            .store
            .insert_unique(kind.collection(), entry.into_document(), SLUG_FIELD)
            .await
            .map_err(|error| match error {
                StoreError::UniqueViolation { .. } => ApplicationError::Conflict(format!(
                    "Ya existe {} con el slug `{}`",
                    kind.display_name(),
                    slug
                )),
                other => other.into(),
            })?;
        info!(
            event_name = "catalog.taxonomy.created",
            entity = kind.label(),
            slug = %slug,
            id = %id,
            "taxonomy entry created"
        );
        Ok(id)
    }

    pub async fn find_by_slug(
        &self,
        kind: EntityKind,
        slug: &str,
    ) -> Result<Option<Document>, ApplicationError> {
        let matches = self.store.find(kind.collection(), &FieldFilter::equal(SLUG_FIELD, slug)).await?;
        Ok(matches.into_iter().next())
    }

    pub async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, ApplicationError> {
        Ok(self.store.list(kind.collection()).await?)
    }
}
