use tracing::warn;

use racar_core::domain::taxonomy::SLUG_FIELD;
use racar_core::{ApplicationError, DocumentRef, EntityKind};

use crate::store::{DocumentStore, FieldFilter};

/// Turns a human-readable slug into a reference to the matching document.
pub struct ReferenceResolver<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// When several documents share the slug, the earliest inserted wins.
    pub async fn resolve(&self, kind: EntityKind, slug: &str) -> Result<DocumentRef, ApplicationError> {
        let matches =
            self.store.find(kind.collection(), &FieldFilter::equal(SLUG_FIELD, slug)).await?;

        if matches.len() > 1 {
            warn!(
                event_name = "catalog.resolver.ambiguous_slug",
                entity = kind.label(),
                slug = %slug,
                matches = matches.len(),
                "slug matches several documents, using the earliest"
            );
        }

        matches
            .into_iter()
            .next()
            .map(|document| document.reference)
            .ok_or_else(|| kind.not_found(slug).into())
    }

    /// Resolves in order and stops at the first slug that does not exist.
    pub async fn resolve_all(
        &self,
        kind: EntityKind,
        slugs: &[String],
    ) -> Result<Vec<DocumentRef>, ApplicationError> {
        let mut references = Vec::with_capacity(slugs.len());
        for slug in slugs {
            references.push(self.resolve(kind, slug).await?);
        }
        Ok(references)
    }
}
