use std::sync::Arc;

use tracing::info;

use racar_core::domain::comment::fields;
use racar_core::{ApplicationError, Collection, DocumentId, DocumentRecord, NewComment};

use crate::store::{DocumentStore, SortDirection};

#[derive(Clone)]
pub struct CommentRepository {
    store: Arc<dyn DocumentStore>,
}

impl CommentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The creation time always comes from the store clock.
    pub async fn add(&self, comment: NewComment) -> Result<DocumentId, ApplicationError> {
        let created_at = self.store.server_timestamp();
        let id = self.store.insert(Collection::Comments, comment.into_document(created_at)).await?;

        info!(
            event_name = "feed.comment.created",
            comment_id = %id,
            created_at = %created_at,
            "comment stored"
        );
        Ok(id)
    }

    /// Newest first. Comments without a creation time are not listed.
    pub async fn list_recent(&self) -> Result<Vec<DocumentRecord>, ApplicationError> {
        let documents = self
            .store
            .list_ordered(Collection::Comments, fields::CREATED_AT, SortDirection::Descending)
            .await?;
        Ok(documents.into_iter().map(DocumentRecord::from).collect())
    }
}
