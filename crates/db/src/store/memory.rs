use std::collections::HashMap;

use tokio::sync::RwLock;

use racar_core::{
    Collection, Document, DocumentData, DocumentId, DocumentRef, MonotonicClock, ServerTimestamp,
};

use super::{
    compare_values, new_document_id, validate_field, DocumentStore, FieldFilter, SortDirection,
    StoreError,
};

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    clock: MonotonicClock,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map_or(0, Vec::len)
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StoreError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents.iter().filter(|document| filter.matches(&document.data)).cloned().collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|document| document.id() == id))
            .cloned())
    }

    async fn insert(
        &self,
        collection: Collection,
        data: DocumentData,
    ) -> Result<DocumentId, StoreError> {
        let id = new_document_id();
        let document = Document { reference: DocumentRef::new(collection, id.clone()), data };
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(document);
        Ok(id)
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        data: DocumentData,
        unique_field: &str,
    ) -> Result<DocumentId, StoreError> {
        validate_field(unique_field)?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        if let Some(value) = data.get(unique_field) {
            if documents.iter().any(|document| document.field(unique_field) == Some(value)) {
                return Err(StoreError::UniqueViolation {
                    field: unique_field.to_string(),
                    value: value.clone(),
                });
            }
        }

        let id = new_document_id();
        documents.push(Document { reference: DocumentRef::new(collection, id.clone()), data });
        Ok(id)
    }

    async fn list_ordered(
        &self,
        collection: Collection,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        validate_field(field)?;
        let mut documents = self
            .list(collection)
            .await?
            .into_iter()
            .filter(|document| document.data.contains_key(field))
            .collect::<Vec<_>>();

        // stable sort, so reversing afterwards also reverses ties
        documents.sort_by(|left, right| match (left.field(field), right.field(field)) {
            (Some(left), Some(right)) => compare_values(left, right),
            _ => std::cmp::Ordering::Equal,
        });
        if direction == SortDirection::Descending {
            documents.reverse();
        }
        Ok(documents)
    }

    fn server_timestamp(&self) -> ServerTimestamp {
        self.clock.now()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
