//! Generic document-store interface and its backends.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use racar_core::{ApplicationError, Collection, Document, DocumentData, DocumentId, ServerTimestamp};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("invalid field path `{0}`")]
    InvalidFieldPath(String),
    #[error("unsupported filter value for field `{0}`; only strings, numbers and booleans are comparable")]
    UnsupportedFilterValue(String),
    #[error("a document with {field} = {value} already exists")]
    UniqueViolation { field: String, value: Value },
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    /// The field holds an array with at least one element equal to the value.
    ArrayContains,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Equal, value: value.into() }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::ArrayContains, value: value.into() }
    }

    /// Rejects filters a backend could not evaluate identically to the others.
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_field(&self.field)?;
        match self.value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
            _ => Err(StoreError::UnsupportedFilterValue(self.field.clone())),
        }
    }

    pub fn matches(&self, data: &DocumentData) -> bool {
        match (self.op, data.get(&self.field)) {
            (FilterOp::Equal, Some(stored)) => stored == &self.value,
            (FilterOp::ArrayContains, Some(Value::Array(items))) => items.contains(&self.value),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Storage seam every repository goes through.
///
/// Result sets come back in insertion order unless an ordering is requested.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    async fn find(
        &self,
        collection: Collection,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StoreError>;

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert(
        &self,
        collection: Collection,
        data: DocumentData,
    ) -> Result<DocumentId, StoreError>;

    /// Inserts unless a document of the collection already holds the same
    /// value under `unique_field`. The check and the write are atomic.
    async fn insert_unique(
        &self,
        collection: Collection,
        data: DocumentData,
        unique_field: &str,
    ) -> Result<DocumentId, StoreError>;

    /// Documents lacking `field` are left out. Ties keep insertion order
    /// ascending and reverse it descending.
    async fn list_ordered(
        &self,
        collection: Collection,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError>;

    fn server_timestamp(&self) -> ServerTimestamp;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub fn new_document_id() -> DocumentId {
    DocumentId(Uuid::new_v4().simple().to_string())
}

pub(crate) fn validate_field(field: &str) -> Result<(), StoreError> {
    let valid = !field.is_empty()
        && field.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && !field.starts_with(|ch: char| ch.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidFieldPath(field.to_string()))
    }
}

/// Cross-type ordering for in-process sorts: null, booleans, numbers,
/// strings, arrays, objects.
pub(crate) fn compare_values(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}
