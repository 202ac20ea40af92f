use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Stored field set of a document.
pub type DocumentData = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Brands,
    Models,
    ProductTypes,
    Comments,
}

impl Collection {
    pub const ALL: [Collection; 5] =
        [Self::Products, Self::Brands, Self::Models, Self::ProductTypes, Self::Comments];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "productos",
            Self::Brands => "marca",
            Self::Models => "modelo",
            Self::ProductTypes => "tipo_producto",
            Self::Comments => "comentarios",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReferenceParseError {
    #[error("unknown collection `{0}`")]
    UnknownCollection(String),
    #[error("reference `{0}` must have the form <collection>/<id>")]
    Malformed(String),
}

impl FromStr for Collection {
    type Err = ReferenceParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.as_str() == value)
            .ok_or_else(|| ReferenceParseError::UnknownCollection(value.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque pointer to a stored document. Travels as `"<collection>/<id>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub collection: Collection,
    pub id: DocumentId,
}

impl DocumentRef {
    pub fn new(collection: Collection, id: DocumentId) -> Self {
        Self { collection, id }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl FromStr for DocumentRef {
    type Err = ReferenceParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (collection, id) = value
            .split_once('/')
            .filter(|(_, id)| !id.is_empty() && !id.contains('/'))
            .ok_or_else(|| ReferenceParseError::Malformed(value.to_string()))?;
        Ok(Self { collection: collection.parse()?, id: DocumentId(id.to_string()) })
    }
}

impl From<&DocumentRef> for Value {
    fn from(reference: &DocumentRef) -> Self {
        Value::String(reference.path())
    }
}

impl Serialize for DocumentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored document as the store hands it back.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub reference: DocumentRef,
    pub data: DocumentData,
}

impl Document {
    pub fn id(&self) -> &DocumentId {
        &self.reference.id
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Wire shape of a read: the stored fields plus the document id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(flatten)]
    pub data: DocumentData,
}

impl From<Document> for DocumentRecord {
    fn from(document: Document) -> Self {
        let mut data = document.data;
        // the document id shadows any stored `id` field
        data.remove("id");
        Self { id: document.reference.id.0, data }
    }
}
