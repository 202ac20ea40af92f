use serde::Deserialize;
use serde_json::Value;

use super::document::{Collection, DocumentData};
use super::input::required_text;
use crate::errors::{DomainError, NotFound};

pub const SLUG_FIELD: &str = "slug";
pub const NAME_FIELD: &str = "nombre";

/// Collections whose documents are looked up by slug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Brand,
    Model,
    ProductType,
}

impl EntityKind {
    pub const fn collection(self) -> Collection {
        match self {
            Self::Brand => Collection::Brands,
            Self::Model => Collection::Models,
            Self::ProductType => Collection::ProductTypes,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Model => "model",
            Self::ProductType => "product_type",
        }
    }

    /// Article plus noun, used in user-facing messages.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Brand => "una marca",
            Self::Model => "un modelo",
            Self::ProductType => "un tipo de producto",
        }
    }

    pub fn not_found(self, slug: impl Into<String>) -> NotFound {
        let slug = slug.into();
        match self {
            Self::Brand => NotFound::Brand { slug },
            Self::Model => NotFound::Model { slug },
            Self::ProductType => NotFound::ProductType { slug },
        }
    }
}

/// Brand, model or product type as stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub slug: String,
    pub name: String,
}

impl TaxonomyEntry {
    pub fn into_document(self) -> DocumentData {
        let mut data = DocumentData::new();
        data.insert(SLUG_FIELD.to_string(), Value::String(self.slug));
        data.insert(NAME_FIELD.to_string(), Value::String(self.name));
        data
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaxonomyDraft {
    #[serde(default)]
    pub slug: Option<Value>,
    #[serde(default, rename = "nombre")]
    pub name: Option<Value>,
}

impl TaxonomyDraft {
    pub fn validate(self) -> Result<TaxonomyEntry, DomainError> {
        let slug = required_text(self.slug, SLUG_FIELD)?;
        let name = required_text(self.name, NAME_FIELD)?;
        if !is_valid_slug(&slug) {
            return Err(DomainError::InvalidSlug(slug));
        }
        Ok(TaxonomyEntry { slug, name })
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
}
