use serde::Deserialize;
use serde_json::Value;

use super::document::{DocumentData, DocumentRef};
use super::input::{required_text, required_text_list, required_year};
use crate::errors::DomainError;

/// Stored field names of a product document.
pub mod fields {
    pub const NAME: &str = "nombre";
    pub const DESCRIPTION: &str = "descripcion";
    pub const IMAGE_URL: &str = "imagenURL";
    pub const START_YEAR: &str = "anioInicio";
    pub const END_YEAR: &str = "anioFin";
    pub const BRAND: &str = "marca";
    pub const MODELS: &str = "modelo";
    pub const PRODUCT_TYPE: &str = "tipoProducto";
}

/// Creation payload exactly as received. Every field is optional here so
/// that shape problems surface as validation errors rather than decode errors.
#[derive(Debug, Default, Deserialize)]
pub struct ProductDraft {
    #[serde(default, rename = "nombre")]
    pub name: Option<Value>,
    #[serde(default, rename = "descripcion")]
    pub description: Option<Value>,
    #[serde(default, rename = "imagenURL")]
    pub image_url: Option<Value>,
    #[serde(default, rename = "anioInicio")]
    pub start_year: Option<Value>,
    #[serde(default, rename = "anioFin")]
    pub end_year: Option<Value>,
    #[serde(default, rename = "marcaSlug")]
    pub brand_slug: Option<Value>,
    #[serde(default, rename = "modelosSlug")]
    pub model_slugs: Option<Value>,
    #[serde(default, rename = "tipoProductoSlug")]
    pub product_type_slug: Option<Value>,
}

/// Validated creation request; slugs are still unresolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub start_year: i32,
    pub end_year: i32,
    pub brand_slug: String,
    pub model_slugs: Vec<String>,
    pub product_type_slug: String,
}

impl ProductDraft {
    pub fn validate(self) -> Result<NewProduct, DomainError> {
        Ok(NewProduct {
            name: required_text(self.name, fields::NAME)?,
            description: required_text(self.description, fields::DESCRIPTION)?,
            image_url: required_text(self.image_url, fields::IMAGE_URL)?,
            start_year: required_year(self.start_year, fields::START_YEAR)?,
            end_year: required_year(self.end_year, fields::END_YEAR)?,
            brand_slug: required_text(self.brand_slug, "marcaSlug")?,
            model_slugs: required_text_list(self.model_slugs, "modelosSlug")?,
            product_type_slug: required_text(self.product_type_slug, "tipoProductoSlug")?,
        })
    }
}

/// Product with every reference resolved, ready to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub start_year: i32,
    pub end_year: i32,
    pub brand: DocumentRef,
    pub models: Vec<DocumentRef>,
    pub product_type: DocumentRef,
}

impl Product {
    pub fn resolved(
        request: NewProduct,
        brand: DocumentRef,
        models: Vec<DocumentRef>,
        product_type: DocumentRef,
    ) -> Result<Self, DomainError> {
        if models.is_empty() {
            return Err(DomainError::EmptyModelList);
        }

        Ok(Self {
            name: request.name,
            description: request.description,
            image_url: request.image_url,
            start_year: request.start_year,
            end_year: request.end_year,
            brand,
            models,
            product_type,
        })
    }

    pub fn into_document(self) -> DocumentData {
        let mut data = DocumentData::new();
        data.insert(fields::NAME.to_string(), Value::String(self.name));
        data.insert(fields::DESCRIPTION.to_string(), Value::String(self.description));
        data.insert(fields::IMAGE_URL.to_string(), Value::String(self.image_url));
        data.insert(fields::START_YEAR.to_string(), Value::from(self.start_year));
        data.insert(fields::END_YEAR.to_string(), Value::from(self.end_year));
        data.insert(fields::BRAND.to_string(), Value::from(&self.brand));
        data.insert(
            fields::MODELS.to_string(),
            Value::Array(self.models.iter().map(Value::from).collect()),
        );
        data.insert(fields::PRODUCT_TYPE.to_string(), Value::from(&self.product_type));
        data
    }
}

/// The single criterion a product query may carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductFilter {
    All,
    Name(String),
    Id(String),
    Brand(String),
    Model(String),
    ProductType(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Name,
    Id,
    Brand,
    Model,
    ProductType,
}

impl FilterKind {
    pub const fn parameter(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::ProductType => "tipo",
        }
    }

    pub const fn missing_message(self) -> &'static str {
        match self {
            Self::Name => "Falta el nombre del producto",
            Self::Id => "Falta el ID del producto",
            Self::Brand => "Falta el slug de la marca",
            Self::Model => "Falta el slug del modelo",
            Self::ProductType => "Falta el slug del tipo de producto",
        }
    }

    fn filter(self, value: String) -> ProductFilter {
        match self {
            Self::Name => ProductFilter::Name(value),
            Self::Id => ProductFilter::Id(value),
            Self::Brand => ProductFilter::Brand(value),
            Self::Model => ProductFilter::Model(value),
            Self::ProductType => ProductFilter::ProductType(value),
        }
    }
}

/// Query string accepted by the product endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductQueryParams {
    pub name: Option<String>,
    pub id: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub tipo: Option<String>,
}

impl ProductQueryParams {
    fn value(&self, kind: FilterKind) -> Option<&str> {
        let value = match kind {
            FilterKind::Name => self.name.as_deref(),
            FilterKind::Id => self.id.as_deref(),
            FilterKind::Brand => self.brand.as_deref(),
            FilterKind::Model => self.model.as_deref(),
            FilterKind::ProductType => self.tipo.as_deref(),
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }

    /// The value of a mandatory parameter, or the endpoint's "missing" message.
    pub fn required(&self, kind: FilterKind) -> Result<String, DomainError> {
        self.value(kind).map(str::to_string).ok_or(DomainError::MissingParameter {
            parameter: kind.parameter(),
            message: kind.missing_message(),
        })
    }
}

impl ProductFilter {
    /// Filter for a single-purpose endpoint whose parameter is mandatory.
    pub fn require(kind: FilterKind, params: &ProductQueryParams) -> Result<Self, DomainError> {
        params.required(kind).map(|value| kind.filter(value))
    }

    /// Zero or one criterion; no criterion means every product.
    pub fn from_params(params: &ProductQueryParams) -> Result<Self, DomainError> {
        let kinds = [
            FilterKind::Name,
            FilterKind::Id,
            FilterKind::Brand,
            FilterKind::Model,
            FilterKind::ProductType,
        ];
        let present =
            kinds.into_iter().filter(|kind| params.value(*kind).is_some()).collect::<Vec<_>>();

        match present.as_slice() {
            [] => Ok(Self::All),
            [kind] => Self::require(*kind, params),
            many => Err(DomainError::ConflictingFilters(
                many.iter().map(|kind| kind.parameter()).collect::<Vec<_>>().join(", "),
            )),
        }
    }
}
