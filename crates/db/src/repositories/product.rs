use std::sync::Arc;

use tracing::info;

use racar_core::domain::product::fields;
use racar_core::{
    ApplicationError, Collection, DocumentId, DocumentRecord, EntityKind, NewProduct, NotFound,
    Product, ProductFilter,
};

use super::ReferenceResolver;
use crate::store::{DocumentStore, FieldFilter};

/// Product reads and writes on top of a document store.
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// An empty result is a success only for the unfiltered listing; every
    /// filtered query reports it as not found.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<DocumentRecord>, ApplicationError> {
        let resolver = ReferenceResolver::new(self.store.as_ref());

        let (documents, when_empty) = match filter {
            ProductFilter::All => {
                let documents = self.store.list(Collection::Products).await?;
                return Ok(documents.into_iter().map(DocumentRecord::from).collect());
            }
            ProductFilter::Id(id) => return Ok(vec![self.get(id).await?]),
            ProductFilter::Name(name) => (
                self.find(FieldFilter::equal(fields::NAME, name.as_str())).await?,
                NotFound::ProductsByName,
            ),
            ProductFilter::Brand(slug) => {
                let brand = resolver.resolve(EntityKind::Brand, slug).await?;
                (
                    self.find(FieldFilter::equal(fields::BRAND, brand.path())).await?,
                    NotFound::ProductsByBrand,
                )
            }
            ProductFilter::Model(slug) => {
                let model = resolver.resolve(EntityKind::Model, slug).await?;
                (
                    self.find(FieldFilter::array_contains(fields::MODELS, model.path())).await?,
                    NotFound::ProductsByModel,
                )
            }
            ProductFilter::ProductType(slug) => {
                let product_type = resolver.resolve(EntityKind::ProductType, slug).await?;
                (
                    self.find(FieldFilter::equal(fields::PRODUCT_TYPE, product_type.path())).await?,
                    NotFound::ProductsByType,
                )
            }
        };

        if documents.is_empty() {
            return Err(when_empty.into());
        }
        Ok(documents.into_iter().map(DocumentRecord::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<DocumentRecord, ApplicationError> {
        self.store
            .get_by_id(Collection::Products, &DocumentId(id.to_string()))
            .await?
            .map(DocumentRecord::from)
            .ok_or_else(|| NotFound::Product { id: id.to_string() }.into())
    }

    /// Every slug is resolved before the single insert, so a failed
    /// resolution leaves the store untouched.
    pub async fn create(&self, request: NewProduct) -> Result<DocumentId, ApplicationError> {
        let resolver = ReferenceResolver::new(self.store.as_ref());
        let brand = resolver.resolve(EntityKind::Brand, &request.brand_slug).await?;
        let product_type = resolver.resolve(EntityKind::ProductType, &request.product_type_slug).await?;
        let models = resolver.resolve_all(EntityKind::Model, &request.model_slugs).await?;

        let product = Product::resolved(request, brand, models, product_type)?;
        let name = product.name.clone();
        let model_count = product.models.len();
        let id = self.store.insert(Collection::Products, product.into_document()).await?;

        info!(
            event_name = "catalog.product.created",
            product_id = %id,
            product_name = %name,
            model_count,
            "product created"
        );
        Ok(id)
    }

    async fn find(&self, filter: FieldFilter) -> Result<Vec<racar_core::Document>, ApplicationError> {
        Ok(self.store.find(Collection::Products, &filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use racar_core::{
        ApplicationError, Collection, DocumentData, DomainError, NewProduct, NotFound,
        ProductDraft, ProductFilter,
    };

    use crate::repositories::ProductRepository;
    use crate::store::{DocumentStore, InMemoryDocumentStore};

    fn data(value: serde_json::Value) -> DocumentData {
        value.as_object().cloned().expect("object literal")
    }

    async fn catalog() -> (Arc<InMemoryDocumentStore>, ProductRepository) {
        let store = Arc::new(InMemoryDocumentStore::new());
        for (collection, slug) in [
            (Collection::Brands, "toyota"),
            (Collection::Brands, "nissan"),
            (Collection::Models, "corolla"),
            (Collection::Models, "camry"),
            (Collection::Models, "sentra"),
            (Collection::ProductTypes, "filtros"),
            (Collection::ProductTypes, "frenos"),
        ] {
            store.insert(collection, data(json!({ "slug": slug, "nombre": slug }))).await.expect("seed");
        }
        let repository = ProductRepository::new(store.clone());
        (store, repository)
    }

    fn request(brand: &str, models: &[&str], product_type: &str) -> NewProduct {
        let draft: ProductDraft = serde_json::from_value(json!({
            "nombre": "Filtro A",
            "descripcion": "d",
            "imagenURL": "u",
            "anioInicio": "2010",
            "anioFin": "2015",
            "marcaSlug": brand,
            "modelosSlug": models,
            "tipoProductoSlug": product_type
        }))
        .expect("draft");
        draft.validate().expect("valid request")
    }

    #[tokio::test]
    async fn create_stores_model_references_in_input_order() {
        let (store, repository) = catalog().await;

        let id = repository
            .create(request("toyota", &["camry", "corolla"], "filtros"))
            .await
            .expect("product created");

        let record = repository.get(&id.0).await.expect("stored product");
        let models = record.data["modelo"].as_array().expect("model array");
        assert_eq!(models.len(), 2);

        let model_slugs = {
            let mut slugs = Vec::new();
            for reference in models {
                let path = reference.as_str().expect("reference string");
                let model_id = path.trim_start_matches("modelo/");
                let model = store
                    .get_by_id(Collection::Models, &racar_core::DocumentId(model_id.to_string()))
                    .await
                    .expect("read model")
                    .expect("model exists");
                slugs.push(model.data["slug"].clone());
            }
            slugs
        };
        assert_eq!(model_slugs, vec![json!("camry"), json!("corolla")]);
        assert_eq!(record.data["anioInicio"], json!(2010));
        assert!(record.data["marca"].as_str().is_some_and(|path| path.starts_with("marca/")));
    }

    #[tokio::test]
    async fn unknown_model_aborts_without_writing() {
        let (store, repository) = catalog().await;

        let error = repository
            .create(request("toyota", &["corolla", "yaris", "camry"], "filtros"))
            .await
            .expect_err("yaris is unknown");

        assert_eq!(error, ApplicationError::NotFound(NotFound::Model { slug: "yaris".into() }));
        assert_eq!(store.len(Collection::Products).await, 0);
    }

    #[tokio::test]
    async fn unknown_brand_or_type_aborts_without_writing() {
        let (store, repository) = catalog().await;

        let brand_error =
            repository.create(request("honda", &["corolla"], "filtros")).await.expect_err("no brand");
        let type_error =
            repository.create(request("toyota", &["corolla"], "luces")).await.expect_err("no type");

        assert_eq!(brand_error, ApplicationError::NotFound(NotFound::Brand { slug: "honda".into() }));
        assert_eq!(
            type_error,
            ApplicationError::NotFound(NotFound::ProductType { slug: "luces".into() })
        );
        assert_eq!(store.len(Collection::Products).await, 0);
    }

    #[tokio::test]
    async fn unfiltered_listing_of_an_empty_catalog_is_ok_but_filtered_is_not_found() {
        let (_store, repository) = catalog().await;

        let all = repository.list(&ProductFilter::All).await.expect("empty listing");
        let by_name = repository.list(&ProductFilter::Name("Filtro A".into())).await;

        assert!(all.is_empty());
        assert_eq!(by_name, Err(ApplicationError::NotFound(NotFound::ProductsByName)));
    }

    #[tokio::test]
    async fn slug_filters_follow_references() {
        let (_store, repository) = catalog().await;
        repository.create(request("toyota", &["corolla", "camry"], "filtros")).await.expect("create");
        repository.create(request("nissan", &["sentra"], "frenos")).await.expect("create");

        let toyota = repository.list(&ProductFilter::Brand("toyota".into())).await.expect("by brand");
        let camry = repository.list(&ProductFilter::Model("camry".into())).await.expect("by model");
        let frenos =
            repository.list(&ProductFilter::ProductType("frenos".into())).await.expect("by type");

        assert_eq!(toyota.len(), 1);
        assert_eq!(camry.len(), 1);
        assert_eq!(camry[0].id, toyota[0].id);
        assert_eq!(frenos.len(), 1);
        assert_ne!(frenos[0].id, toyota[0].id);
    }

    #[tokio::test]
    async fn resolvable_slug_without_products_is_not_found_for_products() {
        let (_store, repository) = catalog().await;

        let result = repository.list(&ProductFilter::Brand("nissan".into())).await;
        let missing_brand = repository.list(&ProductFilter::Brand("honda".into())).await;

        assert_eq!(result, Err(ApplicationError::NotFound(NotFound::ProductsByBrand)));
        assert_eq!(
            missing_brand,
            Err(ApplicationError::NotFound(NotFound::Brand { slug: "honda".into() }))
        );
    }

    #[tokio::test]
    async fn unknown_model_or_type_slug_names_the_missing_entity() {
        let (_store, repository) = catalog().await;
        repository.create(request("toyota", &["corolla"], "filtros")).await.expect("create");

        let by_model = repository.list(&ProductFilter::Model("yaris".into())).await;
        let by_type = repository.list(&ProductFilter::ProductType("luces".into())).await;

        assert_eq!(by_model, Err(ApplicationError::NotFound(NotFound::Model { slug: "yaris".into() })));
        assert_eq!(
            by_type,
            Err(ApplicationError::NotFound(NotFound::ProductType { slug: "luces".into() }))
        );
    }

    #[tokio::test]
    async fn id_lookup_is_a_point_read() {
        let (_store, repository) = catalog().await;
        let id = repository.create(request("toyota", &["corolla"], "filtros")).await.expect("create");

        let found = repository.list(&ProductFilter::Id(id.0.clone())).await.expect("by id");
        let missing = repository.get("does-not-exist").await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id.0);
        assert_eq!(
            missing,
            Err(ApplicationError::NotFound(NotFound::Product { id: "does-not-exist".into() }))
        );
    }

    #[test]
    fn empty_model_list_never_reaches_the_repository() {
        let draft: ProductDraft = serde_json::from_value(json!({
            "nombre": "Filtro A",
            "descripcion": "d",
            "imagenURL": "u",
            "anioInicio": 2010,
            "anioFin": 2015,
            "marcaSlug": "toyota",
            "modelosSlug": [],
            "tipoProductoSlug": "filtros"
        }))
        .expect("draft");

        assert_eq!(draft.validate(), Err(DomainError::EmptyModelList));
    }
}
