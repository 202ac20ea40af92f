use racar_core::{
    ApplicationError, Collection, EntityKind, NewProduct, ProductFilter, TaxonomyEntry,
};

use crate::repositories::{ProductRepository, TaxonomyRepository};

struct SeedEntry {
    slug: &'static str,
    name: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
    start_year: i32,
    end_year: i32,
    brand: &'static str,
    models: &'static [&'static str],
    product_type: &'static str,
}

const SEED_BRANDS: &[SeedEntry] = &[
    SeedEntry { slug: "toyota", name: "Toyota" },
    SeedEntry { slug: "nissan", name: "Nissan" },
    SeedEntry { slug: "chevrolet", name: "Chevrolet" },
];

const SEED_MODELS: &[SeedEntry] = &[
    SeedEntry { slug: "corolla", name: "Corolla" },
    SeedEntry { slug: "camry", name: "Camry" },
    SeedEntry { slug: "sentra", name: "Sentra" },
    SeedEntry { slug: "versa", name: "Versa" },
    SeedEntry { slug: "aveo", name: "Aveo" },
];

const SEED_PRODUCT_TYPES: &[SeedEntry] = &[
    SeedEntry { slug: "filtros", name: "Filtros" },
    SeedEntry { slug: "frenos", name: "Frenos" },
    SeedEntry { slug: "suspension", name: "Suspensión" },
];

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Filtro de aceite",
        description: "Filtro de aceite de alto flujo",
        image_url: "https://img.racar.example/filtro-aceite.png",
        start_year: 2010,
        end_year: 2018,
        brand: "toyota",
        models: &["corolla", "camry"],
        product_type: "filtros",
    },
    SeedProduct {
        name: "Pastillas de freno delanteras",
        description: "Juego de pastillas cerámicas",
        image_url: "https://img.racar.example/pastillas.png",
        start_year: 2012,
        end_year: 2020,
        brand: "nissan",
        models: &["sentra", "versa"],
        product_type: "frenos",
    },
    SeedProduct {
        name: "Amortiguador trasero",
        description: "Amortiguador de gas",
        image_url: "https://img.racar.example/amortiguador.png",
        start_year: 2008,
        end_year: 2016,
        brand: "chevrolet",
        models: &["aveo"],
        product_type: "suspension",
    },
    SeedProduct {
        name: "Filtro de aire",
        description: "Filtro de aire de papel plisado",
        image_url: "https://img.racar.example/filtro-aire.png",
        start_year: 2014,
        end_year: 2022,
        brand: "nissan",
        models: &["versa"],
        product_type: "filtros",
    },
];

/// Demo catalog used by `racar seed` and the integration tests.
pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    /// Loading twice leaves a single copy of every entry.
    pub async fn load(
        taxonomy: &TaxonomyRepository,
        products: &ProductRepository,
    ) -> Result<SeedResult, ApplicationError> {
        let mut result = SeedResult::default();

        for (kind, entries) in Self::taxonomy_sets() {
            for entry in entries {
                if taxonomy.find_by_slug(kind, entry.slug).await?.is_some() {
                    result.skipped += 1;
                    continue;
                }
                taxonomy
                    .add(kind, TaxonomyEntry { slug: entry.slug.into(), name: entry.name.into() })
                    .await?;
                result.taxonomy_seeded.push((kind.collection(), entry.slug));
            }
        }

        for product in SEED_PRODUCTS {
            if Self::product_exists(products, product.name).await? {
                result.skipped += 1;
                continue;
            }
            products.create(Self::request(product)).await?;
            result.products_seeded.push(product.name);
        }

        Ok(result)
    }

    pub async fn verify(
        taxonomy: &TaxonomyRepository,
        products: &ProductRepository,
    ) -> Result<VerificationResult, ApplicationError> {
        let mut checks = Vec::new();

        for (kind, entries) in Self::taxonomy_sets() {
            let mut present = true;
            for entry in entries {
                present &= taxonomy.find_by_slug(kind, entry.slug).await?.is_some();
            }
            checks.push((kind.collection().as_str(), present));
        }

        let mut products_present = true;
        for product in SEED_PRODUCTS {
            products_present &= Self::product_exists(products, product.name).await?;
        }
        checks.push((Collection::Products.as_str(), products_present));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    fn taxonomy_sets() -> [(EntityKind, &'static [SeedEntry]); 3] {
        [
            (EntityKind::Brand, SEED_BRANDS),
            (EntityKind::Model, SEED_MODELS),
            (EntityKind::ProductType, SEED_PRODUCT_TYPES),
        ]
    }

    async fn product_exists(products: &ProductRepository, name: &str) -> Result<bool, ApplicationError> {
        match products.list(&ProductFilter::Name(name.to_string())).await {
            Ok(found) => Ok(!found.is_empty()),
            Err(ApplicationError::NotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn request(product: &SeedProduct) -> NewProduct {
        NewProduct {
            name: product.name.into(),
            description: product.description.into(),
            image_url: product.image_url.into(),
            start_year: product.start_year,
            end_year: product.end_year,
            brand_slug: product.brand.into(),
            model_slugs: product.models.iter().map(|slug| slug.to_string()).collect(),
            product_type_slug: product.product_type.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SeedResult {
    pub taxonomy_seeded: Vec<(Collection, &'static str)>,
    pub products_seeded: Vec<&'static str>,
    pub skipped: usize,
}

impl SeedResult {
    pub fn inserted(&self) -> usize {
        self.taxonomy_seeded.len() + self.products_seeded.len()
    }
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn missing(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(name, _)| *name).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{CatalogSeedDataset, SEED_BRANDS, SEED_MODELS, SEED_PRODUCTS, SEED_PRODUCT_TYPES};
    use crate::repositories::{ProductRepository, TaxonomyRepository};
    use crate::store::{DocumentStore, InMemoryDocumentStore};
    use racar_core::domain::taxonomy::is_valid_slug;

    fn repositories() -> (TaxonomyRepository, ProductRepository) {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        (TaxonomyRepository::new(store.clone()), ProductRepository::new(store))
    }

    #[test]
    fn seed_products_only_reference_seeded_slugs() {
        for entries in [SEED_BRANDS, SEED_MODELS, SEED_PRODUCT_TYPES] {
            assert!(entries.iter().all(|entry| is_valid_slug(entry.slug)));
        }
        for product in SEED_PRODUCTS {
            assert!(SEED_BRANDS.iter().any(|brand| brand.slug == product.brand), "{}", product.name);
            assert!(SEED_PRODUCT_TYPES.iter().any(|kind| kind.slug == product.product_type));
            assert!(!product.models.is_empty());
            assert!(product
                .models
                .iter()
                .all(|model| SEED_MODELS.iter().any(|seeded| seeded.slug == *model)));
        }
    }

    #[tokio::test]
    async fn load_is_idempotent_and_verifiable() {
        let (taxonomy, products) = repositories();

        let first = CatalogSeedDataset::load(&taxonomy, &products).await.expect("first load");
        let second = CatalogSeedDataset::load(&taxonomy, &products).await.expect("second load");
        let verification = CatalogSeedDataset::verify(&taxonomy, &products).await.expect("verify");

        let expected =
            SEED_BRANDS.len() + SEED_MODELS.len() + SEED_PRODUCT_TYPES.len() + SEED_PRODUCTS.len();
        assert_eq!(first.inserted(), expected);
        assert_eq!(second.inserted(), 0);
        assert_eq!(second.skipped, expected);
        assert!(verification.all_present, "missing: {:?}", verification.missing());
    }

    #[tokio::test]
    async fn verify_reports_an_empty_store() {
        let (taxonomy, products) = repositories();

        let verification = CatalogSeedDataset::verify(&taxonomy, &products).await.expect("verify");

        assert!(!verification.all_present);
        assert_eq!(verification.missing(), vec!["marca", "modelo", "tipo_producto", "productos"]);
    }
}
