use std::sync::Arc;

use racar_core::config::StoreBackend;
use racar_db::{
    connect_with_settings, migrations, CatalogSeedDataset, DocumentStore, ProductRepository,
    SqliteDocumentStore, TaxonomyRepository,
};

use super::{build_runtime, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    if config.database.backend == StoreBackend::Memory {
        return CommandResult::failure(
            "seed",
            "unsupported_backend",
            "seeding needs a persistent store; set database.backend = \"sqlite\"",
            7,
        );
    }

    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(pool.clone()));
        let taxonomy = TaxonomyRepository::new(store.clone());
        let products = ProductRepository::new(store);

        let seed_result = CatalogSeedDataset::load(&taxonomy, &products)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = CatalogSeedDataset::verify(&taxonomy, &products)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        pool.close().await;

        if !verification.all_present {
            return Err(("seed_verification", verification_message(&verification.missing()), 6u8));
        }
        let counts = (seed_result.inserted(), seed_result.skipped);
        Ok::<(usize, usize), (&'static str, String, u8)>(counts)
    });

    match result {
        Ok((inserted, skipped)) => CommandResult::success(
            "seed",
            format!("catalog seed loaded: {inserted} inserted, {skipped} already present"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_message(missing: &[&str]) -> String {
    if missing.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for collections: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_error_message_targets_missing_collections() {
        assert_eq!(
            verification_message(&["modelo", "productos"]),
            "Seed verification failed for collections: modelo, productos"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_message(&[]), "Some seed data failed to load");
    }
}
