//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - title: naruto-bag
//!     price: 25
//!     img: https://cdn.animart.example/naruto-bag.png
//!     category: naruto
//! ```
//!
//! Every entry goes through the same validation as `POST /products`. The whole
//! file is validated against an in-memory catalog before anything is written.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use animart_server::db::{self, MemoryStore, PgProductStore, ProductStore};
use animart_server::services::{Catalog, NewProductRequest};

use super::{CliError, database_url};

/// Top-level layout of a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedProduct {
    title: String,
    price: f64,
    img: String,
    category: String,
}

impl From<SeedProduct> for NewProductRequest {
    fn from(p: SeedProduct) -> Self {
        Self {
            title: p.title,
            price: p.price,
            img: p.img,
            category: p.category,
        }
    }
}

/// Parse seed file contents.
fn parse(content: &str) -> Result<Vec<NewProductRequest>, CliError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    Ok(file.products.into_iter().map(Into::into).collect())
}

/// Add every product to `catalog`, stopping at the first invalid entry.
async fn load(catalog: &Catalog, products: &[NewProductRequest]) -> Result<usize, CliError> {
    for (index, product) in products.iter().enumerate() {
        catalog
            .add(product)
            .await
            .map_err(|source| CliError::Product {
                index,
                title: product.title.clone(),
                source,
            })?;
    }
    Ok(products.len())
}

/// Validate a seed file and, unless `dry_run`, insert it into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an entry is invalid,
/// or the database rejects an insert.
pub async fn run(path: &Path, dry_run: bool) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let products = parse(&content)?;
    info!(path = %path.display(), count = products.len(), "Parsed seed file");

    // Validate against a scratch catalog first so a bad entry writes nothing
    let scratch = Catalog::new(Arc::new(MemoryStore::new()));
    load(&scratch, &products).await?;
    info!("Seed file validated");

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let pool = db::create_pool(&database_url()?).await?;
    let store: Arc<dyn ProductStore> = Arc::new(PgProductStore::new(pool));
    let inserted = load(&Catalog::new(store), &products).await?;

    info!(inserted, "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use animart_server::services::CatalogError;

    use super::*;

    const SEED: &str = "
products:
  - title: naruto-bag
    price: 25
    img: https://cdn.animart.example/naruto-bag.png
    category: naruto
  - title: demon-cup
    price: 12.5
    img: https://cdn.animart.example/demon-cup.png
    category: demon-slayer
";

    #[test]
    fn test_parse_seed_file() {
        let products = parse(SEED).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "naruto-bag");
        assert!((products[1].price - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let err = parse("products:\n  - title: x\n    price: 1\n    img: a\n    category: b\n    stock: 3\n")
            .unwrap_err();
        assert!(matches!(err, CliError::Yaml(_)));
    }

    #[tokio::test]
    async fn test_load_reports_bad_entry() {
        let mut products = parse(SEED).unwrap();
        products[1].price = -1.0;

        let catalog = Catalog::new(Arc::new(MemoryStore::new()));
        let err = load(&catalog, &products).await.unwrap_err();

        assert!(matches!(err, CliError::Product { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_dry_run_rejects_price_the_column_cannot_hold() {
        let dir = std::env::temp_dir().join(format!("animart-seed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("too-large.yaml");
        std::fs::write(&path, SEED.replace("price: 12.5", "price: 1000000000000")).unwrap();

        let err = run(&path, true).await.unwrap_err();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            err,
            CliError::Product {
                index: 1,
                source: CatalogError::Validation(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_inserts_everything() {
        let store = MemoryStore::new();
        let catalog = Catalog::new(Arc::new(store.clone()));

        let inserted = load(&catalog, &parse(SEED).unwrap()).await.unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.search(Some("NARUTO")).await.unwrap().len(), 1);
    }
}
