//! Seed the product collection with sample products.

use product_graph_core::{DocumentKey, Product};
use product_graph_server::db::{self, DocumentStore};
use tracing::info;

use super::{CliError, database_config};

const NAMES: &[&str] = &["Widget", "Gadget", "Sprocket", "Gizmo", "Doohickey"];
const TAGS: &[&str] = &["tools", "hardware", "spares"];

/// Insert `count` sample products, logging each generated key.
///
/// # Errors
///
/// Returns an error if configuration is missing or an insert fails.
pub async fn products(count: usize) -> Result<(), CliError> {
    let database = database_config("seed")?;

    let pool = db::create_pool(&database).await?;
    info!("Connected to database");

    let store = DocumentStore::postgres(pool);
    let collection = store.products();

    for index in 0..count {
        let key = DocumentKey::generate();
        let product = sample_product(index);
        collection.insert(&key, &product).await?;
        info!(key = %key, name = product.name.as_deref().unwrap_or(""), "Seeded product");
    }

    store.close().await;
    info!(count, "Seeding complete!");
    Ok(())
}

/// Deterministic sample product for position `index`.
fn sample_product(index: usize) -> Product {
    let name = NAMES.get(index % NAMES.len()).copied().unwrap_or("Widget");
    let batch = index / NAMES.len();
    let name = if batch == 0 {
        name.to_string()
    } else {
        format!("{name} Mk {}", batch + 1)
    };

    let step = u32::try_from(index % 100).unwrap_or(0);
    let quantity = i32::try_from((index % 100 + 1) * 10).unwrap_or(0);

    Product {
        name: Some(name),
        price: Some(f64::from(step).mul_add(2.5, 4.99)),
        quantity: Some(quantity),
        tags: Some(vec![
            TAGS.get(index % TAGS.len()).map(|tag| (*tag).to_string()),
        ]),
    }
}
