//! Products routes over the MongoDB `products` collection

use axum::Router;
use database::MongoRepository;
use database::mongodb::Database;
use domain_products::{Product, ProductService, handlers};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = Arc::new(MongoRepository::<Product>::new(&state.db));
    handlers::router(ProductService::new(repository), state.jwt.clone())
}

/// Text index on name and description
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoRepository::<Product>::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create product indexes: {}", e))?;
    info!("Product collection indexes created");
    Ok(())
}
