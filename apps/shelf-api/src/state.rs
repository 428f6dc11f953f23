use std::sync::Arc;

use shelf_service::{ShelfService, Stores};
use shelf_storage::{db::Db, qdrant::QdrantStore, store::VectorStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ShelfService>,
}
impl AppState {
	pub async fn new(config: shelf_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let stores = Stores {
			locations: Arc::new(db.location_store()),
			placements: Arc::new(db.placement_store()),
			things: Arc::new(db.thing_store()),
			vectors: Arc::new(qdrant),
		};
		let service = ShelfService::new(config, stores);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn from_service(service: ShelfService) -> Self {
		Self { service: Arc::new(service) }
	}
}
