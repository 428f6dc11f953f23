pub mod hierarchy;
pub mod placement;
pub mod search;
pub mod things;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use error::{Error, Result};
pub use hierarchy::{
	CreateLocationRequest, DeleteLocationRequest, Location, MoveLocationRequest,
	RenameLocationRequest,
};
pub use placement::{PlaceThingRequest, Placement};
pub use search::{ImageSearchRequest, SearchHit, TextSearchRequest};
pub use things::{CreateThingRequest, IndexThingImageRequest, Thing, UpdateThingRequest};

use shelf_config::{Config, EmbeddingProviderConfig, VisionProviderConfig};
use shelf_providers::{embedding, vision};
use shelf_storage::store::{LocationStore, PlacementStore, ThingStore, VectorStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait VisionProvider
where
	Self: Send + Sync,
{
	fn embed_image<'a>(
		&'a self,
		cfg: &'a VisionProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub vision: Arc<dyn VisionProvider>,
}

/// Storage handles the service operates through. Every backend pairing that
/// satisfies the traits works: Postgres + Qdrant in production, the in-memory
/// stores from shelf-testkit in tests.
#[derive(Clone)]
pub struct Stores {
	pub locations: Arc<dyn LocationStore>,
	pub placements: Arc<dyn PlacementStore>,
	pub things: Arc<dyn ThingStore>,
	pub vectors: Arc<dyn VectorStore>,
}

pub struct ShelfService {
	pub cfg: Config,
	pub stores: Stores,
	pub providers: Providers,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl VisionProvider for DefaultProviders {
	fn embed_image<'a>(
		&'a self,
		cfg: &'a VisionProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(vision::embed_image(cfg, image))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, vision: Arc<dyn VisionProvider>) -> Self {
		Self { embedding, vision }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), vision: provider }
	}
}

impl ShelfService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self { cfg, stores, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, stores: Stores, providers: Providers) -> Self {
		Self { cfg, stores, providers }
	}
}
