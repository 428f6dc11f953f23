#![allow(dead_code)]

use std::sync::Arc;

use shelf_config::{Config, EmbeddingProviderConfig, VisionProviderConfig};
use shelf_service::{
	BoxFuture, EmbeddingProvider, Providers, ShelfService, Stores, VisionProvider,
};
use shelf_testkit::{
	MemoryLocationStore, MemoryPlacementStore, MemoryThingStore, MemoryVectorStore,
	stub_embedding, stub_image_embedding, test_config,
};

pub struct StubProviders;

impl EmbeddingProvider for StubProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Ok(texts.iter().map(|text| stub_embedding(text, cfg.dimensions as usize)).collect())
		})
	}
}

impl VisionProvider for StubProviders {
	fn embed_image<'a>(
		&'a self,
		cfg: &'a VisionProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(vec![stub_image_embedding(image, cfg.dimensions as usize)]) })
	}
}

pub struct TestHarness {
	pub service: ShelfService,
	pub vectors: Arc<MemoryVectorStore>,
}

pub fn harness() -> TestHarness {
	harness_with_config(test_config())
}

pub fn harness_with_config(cfg: Config) -> TestHarness {
	let vectors = Arc::new(MemoryVectorStore::default());
	let stores = Stores {
		locations: Arc::new(MemoryLocationStore::default()),
		placements: Arc::new(MemoryPlacementStore::default()),
		things: Arc::new(MemoryThingStore::default()),
		vectors: vectors.clone(),
	};
	let providers = Providers::new(Arc::new(StubProviders), Arc::new(StubProviders));

	TestHarness { service: ShelfService::with_providers(cfg, stores, providers), vectors }
}
