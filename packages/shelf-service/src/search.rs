pub mod ranking;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, ShelfService, search::ranking::RankerWeights};
use shelf_storage::store::{VectorFilters, VectorHit};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextSearchRequest {
	pub query: String,
	#[serde(default)]
	pub location_filter: Option<String>,
	#[serde(default)]
	pub category_filter: Option<String>,
	#[serde(default)]
	pub material_filter: Option<String>,
	#[serde(default)]
	pub tags_filter: Vec<String>,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageSearchRequest {
	pub image: Vec<u8>,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchHit {
	pub thing_id: Uuid,
	pub name: String,
	pub description: String,
	pub category: String,
	pub tags: Vec<String>,
	pub location_path: Option<String>,
	/// Raw similarity from the vector store, higher is more similar.
	pub vector_score: f32,
	/// Combined score after ranking; equals `vector_score` for image search.
	pub score: f32,
}
impl From<VectorHit> for SearchHit {
	fn from(hit: VectorHit) -> Self {
		Self {
			thing_id: hit.thing_id,
			name: hit.name,
			description: hit.description,
			category: hit.category,
			tags: hit.tags,
			location_path: hit.location_path,
			vector_score: hit.score,
			score: hit.score,
		}
	}
}

impl ShelfService {
	/// Text search pipeline: embed the query, similarity-search with the
	/// structured filters, then re-rank with tag overlap and location bonus.
	pub async fn search_text(&self, req: TextSearchRequest) -> Result<Vec<SearchHit>> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Search query must be non-empty.".to_string(),
			});
		}

		let limit = self.clamp_limit(req.limit);

		tracing::debug!(query = %query, limit, "Text search.");

		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[query.to_string()])
			.await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};
		let filters = VectorFilters {
			location_path: req.location_filter.clone(),
			category: req.category_filter.clone(),
			material: req.material_filter.clone(),
			tags: req.tags_filter.clone(),
		};
		let raw = self.stores.vectors.search_text(&vector, limit.into(), &filters).await?;
		let hits: Vec<SearchHit> = raw.into_iter().map(Into::into).collect();
		let query_tags: Vec<String> =
			query.to_lowercase().split_whitespace().map(str::to_string).collect();
		let ranked = ranking::rank(
			RankerWeights::from(&self.cfg.ranking),
			hits,
			&query_tags,
			req.location_filter.as_deref(),
		);

		tracing::debug!(returned = ranked.len(), "Text search complete.");

		Ok(ranked)
	}

	/// Image search pipeline. Degrades to an empty result list when no vision
	/// provider is configured. Only the first (whole-image) embedding is used,
	/// and results keep their raw similarity order.
	pub async fn search_image(&self, req: ImageSearchRequest) -> Result<Vec<SearchHit>> {
		let Some(vision_cfg) = self.cfg.providers.vision.as_ref() else {
			tracing::warn!("Vision search requested but no vision provider is configured.");

			return Ok(Vec::new());
		};
		let limit = self.clamp_limit(req.limit);

		tracing::debug!(bytes = req.image.len(), limit, "Vision search.");

		let vectors = self.providers.vision.embed_image(vision_cfg, &req.image).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Ok(Vec::new());
		};
		let raw = self.stores.vectors.search_image(&vector, limit.into()).await?;
		let mut hits: Vec<SearchHit> = raw.into_iter().map(Into::into).collect();

		hits.sort_by(|left, right| ranking::cmp_score_desc(left.score, right.score));

		Ok(hits)
	}

	fn clamp_limit(&self, limit: Option<u32>) -> u32 {
		limit.unwrap_or(self.cfg.search.default_limit).clamp(1, self.cfg.search.max_limit)
	}
}
