use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, ShelfService};
use shelf_domain::{enrich, metadata::ThingMetadata, path::MAX_NAME_CHARS};
use shelf_storage::{
	models::ThingRecord,
	store::VectorPayload,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Thing {
	pub thing_id: Uuid,
	pub name: String,
	pub description: String,
	pub metadata: ThingMetadata,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl From<ThingRecord> for Thing {
	fn from(record: ThingRecord) -> Self {
		let metadata = serde_json::from_value(record.metadata).unwrap_or_default();

		Self {
			thing_id: record.thing_id,
			name: record.name,
			description: record.description,
			metadata,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateThingRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateThingRequest {
	pub thing_id: Uuid,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub regenerate_metadata: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexThingImageRequest {
	pub thing_id: Uuid,
	pub image: Vec<u8>,
}

impl ShelfService {
	/// Registers a thing: deterministic metadata enrichment, persistence, then
	/// text-vector indexing. A freshly created thing is unplaced.
	pub async fn create_thing(&self, req: CreateThingRequest) -> Result<Thing> {
		validate_thing_name(&req.name)?;

		let description = req.description.unwrap_or_default();
		let metadata =
			enrich::enrich(&req.name, (!description.is_empty()).then_some(description.as_str()));
		let now = OffsetDateTime::now_utc();
		let record = ThingRecord {
			thing_id: Uuid::new_v4(),
			name: req.name,
			description,
			metadata: serde_json::to_value(&metadata)
				.map_err(|err| Error::Storage { message: err.to_string() })?,
			created_at: now,
			updated_at: now,
		};

		self.stores.things.insert(&record).await?;
		self.index_thing_text(&record, &metadata, None).await?;

		tracing::info!(thing_id = %record.thing_id, name = %record.name, "Created thing.");

		Ok(record.into())
	}

	pub async fn thing(&self, thing_id: Uuid) -> Result<Thing> {
		self.thing_record(thing_id).await.map(Into::into)
	}

	pub async fn list_things(&self, offset: i64, limit: i64) -> Result<Vec<Thing>> {
		let records = self.stores.things.list(offset.max(0), limit.clamp(1, 200)).await?;

		Ok(records.into_iter().map(Into::into).collect())
	}

	pub async fn count_things(&self) -> Result<i64> {
		let count = self.stores.things.count().await?;

		Ok(count)
	}

	/// Updates a thing and re-indexes its text vector so the payload follows
	/// the current name, description, and metadata.
	pub async fn update_thing(&self, req: UpdateThingRequest) -> Result<Thing> {
		let mut record = self.thing_record(req.thing_id).await?;

		if let Some(name) = req.name {
			validate_thing_name(&name)?;

			record.name = name;
		}
		if let Some(description) = req.description {
			record.description = description;
		}

		let mut metadata: ThingMetadata =
			serde_json::from_value(record.metadata.clone()).unwrap_or_default();

		if req.regenerate_metadata {
			metadata = enrich::enrich(
				&record.name,
				(!record.description.is_empty()).then_some(record.description.as_str()),
			);
			record.metadata = serde_json::to_value(&metadata)
				.map_err(|err| Error::Storage { message: err.to_string() })?;
		}

		record.updated_at = OffsetDateTime::now_utc();

		self.stores.things.update(&record).await?;

		let location_path = self.active_location_path(record.thing_id).await?;

		self.index_thing_text(&record, &metadata, location_path).await?;

		tracing::info!(thing_id = %record.thing_id, name = %record.name, "Updated thing.");

		Ok(record.into())
	}

	/// Deletes a thing along with its vectors and entire placement history.
	pub async fn delete_thing(&self, thing_id: Uuid) -> Result<bool> {
		self.thing_record(thing_id).await?;
		self.stores.vectors.delete_thing(thing_id).await?;

		let purged = self.stores.placements.delete_by_thing(thing_id).await?;
		let deleted = self.stores.things.delete(thing_id).await?;

		tracing::info!(thing_id = %thing_id, purged, "Deleted thing.");

		Ok(deleted)
	}

	/// Stores a whole-image embedding for an already-registered thing.
	pub async fn index_thing_image(&self, req: IndexThingImageRequest) -> Result<()> {
		let record = self.thing_record(req.thing_id).await?;
		let Some(vision_cfg) = self.cfg.providers.vision.as_ref() else {
			return Err(Error::InvalidRequest {
				message: "No vision provider is configured.".to_string(),
			});
		};
		let vectors = self.providers.vision.embed_image(vision_cfg, &req.image).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Vision provider returned no embeddings.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.image_vector_dim as usize {
			return Err(Error::Provider {
				message: "Image embedding dimension mismatch.".to_string(),
			});
		}

		self.stores.vectors.upsert_image(record.thing_id, &vector).await?;

		tracing::info!(thing_id = %record.thing_id, name = %record.name, "Indexed image vector.");

		Ok(())
	}

	async fn index_thing_text(
		&self,
		record: &ThingRecord,
		metadata: &ThingMetadata,
		location_path: Option<String>,
	) -> Result<()> {
		let embed_text = build_embed_text(&record.name, &record.description, &metadata.tags);
		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[embed_text])
			.await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.text_vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		let payload = VectorPayload {
			name: record.name.clone(),
			description: record.description.clone(),
			category: metadata.category.clone(),
			tags: metadata.tags.clone(),
			material: metadata.material.clone(),
			location_path,
		};

		self.stores.vectors.upsert_text(record.thing_id, &vector, &payload).await?;

		Ok(())
	}

	async fn active_location_path(&self, thing_id: Uuid) -> Result<Option<String>> {
		let Some(placement) = self.stores.placements.active_for_thing(thing_id).await? else {
			return Ok(None);
		};
		let location = self.stores.locations.fetch(placement.location_id).await?;

		Ok(location.map(|location| location.path))
	}

	pub(crate) async fn thing_record(&self, thing_id: Uuid) -> Result<ThingRecord> {
		self.stores.things.fetch(thing_id).await?.ok_or_else(|| Error::NotFound {
			message: format!("Thing {thing_id} not found."),
		})
	}
}

fn validate_thing_name(name: &str) -> Result<()> {
	if name.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "Thing name must not be empty.".to_string() });
	}
	if name.chars().count() > MAX_NAME_CHARS {
		return Err(Error::InvalidRequest {
			message: format!("Thing name must be at most {MAX_NAME_CHARS} characters."),
		});
	}

	Ok(())
}

fn build_embed_text(name: &str, description: &str, tags: &[String]) -> String {
	let mut parts = vec![name.to_string()];

	if !description.is_empty() {
		parts.push(description.to_string());
	}
	if !tags.is_empty() {
		parts.push(tags.join(" "));
	}

	parts.join(" ")
}
