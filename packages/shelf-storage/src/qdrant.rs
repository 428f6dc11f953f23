pub const TEXT_VECTOR_NAME: &str = "text";
pub const IMAGE_VECTOR_NAME: &str = "image";

use std::collections::HashMap;

use qdrant_client::{
	Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, CreateFieldIndexCollection, DeletePointsBuilder,
		Distance, FieldType, Filter, PointId, PointStruct, PointVectors, Query,
		QueryPointsBuilder, ScoredPoint, SetPayloadPointsBuilder, UpdatePointVectorsBuilder,
		UpsertPointsBuilder, Value, Vector, VectorParamsBuilder, VectorsConfigBuilder,
		point_id::PointIdOptions, value::Kind,
	},
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
	Result,
	store::{BoxFuture, VectorFilters, VectorHit, VectorPayload, VectorStore},
};

const FILTER_INDEX_FIELDS: [&str; 6] =
	["thing_id", "name", "category", "tags", "material", "location_path"];

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub text_dim: u32,
	pub image_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &shelf_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			text_dim: cfg.text_vector_dim,
			image_dim: cfg.image_vector_dim,
		})
	}

	async fn query_points(
		&self,
		vector: &[f32],
		vector_name: &str,
		limit: u64,
		filter: Option<Filter>,
	) -> Result<Vec<ScoredPoint>> {
		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.using(vector_name)
			.with_payload(true)
			.limit(limit);

		if let Some(filter) = filter {
			search = search.filter(filter);
		}

		let response = self.client.query(search).await?;

		Ok(response.result)
	}
}

impl VectorStore for QdrantStore {
	fn ensure_collection(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			if self.client.collection_exists(self.collection.clone()).await? {
				return Ok(());
			}

			let mut vectors_config = VectorsConfigBuilder::default();

			vectors_config.add_named_vector_params(
				TEXT_VECTOR_NAME,
				VectorParamsBuilder::new(self.text_dim.into(), Distance::Cosine),
			);
			vectors_config.add_named_vector_params(
				IMAGE_VECTOR_NAME,
				VectorParamsBuilder::new(self.image_dim.into(), Distance::Cosine),
			);

			self.client
				.create_collection(
					CreateCollectionBuilder::new(self.collection.clone())
						.vectors_config(vectors_config),
				)
				.await?;

			for field_name in FILTER_INDEX_FIELDS {
				let request = CreateFieldIndexCollection {
					collection_name: self.collection.clone(),
					wait: Some(true),
					field_name: field_name.to_string(),
					field_type: Some(FieldType::Keyword as i32),
					field_index_params: None,
					ordering: None,
				};

				self.client.create_field_index(request).await?;
			}

			tracing::info!(collection = %self.collection, "Created Qdrant collection.");

			Ok(())
		})
	}

	fn upsert_text<'a>(
		&'a self,
		thing_id: Uuid,
		vector: &'a [f32],
		payload: &'a VectorPayload,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut vector_map = HashMap::new();

			vector_map.insert(TEXT_VECTOR_NAME.to_string(), Vector::from(vector.to_vec()));

			let point = PointStruct::new(
				thing_id.to_string(),
				vector_map,
				Payload::from(payload_map(thing_id, payload)),
			);
			let upsert = UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true);

			self.client.upsert_points(upsert).await?;

			Ok(())
		})
	}

	fn upsert_image<'a>(&'a self, thing_id: Uuid, vector: &'a [f32]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut vector_map = HashMap::new();

			vector_map.insert(IMAGE_VECTOR_NAME.to_string(), Vector::from(vector.to_vec()));

			// update_vectors leaves the text vector and payload in place.
			let point = PointVectors {
				id: Some(PointId::from(thing_id.to_string())),
				vectors: Some(vector_map.into()),
			};
			let update =
				UpdatePointVectorsBuilder::new(self.collection.clone(), vec![point]).wait(true);

			self.client.update_vectors(update).await?;

			Ok(())
		})
	}

	fn search_text<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u64,
		filters: &'a VectorFilters,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		Box::pin(async move {
			let mut must = Vec::new();

			if let Some(category) = filters.category.as_ref() {
				must.push(Condition::matches("category", category.clone()));
			}
			if let Some(material) = filters.material.as_ref() {
				must.push(Condition::matches("material", material.clone()));
			}
			for tag in &filters.tags {
				must.push(Condition::matches("tags", tag.clone()));
			}

			let filter = if must.is_empty() { None } else { Some(Filter::must(must)) };
			// Keyword payload indexes cannot express a path-prefix match, so
			// over-fetch and keep at-or-under-path hits client side.
			let fetch_limit =
				if filters.location_path.is_some() { limit.saturating_mul(4) } else { limit };
			let points =
				self.query_points(vector, TEXT_VECTOR_NAME, fetch_limit, filter).await?;
			let mut hits: Vec<VectorHit> = points.iter().filter_map(to_hit).collect();

			if let Some(query_path) = filters.location_path.as_deref() {
				hits.retain(|hit| {
					hit.location_path
						.as_deref()
						.map(|path| shelf_domain::path::is_self_or_descendant(path, query_path))
						.unwrap_or(false)
				});
				hits.truncate(limit as usize);
			}

			Ok(hits)
		})
	}

	fn search_image<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		Box::pin(async move {
			let points = self.query_points(vector, IMAGE_VECTOR_NAME, limit, None).await?;

			Ok(points.iter().filter_map(to_hit).collect())
		})
	}

	fn update_location_path<'a>(
		&'a self,
		thing_id: Uuid,
		location_path: Option<&'a str>,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut patch = HashMap::new();

			patch.insert("location_path".to_string(), match location_path {
				Some(path) => Value::from(path.to_string()),
				None => Value::from(JsonValue::Null),
			});

			let filter = Filter::must([Condition::matches("thing_id", thing_id.to_string())]);
			let set = SetPayloadPointsBuilder::new(self.collection.clone(), Payload::from(patch))
				.points_selector(filter)
				.wait(true);

			self.client.set_payload(set).await?;

			Ok(())
		})
	}

	fn delete_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let filter = Filter::must([Condition::matches("thing_id", thing_id.to_string())]);
			let delete =
				DeletePointsBuilder::new(self.collection.clone()).points(filter).wait(true);

			self.client.delete_points(delete).await?;

			Ok(())
		})
	}
}

fn payload_map(thing_id: Uuid, payload: &VectorPayload) -> HashMap<String, Value> {
	let mut map = HashMap::new();

	map.insert("thing_id".to_string(), Value::from(thing_id.to_string()));
	map.insert("name".to_string(), Value::from(payload.name.clone()));
	map.insert("description".to_string(), Value::from(payload.description.clone()));
	map.insert("category".to_string(), Value::from(payload.category.clone()));
	map.insert("tags".to_string(), Value::from(JsonValue::from(payload.tags.clone())));
	map.insert("material".to_string(), match payload.material.as_ref() {
		Some(material) => Value::from(material.clone()),
		None => Value::from(JsonValue::Null),
	});
	map.insert("location_path".to_string(), match payload.location_path.as_ref() {
		Some(path) => Value::from(path.clone()),
		None => Value::from(JsonValue::Null),
	});

	map
}

fn to_hit(point: &ScoredPoint) -> Option<VectorHit> {
	let thing_id = payload_uuid(&point.payload, "thing_id")
		.or_else(|| point.id.as_ref().and_then(point_id_to_uuid));
	let Some(thing_id) = thing_id else {
		tracing::warn!("Search hit missing thing_id.");

		return None;
	};

	Some(VectorHit {
		thing_id,
		name: payload_string(&point.payload, "name").unwrap_or_default(),
		description: payload_string(&point.payload, "description").unwrap_or_default(),
		category: payload_string(&point.payload, "category").unwrap_or_default(),
		tags: payload_string_list(&point.payload, "tags"),
		location_path: payload_string(&point.payload, "location_path"),
		score: point.score,
	})
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_uuid(payload: &HashMap<String, Value>, key: &str) -> Option<Uuid> {
	payload_string(payload, key).and_then(|text| Uuid::parse_str(&text).ok())
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

fn payload_string_list(payload: &HashMap<String, Value>, key: &str) -> Vec<String> {
	let Some(value) = payload.get(key) else {
		return Vec::new();
	};

	match &value.kind {
		Some(Kind::ListValue(list)) => list
			.values
			.iter()
			.filter_map(|item| match &item.kind {
				Some(Kind::StringValue(text)) => Some(text.to_string()),
				_ => None,
			})
			.collect(),
		_ => Vec::new(),
	}
}
