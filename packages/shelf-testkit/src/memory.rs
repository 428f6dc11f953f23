//! In-memory implementations of the storage traits. Each store serializes its
//! operations behind one mutex, which is exactly the atomicity the cascade
//! and placement-transition operations require.

use std::{
	collections::HashMap,
	sync::Mutex,
};

use uuid::Uuid;

use shelf_domain::path;
use shelf_storage::{
	Error, Result,
	models::{LocationRecord, PlacementRecord, ThingRecord},
	store::{
		BoxFuture, LocationStore, PlacementStore, ThingStore, VectorFilters, VectorHit,
		VectorPayload, VectorStore,
	},
};

#[derive(Default)]
pub struct MemoryLocationStore {
	rows: Mutex<Vec<LocationRecord>>,
}

#[derive(Default)]
pub struct MemoryPlacementStore {
	rows: Mutex<Vec<PlacementRecord>>,
}

#[derive(Default)]
pub struct MemoryThingStore {
	rows: Mutex<Vec<ThingRecord>>,
}

#[derive(Clone, Debug)]
struct MemoryPoint {
	text_vector: Option<Vec<f32>>,
	image_vector: Option<Vec<f32>>,
	payload: VectorPayload,
}

#[derive(Default)]
pub struct MemoryVectorStore {
	points: Mutex<HashMap<Uuid, MemoryPoint>>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

impl LocationStore for MemoryLocationStore {
	fn insert<'a>(&'a self, location: &'a LocationRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);

			if rows
				.iter()
				.any(|row| row.parent_id == location.parent_id && row.name == location.name)
			{
				return Err(Error::Conflict(
					"Location violates a uniqueness constraint.".to_string(),
				));
			}
			if rows.iter().any(|row| row.path == location.path) {
				return Err(Error::Conflict(
					"Location violates a uniqueness constraint.".to_string(),
				));
			}

			rows.push(location.clone());

			Ok(())
		})
	}

	fn fetch(&self, location_id: Uuid) -> BoxFuture<'_, Result<Option<LocationRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().find(|row| row.location_id == location_id).cloned())
		})
	}

	fn fetch_by_path<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Option<LocationRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().find(|row| row.path == path).cloned())
		})
	}

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);
			let mut all: Vec<LocationRecord> = rows.iter().cloned().collect();

			all.sort_by(|left, right| left.path.cmp(&right.path));

			Ok(all)
		})
	}

	fn children(&self, parent_id: Option<Uuid>) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);
			let mut children: Vec<LocationRecord> =
				rows.iter().filter(|row| row.parent_id == parent_id).cloned().collect();

			children.sort_by(|left, right| left.name.cmp(&right.name));

			Ok(children)
		})
	}

	fn subtree<'a>(&'a self, subtree_path: &'a str) -> BoxFuture<'a, Result<Vec<LocationRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);
			let mut subtree: Vec<LocationRecord> = rows
				.iter()
				.filter(|row| path::is_self_or_descendant(&row.path, subtree_path))
				.cloned()
				.collect();

			subtree.sort_by(|left, right| left.path.cmp(&right.path));

			Ok(subtree)
		})
	}

	fn sibling_exists<'a>(
		&'a self,
		name: &'a str,
		parent_id: Option<Uuid>,
		exclude: Option<Uuid>,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().any(|row| {
				row.name == name
					&& row.parent_id == parent_id
					&& Some(row.location_id) != exclude
			}))
		})
	}

	fn has_children(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().any(|row| row.parent_id == Some(location_id)))
		})
	}

	fn update_subtree<'a>(
		&'a self,
		location: &'a LocationRecord,
		old_path: &'a str,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			// One lock for the node update and every descendant rewrite.
			let mut rows = lock(&self.rows);

			if rows.iter().any(|row| {
				row.location_id != location.location_id
					&& row.parent_id == location.parent_id
					&& row.name == location.name
			}) {
				return Err(Error::Conflict(
					"Location violates a uniqueness constraint.".to_string(),
				));
			}

			let mut touched = 0_u64;

			for row in rows.iter_mut() {
				if row.location_id == location.location_id {
					row.name = location.name.clone();
					row.parent_id = location.parent_id;
					row.path = location.path.clone();
					touched += 1;
				} else if let Some(rewritten) =
					path::replace_prefix(&row.path, old_path, &location.path)
				{
					row.path = rewritten;
					touched += 1;
				}
			}

			Ok(touched)
		})
	}

	fn delete(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);
			let before = rows.len();

			rows.retain(|row| row.location_id != location_id);

			Ok(rows.len() < before)
		})
	}
}

impl PlacementStore for MemoryPlacementStore {
	fn transition<'a>(&'a self, placement: &'a PlacementRecord) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			// Deactivate-then-insert under one lock keeps at most one row
			// active even across racing callers.
			let mut rows = lock(&self.rows);
			let mut deactivated = 0_u64;

			for row in rows.iter_mut() {
				if row.thing_id == placement.thing_id && row.active {
					row.active = false;
					deactivated += 1;
				}
			}

			rows.push(placement.clone());

			Ok(deactivated)
		})
	}

	fn active_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Option<PlacementRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().find(|row| row.thing_id == thing_id && row.active).cloned())
		})
	}

	fn history_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Vec<PlacementRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);
			let mut history: Vec<(usize, PlacementRecord)> = rows
				.iter()
				.enumerate()
				.filter(|(_, row)| row.thing_id == thing_id)
				.map(|(index, row)| (index, row.clone()))
				.collect();

			// Most recent first; insertion order breaks timestamp ties so fast
			// tests stay deterministic.
			history.sort_by(|(left_index, left), (right_index, right)| {
				right
					.placed_at
					.cmp(&left.placed_at)
					.then_with(|| right_index.cmp(left_index))
			});

			Ok(history.into_iter().map(|(_, row)| row).collect())
		})
	}

	fn active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<Vec<PlacementRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows
				.iter()
				.filter(|row| row.location_id == location_id && row.active)
				.cloned()
				.collect())
		})
	}

	fn count_active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<i64>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().filter(|row| row.location_id == location_id && row.active).count()
				as i64)
		})
	}

	fn has_active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().any(|row| row.location_id == location_id && row.active))
		})
	}

	fn deactivate_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);
			let mut deactivated = 0_u64;

			for row in rows.iter_mut() {
				if row.thing_id == thing_id && row.active {
					row.active = false;
					deactivated += 1;
				}
			}

			Ok(deactivated)
		})
	}

	fn delete_by_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);
			let before = rows.len();

			rows.retain(|row| row.location_id != location_id);

			Ok((before - rows.len()) as u64)
		})
	}

	fn delete_by_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);
			let before = rows.len();

			rows.retain(|row| row.thing_id != thing_id);

			Ok((before - rows.len()) as u64)
		})
	}
}

impl ThingStore for MemoryThingStore {
	fn insert<'a>(&'a self, thing: &'a ThingRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);

			rows.push(thing.clone());

			Ok(())
		})
	}

	fn fetch(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Option<ThingRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.iter().find(|row| row.thing_id == thing_id).cloned())
		})
	}

	fn list(&self, offset: i64, limit: i64) -> BoxFuture<'_, Result<Vec<ThingRecord>>> {
		Box::pin(async move {
			let rows = lock(&self.rows);
			let mut all: Vec<(usize, ThingRecord)> =
				rows.iter().enumerate().map(|(index, row)| (index, row.clone())).collect();

			all.sort_by(|(left_index, left), (right_index, right)| {
				right
					.created_at
					.cmp(&left.created_at)
					.then_with(|| right_index.cmp(left_index))
			});

			Ok(all
				.into_iter()
				.map(|(_, row)| row)
				.skip(offset.max(0) as usize)
				.take(limit.max(0) as usize)
				.collect())
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<i64>> {
		Box::pin(async move {
			let rows = lock(&self.rows);

			Ok(rows.len() as i64)
		})
	}

	fn update<'a>(&'a self, thing: &'a ThingRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);

			if let Some(row) = rows.iter_mut().find(|row| row.thing_id == thing.thing_id) {
				*row = thing.clone();
			}

			Ok(())
		})
	}

	fn delete(&self, thing_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let mut rows = lock(&self.rows);
			let before = rows.len();

			rows.retain(|row| row.thing_id != thing_id);

			Ok(rows.len() < before)
		})
	}
}

impl VectorStore for MemoryVectorStore {
	fn ensure_collection(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(()) })
	}

	fn upsert_text<'a>(
		&'a self,
		thing_id: Uuid,
		vector: &'a [f32],
		payload: &'a VectorPayload,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut points = lock(&self.points);
			let image_vector =
				points.get(&thing_id).and_then(|point| point.image_vector.clone());

			points.insert(thing_id, MemoryPoint {
				text_vector: Some(vector.to_vec()),
				image_vector,
				payload: payload.clone(),
			});

			Ok(())
		})
	}

	fn upsert_image<'a>(&'a self, thing_id: Uuid, vector: &'a [f32]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut points = lock(&self.points);

			// Setting vectors on an unindexed point is a no-op, mirroring
			// update_vectors against a missing Qdrant point.
			if let Some(point) = points.get_mut(&thing_id) {
				point.image_vector = Some(vector.to_vec());
			}

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
			let points = lock(&self.points);
			let mut hits: Vec<VectorHit> = points
				.iter()
				.filter(|(_, point)| matches_filters(&point.payload, filters))
				.filter_map(|(thing_id, point)| {
					let text_vector = point.text_vector.as_ref()?;

					Some(to_hit(*thing_id, point, cosine(vector, text_vector)))
				})
				.collect();

			sort_hits(&mut hits);
			hits.truncate(limit as usize);

			Ok(hits)
		})
	}

	fn search_image<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		Box::pin(async move {
			let points = lock(&self.points);
			let mut hits: Vec<VectorHit> = points
				.iter()
				.filter_map(|(thing_id, point)| {
					let image_vector = point.image_vector.as_ref()?;

					Some(to_hit(*thing_id, point, cosine(vector, image_vector)))
				})
				.collect();

			sort_hits(&mut hits);
			hits.truncate(limit as usize);

			Ok(hits)
		})
	}

	fn update_location_path<'a>(
		&'a self,
		thing_id: Uuid,
		location_path: Option<&'a str>,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut points = lock(&self.points);

			if let Some(point) = points.get_mut(&thing_id) {
				point.payload.location_path = location_path.map(str::to_string);
			}

			Ok(())
		})
	}

	fn delete_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut points = lock(&self.points);

			points.remove(&thing_id);

			Ok(())
		})
	}
}

impl MemoryVectorStore {
	/// Test visibility into the indexed payload.
	pub fn payload(&self, thing_id: Uuid) -> Option<VectorPayload> {
		let points = lock(&self.points);

		points.get(&thing_id).map(|point| point.payload.clone())
	}

	pub fn has_point(&self, thing_id: Uuid) -> bool {
		let points = lock(&self.points);

		points.contains_key(&thing_id)
	}

	pub fn has_image_vector(&self, thing_id: Uuid) -> bool {
		let points = lock(&self.points);

		points.get(&thing_id).and_then(|point| point.image_vector.as_ref()).is_some()
	}
}

fn matches_filters(payload: &VectorPayload, filters: &VectorFilters) -> bool {
	if let Some(category) = filters.category.as_deref()
		&& payload.category != category
	{
		return false;
	}
	if let Some(material) = filters.material.as_deref()
		&& payload.material.as_deref() != Some(material)
	{
		return false;
	}
	if !filters.tags.iter().all(|tag| payload.tags.contains(tag)) {
		return false;
	}
	if let Some(query_path) = filters.location_path.as_deref() {
		let Some(hit_path) = payload.location_path.as_deref() else {
			return false;
		};

		if !path::is_self_or_descendant(hit_path, query_path) {
			return false;
		}
	}

	true
}

fn to_hit(thing_id: Uuid, point: &MemoryPoint, score: f32) -> VectorHit {
	VectorHit {
		thing_id,
		name: point.payload.name.clone(),
		description: point.payload.description.clone(),
		category: point.payload.category.clone(),
		tags: point.payload.tags.clone(),
		location_path: point.payload.location_path.clone(),
		score,
	}
}

fn sort_hits(hits: &mut [VectorHit]) {
	hits.sort_by(|left, right| {
		right
			.score
			.partial_cmp(&left.score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| left.thing_id.cmp(&right.thing_id))
	});
}

fn cosine(left: &[f32], right: &[f32]) -> f32 {
	if left.len() != right.len() {
		return 0.0;
	}

	let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
	let left_norm = left.iter().map(|v| v * v).sum::<f32>().sqrt();
	let right_norm = right.iter().map(|v| v * v).sum::<f32>().sqrt();

	if left_norm == 0.0 || right_norm == 0.0 {
		return 0.0;
	}

	dot / (left_norm * right_norm)
}
