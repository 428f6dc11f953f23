//! Capability traits over the storage backends. Each entity gets one trait;
//! the Postgres and Qdrant implementations in this crate and the in-memory
//! implementations in shelf-testkit are interchangeable behind them.

use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::{
	Result,
	models::{LocationRecord, PlacementRecord, ThingRecord},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait LocationStore
where
	Self: Send + Sync,
{
	fn insert<'a>(&'a self, location: &'a LocationRecord) -> BoxFuture<'a, Result<()>>;

	fn fetch(&self, location_id: Uuid) -> BoxFuture<'_, Result<Option<LocationRecord>>>;

	fn fetch_by_path<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Option<LocationRecord>>>;

	/// All locations ordered by path.
	fn list_all(&self) -> BoxFuture<'_, Result<Vec<LocationRecord>>>;

	/// Direct children only; `None` lists the roots.
	fn children(&self, parent_id: Option<Uuid>) -> BoxFuture<'_, Result<Vec<LocationRecord>>>;

	/// The location at `path` and every location under it, ordered by path.
	fn subtree<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<LocationRecord>>>;

	fn sibling_exists<'a>(
		&'a self,
		name: &'a str,
		parent_id: Option<Uuid>,
		exclude: Option<Uuid>,
	) -> BoxFuture<'a, Result<bool>>;

	fn has_children(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>>;

	/// Persists the node's new name/parent/path and rewrites the path of every
	/// descendant from `old_path` to the node's new path in a single atomic
	/// step. Returns the number of rows touched, the node included.
	fn update_subtree<'a>(
		&'a self,
		location: &'a LocationRecord,
		old_path: &'a str,
	) -> BoxFuture<'a, Result<u64>>;

	fn delete(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>>;
}

pub trait PlacementStore
where
	Self: Send + Sync,
{
	/// Atomically deactivates every active placement of the thing, then
	/// inserts `placement` as the new active row. Returns the number of rows
	/// deactivated (0 or 1 under the invariant, possibly more when repairing
	/// a violation).
	fn transition<'a>(&'a self, placement: &'a PlacementRecord) -> BoxFuture<'a, Result<u64>>;

	fn active_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Option<PlacementRecord>>>;

	/// Full history, most recent first. Rows with equal timestamps have no
	/// specified relative order.
	fn history_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Vec<PlacementRecord>>>;

	fn active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<Vec<PlacementRecord>>>;

	fn count_active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<i64>>;

	fn has_active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>>;

	fn deactivate_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<u64>>;

	fn delete_by_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<u64>>;

	fn delete_by_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<u64>>;
}

pub trait ThingStore
where
	Self: Send + Sync,
{
	fn insert<'a>(&'a self, thing: &'a ThingRecord) -> BoxFuture<'a, Result<()>>;

	fn fetch(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Option<ThingRecord>>>;

	fn list(&self, offset: i64, limit: i64) -> BoxFuture<'_, Result<Vec<ThingRecord>>>;

	fn count(&self) -> BoxFuture<'_, Result<i64>>;

	fn update<'a>(&'a self, thing: &'a ThingRecord) -> BoxFuture<'a, Result<()>>;

	fn delete(&self, thing_id: Uuid) -> BoxFuture<'_, Result<bool>>;
}

/// Payload stored alongside a thing's vectors; every field the search surface
/// renders or filters on.
#[derive(Clone, Debug)]
pub struct VectorPayload {
	pub name: String,
	pub description: String,
	pub category: String,
	pub tags: Vec<String>,
	pub material: Option<String>,
	pub location_path: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct VectorFilters {
	/// Keeps hits whose location path equals this value or lies under it.
	pub location_path: Option<String>,
	pub category: Option<String>,
	pub material: Option<String>,
	/// Every listed tag must be present on the hit.
	pub tags: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct VectorHit {
	pub thing_id: Uuid,
	pub name: String,
	pub description: String,
	pub category: String,
	pub tags: Vec<String>,
	pub location_path: Option<String>,
	pub score: f32,
}

pub trait VectorStore
where
	Self: Send + Sync,
{
	fn ensure_collection(&self) -> BoxFuture<'_, Result<()>>;

	fn upsert_text<'a>(
		&'a self,
		thing_id: Uuid,
		vector: &'a [f32],
		payload: &'a VectorPayload,
	) -> BoxFuture<'a, Result<()>>;

	/// Sets the image vector on an already-indexed thing, leaving the text
	/// vector and payload untouched.
	fn upsert_image<'a>(&'a self, thing_id: Uuid, vector: &'a [f32]) -> BoxFuture<'a, Result<()>>;

	fn search_text<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u64,
		filters: &'a VectorFilters,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>>;

	fn search_image<'a>(&'a self, vector: &'a [f32], limit: u64)
	-> BoxFuture<'a, Result<Vec<VectorHit>>>;

	fn update_location_path<'a>(
		&'a self,
		thing_id: Uuid,
		location_path: Option<&'a str>,
	) -> BoxFuture<'a, Result<()>>;

	fn delete_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<()>>;
}
