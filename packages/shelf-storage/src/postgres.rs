//! Postgres-backed implementations of the entity store traits. All queries
//! use the runtime API so the crate builds without a live database.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{LocationRecord, PlacementRecord, ThingRecord},
	store::{BoxFuture, LocationStore, PlacementStore, ThingStore},
};

pub struct PgLocationStore {
	pub pool: PgPool,
}

pub struct PgPlacementStore {
	pub pool: PgPool,
}

pub struct PgThingStore {
	pub pool: PgPool,
}

fn map_insert_err(err: sqlx::Error, what: &str) -> Error {
	if let sqlx::Error::Database(db_err) = &err
		&& db_err.is_unique_violation()
	{
		return Error::Conflict(format!("{what} violates a uniqueness constraint."));
	}

	Error::Sqlx(err)
}

impl LocationStore for PgLocationStore {
	fn insert<'a>(&'a self, location: &'a LocationRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO locations (location_id, name, parent_id, path, created_at)
VALUES ($1, $2, $3, $4, $5)",
			)
			.bind(location.location_id)
			.bind(location.name.as_str())
			.bind(location.parent_id)
			.bind(location.path.as_str())
			.bind(location.created_at)
			.execute(&self.pool)
			.await
			.map_err(|err| map_insert_err(err, "Location"))?;

			Ok(())
		})
	}

	fn fetch(&self, location_id: Uuid) -> BoxFuture<'_, Result<Option<LocationRecord>>> {
		Box::pin(async move {
			let location = sqlx::query_as::<_, LocationRecord>(
				"SELECT * FROM locations WHERE location_id = $1",
			)
			.bind(location_id)
			.fetch_optional(&self.pool)
			.await?;

			Ok(location)
		})
	}

	fn fetch_by_path<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Option<LocationRecord>>> {
		Box::pin(async move {
			let location =
				sqlx::query_as::<_, LocationRecord>("SELECT * FROM locations WHERE path = $1")
					.bind(path)
					.fetch_optional(&self.pool)
					.await?;

			Ok(location)
		})
	}

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
		Box::pin(async move {
			let locations =
				sqlx::query_as::<_, LocationRecord>("SELECT * FROM locations ORDER BY path")
					.fetch_all(&self.pool)
					.await?;

			Ok(locations)
		})
	}

	fn children(&self, parent_id: Option<Uuid>) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
		Box::pin(async move {
			let children = sqlx::query_as::<_, LocationRecord>(
				"\
SELECT *
FROM locations
WHERE parent_id IS NOT DISTINCT FROM $1
ORDER BY name",
			)
			.bind(parent_id)
			.fetch_all(&self.pool)
			.await?;

			Ok(children)
		})
	}

	fn subtree<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<LocationRecord>>> {
		Box::pin(async move {
			let locations = sqlx::query_as::<_, LocationRecord>(
				"\
SELECT *
FROM locations
WHERE path = $1 OR substr(path, 1, char_length($1) + 1) = $1 || '/'
ORDER BY path",
			)
			.bind(path)
			.fetch_all(&self.pool)
			.await?;

			Ok(locations)
		})
	}

	fn sibling_exists<'a>(
		&'a self,
		name: &'a str,
		parent_id: Option<Uuid>,
		exclude: Option<Uuid>,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let count: i64 = sqlx::query_scalar(
				"\
SELECT count(*)
FROM locations
WHERE name = $1
	AND parent_id IS NOT DISTINCT FROM $2
	AND ($3::uuid IS NULL OR location_id <> $3)",
			)
			.bind(name)
			.bind(parent_id)
			.bind(exclude)
			.fetch_one(&self.pool)
			.await?;

			Ok(count > 0)
		})
	}

	fn has_children(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let count: i64 =
				sqlx::query_scalar("SELECT count(*) FROM locations WHERE parent_id = $1")
					.bind(location_id)
					.fetch_one(&self.pool)
					.await?;

			Ok(count > 0)
		})
	}

	fn update_subtree<'a>(
		&'a self,
		location: &'a LocationRecord,
		old_path: &'a str,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let mut tx = self.pool.begin().await?;

			sqlx::query(
				"UPDATE locations SET name = $2, parent_id = $3, path = $4 WHERE location_id = $1",
			)
			.bind(location.location_id)
			.bind(location.name.as_str())
			.bind(location.parent_id)
			.bind(location.path.as_str())
			.execute(&mut *tx)
			.await
			.map_err(|err| map_insert_err(err, "Location"))?;

			// Descendants keep their relative suffix; only the matched prefix
			// is replaced.
			let cascaded = sqlx::query(
				"\
UPDATE locations
SET path = $2 || substr(path, char_length($1) + 1)
WHERE substr(path, 1, char_length($1) + 1) = $1 || '/'",
			)
			.bind(old_path)
			.bind(location.path.as_str())
			.execute(&mut *tx)
			.await?
			.rows_affected();

			tx.commit().await?;

			Ok(cascaded + 1)
		})
	}

	fn delete(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let deleted = sqlx::query("DELETE FROM locations WHERE location_id = $1")
				.bind(location_id)
				.execute(&self.pool)
				.await?
				.rows_affected();

			Ok(deleted > 0)
		})
	}
}

impl PlacementStore for PgPlacementStore {
	fn transition<'a>(&'a self, placement: &'a PlacementRecord) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let mut tx = self.pool.begin().await?;
			let deactivated =
				sqlx::query("UPDATE placements SET active = FALSE WHERE thing_id = $1 AND active")
					.bind(placement.thing_id)
					.execute(&mut *tx)
					.await?
					.rows_affected();

			sqlx::query(
				"\
INSERT INTO placements (placement_id, thing_id, location_id, placed_at, active)
VALUES ($1, $2, $3, $4, TRUE)",
			)
			.bind(placement.placement_id)
			.bind(placement.thing_id)
			.bind(placement.location_id)
			.bind(placement.placed_at)
			.execute(&mut *tx)
			.await
			.map_err(|err| map_insert_err(err, "Placement"))?;

			tx.commit().await?;

			Ok(deactivated)
		})
	}

	fn active_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Option<PlacementRecord>>> {
		Box::pin(async move {
			let placement = sqlx::query_as::<_, PlacementRecord>(
				"SELECT * FROM placements WHERE thing_id = $1 AND active",
			)
			.bind(thing_id)
			.fetch_optional(&self.pool)
			.await?;

			Ok(placement)
		})
	}

	fn history_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Vec<PlacementRecord>>> {
		Box::pin(async move {
			let placements = sqlx::query_as::<_, PlacementRecord>(
				"SELECT * FROM placements WHERE thing_id = $1 ORDER BY placed_at DESC",
			)
			.bind(thing_id)
			.fetch_all(&self.pool)
			.await?;

			Ok(placements)
		})
	}

	fn active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<Vec<PlacementRecord>>> {
		Box::pin(async move {
			let placements = sqlx::query_as::<_, PlacementRecord>(
				"SELECT * FROM placements WHERE location_id = $1 AND active ORDER BY placed_at",
			)
			.bind(location_id)
			.fetch_all(&self.pool)
			.await?;

			Ok(placements)
		})
	}

	fn count_active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<i64>> {
		Box::pin(async move {
			let count: i64 = sqlx::query_scalar(
				"SELECT count(*) FROM placements WHERE location_id = $1 AND active",
			)
			.bind(location_id)
			.fetch_one(&self.pool)
			.await?;

			Ok(count)
		})
	}

	fn has_active_at_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let count: i64 = sqlx::query_scalar(
				"SELECT count(*) FROM placements WHERE location_id = $1 AND active",
			)
			.bind(location_id)
			.fetch_one(&self.pool)
			.await?;

			Ok(count > 0)
		})
	}

	fn deactivate_for_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let deactivated =
				sqlx::query("UPDATE placements SET active = FALSE WHERE thing_id = $1 AND active")
					.bind(thing_id)
					.execute(&self.pool)
					.await?
					.rows_affected();

			Ok(deactivated)
		})
	}

	fn delete_by_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let deleted = sqlx::query("DELETE FROM placements WHERE location_id = $1")
				.bind(location_id)
				.execute(&self.pool)
				.await?
				.rows_affected();

			Ok(deleted)
		})
	}

	fn delete_by_thing(&self, thing_id: Uuid) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let deleted = sqlx::query("DELETE FROM placements WHERE thing_id = $1")
				.bind(thing_id)
				.execute(&self.pool)
				.await?
				.rows_affected();

			Ok(deleted)
		})
	}
}

impl ThingStore for PgThingStore {
	fn insert<'a>(&'a self, thing: &'a ThingRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO things (thing_id, name, description, metadata, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6)",
			)
			.bind(thing.thing_id)
			.bind(thing.name.as_str())
			.bind(thing.description.as_str())
			.bind(&thing.metadata)
			.bind(thing.created_at)
			.bind(thing.updated_at)
			.execute(&self.pool)
			.await
			.map_err(|err| map_insert_err(err, "Thing"))?;

			Ok(())
		})
	}

	fn fetch(&self, thing_id: Uuid) -> BoxFuture<'_, Result<Option<ThingRecord>>> {
		Box::pin(async move {
			let thing =
				sqlx::query_as::<_, ThingRecord>("SELECT * FROM things WHERE thing_id = $1")
					.bind(thing_id)
					.fetch_optional(&self.pool)
					.await?;

			Ok(thing)
		})
	}

	fn list(&self, offset: i64, limit: i64) -> BoxFuture<'_, Result<Vec<ThingRecord>>> {
		Box::pin(async move {
			let things = sqlx::query_as::<_, ThingRecord>(
				"SELECT * FROM things ORDER BY created_at DESC OFFSET $1 LIMIT $2",
			)
			.bind(offset)
			.bind(limit)
			.fetch_all(&self.pool)
			.await?;

			Ok(things)
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<i64>> {
		Box::pin(async move {
			let count: i64 = sqlx::query_scalar("SELECT count(*) FROM things")
				.fetch_one(&self.pool)
				.await?;

			Ok(count)
		})
	}

	fn update<'a>(&'a self, thing: &'a ThingRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
UPDATE things
SET name = $2, description = $3, metadata = $4, updated_at = $5
WHERE thing_id = $1",
			)
			.bind(thing.thing_id)
			.bind(thing.name.as_str())
			.bind(thing.description.as_str())
			.bind(&thing.metadata)
			.bind(thing.updated_at)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn delete(&self, thing_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let deleted = sqlx::query("DELETE FROM things WHERE thing_id = $1")
				.bind(thing_id)
				.execute(&self.pool)
				.await?
				.rows_affected();

			Ok(deleted > 0)
		})
	}
}
