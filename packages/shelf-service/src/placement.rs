use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, ShelfService};
use shelf_storage::models::PlacementRecord;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Placement {
	pub placement_id: Uuid,
	pub thing_id: Uuid,
	pub location_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub placed_at: OffsetDateTime,
	pub active: bool,
}
impl From<PlacementRecord> for Placement {
	fn from(record: PlacementRecord) -> Self {
		Self {
			placement_id: record.placement_id,
			thing_id: record.thing_id,
			location_id: record.location_id,
			placed_at: record.placed_at,
			active: record.active,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceThingRequest {
	pub thing_id: Uuid,
	pub location_id: Uuid,
}

impl ShelfService {
	/// Places a thing at a location, or moves it there. The previous active
	/// placement is deactivated, never deleted, so history is preserved.
	pub async fn place_thing(&self, req: PlaceThingRequest) -> Result<Placement> {
		let thing = self.stores.things.fetch(req.thing_id).await?.ok_or_else(|| {
			Error::NotFound { message: format!("Thing {} not found.", req.thing_id) }
		})?;
		let location = self.stores.locations.fetch(req.location_id).await?.ok_or_else(|| {
			Error::NotFound { message: format!("Location {} not found.", req.location_id) }
		})?;
		let record = PlacementRecord {
			placement_id: Uuid::new_v4(),
			thing_id: req.thing_id,
			location_id: req.location_id,
			placed_at: OffsetDateTime::now_utc(),
			active: true,
		};
		let deactivated = self.stores.placements.transition(&record).await?;

		if deactivated > 1 {
			tracing::warn!(thing_id = %req.thing_id, deactivated, "Deactivated more than one active placement.");
		}

		self.stores.vectors.update_location_path(req.thing_id, Some(&location.path)).await?;

		tracing::info!(
			thing = %thing.name,
			path = %location.path,
			placement_id = %record.placement_id,
			"Placed thing.",
		);

		Ok(record.into())
	}

	pub async fn active_placement(&self, thing_id: Uuid) -> Result<Option<Placement>> {
		let record = self.stores.placements.active_for_thing(thing_id).await?;

		Ok(record.map(Into::into))
	}

	/// Full placement history for a thing, most recent first.
	pub async fn placement_history(&self, thing_id: Uuid) -> Result<Vec<Placement>> {
		let records = self.stores.placements.history_for_thing(thing_id).await?;

		Ok(records.into_iter().map(Into::into).collect())
	}

	pub async fn placements_at_location(&self, location_id: Uuid) -> Result<Vec<Placement>> {
		let records = self.stores.placements.active_at_location(location_id).await?;

		Ok(records.into_iter().map(Into::into).collect())
	}

	pub async fn count_at_location(&self, location_id: Uuid) -> Result<i64> {
		let count = self.stores.placements.count_active_at_location(location_id).await?;

		Ok(count)
	}

	/// Deactivates the current placement without touching history. Returns the
	/// number of rows deactivated (0 when the thing was already unplaced).
	pub async fn remove_placement(&self, thing_id: Uuid) -> Result<u64> {
		let deactivated = self.stores.placements.deactivate_for_thing(thing_id).await?;

		if deactivated > 0 {
			self.stores.vectors.update_location_path(thing_id, None).await?;
		}

		tracing::info!(thing_id = %thing_id, deactivated, "Removed placement.");

		Ok(deactivated)
	}
}
