use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, ShelfService};
use shelf_domain::path;
use shelf_storage::models::LocationRecord;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Location {
	pub location_id: Uuid,
	pub name: String,
	pub parent_id: Option<Uuid>,
	pub path: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<LocationRecord> for Location {
	fn from(record: LocationRecord) -> Self {
		Self {
			location_id: record.location_id,
			name: record.name,
			parent_id: record.parent_id,
			path: record.path,
			created_at: record.created_at,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateLocationRequest {
	pub name: String,
	pub parent_id: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenameLocationRequest {
	pub location_id: Uuid,
	pub new_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveLocationRequest {
	pub location_id: Uuid,
	pub new_parent_id: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteLocationRequest {
	pub location_id: Uuid,
	#[serde(default)]
	pub force: bool,
}

impl ShelfService {
	pub async fn create_location(&self, req: CreateLocationRequest) -> Result<Location> {
		path::validate_name(&req.name)
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;

		let parent_path = match req.parent_id {
			Some(parent_id) => {
				self.stores
					.locations
					.fetch(parent_id)
					.await?
					.ok_or_else(|| Error::NotFound {
						message: format!("Parent location {parent_id} not found."),
					})?
					.path
			},
			None => String::new(),
		};

		if self.stores.locations.sibling_exists(&req.name, req.parent_id, None).await? {
			return Err(Error::DuplicateSibling {
				message: format!("Location {:?} already exists under this parent.", req.name),
			});
		}

		let record = LocationRecord {
			location_id: Uuid::new_v4(),
			name: req.name.clone(),
			parent_id: req.parent_id,
			path: path::build_path(&parent_path, &req.name),
			created_at: OffsetDateTime::now_utc(),
		};

		self.stores.locations.insert(&record).await?;

		tracing::info!(location_id = %record.location_id, path = %record.path, "Created location.");

		Ok(record.into())
	}

	pub async fn location(&self, location_id: Uuid) -> Result<Location> {
		self.location_record(location_id).await.map(Into::into)
	}

	pub async fn location_by_path(&self, path: &str) -> Result<Location> {
		let record = self.stores.locations.fetch_by_path(path).await?.ok_or_else(|| {
			Error::NotFound { message: format!("Location at path {path:?} not found.") }
		})?;

		Ok(record.into())
	}

	pub async fn list_locations(&self) -> Result<Vec<Location>> {
		let records = self.stores.locations.list_all().await?;

		Ok(records.into_iter().map(Into::into).collect())
	}

	pub async fn location_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Location>> {
		let records = self.stores.locations.children(parent_id).await?;

		Ok(records.into_iter().map(Into::into).collect())
	}

	pub async fn location_subtree(&self, location_id: Uuid) -> Result<Vec<Location>> {
		let record = self.location_record(location_id).await?;
		let records = self.stores.locations.subtree(&record.path).await?;

		Ok(records.into_iter().map(Into::into).collect())
	}

	pub async fn rename_location(&self, req: RenameLocationRequest) -> Result<Location> {
		path::validate_name(&req.new_name)
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;

		let mut record = self.location_record(req.location_id).await?;

		if self
			.stores
			.locations
			.sibling_exists(&req.new_name, record.parent_id, Some(record.location_id))
			.await?
		{
			return Err(Error::DuplicateSibling {
				message: format!("Location {:?} already exists under this parent.", req.new_name),
			});
		}

		let parent_path = match record.parent_id {
			Some(parent_id) => {
				self.stores
					.locations
					.fetch(parent_id)
					.await?
					.ok_or_else(|| Error::NotFound {
						message: format!("Parent location {parent_id} not found."),
					})?
					.path
			},
			None => String::new(),
		};
		let old_path = record.path.clone();

		record.name = req.new_name;
		record.path = path::build_path(&parent_path, &record.name);

		let touched = self.stores.locations.update_subtree(&record, &old_path).await?;

		tracing::info!(old_path = %old_path, new_path = %record.path, touched, "Renamed location.");

		Ok(record.into())
	}

	pub async fn move_location(&self, req: MoveLocationRequest) -> Result<Location> {
		let mut record = self.location_record(req.location_id).await?;
		let new_parent_path = match req.new_parent_id {
			Some(new_parent_id) => {
				if new_parent_id == record.location_id {
					return Err(Error::InvalidMoveTarget {
						message: "Cannot move a location under itself.".to_string(),
					});
				}

				let new_parent =
					self.stores.locations.fetch(new_parent_id).await?.ok_or_else(|| {
						Error::NotFound {
							message: format!("New parent location {new_parent_id} not found."),
						}
					})?;

				// Walk up from the new parent; reaching the moved node means the
				// target sits inside its own subtree.
				let mut cursor = new_parent.parent_id;

				while let Some(ancestor_id) = cursor {
					if ancestor_id == record.location_id {
						return Err(Error::InvalidMoveTarget {
							message: "Cannot move a location under its own descendant."
								.to_string(),
						});
					}

					cursor = self
						.stores
						.locations
						.fetch(ancestor_id)
						.await?
						.and_then(|ancestor| ancestor.parent_id);
				}

				new_parent.path
			},
			None => String::new(),
		};

		if self
			.stores
			.locations
			.sibling_exists(&record.name, req.new_parent_id, Some(record.location_id))
			.await?
		{
			return Err(Error::DuplicateSibling {
				message: format!("Location {:?} already exists under this parent.", record.name),
			});
		}

		let old_path = record.path.clone();

		record.parent_id = req.new_parent_id;
		record.path = path::build_path(&new_parent_path, &record.name);

		let touched = self.stores.locations.update_subtree(&record, &old_path).await?;

		tracing::info!(old_path = %old_path, new_path = %record.path, touched, "Moved location.");

		Ok(record.into())
	}

	pub async fn delete_location(&self, req: DeleteLocationRequest) -> Result<bool> {
		let record = self.location_record(req.location_id).await?;

		// Children always block deletion; force only overrides placements.
		if self.stores.locations.has_children(record.location_id).await? {
			return Err(Error::HasChildren {
				message: format!("Location {} has child locations.", record.location_id),
			});
		}
		if !req.force && self.stores.placements.has_active_at_location(record.location_id).await? {
			return Err(Error::HasThings {
				message: format!(
					"Location {} has things placed at it; pass force to delete.",
					record.location_id
				),
			});
		}
		if req.force {
			for placement in
				self.stores.placements.active_at_location(record.location_id).await?
			{
				self.stores.vectors.update_location_path(placement.thing_id, None).await?;
			}

			let purged =
				self.stores.placements.delete_by_location(record.location_id).await?;

			if purged > 0 {
				tracing::info!(location_id = %record.location_id, purged, "Purged placements for forced delete.");
			}
		}

		let deleted = self.stores.locations.delete(record.location_id).await?;

		tracing::info!(location_id = %record.location_id, path = %record.path, "Deleted location.");

		Ok(deleted)
	}

	pub(crate) async fn location_record(&self, location_id: Uuid) -> Result<LocationRecord> {
		self.stores.locations.fetch(location_id).await?.ok_or_else(|| Error::NotFound {
			message: format!("Location {location_id} not found."),
		})
	}
}
