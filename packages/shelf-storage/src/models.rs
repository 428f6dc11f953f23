use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LocationRecord {
	pub location_id: Uuid,
	pub name: String,
	pub parent_id: Option<Uuid>,
	pub path: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PlacementRecord {
	pub placement_id: Uuid,
	pub thing_id: Uuid,
	pub location_id: Uuid,
	pub placed_at: OffsetDateTime,
	pub active: bool,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ThingRecord {
	pub thing_id: Uuid,
	pub name: String,
	pub description: String,
	pub metadata: Value,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
