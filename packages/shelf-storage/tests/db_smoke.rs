use std::env;

use time::OffsetDateTime;
use uuid::Uuid;

use shelf_config::Postgres;
use shelf_storage::{
	db::Db,
	models::{LocationRecord, PlacementRecord, ThingRecord},
	store::{LocationStore, PlacementStore, ThingStore},
};

fn env_dsn() -> Option<String> {
	env::var("SHELF_PG_DSN").ok()
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn schema_bootstraps_and_tables_exist() {
	let Some(dsn) = env_dsn() else {
		eprintln!("Skipping schema_bootstraps_and_tables_exist; set SHELF_PG_DSN to run.");

		return;
	};
	let cfg = Postgres { dsn, pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	for table in ["locations", "things", "placements"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn sibling_uniqueness_enforced_by_index() {
	let Some(dsn) = env_dsn() else {
		eprintln!("Skipping sibling_uniqueness_enforced_by_index; set SHELF_PG_DSN to run.");

		return;
	};
	let cfg = Postgres { dsn, pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let store = db.location_store();
	let suffix = Uuid::new_v4().simple().to_string();
	let name = format!("Root {suffix}");
	let now = OffsetDateTime::now_utc();
	let first = LocationRecord {
		location_id: Uuid::new_v4(),
		name: name.clone(),
		parent_id: None,
		path: format!("/{name}"),
		created_at: now,
	};

	store.insert(&first).await.expect("Failed to insert first root.");

	let duplicate = LocationRecord { location_id: Uuid::new_v4(), ..first.clone() };
	let result = store.insert(&duplicate).await;

	assert!(
		matches!(result, Err(shelf_storage::Error::Conflict(_))),
		"expected Conflict, got {result:?}"
	);

	store.delete(first.location_id).await.expect("Failed to clean up root.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn placement_transition_keeps_one_active_row() {
	let Some(dsn) = env_dsn() else {
		eprintln!("Skipping placement_transition_keeps_one_active_row; set SHELF_PG_DSN to run.");

		return;
	};
	let cfg = Postgres { dsn, pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let locations = db.location_store();
	let things = db.thing_store();
	let placements = db.placement_store();
	let suffix = Uuid::new_v4().simple().to_string();
	let now = OffsetDateTime::now_utc();
	let location = LocationRecord {
		location_id: Uuid::new_v4(),
		name: format!("Shelf {suffix}"),
		parent_id: None,
		path: format!("/Shelf {suffix}"),
		created_at: now,
	};
	let thing = ThingRecord {
		thing_id: Uuid::new_v4(),
		name: "Smoke test thing".to_string(),
		description: String::new(),
		metadata: serde_json::json!({}),
		created_at: now,
		updated_at: now,
	};

	locations.insert(&location).await.expect("Failed to insert location.");
	things.insert(&thing).await.expect("Failed to insert thing.");

	for _ in 0..3 {
		let placement = PlacementRecord {
			placement_id: Uuid::new_v4(),
			thing_id: thing.thing_id,
			location_id: location.location_id,
			placed_at: OffsetDateTime::now_utc(),
			active: true,
		};

		placements.transition(&placement).await.expect("Failed to transition placement.");
	}

	let active_count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM placements WHERE thing_id = $1 AND active")
			.bind(thing.thing_id)
			.fetch_one(&db.pool)
			.await
			.expect("Failed to count active placements.");
	let total_count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM placements WHERE thing_id = $1")
			.bind(thing.thing_id)
			.fetch_one(&db.pool)
			.await
			.expect("Failed to count placements.");

	assert_eq!(active_count, 1);
	assert_eq!(total_count, 3);

	placements.delete_by_thing(thing.thing_id).await.expect("Failed to clean up placements.");
	things.delete(thing.thing_id).await.expect("Failed to clean up thing.");
	locations.delete(location.location_id).await.expect("Failed to clean up location.");
}
