mod common;

use uuid::Uuid;

use shelf_service::{
	CreateLocationRequest, CreateThingRequest, Error, IndexThingImageRequest, PlaceThingRequest,
	UpdateThingRequest,
};
use shelf_testkit::test_config;

use crate::common::{harness, harness_with_config};

#[tokio::test]
async fn create_enriches_metadata_and_indexes_the_vector() {
	let harness = harness();
	let spoon = harness
		.service
		.create_thing(CreateThingRequest {
			name: "Wooden spoon".to_string(),
			description: Some("a spoon for the kitchen drawer".to_string()),
		})
		.await
		.expect("Failed to create thing.");

	assert_eq!(spoon.metadata.category, "kitchenware");
	assert_eq!(spoon.metadata.material.as_deref(), Some("wood"));
	assert!(spoon.metadata.tags.contains(&"spoon".to_string()));

	let payload = harness.vectors.payload(spoon.thing_id).expect("Thing must be indexed.");

	assert_eq!(payload.name, "Wooden spoon");
	assert_eq!(payload.category, "kitchenware");
	assert_eq!(payload.material.as_deref(), Some("wood"));
	assert_eq!(payload.location_path, None);
}

#[tokio::test]
async fn create_validates_the_name() {
	let harness = harness();
	let empty = harness
		.service
		.create_thing(CreateThingRequest { name: "  ".to_string(), description: None })
		.await;

	assert!(matches!(empty, Err(Error::InvalidRequest { .. })), "got {empty:?}");

	let long = harness
		.service
		.create_thing(CreateThingRequest { name: "x".repeat(121), description: None })
		.await;

	assert!(matches!(long, Err(Error::InvalidRequest { .. })), "got {long:?}");
}

#[tokio::test]
async fn update_regenerates_metadata_and_preserves_placement_payload() {
	let harness = harness();
	let garage = harness
		.service
		.create_location(CreateLocationRequest { name: "Garage".to_string(), parent_id: None })
		.await
		.expect("Failed to create location.");
	let created = harness
		.service
		.create_thing(CreateThingRequest {
			name: "Mystery box".to_string(),
			description: None,
		})
		.await
		.expect("Failed to create thing.");

	assert_eq!(created.metadata.category, "general");

	harness
		.service
		.place_thing(PlaceThingRequest {
			thing_id: created.thing_id,
			location_id: garage.location_id,
		})
		.await
		.expect("Failed to place.");

	let updated = harness
		.service
		.update_thing(UpdateThingRequest {
			thing_id: created.thing_id,
			name: Some("Steel hammer".to_string()),
			description: Some("a hammer for the garage".to_string()),
			regenerate_metadata: true,
		})
		.await
		.expect("Failed to update thing.");

	assert_eq!(updated.name, "Steel hammer");
	assert_eq!(updated.metadata.category, "tools");
	assert_eq!(updated.metadata.material.as_deref(), Some("metal"));
	assert!(updated.updated_at >= created.updated_at);

	// Re-indexing keeps the active placement's path in the payload.
	let payload = harness.vectors.payload(created.thing_id).expect("Thing must be indexed.");

	assert_eq!(payload.name, "Steel hammer");
	assert_eq!(payload.category, "tools");
	assert_eq!(payload.location_path.as_deref(), Some("/Garage"));
}

#[tokio::test]
async fn update_without_regeneration_keeps_metadata() {
	let harness = harness();
	let spoon = harness
		.service
		.create_thing(CreateThingRequest {
			name: "Wooden spoon".to_string(),
			description: None,
		})
		.await
		.expect("Failed to create thing.");
	let updated = harness
		.service
		.update_thing(UpdateThingRequest {
			thing_id: spoon.thing_id,
			name: None,
			description: Some("lives in the drawer".to_string()),
			regenerate_metadata: false,
		})
		.await
		.expect("Failed to update thing.");

	assert_eq!(updated.metadata, spoon.metadata);
	assert_eq!(updated.description, "lives in the drawer");
}

#[tokio::test]
async fn delete_removes_vectors_placements_and_the_row() {
	let harness = harness();
	let shelf = harness
		.service
		.create_location(CreateLocationRequest { name: "Shelf".to_string(), parent_id: None })
		.await
		.expect("Failed to create location.");
	let widget = harness
		.service
		.create_thing(CreateThingRequest { name: "Widget".to_string(), description: None })
		.await
		.expect("Failed to create thing.");

	harness
		.service
		.place_thing(PlaceThingRequest {
			thing_id: widget.thing_id,
			location_id: shelf.location_id,
		})
		.await
		.expect("Failed to place.");

	let deleted =
		harness.service.delete_thing(widget.thing_id).await.expect("Failed to delete thing.");

	assert!(deleted);
	assert!(!harness.vectors.has_point(widget.thing_id));

	let history = harness
		.service
		.placement_history(widget.thing_id)
		.await
		.expect("Failed to fetch history.");

	assert!(history.is_empty());

	let gone = harness.service.thing(widget.thing_id).await;

	assert!(matches!(gone, Err(Error::NotFound { .. })), "got {gone:?}");

	let missing = harness.service.delete_thing(Uuid::new_v4()).await;

	assert!(matches!(missing, Err(Error::NotFound { .. })), "got {missing:?}");
}

#[tokio::test]
async fn list_is_newest_first_with_pagination() {
	let harness = harness();

	for index in 0..5 {
		harness
			.service
			.create_thing(CreateThingRequest {
				name: format!("Thing {index}"),
				description: None,
			})
			.await
			.expect("Failed to create thing.");
	}

	let count = harness.service.count_things().await.expect("Failed to count.");

	assert_eq!(count, 5);

	let first_page = harness.service.list_things(0, 2).await.expect("Failed to list.");
	let names: Vec<&str> = first_page.iter().map(|thing| thing.name.as_str()).collect();

	assert_eq!(names, vec!["Thing 4", "Thing 3"]);

	let second_page = harness.service.list_things(2, 2).await.expect("Failed to list.");
	let names: Vec<&str> = second_page.iter().map(|thing| thing.name.as_str()).collect();

	assert_eq!(names, vec!["Thing 2", "Thing 1"]);
}

#[tokio::test]
async fn image_indexing_requires_a_vision_provider() {
	let harness = harness();
	let widget = harness
		.service
		.create_thing(CreateThingRequest { name: "Widget".to_string(), description: None })
		.await
		.expect("Failed to create thing.");

	harness
		.service
		.index_thing_image(IndexThingImageRequest {
			thing_id: widget.thing_id,
			image: vec![1, 2, 3, 4],
		})
		.await
		.expect("Failed to index image.");

	assert!(harness.vectors.has_image_vector(widget.thing_id));

	let mut cfg = test_config();

	cfg.providers.vision = None;

	let no_vision = harness_with_config(cfg);
	let widget = no_vision
		.service
		.create_thing(CreateThingRequest { name: "Widget".to_string(), description: None })
		.await
		.expect("Failed to create thing.");
	let rejected = no_vision
		.service
		.index_thing_image(IndexThingImageRequest {
			thing_id: widget.thing_id,
			image: vec![1, 2, 3, 4],
		})
		.await;

	assert!(matches!(rejected, Err(Error::InvalidRequest { .. })), "got {rejected:?}");
}
