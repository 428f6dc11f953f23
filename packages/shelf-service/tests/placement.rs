mod common;

use uuid::Uuid;

use shelf_service::{CreateLocationRequest, CreateThingRequest, Error, PlaceThingRequest};

use crate::common::{TestHarness, harness};

async fn location(harness: &TestHarness, name: &str) -> Uuid {
	harness
		.service
		.create_location(CreateLocationRequest { name: name.to_string(), parent_id: None })
		.await
		.expect("Failed to create location.")
		.location_id
}

async fn thing(harness: &TestHarness, name: &str) -> Uuid {
	harness
		.service
		.create_thing(CreateThingRequest { name: name.to_string(), description: None })
		.await
		.expect("Failed to create thing.")
		.thing_id
}

#[tokio::test]
async fn placing_twice_moves_the_thing_and_keeps_history() {
	let harness = harness();
	let shelf_a = location(&harness, "Shelf A").await;
	let shelf_b = location(&harness, "Shelf B").await;
	let stapler = thing(&harness, "Stapler").await;

	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: stapler, location_id: shelf_a })
		.await
		.expect("Failed to place at A.");
	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: stapler, location_id: shelf_b })
		.await
		.expect("Failed to place at B.");

	let active = harness
		.service
		.active_placement(stapler)
		.await
		.expect("Failed to fetch active placement.")
		.expect("Thing must be placed.");

	assert_eq!(active.location_id, shelf_b);
	assert!(active.active);

	let history =
		harness.service.placement_history(stapler).await.expect("Failed to fetch history.");

	assert_eq!(history.len(), 2);
	// Most recent first: B active, A deactivated but retained.
	assert_eq!(history[0].location_id, shelf_b);
	assert!(history[0].active);
	assert_eq!(history[1].location_id, shelf_a);
	assert!(!history[1].active);
}

#[tokio::test]
async fn at_most_one_active_across_arbitrary_sequences() {
	let harness = harness();
	let shelves = [
		location(&harness, "Shelf 1").await,
		location(&harness, "Shelf 2").await,
		location(&harness, "Shelf 3").await,
	];
	let widget = thing(&harness, "Widget").await;

	for (step, shelf) in shelves.iter().cycle().take(7).enumerate() {
		harness
			.service
			.place_thing(PlaceThingRequest { thing_id: widget, location_id: *shelf })
			.await
			.expect("Failed to place.");

		if step == 3 {
			harness.service.remove_placement(widget).await.expect("Failed to remove.");
		}

		let history =
			harness.service.placement_history(widget).await.expect("Failed to fetch history.");
		let active_rows = history.iter().filter(|placement| placement.active).count();

		assert!(active_rows <= 1, "invariant violated at step {step}: {active_rows} active rows");
	}

	let history =
		harness.service.placement_history(widget).await.expect("Failed to fetch history.");

	assert_eq!(history.len(), 7);
}

#[tokio::test]
async fn place_validates_thing_and_location() {
	let harness = harness();
	let shelf = location(&harness, "Shelf").await;
	let widget = thing(&harness, "Widget").await;

	let missing_thing = harness
		.service
		.place_thing(PlaceThingRequest { thing_id: Uuid::new_v4(), location_id: shelf })
		.await;

	assert!(matches!(missing_thing, Err(Error::NotFound { .. })), "got {missing_thing:?}");

	let missing_location = harness
		.service
		.place_thing(PlaceThingRequest { thing_id: widget, location_id: Uuid::new_v4() })
		.await;

	assert!(matches!(missing_location, Err(Error::NotFound { .. })), "got {missing_location:?}");
}

#[tokio::test]
async fn remove_returns_count_and_tolerates_unplaced_things() {
	let harness = harness();
	let shelf = location(&harness, "Shelf").await;
	let widget = thing(&harness, "Widget").await;

	// Removing an unplaced thing is a no-op, not an error.
	let removed = harness.service.remove_placement(widget).await.expect("Remove must succeed.");

	assert_eq!(removed, 0);

	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: widget, location_id: shelf })
		.await
		.expect("Failed to place.");

	let removed = harness.service.remove_placement(widget).await.expect("Remove must succeed.");

	assert_eq!(removed, 1);

	let active =
		harness.service.active_placement(widget).await.expect("Failed to fetch active.");

	assert!(active.is_none());

	// Deactivation preserves the row.
	let history =
		harness.service.placement_history(widget).await.expect("Failed to fetch history.");

	assert_eq!(history.len(), 1);
	assert!(!history[0].active);
}

#[tokio::test]
async fn location_listings_count_only_active_placements() {
	let harness = harness();
	let shelf_a = location(&harness, "Shelf A").await;
	let shelf_b = location(&harness, "Shelf B").await;
	let stapler = thing(&harness, "Stapler").await;
	let widget = thing(&harness, "Widget").await;

	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: stapler, location_id: shelf_a })
		.await
		.expect("Failed to place.");
	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: widget, location_id: shelf_a })
		.await
		.expect("Failed to place.");
	// Moving the widget away leaves an inactive row at A.
	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: widget, location_id: shelf_b })
		.await
		.expect("Failed to place.");

	let at_a = harness
		.service
		.placements_at_location(shelf_a)
		.await
		.expect("Failed to list placements.");

	assert_eq!(at_a.len(), 1);
	assert_eq!(at_a[0].thing_id, stapler);

	let count_a =
		harness.service.count_at_location(shelf_a).await.expect("Failed to count.");
	let count_b =
		harness.service.count_at_location(shelf_b).await.expect("Failed to count.");

	assert_eq!(count_a, 1);
	assert_eq!(count_b, 1);
}

#[tokio::test]
async fn placement_transitions_keep_vector_payload_in_sync() {
	let harness = harness();
	let kitchen = harness
		.service
		.create_location(CreateLocationRequest { name: "Kitchen".to_string(), parent_id: None })
		.await
		.expect("Failed to create location.");
	let spoon = thing(&harness, "Wooden spoon").await;

	let payload = harness.vectors.payload(spoon).expect("Thing must be indexed.");

	assert_eq!(payload.location_path, None);

	harness
		.service
		.place_thing(PlaceThingRequest { thing_id: spoon, location_id: kitchen.location_id })
		.await
		.expect("Failed to place.");

	let payload = harness.vectors.payload(spoon).expect("Thing must be indexed.");

	assert_eq!(payload.location_path.as_deref(), Some("/Kitchen"));

	harness.service.remove_placement(spoon).await.expect("Failed to remove.");

	let payload = harness.vectors.payload(spoon).expect("Thing must be indexed.");

	assert_eq!(payload.location_path, None);
}
