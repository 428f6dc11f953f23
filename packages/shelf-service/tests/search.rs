mod common;

use uuid::Uuid;

use shelf_service::{
	CreateLocationRequest, CreateThingRequest, Error, ImageSearchRequest, IndexThingImageRequest,
	PlaceThingRequest, TextSearchRequest,
};
use shelf_testkit::test_config;

use crate::common::{TestHarness, harness, harness_with_config};

fn text_request(query: &str) -> TextSearchRequest {
	TextSearchRequest {
		query: query.to_string(),
		location_filter: None,
		category_filter: None,
		material_filter: None,
		tags_filter: Vec::new(),
		limit: None,
	}
}

async fn place_at(harness: &TestHarness, thing_id: Uuid, path_name: &str, parent: Option<Uuid>) -> Uuid {
	let location = harness
		.service
		.create_location(CreateLocationRequest { name: path_name.to_string(), parent_id: parent })
		.await
		.expect("Failed to create location.");

	harness
		.service
		.place_thing(PlaceThingRequest { thing_id, location_id: location.location_id })
		.await
		.expect("Failed to place thing.");

	location.location_id
}

async fn create_thing(harness: &TestHarness, name: &str, description: &str) -> Uuid {
	harness
		.service
		.create_thing(CreateThingRequest {
			name: name.to_string(),
			description: (!description.is_empty()).then(|| description.to_string()),
		})
		.await
		.expect("Failed to create thing.")
		.thing_id
}

#[tokio::test]
async fn text_search_ranks_token_matches_first() {
	let harness = harness();
	let charger = create_thing(&harness, "Phone charger", "usb charger cable").await;
	let spoon = create_thing(&harness, "Wooden spoon", "kitchen utensil").await;
	let hits = harness
		.service
		.search_text(text_request("phone charger"))
		.await
		.expect("Search must succeed.");

	assert_eq!(hits.len(), 2);
	assert_eq!(hits[0].thing_id, charger);
	assert_eq!(hits[1].thing_id, spoon);
	assert!(hits[0].score > hits[1].score);
	// The combined score folds in the tag overlap on top of the vector score.
	assert!(hits[0].score > 0.7 * hits[0].vector_score);
}

#[tokio::test]
async fn text_search_rejects_empty_queries_and_respects_limit() {
	let harness = harness();

	for index in 0..5 {
		create_thing(&harness, &format!("Box {index}"), "cardboard box").await;
	}

	let empty = harness.service.search_text(text_request("   ")).await;

	assert!(matches!(empty, Err(Error::InvalidRequest { .. })), "got {empty:?}");

	let mut req = text_request("cardboard box");

	req.limit = Some(3);

	let hits = harness.service.search_text(req).await.expect("Search must succeed.");

	assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn location_filter_keeps_the_queried_subtree() {
	let harness = harness();
	let home_mug = create_thing(&harness, "Coffee mug", "ceramic mug").await;
	let office_mug = create_thing(&harness, "Coffee mug", "ceramic mug").await;
	let home = harness
		.service
		.create_location(CreateLocationRequest { name: "Home".to_string(), parent_id: None })
		.await
		.expect("Failed to create location.");

	place_at(&harness, home_mug, "Kitchen", Some(home.location_id)).await;
	place_at(&harness, office_mug, "Office", None).await;

	let mut req = text_request("ceramic mug");

	req.location_filter = Some("/Home".to_string());

	let hits = harness.service.search_text(req).await.expect("Search must succeed.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].thing_id, home_mug);
	assert_eq!(hits[0].location_path.as_deref(), Some("/Home/Kitchen"));
}

#[tokio::test]
async fn exact_location_match_outranks_a_descendant_match() {
	let harness = harness();
	// Identical text, so vector score and tag overlap tie; only the location
	// bonus separates them.
	let at_kitchen = create_thing(&harness, "Coffee mug", "ceramic mug").await;
	let in_drawer = create_thing(&harness, "Coffee mug", "ceramic mug").await;
	let home = harness
		.service
		.create_location(CreateLocationRequest { name: "Home".to_string(), parent_id: None })
		.await
		.expect("Failed to create location.");
	let kitchen_id = place_at(&harness, at_kitchen, "Kitchen", Some(home.location_id)).await;

	place_at(&harness, in_drawer, "Drawer", Some(kitchen_id)).await;

	let mut req = text_request("ceramic mug");

	req.location_filter = Some("/Home/Kitchen".to_string());

	let hits = harness.service.search_text(req).await.expect("Search must succeed.");

	assert_eq!(hits.len(), 2);
	assert_eq!(hits[0].thing_id, at_kitchen);
	assert_eq!(hits[1].thing_id, in_drawer);
	assert!((hits[0].score - hits[1].score - 0.1 * (0.1 - 0.05)).abs() < 1e-6);
}

#[tokio::test]
async fn category_filter_excludes_other_categories() {
	let harness = harness();
	let spoon = create_thing(&harness, "Wooden spoon", "kitchen spoon").await;

	create_thing(&harness, "Phone charger", "usb cable").await;

	let mut req = text_request("spoon charger");

	req.category_filter = Some("kitchenware".to_string());

	let hits = harness.service.search_text(req).await.expect("Search must succeed.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].thing_id, spoon);
	assert_eq!(hits[0].category, "kitchenware");
}

#[tokio::test]
async fn image_search_returns_the_indexed_thing() {
	let harness = harness();
	let widget = create_thing(&harness, "Widget", "").await;

	create_thing(&harness, "Other widget", "").await;

	let image = vec![10_u8, 20, 30, 40, 50];

	harness
		.service
		.index_thing_image(IndexThingImageRequest { thing_id: widget, image: image.clone() })
		.await
		.expect("Failed to index image.");

	let hits = harness
		.service
		.search_image(ImageSearchRequest { image, limit: None })
		.await
		.expect("Search must succeed.");

	// Only things with an image vector participate.
	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].thing_id, widget);
	assert!(hits[0].score > 0.99);
	assert_eq!(hits[0].score, hits[0].vector_score);
}

#[tokio::test]
async fn image_search_without_vision_degrades_to_empty() {
	let mut cfg = test_config();

	cfg.providers.vision = None;

	let harness = harness_with_config(cfg);

	create_thing(&harness, "Widget", "").await;

	let hits = harness
		.service
		.search_image(ImageSearchRequest { image: vec![1, 2, 3], limit: None })
		.await
		.expect("Vision-less search must not error.");

	assert!(hits.is_empty());
}
