use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shelf_service::{
	CreateLocationRequest, CreateThingRequest, DeleteLocationRequest, Error as ServiceError,
	ImageSearchRequest, IndexThingImageRequest, Location, MoveLocationRequest, PlaceThingRequest,
	Placement, RenameLocationRequest, SearchHit, TextSearchRequest, Thing, UpdateThingRequest,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/locations", get(list_locations))
		.route("/v1/locations/create", post(create_location))
		.route("/v1/locations/get", post(get_location))
		.route("/v1/locations/get_by_path", post(get_location_by_path))
		.route("/v1/locations/children", post(location_children))
		.route("/v1/locations/subtree", post(location_subtree))
		.route("/v1/locations/rename", post(rename_location))
		.route("/v1/locations/move", post(move_location))
		.route("/v1/locations/delete", post(delete_location))
		.route("/v1/things", get(list_things))
		.route("/v1/things/create", post(create_thing))
		.route("/v1/things/get", post(get_thing))
		.route("/v1/things/update", post(update_thing))
		.route("/v1/things/delete", post(delete_thing))
		.route("/v1/things/index_image", post(index_thing_image))
		.route("/v1/placements/place", post(place_thing))
		.route("/v1/placements/active", post(active_placement))
		.route("/v1/placements/history", post(placement_history))
		.route("/v1/placements/at_location", post(placements_at_location))
		.route("/v1/placements/count_at_location", post(count_at_location))
		.route("/v1/placements/remove", post(remove_placement))
		.route("/v1/search/text", post(search_text))
		.route("/v1/search/image", post(search_image))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct LocationIdBody {
	location_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct LocationPathBody {
	path: String,
}

#[derive(Debug, Deserialize)]
struct ChildrenBody {
	parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct ThingIdBody {
	thing_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ListThingsQuery {
	offset: Option<i64>,
	limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct DeletedBody {
	deleted: bool,
}

#[derive(Debug, Serialize)]
struct DeactivatedBody {
	deactivated: u64,
}

#[derive(Debug, Serialize)]
struct CountBody {
	count: i64,
}

#[derive(Debug, Serialize)]
struct ListThingsBody {
	things: Vec<Thing>,
	total: i64,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_locations(State(state): State<AppState>) -> Result<Json<Vec<Location>>, ApiError> {
	let locations = state.service.list_locations().await?;
	Ok(Json(locations))
}

async fn create_location(
	State(state): State<AppState>,
	Json(payload): Json<CreateLocationRequest>,
) -> Result<Json<Location>, ApiError> {
	let location = state.service.create_location(payload).await?;
	Ok(Json(location))
}

async fn get_location(
	State(state): State<AppState>,
	Json(payload): Json<LocationIdBody>,
) -> Result<Json<Location>, ApiError> {
	let location = state.service.location(payload.location_id).await?;
	Ok(Json(location))
}

async fn get_location_by_path(
	State(state): State<AppState>,
	Json(payload): Json<LocationPathBody>,
) -> Result<Json<Location>, ApiError> {
	let location = state.service.location_by_path(&payload.path).await?;
	Ok(Json(location))
}

async fn location_children(
	State(state): State<AppState>,
	Json(payload): Json<ChildrenBody>,
) -> Result<Json<Vec<Location>>, ApiError> {
	let children = state.service.location_children(payload.parent_id).await?;
	Ok(Json(children))
}

async fn location_subtree(
	State(state): State<AppState>,
	Json(payload): Json<LocationIdBody>,
) -> Result<Json<Vec<Location>>, ApiError> {
	let subtree = state.service.location_subtree(payload.location_id).await?;
	Ok(Json(subtree))
}

async fn rename_location(
	State(state): State<AppState>,
	Json(payload): Json<RenameLocationRequest>,
) -> Result<Json<Location>, ApiError> {
	let location = state.service.rename_location(payload).await?;
	Ok(Json(location))
}

async fn move_location(
	State(state): State<AppState>,
	Json(payload): Json<MoveLocationRequest>,
) -> Result<Json<Location>, ApiError> {
	let location = state.service.move_location(payload).await?;
	Ok(Json(location))
}

async fn delete_location(
	State(state): State<AppState>,
	Json(payload): Json<DeleteLocationRequest>,
) -> Result<Json<DeletedBody>, ApiError> {
	let deleted = state.service.delete_location(payload).await?;
	Ok(Json(DeletedBody { deleted }))
}

async fn list_things(
	State(state): State<AppState>,
	Query(query): Query<ListThingsQuery>,
) -> Result<Json<ListThingsBody>, ApiError> {
	let things =
		state.service.list_things(query.offset.unwrap_or(0), query.limit.unwrap_or(50)).await?;
	let total = state.service.count_things().await?;
	Ok(Json(ListThingsBody { things, total }))
}

async fn create_thing(
	State(state): State<AppState>,
	Json(payload): Json<CreateThingRequest>,
) -> Result<Json<Thing>, ApiError> {
	let thing = state.service.create_thing(payload).await?;
	Ok(Json(thing))
}

async fn get_thing(
	State(state): State<AppState>,
	Json(payload): Json<ThingIdBody>,
) -> Result<Json<Thing>, ApiError> {
	let thing = state.service.thing(payload.thing_id).await?;
	Ok(Json(thing))
}

async fn update_thing(
	State(state): State<AppState>,
	Json(payload): Json<UpdateThingRequest>,
) -> Result<Json<Thing>, ApiError> {
	let thing = state.service.update_thing(payload).await?;
	Ok(Json(thing))
}

async fn delete_thing(
	State(state): State<AppState>,
	Json(payload): Json<ThingIdBody>,
) -> Result<Json<DeletedBody>, ApiError> {
	let deleted = state.service.delete_thing(payload.thing_id).await?;
	Ok(Json(DeletedBody { deleted }))
}

async fn index_thing_image(
	State(state): State<AppState>,
	Json(payload): Json<IndexThingImageRequest>,
) -> Result<StatusCode, ApiError> {
	state.service.index_thing_image(payload).await?;
	Ok(StatusCode::NO_CONTENT)
}

async fn place_thing(
	State(state): State<AppState>,
	Json(payload): Json<PlaceThingRequest>,
) -> Result<Json<Placement>, ApiError> {
	let placement = state.service.place_thing(payload).await?;
	Ok(Json(placement))
}

async fn active_placement(
	State(state): State<AppState>,
	Json(payload): Json<ThingIdBody>,
) -> Result<Json<Option<Placement>>, ApiError> {
	let placement = state.service.active_placement(payload.thing_id).await?;
	Ok(Json(placement))
}

async fn placement_history(
	State(state): State<AppState>,
	Json(payload): Json<ThingIdBody>,
) -> Result<Json<Vec<Placement>>, ApiError> {
	let history = state.service.placement_history(payload.thing_id).await?;
	Ok(Json(history))
}

async fn placements_at_location(
	State(state): State<AppState>,
	Json(payload): Json<LocationIdBody>,
) -> Result<Json<Vec<Placement>>, ApiError> {
	let placements = state.service.placements_at_location(payload.location_id).await?;
	Ok(Json(placements))
}

async fn count_at_location(
	State(state): State<AppState>,
	Json(payload): Json<LocationIdBody>,
) -> Result<Json<CountBody>, ApiError> {
	let count = state.service.count_at_location(payload.location_id).await?;
	Ok(Json(CountBody { count }))
}

async fn remove_placement(
	State(state): State<AppState>,
	Json(payload): Json<ThingIdBody>,
) -> Result<Json<DeactivatedBody>, ApiError> {
	let deactivated = state.service.remove_placement(payload.thing_id).await?;
	Ok(Json(DeactivatedBody { deactivated }))
}

async fn search_text(
	State(state): State<AppState>,
	Json(payload): Json<TextSearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
	let hits = state.service.search_text(payload).await?;
	Ok(Json(hits))
}

async fn search_image(
	State(state): State<AppState>,
	Json(payload): Json<ImageSearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
	let hits = state.service.search_image(payload).await?;
	Ok(Json(hits))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();
		match err {
			ServiceError::NotFound { .. } =>
				ApiError::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::DuplicateSibling { .. } =>
				ApiError::new(StatusCode::CONFLICT, "duplicate_sibling", message),
			ServiceError::HasChildren { .. } =>
				ApiError::new(StatusCode::CONFLICT, "has_children", message),
			ServiceError::HasThings { .. } =>
				ApiError::new(StatusCode::CONFLICT, "has_things", message),
			ServiceError::InvalidMoveTarget { .. } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_move_target", message),
			ServiceError::InvalidRequest { .. } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Provider { .. } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", message),
			ServiceError::Storage { .. } =>
				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
			ServiceError::VectorStore { .. } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "vector_store_error", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		(self.status, Json(body)).into_response()
	}
}
