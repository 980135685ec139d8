use axum::{
	Json, Router,
	body::Bytes,
	extract::{FromRequestParts, Path, Query, State},
	http::{StatusCode, request::Parts},
	middleware,
	response::{IntoResponse, Response},
	routing::{delete, get, patch},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use notes_service::{Note, NoteLink};

use crate::{auth, state::AppState};

/// Builds the API router: request logging wraps Basic-Auth, which wraps every route.
pub fn router(state: AppState) -> Router {
	let credentials = state.credentials.clone();

	Router::new()
		.route("/notes", get(list_notes).post(add_note).delete(clear_notes))
		.route("/notes/{id}", delete(delete_note))
		.route("/notes/{id}/links", get(list_note_links).post(add_link))
		.route("/links", get(list_links))
		.route("/links/{id}", patch(update_link).delete(delete_link))
		.with_state(state)
		.layer(middleware::from_fn_with_state(credentials, auth::basic_auth_middleware))
		.layer(middleware::from_fn(auth::request_log_middleware))
}

/// Owner of the request, taken from the `user_id` query parameter.
#[derive(Clone, Copy, Debug)]
pub struct UserId(pub i64);
impl<S> FromRequestParts<S> for UserId
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let Query(query) = Query::<UserIdQuery>::try_from_uri(&parts.uri)
			.map_err(|_| invalid_request("Query string is malformed."))?;
		let raw = query.user_id.ok_or_else(|| invalid_request("user_id is required."))?;

		parse_positive_id(&raw, "user_id").map(Self)
	}
}

#[derive(Debug, Deserialize)]
struct UserIdQuery {
	user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddNoteRequest {
	text: String,
}

#[derive(Debug, Deserialize)]
struct LinkTargetRequest {
	to_id: i64,
}

#[derive(Debug, Serialize)]
struct UpdateLinkResponse {
	updated: bool,
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
impl From<notes_service::Error> for ApiError {
	fn from(err: notes_service::Error) -> Self {
		match err {
			notes_service::Error::Validation { message } => {
				tracing::warn!(%message, "Store rejected the operation.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "operation_failed", message)
			},
			notes_service::Error::Storage { message } => {
				tracing::error!(%message, "Store call failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"Storage is unavailable. Try again later.",
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

async fn list_notes(
	State(state): State<AppState>,
	UserId(user_id): UserId,
) -> Result<Json<Vec<Note>>, ApiError> {
	let notes = state.store.list_notes(user_id).await?;

	Ok(Json(notes))
}

async fn add_note(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	body: Bytes,
) -> Result<(StatusCode, Json<Note>), ApiError> {
	let payload: AddNoteRequest = parse_json(&body)?;
	let text = notes_service::normalize_note_text(&payload.text)
		.map_err(|_| invalid_request("Note text must be non-empty."))?;
	let note = state.store.add_note(user_id, text).await?;

	Ok((StatusCode::CREATED, Json(note)))
}

async fn clear_notes(
	State(state): State<AppState>,
	UserId(user_id): UserId,
) -> Result<StatusCode, ApiError> {
	state.store.clear_notes(user_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn delete_note(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	let note_id = parse_positive_id(&raw_id, "note id")?;

	if !state.store.delete_note(user_id, note_id).await? {
		return Err(not_found("Note not found."));
	}

	Ok(StatusCode::NO_CONTENT)
}

async fn list_note_links(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(raw_id): Path<String>,
) -> Result<Json<Vec<NoteLink>>, ApiError> {
	let note_id = parse_positive_id(&raw_id, "note id")?;
	let links = state.store.list_links_for_note(user_id, note_id).await?;

	Ok(Json(links))
}

async fn add_link(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(raw_id): Path<String>,
	body: Bytes,
) -> Result<(StatusCode, Json<NoteLink>), ApiError> {
	let from_id = parse_positive_id(&raw_id, "note id")?;
	let payload: LinkTargetRequest = parse_json(&body)?;

	if payload.to_id <= 0 {
		return Err(invalid_request("to_id must be a positive integer."));
	}

	let link = state.store.add_link(user_id, from_id, payload.to_id).await?;

	Ok((StatusCode::CREATED, Json(link)))
}

async fn list_links(
	State(state): State<AppState>,
	UserId(user_id): UserId,
) -> Result<Json<Vec<NoteLink>>, ApiError> {
	let links = state.store.list_links(user_id).await?;

	Ok(Json(links))
}

async fn update_link(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(raw_id): Path<String>,
	body: Bytes,
) -> Result<Json<UpdateLinkResponse>, ApiError> {
	let link_id = parse_positive_id(&raw_id, "link id")?;
	let payload: LinkTargetRequest = parse_json(&body)?;

	if payload.to_id <= 0 {
		return Err(invalid_request("to_id must be a positive integer."));
	}
	if !state.store.update_link(user_id, link_id, payload.to_id).await? {
		return Err(not_found("Link not found."));
	}

	Ok(Json(UpdateLinkResponse { updated: true }))
}

async fn delete_link(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	let link_id = parse_positive_id(&raw_id, "link id")?;

	if !state.store.delete_link(user_id, link_id).await? {
		return Err(not_found("Link not found."));
	}

	Ok(StatusCode::NO_CONTENT)
}

fn parse_positive_id(raw: &str, name: &str) -> Result<i64, ApiError> {
	match raw.parse::<i64>() {
		Ok(id) if id > 0 => Ok(id),
		_ => Err(invalid_request(format!("{name} must be a positive integer."))),
	}
}

fn parse_json<T>(body: &[u8]) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	serde_json::from_slice(body)
		.map_err(|err| invalid_request(format!("Request body is invalid: {err}.")))
}

fn invalid_request(message: impl Into<String>) -> ApiError {
	json_error(StatusCode::BAD_REQUEST, "invalid_request", message)
}

fn not_found(message: &str) -> ApiError {
	json_error(StatusCode::NOT_FOUND, "not_found", message)
}
