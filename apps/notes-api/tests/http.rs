use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;
use tower::util::ServiceExt;

use notes_api::{routes, state::AppState};
use notes_config::Api;
use notes_testkit::MemoryStore;

const USER: &str = "admin";
const PASSWORD: &str = "secret";

fn test_app(store: Arc<MemoryStore>) -> Router {
	let api = Api { user: USER.to_string(), password: PASSWORD.to_string() };

	routes::router(AppState::from_store(store, api))
}

fn auth_header() -> String {
	format!("Basic {}", general_purpose::STANDARD.encode(format!("{USER}:{PASSWORD}")))
}

fn request(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
	let builder =
		Request::builder().method(method).uri(uri).header(header::AUTHORIZATION, auth_header());
	let builder = match body {
		Some(_) => builder.header(header::CONTENT_TYPE, "application/json"),
		None => builder,
	};

	builder
		.body(body.map(|raw| Body::from(raw.to_string())).unwrap_or_else(Body::empty))
		.expect("Failed to build request.")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(req).await.expect("Failed to call router.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("Failed to parse response JSON.")
	};

	(status, json)
}

#[tokio::test]
async fn add_note_trims_text_and_returns_created() {
	let app = test_app(Arc::new(MemoryStore::new()));
	let (status, json) =
		send(&app, request(Method::POST, "/notes?user_id=5", Some(r#"{"text":"  buy milk  "}"#)))
			.await;

	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(json["text"], "buy milk");
	assert_eq!(json["user_id"], 5);
	assert_eq!(json["status"], "active");
	assert!(json["id"].as_i64().is_some_and(|id| id > 0));
	assert!(json["created_at"].is_string());

	let (status, json) = send(&app, request(Method::GET, "/notes?user_id=5", None)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json.as_array().map(Vec::len), Some(1));

	let (_, json) = send(&app, request(Method::GET, "/notes?user_id=6", None)).await;

	assert_eq!(json, Value::Array(Vec::new()));
}

#[tokio::test]
async fn missing_basic_auth_is_challenged() {
	let app = test_app(Arc::new(MemoryStore::new()));
	let response = app
		.oneshot(
			Request::builder()
				.method(Method::DELETE)
				.uri("/notes/2?user_id=5")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call router.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(
		response.headers().get(header::WWW_AUTHENTICATE).and_then(|value| value.to_str().ok()),
		Some("Basic realm=notes")
	);
}

#[tokio::test]
async fn empty_credentials_reject_every_request() {
	let store = Arc::new(MemoryStore::new());
	let app = routes::router(AppState::from_store(store, Api::default()));
	let (status, _) = send(&app, request(Method::GET, "/notes?user_id=5", None)).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_id_must_be_a_positive_integer() {
	let app = test_app(Arc::new(MemoryStore::new()));

	for uri in [
		"/notes",
		"/notes?user_id=",
		"/notes?user_id=abc",
		"/notes?user_id=0",
		"/notes?user_id=%207",
		"/notes?user_id=7%20",
	] {
		let (status, json) = send(&app, request(Method::GET, uri, None)).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "Unexpected status for {uri}.");
		assert_eq!(json["error_code"], "invalid_request");
	}
}

#[tokio::test]
async fn invalid_note_payloads_are_rejected() {
	let app = test_app(Arc::new(MemoryStore::new()));

	for body in [r#"{"text":"   "}"#, r#"{"txt":"x"}"#, "not json", ""] {
		let (status, _) = send(&app, request(Method::POST, "/notes?user_id=1", Some(body))).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "Unexpected status for body {body:?}.");
	}
}

#[tokio::test]
async fn delete_note_reports_missing_targets() {
	let store = Arc::new(MemoryStore::new());
	let app = test_app(store.clone());
	let (_, note) =
		send(&app, request(Method::POST, "/notes?user_id=1", Some(r#"{"text":"a"}"#))).await;
	let uri = format!("/notes/{}?user_id=1", note["id"]);
	let foreign_uri = format!("/notes/{}?user_id=2", note["id"]);

	let (status, json) = send(&app, request(Method::DELETE, &foreign_uri, None)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(json["error_code"], "not_found");

	let (status, _) = send(&app, request(Method::DELETE, &uri, None)).await;

	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = send(&app, request(Method::DELETE, &uri, None)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _) = send(&app, request(Method::DELETE, "/notes/abc?user_id=1", None)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(store.all_notes().iter().all(|note| note.user_id == 1));
}

#[tokio::test]
async fn links_are_created_listed_updated_and_deleted() {
	let app = test_app(Arc::new(MemoryStore::new()));
	let mut ids = Vec::new();

	for text in ["a", "b", "c"] {
		let body = format!(r#"{{"text":"{text}"}}"#);
		let (_, note) = send(&app, request(Method::POST, "/notes?user_id=1", Some(&body))).await;

		ids.push(note["id"].as_i64().expect("note id"));
	}

	let (a, b, c) = (ids[0], ids[1], ids[2]);
	let (status, link) = send(
		&app,
		request(
			Method::POST,
			&format!("/notes/{a}/links?user_id=1"),
			Some(&format!(r#"{{"to_id":{c}}}"#)),
		),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(link["from_id"], a);
	assert_eq!(link["to_id"], c);

	let link_id = link["id"].as_i64().expect("link id");
	let (status, _) = send(
		&app,
		request(
			Method::POST,
			&format!("/notes/{a}/links?user_id=1"),
			Some(&format!(r#"{{"to_id":{a}}}"#)),
		),
	)
	.await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

	let (status, _) = send(
		&app,
		request(Method::POST, &format!("/notes/{a}/links?user_id=1"), Some(r#"{"to_id":0}"#)),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, updated) = send(
		&app,
		request(
			Method::PATCH,
			&format!("/links/{link_id}?user_id=1"),
			Some(&format!(r#"{{"to_id":{b}}}"#)),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["updated"], true);

	let (_, outgoing) =
		send(&app, request(Method::GET, &format!("/notes/{a}/links?user_id=1"), None)).await;

	assert_eq!(outgoing[0]["to_id"], b);

	let (status, all) = send(&app, request(Method::GET, "/links?user_id=1", None)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(all.as_array().map(Vec::len), Some(1));

	let (status, _) = send(
		&app,
		request(Method::PATCH, "/links/999?user_id=1", Some(&format!(r#"{{"to_id":{b}}}"#))),
	)
	.await;

	assert_eq!(status, StatusCode::NOT_FOUND);

	let uri = format!("/links/{link_id}?user_id=1");
	let (status, _) = send(&app, request(Method::DELETE, &uri, None)).await;

	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = send(&app, request(Method::DELETE, &uri, None)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_rejections_are_internal_errors() {
	let store = Arc::new(MemoryStore::new());
	let app = test_app(store.clone());
	let (status, json) =
		send(&app, request(Method::POST, "/notes/1/links?user_id=5", Some(r#"{"to_id":2}"#))).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json["error_code"], "operation_failed");

	let (_, note) =
		send(&app, request(Method::POST, "/notes?user_id=5", Some(r#"{"text":"a"}"#))).await;
	let uri = format!("/notes/{}/links?user_id=5", note["id"]);
	let (status, _) = send(&app, request(Method::POST, &uri, Some(r#"{"to_id":999}"#))).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

	let (status, json) = send(&app, request(Method::POST, &uri, Some(r#"{"to_id":-1}"#))).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");
	assert!(store.all_links().is_empty());
}

#[tokio::test]
async fn clear_notes_removes_every_active_note() {
	let app = test_app(Arc::new(MemoryStore::new()));

	for _ in 0..3 {
		send(&app, request(Method::POST, "/notes?user_id=1", Some(r#"{"text":"x"}"#))).await;
	}

	let (status, _) = send(&app, request(Method::DELETE, "/notes?user_id=1", None)).await;

	assert_eq!(status, StatusCode::NO_CONTENT);

	let (_, json) = send(&app, request(Method::GET, "/notes?user_id=1", None)).await;

	assert_eq!(json, Value::Array(Vec::new()));
}

#[tokio::test]
async fn storage_failures_map_to_internal_errors() {
	let store = Arc::new(MemoryStore::new());
	let app = test_app(store.clone());

	store.set_failing(true);

	let (status, json) = send(&app, request(Method::GET, "/notes?user_id=1", None)).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json["error_code"], "storage_error");
	assert!(!json["message"].as_str().unwrap_or_default().contains("memory store"));
}

#[tokio::test]
async fn unknown_routes_and_methods_use_default_statuses() {
	let app = test_app(Arc::new(MemoryStore::new()));
	let (status, _) = send(&app, request(Method::GET, "/unknown?user_id=1", None)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _) = send(&app, request(Method::PUT, "/notes?user_id=1", None)).await;

	assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
