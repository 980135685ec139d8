use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use axum::{
	body::Body,
	extract::State,
	http::{HeaderMap, HeaderValue, Request, StatusCode, header},
	middleware::Next,
	response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose};

use crate::routes::json_error;

const BASIC_PREFIX: &str = "Basic ";
const CHALLENGE: &str = "Basic realm=notes";

/// The single Basic-Auth pair accepted by the API.
///
/// An empty user or password disables access entirely: every request is rejected.
#[derive(Clone, Debug)]
pub struct Credentials {
	user: String,
	password: String,
}
impl Credentials {
	pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
		Self { user: user.into(), password: password.into() }
	}

	pub fn is_configured(&self) -> bool {
		!self.user.is_empty() && !self.password.is_empty()
	}

	pub fn verify(&self, headers: &HeaderMap) -> bool {
		if !self.is_configured() {
			return false;
		}

		read_basic_credentials(headers)
			.is_some_and(|(user, password)| user == self.user && password == self.password)
	}
}

pub(crate) async fn basic_auth_middleware(
	State(credentials): State<Arc<Credentials>>,
	req: Request<Body>,
	next: Next,
) -> Response {
	if !credentials.verify(req.headers()) {
		let mut response =
			json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Authentication required.")
				.into_response();

		response
			.headers_mut()
			.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));

		return response;
	}

	next.run(req).await
}

pub(crate) async fn request_log_middleware(req: Request<Body>, next: Next) -> Response {
	let method = req.method().clone();
	let path = req.uri().path().to_string();
	let started = Instant::now();
	let response = next.run(req).await;
	let latency_ms = millis(started.elapsed());

	tracing::info!(
		%method,
		%path,
		status = response.status().as_u16(),
		latency_ms,
		"HTTP request."
	);

	response
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
	u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn read_basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
	let raw = headers.get(header::AUTHORIZATION)?;
	let value = raw.to_str().ok()?;
	let encoded = value.strip_prefix(BASIC_PREFIX)?;
	let decoded = general_purpose::STANDARD.decode(encoded).ok()?;
	let decoded = String::from_utf8(decoded).ok()?;
	let (user, password) = decoded.split_once(':')?;

	Some((user.to_string(), password.to_string()))
}
