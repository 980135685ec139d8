pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Bad input shape, self-link, or a missing, foreign, or inactive note reference.
	#[error("Invalid request: {message}")]
	Validation { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}

	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation { .. })
	}
}
impl From<notes_storage::Error> for Error {
	fn from(err: notes_storage::Error) -> Self {
		match err {
			notes_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
		}
	}
}
