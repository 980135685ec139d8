pub mod links;
pub mod notes;
pub mod users;

mod error;

pub use error::{Error, Result};
pub use links::NoteLink;
pub use notes::{Note, NoteStatus};

use std::{future::Future, pin::Pin};

use notes_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence contract shared by the HTTP API and the chat bot.
///
/// Every operation is scoped by the owning `user_id`; rows of other users are never observed or
/// changed. Boolean results report whether a matching row existed, which callers surface as a
/// "not found" outcome rather than an error.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn add_note<'a>(&'a self, user_id: i64, text: &'a str) -> BoxFuture<'a, Result<Note>>;

	/// Active notes ordered by `(created_at, id)`.
	fn list_notes(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<Note>>>;

	fn delete_note(&self, user_id: i64, note_id: i64) -> BoxFuture<'_, Result<bool>>;

	fn clear_notes(&self, user_id: i64) -> BoxFuture<'_, Result<()>>;

	fn add_link(
		&self,
		user_id: i64,
		from_id: i64,
		to_id: i64,
	) -> BoxFuture<'_, Result<NoteLink>>;

	fn update_link(&self, user_id: i64, link_id: i64, to_id: i64) -> BoxFuture<'_, Result<bool>>;

	fn delete_link(&self, user_id: i64, link_id: i64) -> BoxFuture<'_, Result<bool>>;

	/// All links ordered by `(from_id, to_id)`.
	fn list_links(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<NoteLink>>>;

	/// Outgoing links of one note ordered by `to_id`.
	fn list_links_for_note(
		&self,
		user_id: i64,
		from_id: i64,
	) -> BoxFuture<'_, Result<Vec<NoteLink>>>;

	fn authorize_user(&self, user_id: i64) -> BoxFuture<'_, Result<()>>;

	fn is_user_authorized(&self, user_id: i64) -> BoxFuture<'_, Result<bool>>;
}

/// Postgres-backed [`NoteStore`].
#[derive(Clone)]
pub struct NotesService {
	pub db: Db,
}
impl NotesService {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}

impl NoteStore for NotesService {
	fn add_note<'a>(&'a self, user_id: i64, text: &'a str) -> BoxFuture<'a, Result<Note>> {
		Box::pin(self.add_note(user_id, text))
	}

	fn list_notes(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<Note>>> {
		Box::pin(self.list_notes(user_id))
	}

	fn delete_note(&self, user_id: i64, note_id: i64) -> BoxFuture<'_, Result<bool>> {
		Box::pin(self.delete_note(user_id, note_id))
	}

	fn clear_notes(&self, user_id: i64) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.clear_notes(user_id))
	}

	fn add_link(
		&self,
		user_id: i64,
		from_id: i64,
		to_id: i64,
	) -> BoxFuture<'_, Result<NoteLink>> {
		Box::pin(self.add_link(user_id, from_id, to_id))
	}

	fn update_link(&self, user_id: i64, link_id: i64, to_id: i64) -> BoxFuture<'_, Result<bool>> {
		Box::pin(self.update_link(user_id, link_id, to_id))
	}

	fn delete_link(&self, user_id: i64, link_id: i64) -> BoxFuture<'_, Result<bool>> {
		Box::pin(self.delete_link(user_id, link_id))
	}

	fn list_links(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<NoteLink>>> {
		Box::pin(self.list_links(user_id))
	}

	fn list_links_for_note(
		&self,
		user_id: i64,
		from_id: i64,
	) -> BoxFuture<'_, Result<Vec<NoteLink>>> {
		Box::pin(self.list_links_for_note(user_id, from_id))
	}

	fn authorize_user(&self, user_id: i64) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.authorize_user(user_id))
	}

	fn is_user_authorized(&self, user_id: i64) -> BoxFuture<'_, Result<bool>> {
		Box::pin(self.is_user_authorized(user_id))
	}
}

/// Trims note text and rejects it when nothing is left.
pub fn normalize_note_text(text: &str) -> Result<&str> {
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return Err(Error::validation("Note text must be non-empty."));
	}

	Ok(trimmed)
}

/// Rejects non-positive ids and self-links before any row is touched.
pub fn validate_link_endpoints(from_id: i64, to_id: i64) -> Result<()> {
	if from_id <= 0 || to_id <= 0 {
		return Err(Error::validation("Note ids must be positive."));
	}
	if from_id == to_id {
		return Err(Error::validation("A note cannot link to itself."));
	}

	Ok(())
}
