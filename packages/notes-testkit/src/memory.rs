use std::{
	collections::BTreeSet,
	future,
	sync::{
		Mutex, MutexGuard,
		atomic::{AtomicBool, Ordering},
	},
};

use time::OffsetDateTime;

use notes_service::{
	BoxFuture, Error, Note, NoteLink, NoteStatus, NoteStore, Result, normalize_note_text,
	validate_link_endpoints,
};

/// Store operations, used to make a single one fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
	AddNote,
	ListNotes,
	DeleteNote,
	ClearNotes,
	AddLink,
	UpdateLink,
	DeleteLink,
	ListLinks,
	ListLinksForNote,
	AuthorizeUser,
	IsUserAuthorized,
}

pub const FAILURE_MESSAGE: &str = "memory store is failing.";

/// In-process [`NoteStore`] with the same scoping, ordering, and validation rules as the
/// Postgres store.
#[derive(Default)]
pub struct MemoryStore {
	state: Mutex<State>,
	failing: AtomicBool,
	failing_ops: Mutex<BTreeSet<Operation>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes every following call fail with a storage error until switched back.
	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	/// Makes `op` fail with a storage error while every other operation keeps working.
	pub fn fail_on(&self, op: Operation) {
		self.failing_ops.lock().unwrap_or_else(|err| err.into_inner()).insert(op);
	}

	/// Every note ever written, deleted ones included.
	pub fn all_notes(&self) -> Vec<Note> {
		self.lock().notes.clone()
	}

	pub fn all_links(&self) -> Vec<NoteLink> {
		self.lock().links.clone()
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn is_failing(&self, op: Operation) -> bool {
		self.failing.load(Ordering::SeqCst)
			|| self.failing_ops.lock().unwrap_or_else(|err| err.into_inner()).contains(&op)
	}

	fn run<T, F>(&self, op: Operation, f: F) -> BoxFuture<'_, Result<T>>
	where
		T: Send + 'static,
		F: FnOnce(&mut State) -> Result<T>,
	{
		let result = if self.is_failing(op) {
			Err(Error::Storage { message: FAILURE_MESSAGE.to_string() })
		} else {
			f(&mut *self.lock())
		};

		Box::pin(future::ready(result))
	}
}

impl NoteStore for MemoryStore {
	fn add_note<'a>(&'a self, user_id: i64, text: &'a str) -> BoxFuture<'a, Result<Note>> {
		self.run(Operation::AddNote, |state| {
			let text = normalize_note_text(text)?;
			let now = OffsetDateTime::now_utc();

			state.last_note_id += 1;

			let note = Note {
				id: state.last_note_id,
				user_id,
				text: text.to_string(),
				status: NoteStatus::Active,
				created_at: now,
				updated_at: now,
			};

			state.notes.push(note.clone());

			Ok(note)
		})
	}

	fn list_notes(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<Note>>> {
		self.run(Operation::ListNotes, |state| {
			let mut notes = state
				.notes
				.iter()
				.filter(|note| note.user_id == user_id && note.status == NoteStatus::Active)
				.cloned()
				.collect::<Vec<_>>();

			notes.sort_by_key(|note| (note.created_at, note.id));

			Ok(notes)
		})
	}

	fn delete_note(&self, user_id: i64, note_id: i64) -> BoxFuture<'_, Result<bool>> {
		self.run(Operation::DeleteNote, |state| {
			let now = OffsetDateTime::now_utc();
			let Some(note) = state.active_note_mut(user_id, note_id) else {
				return Ok(false);
			};

			note.status = NoteStatus::Deleted;
			note.updated_at = now;

			Ok(true)
		})
	}

	fn clear_notes(&self, user_id: i64) -> BoxFuture<'_, Result<()>> {
		self.run(Operation::ClearNotes, |state| {
			let now = OffsetDateTime::now_utc();

			for note in state
				.notes
				.iter_mut()
				.filter(|note| note.user_id == user_id && note.status == NoteStatus::Active)
			{
				note.status = NoteStatus::Deleted;
				note.updated_at = now;
			}

			Ok(())
		})
	}

	fn add_link(
		&self,
		user_id: i64,
		from_id: i64,
		to_id: i64,
	) -> BoxFuture<'_, Result<NoteLink>> {
		self.run(Operation::AddLink, |state| {
			validate_link_endpoints(from_id, to_id)?;

			if !state.both_active(user_id, from_id, to_id) {
				return Err(Error::validation("Both notes must exist and be active."));
			}

			let now = OffsetDateTime::now_utc();

			state.last_link_id += 1;

			let link = NoteLink {
				id: state.last_link_id,
				user_id,
				from_id,
				to_id,
				created_at: now,
				updated_at: now,
			};

			state.links.push(link.clone());

			Ok(link)
		})
	}

	fn update_link(&self, user_id: i64, link_id: i64, to_id: i64) -> BoxFuture<'_, Result<bool>> {
		self.run(Operation::UpdateLink, |state| {
			let Some(from_id) = state
				.links
				.iter()
				.find(|link| link.user_id == user_id && link.id == link_id)
				.map(|link| link.from_id)
			else {
				return Ok(false);
			};

			validate_link_endpoints(from_id, to_id)?;

			if !state.both_active(user_id, from_id, to_id) {
				return Err(Error::validation("Both notes must exist and be active."));
			}

			let now = OffsetDateTime::now_utc();

			if let Some(link) =
				state.links.iter_mut().find(|link| link.user_id == user_id && link.id == link_id)
			{
				link.to_id = to_id;
				link.updated_at = now;
			}

			Ok(true)
		})
	}

	fn delete_link(&self, user_id: i64, link_id: i64) -> BoxFuture<'_, Result<bool>> {
		self.run(Operation::DeleteLink, |state| {
			let before = state.links.len();

			state.links.retain(|link| !(link.user_id == user_id && link.id == link_id));

			Ok(state.links.len() != before)
		})
	}

	fn list_links(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<NoteLink>>> {
		self.run(Operation::ListLinks, |state| {
			let mut links = state
				.links
				.iter()
				.filter(|link| link.user_id == user_id)
				.cloned()
				.collect::<Vec<_>>();

			links.sort_by_key(|link| (link.from_id, link.to_id, link.id));

			Ok(links)
		})
	}

	fn list_links_for_note(
		&self,
		user_id: i64,
		from_id: i64,
	) -> BoxFuture<'_, Result<Vec<NoteLink>>> {
		self.run(Operation::ListLinksForNote, |state| {
			let mut links = state
				.links
				.iter()
				.filter(|link| link.user_id == user_id && link.from_id == from_id)
				.cloned()
				.collect::<Vec<_>>();

			links.sort_by_key(|link| (link.to_id, link.id));

			Ok(links)
		})
	}

	fn authorize_user(&self, user_id: i64) -> BoxFuture<'_, Result<()>> {
		self.run(Operation::AuthorizeUser, |state| {
			state.authorized.insert(user_id);

			Ok(())
		})
	}

	fn is_user_authorized(&self, user_id: i64) -> BoxFuture<'_, Result<bool>> {
		self.run(Operation::IsUserAuthorized, |state| Ok(state.authorized.contains(&user_id)))
	}
}

#[derive(Default)]
struct State {
	notes: Vec<Note>,
	links: Vec<NoteLink>,
	authorized: BTreeSet<i64>,
	last_note_id: i64,
	last_link_id: i64,
}
impl State {
	fn active_note_mut(&mut self, user_id: i64, note_id: i64) -> Option<&mut Note> {
		self.notes.iter_mut().find(|note| {
			note.user_id == user_id && note.id == note_id && note.status == NoteStatus::Active
		})
	}

	fn is_active(&self, user_id: i64, note_id: i64) -> bool {
		self.notes.iter().any(|note| {
			note.user_id == user_id && note.id == note_id && note.status == NoteStatus::Active
		})
	}

	fn both_active(&self, user_id: i64, from_id: i64, to_id: i64) -> bool {
		self.is_active(user_id, from_id) && self.is_active(user_id, to_id)
	}
}
