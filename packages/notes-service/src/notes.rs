use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use notes_storage::{
	models::{NOTE_STATUS_ACTIVE, NOTE_STATUS_DELETED, NoteRecord},
	queries,
};

use crate::{Error, NotesService, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
	Active,
	Deleted,
}
impl NoteStatus {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			NOTE_STATUS_ACTIVE => Some(Self::Active),
			NOTE_STATUS_DELETED => Some(Self::Deleted),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
	pub id: i64,
	pub user_id: i64,
	pub text: String,
	pub status: NoteStatus,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl TryFrom<NoteRecord> for Note {
	type Error = Error;

	fn try_from(record: NoteRecord) -> Result<Self> {
		let status = NoteStatus::parse(&record.status).ok_or_else(|| Error::Storage {
			message: format!("Unknown status {:?} on note {}.", record.status, record.id),
		})?;

		Ok(Self {
			id: record.id,
			user_id: record.user_id,
			text: record.text,
			status,
			created_at: record.created_at,
			updated_at: record.updated_at,
		})
	}
}

impl NotesService {
	pub async fn add_note(&self, user_id: i64, text: &str) -> Result<Note> {
		let text = crate::normalize_note_text(text)?;
		let record = queries::insert_note(&self.db.pool, user_id, text).await?;

		Note::try_from(record)
	}

	pub async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>> {
		queries::list_active_notes(&self.db.pool, user_id)
			.await?
			.into_iter()
			.map(Note::try_from)
			.collect()
	}

	pub async fn delete_note(&self, user_id: i64, note_id: i64) -> Result<bool> {
		Ok(queries::soft_delete_note(&self.db.pool, user_id, note_id).await?)
	}

	pub async fn clear_notes(&self, user_id: i64) -> Result<()> {
		let cleared = queries::soft_delete_all_notes(&self.db.pool, user_id).await?;

		tracing::debug!(user_id, cleared, "Cleared notes.");

		Ok(())
	}
}
