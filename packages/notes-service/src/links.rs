use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use notes_storage::{models::NoteLinkRecord, queries};

use crate::{Error, NotesService, Result};

/// Directed edge between two notes of the same user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLink {
	pub id: i64,
	pub user_id: i64,
	pub from_id: i64,
	pub to_id: i64,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<NoteLinkRecord> for NoteLink {
	fn from(record: NoteLinkRecord) -> Self {
		Self {
			id: record.id,
			user_id: record.user_id,
			from_id: record.from_id,
			to_id: record.to_id,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

impl NotesService {
	pub async fn add_link(&self, user_id: i64, from_id: i64, to_id: i64) -> Result<NoteLink> {
		crate::validate_link_endpoints(from_id, to_id)?;

		let record =
			queries::insert_link_between_active_notes(&self.db.pool, user_id, from_id, to_id)
				.await?
				.ok_or_else(|| Error::validation("Both notes must exist and be active."))?;

		Ok(record.into())
	}

	pub async fn update_link(&self, user_id: i64, link_id: i64, to_id: i64) -> Result<bool> {
		let Some(link) = queries::find_link(&self.db.pool, user_id, link_id).await? else {
			return Ok(false);
		};

		crate::validate_link_endpoints(link.from_id, to_id)?;

		if !queries::retarget_link(&self.db.pool, user_id, link_id, to_id).await? {
			return Err(Error::validation("Both notes must exist and be active."));
		}

		Ok(true)
	}

	pub async fn delete_link(&self, user_id: i64, link_id: i64) -> Result<bool> {
		Ok(queries::delete_link(&self.db.pool, user_id, link_id).await?)
	}

	pub async fn list_links(&self, user_id: i64) -> Result<Vec<NoteLink>> {
		let records = queries::list_links(&self.db.pool, user_id).await?;

		Ok(records.into_iter().map(NoteLink::from).collect())
	}

	pub async fn list_links_for_note(&self, user_id: i64, from_id: i64) -> Result<Vec<NoteLink>> {
		let records = queries::list_links_from(&self.db.pool, user_id, from_id).await?;

		Ok(records.into_iter().map(NoteLink::from).collect())
	}
}
