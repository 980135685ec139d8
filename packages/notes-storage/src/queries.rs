//! Every statement is scoped by `user_id` and performs its write in a single statement.

use sqlx::PgExecutor;

use crate::{
	Result,
	models::{NOTE_STATUS_ACTIVE, NOTE_STATUS_DELETED, NoteLinkRecord, NoteRecord},
};

pub async fn insert_note<'e, E>(executor: E, user_id: i64, text: &str) -> Result<NoteRecord>
where
	E: PgExecutor<'e>,
{
	let note = sqlx::query_as::<_, NoteRecord>(
		"\
INSERT INTO notes (user_id, text, status)
VALUES ($1, $2, $3)
RETURNING id, user_id, text, status, created_at, updated_at",
	)
	.bind(user_id)
	.bind(text)
	.bind(NOTE_STATUS_ACTIVE)
	.fetch_one(executor)
	.await?;

	Ok(note)
}

pub async fn list_active_notes<'e, E>(executor: E, user_id: i64) -> Result<Vec<NoteRecord>>
where
	E: PgExecutor<'e>,
{
	let notes = sqlx::query_as::<_, NoteRecord>(
		"\
SELECT id, user_id, text, status, created_at, updated_at
FROM notes
WHERE user_id = $1 AND status = $2
ORDER BY created_at, id",
	)
	.bind(user_id)
	.bind(NOTE_STATUS_ACTIVE)
	.fetch_all(executor)
	.await?;

	Ok(notes)
}

/// Returns whether an active note owned by `user_id` was moved to `deleted`.
pub async fn soft_delete_note<'e, E>(executor: E, user_id: i64, note_id: i64) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE notes
SET status = $1, updated_at = now()
WHERE user_id = $2 AND id = $3 AND status = $4",
	)
	.bind(NOTE_STATUS_DELETED)
	.bind(user_id)
	.bind(note_id)
	.bind(NOTE_STATUS_ACTIVE)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn soft_delete_all_notes<'e, E>(executor: E, user_id: i64) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE notes
SET status = $1, updated_at = now()
WHERE user_id = $2 AND status = $3",
	)
	.bind(NOTE_STATUS_DELETED)
	.bind(user_id)
	.bind(NOTE_STATUS_ACTIVE)
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

/// Inserts the link only when both endpoints are distinct active notes owned by `user_id`.
pub async fn insert_link_between_active_notes<'e, E>(
	executor: E,
	user_id: i64,
	from_id: i64,
	to_id: i64,
) -> Result<Option<NoteLinkRecord>>
where
	E: PgExecutor<'e>,
{
	let link = sqlx::query_as::<_, NoteLinkRecord>(
		"\
INSERT INTO note_links (user_id, from_id, to_id)
SELECT $1::bigint, $2::bigint, $3::bigint
WHERE $2::bigint <> $3::bigint
	AND (
		SELECT count(*)
		FROM notes
		WHERE user_id = $1 AND id IN ($2, $3) AND status = $4
	) = 2
RETURNING id, user_id, from_id, to_id, created_at, updated_at",
	)
	.bind(user_id)
	.bind(from_id)
	.bind(to_id)
	.bind(NOTE_STATUS_ACTIVE)
	.fetch_optional(executor)
	.await?;

	Ok(link)
}

pub async fn find_link<'e, E>(
	executor: E,
	user_id: i64,
	link_id: i64,
) -> Result<Option<NoteLinkRecord>>
where
	E: PgExecutor<'e>,
{
	let link = sqlx::query_as::<_, NoteLinkRecord>(
		"\
SELECT id, user_id, from_id, to_id, created_at, updated_at
FROM note_links
WHERE user_id = $1 AND id = $2",
	)
	.bind(user_id)
	.bind(link_id)
	.fetch_optional(executor)
	.await?;

	Ok(link)
}

/// Points the link at `to_id` when its source and the new target are distinct active notes owned
/// by `user_id`. Returns whether a row changed.
pub async fn retarget_link<'e, E>(
	executor: E,
	user_id: i64,
	link_id: i64,
	to_id: i64,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE note_links AS l
SET to_id = $3, updated_at = now()
WHERE l.user_id = $1
	AND l.id = $2
	AND l.from_id <> $3
	AND (
		SELECT count(*)
		FROM notes AS n
		WHERE n.user_id = $1 AND n.id IN (l.from_id, $3) AND n.status = $4
	) = 2",
	)
	.bind(user_id)
	.bind(link_id)
	.bind(to_id)
	.bind(NOTE_STATUS_ACTIVE)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn delete_link<'e, E>(executor: E, user_id: i64, link_id: i64) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM note_links WHERE user_id = $1 AND id = $2")
		.bind(user_id)
		.bind(link_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn list_links<'e, E>(executor: E, user_id: i64) -> Result<Vec<NoteLinkRecord>>
where
	E: PgExecutor<'e>,
{
	let links = sqlx::query_as::<_, NoteLinkRecord>(
		"\
SELECT id, user_id, from_id, to_id, created_at, updated_at
FROM note_links
WHERE user_id = $1
ORDER BY from_id, to_id, id",
	)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(links)
}

pub async fn list_links_from<'e, E>(
	executor: E,
	user_id: i64,
	from_id: i64,
) -> Result<Vec<NoteLinkRecord>>
where
	E: PgExecutor<'e>,
{
	let links = sqlx::query_as::<_, NoteLinkRecord>(
		"\
SELECT id, user_id, from_id, to_id, created_at, updated_at
FROM note_links
WHERE user_id = $1 AND from_id = $2
ORDER BY to_id, id",
	)
	.bind(user_id)
	.bind(from_id)
	.fetch_all(executor)
	.await?;

	Ok(links)
}

pub async fn insert_authorized_user<'e, E>(executor: E, user_id: i64) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO authorized_users (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
		.bind(user_id)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn authorized_user_exists<'e, E>(executor: E, user_id: i64) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists = sqlx::query_scalar::<_, bool>(
		"SELECT EXISTS (SELECT 1 FROM authorized_users WHERE user_id = $1)",
	)
	.bind(user_id)
	.fetch_one(executor)
	.await?;

	Ok(exists)
}
