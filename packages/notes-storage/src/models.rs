use time::OffsetDateTime;

pub const NOTE_STATUS_ACTIVE: &str = "active";
pub const NOTE_STATUS_DELETED: &str = "deleted";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoteRecord {
	pub id: i64,
	pub user_id: i64,
	pub text: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoteLinkRecord {
	pub id: i64,
	pub user_id: i64,
	pub from_id: i64,
	pub to_id: i64,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
