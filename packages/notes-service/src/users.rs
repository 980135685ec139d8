use notes_storage::queries;

use crate::{NotesService, Result};

impl NotesService {
	/// Records that `user_id` completed the login handshake. Repeated calls are no-ops.
	pub async fn authorize_user(&self, user_id: i64) -> Result<()> {
		queries::insert_authorized_user(&self.db.pool, user_id).await?;

		Ok(())
	}

	pub async fn is_user_authorized(&self, user_id: i64) -> Result<bool> {
		Ok(queries::authorized_user_exists(&self.db.pool, user_id).await?)
	}
}
