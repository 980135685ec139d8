use std::sync::Arc;

use notes_service::{NoteStore, NotesService};
use notes_storage::db::Db;

use crate::auth::Credentials;

#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn NoteStore>,
	pub credentials: Arc<Credentials>,
}
impl AppState {
	pub async fn new(config: notes_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_store(Arc::new(NotesService::new(db)), config.api))
	}

	pub fn from_store(store: Arc<dyn NoteStore>, api: notes_config::Api) -> Self {
		Self { store, credentials: Arc::new(Credentials::new(api.user, api.password)) }
	}
}
