pub mod command;
pub mod handler;
pub mod telegram;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use notes_cli::ConfigArgs;
use notes_service::NotesService;
use notes_storage::db::Db;

use crate::handler::CommandHandler;

#[derive(Debug, Parser)]
#[command(
	version = notes_cli::VERSION,
	rename_all = "kebab",
	styles = notes_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = notes_config::load(args.config.config.as_deref())?;

	init_tracing(&config);

	if config.bot.token.is_empty() {
		return Err(eyre::eyre!("bot.token must be non-empty (or set BOT_TOKEN)."));
	}
	if config.bot.login.is_empty() || config.bot.password.is_empty() {
		tracing::warn!("Bot credentials are empty. Every /login attempt will be rejected.");
	}

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let handler = CommandHandler::new(Arc::new(NotesService::new(db)), config.bot.clone());

	telegram::serve(&config.bot.token, handler).await
}

fn init_tracing(config: &notes_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
