use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::handler::CommandHandler;

/// Long-polls Telegram until Ctrl-C, answering every text message in plain text.
pub async fn serve(token: &str, handler: CommandHandler) -> color_eyre::Result<()> {
	let bot = Bot::new(token);
	let me = bot.get_me().await?;

	tracing::info!(username = me.username(), "Bot authorized.");

	let schema = Update::filter_message().endpoint(on_message);

	Dispatcher::builder(bot, schema)
		.dependencies(dptree::deps![Arc::new(handler)])
		.enable_ctrlc_handler()
		.build()
		.dispatch()
		.await;

	tracing::info!("Bot stopped.");

	Ok(())
}

async fn on_message(bot: Bot, msg: Message, handler: Arc<CommandHandler>) -> ResponseResult<()> {
	let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
		return Ok(());
	};
	let Ok(user_id) = i64::try_from(user.id.0) else {
		tracing::warn!(user_id = user.id.0, "Ignoring message from an out-of-range user id.");

		return Ok(());
	};
	let reply = handler.handle(user_id, text).await;

	if let Err(err) = bot.send_message(msg.chat.id, reply).await {
		tracing::warn!(user_id, error = %err, "Failed to send reply.");
	}

	Ok(())
}
