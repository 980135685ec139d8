use std::{collections::BTreeMap, sync::Arc};

use notes_service::{Note, NoteLink, NoteStore};

use crate::command::{ArgError, Command, CommandName, ParseError};

pub const EMPTY_INPUT: &str = "Пришлите команду или текст заметки. Используйте /help для справки.";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Используйте /help.";
pub const START: &str = "Привет! Я помогу хранить ваши заметки. Введите /help для списка команд.";
pub const HELP: &str = "\
Доступные команды:
/login <логин> <пароль> — авторизация
/add <текст> — добавить заметку
/list — список заметок
/link <id1> <id2> — связь между заметками
/link_edit <связь> <id> — изменить цель связи
/link_delete <связь> — удалить связь
/delete <номер> — удалить заметку
/clear — удалить все заметки
/help — справка";

pub const LOGIN_USAGE: &str = "Используйте /login <логин> <пароль>";
pub const LOGIN_REJECTED: &str = "Неверный логин или пароль.";
pub const LOGIN_OK: &str = "Авторизация успешна. Теперь можно работать с заметками.";
pub const LOGIN_FAILED: &str = "Не удалось сохранить авторизацию. Попробуйте позже.";
pub const LOGIN_REQUIRED: &str = "Сначала выполните /login <логин> <пароль>.";
pub const AUTH_CHECK_FAILED: &str = "Не удалось проверить авторизацию. Попробуйте позже.";

pub const ADD_USAGE: &str = "Добавьте текст заметки: /add купить молоко";
pub const ADD_FAILED: &str = "Не удалось сохранить заметку. Попробуйте позже.";

pub const LIST_EMPTY: &str = "У вас пока нет заметок. Добавьте через /add.";
pub const LIST_HEADER: &str = "Ваши заметки:";
pub const LIST_FAILED: &str = "Не удалось получить заметки. Попробуйте позже.";
pub const LIST_LINKS_FAILED: &str = "Не удалось получить связи между заметками. Попробуйте позже.";

pub const DELETE_USAGE: &str = "Укажите номер заметки: /delete 2";
pub const DELETE_BAD_ID: &str = "Номер заметки должен быть числом: /delete 2";
pub const NOTE_NOT_FOUND: &str = "Заметка с таким номером не найдена.";
pub const DELETE_OK: &str = "Заметка удалена.";
pub const DELETE_FAILED: &str = "Не удалось удалить заметку. Попробуйте позже.";

pub const CLEAR_OK: &str = "Все заметки удалены.";
pub const CLEAR_FAILED: &str = "Не удалось очистить заметки. Попробуйте позже.";

pub const LINK_USAGE: &str = "Укажите две заметки: /link 1 2";
pub const LINK_BAD_FROM: &str = "Первый номер должен быть числом: /link 1 2";
pub const LINK_BAD_TO: &str = "Второй номер должен быть числом: /link 1 2";
pub const LINK_INVALID: &str = "Не удалось добавить связь: проверьте номера заметок.";
pub const LINK_FAILED: &str = "Не удалось добавить связь. Попробуйте позже.";

pub const LINK_EDIT_USAGE: &str = "Укажите связь и новую заметку: /link_edit 1 3";
pub const LINK_EDIT_BAD_LINK: &str = "Номер связи должен быть числом: /link_edit 1 3";
pub const LINK_EDIT_BAD_TO: &str = "Номер заметки должен быть числом: /link_edit 1 3";
pub const LINK_NOT_FOUND: &str = "Связь с таким номером не найдена.";
pub const LINK_EDIT_OK: &str = "Связь обновлена.";
pub const LINK_EDIT_INVALID: &str = "Не удалось изменить связь: проверьте номер заметки.";
pub const LINK_EDIT_FAILED: &str = "Не удалось изменить связь. Попробуйте позже.";

pub const LINK_DELETE_USAGE: &str = "Укажите номер связи: /link_delete 1";
pub const LINK_DELETE_BAD_ID: &str = "Номер связи должен быть числом: /link_delete 1";
pub const LINK_DELETE_OK: &str = "Связь удалена.";
pub const LINK_DELETE_FAILED: &str = "Не удалось удалить связь. Попробуйте позже.";

/// Turns one inbound chat message into one reply, independent of the chat transport.
#[derive(Clone)]
pub struct CommandHandler {
	store: Arc<dyn NoteStore>,
	credentials: notes_config::Bot,
}
impl CommandHandler {
	pub fn new(store: Arc<dyn NoteStore>, credentials: notes_config::Bot) -> Self {
		Self { store, credentials }
	}

	pub async fn handle(&self, user_id: i64, text: &str) -> String {
		let command = match Command::parse(text) {
			Ok(command) => command,
			Err(err) => return self.reject(user_id, err).await,
		};

		tracing::debug!(user_id, ?command, "Handling chat command.");

		match command {
			Command::Start => START.to_string(),
			Command::Help => HELP.to_string(),
			Command::Login { login, password } => self.login(user_id, &login, &password).await,
			command => {
				if let Err(reply) = self.ensure_authorized(user_id).await {
					return reply.to_string();
				}

				self.execute(user_id, command).await
			},
		}
	}

	async fn reject(&self, user_id: i64, err: ParseError) -> String {
		if err.is_gated()
			&& let Err(reply) = self.ensure_authorized(user_id).await
		{
			return reply.to_string();
		}

		parse_error_reply(err).to_string()
	}

	async fn login(&self, user_id: i64, login: &str, password: &str) -> String {
		if login != self.credentials.login || password != self.credentials.password {
			return LOGIN_REJECTED.to_string();
		}

		match self.store.authorize_user(user_id).await {
			Ok(()) => {
				tracing::info!(user_id, "Chat user logged in.");

				LOGIN_OK.to_string()
			},
			Err(err) => {
				tracing::error!(user_id, error = %err, "Failed to authorize chat user.");

				LOGIN_FAILED.to_string()
			},
		}
	}

	async fn ensure_authorized(&self, user_id: i64) -> Result<(), &'static str> {
		match self.store.is_user_authorized(user_id).await {
			Ok(true) => Ok(()),
			Ok(false) => Err(LOGIN_REQUIRED),
			Err(err) => {
				tracing::error!(user_id, error = %err, "Failed to check chat authorization.");

				Err(AUTH_CHECK_FAILED)
			},
		}
	}

	async fn execute(&self, user_id: i64, command: Command) -> String {
		match command {
			Command::Add { text } => match self.store.add_note(user_id, &text).await {
				Ok(note) => format!("Заметка #{} сохранена.", note.id),
				Err(err) if err.is_validation() => ADD_USAGE.to_string(),
				Err(err) => store_failure(user_id, &err, ADD_FAILED),
			},
			Command::List => self.list(user_id).await,
			Command::Delete { note_id } => match self.store.delete_note(user_id, note_id).await {
				Ok(true) => DELETE_OK.to_string(),
				Ok(false) => NOTE_NOT_FOUND.to_string(),
				Err(err) => store_failure(user_id, &err, DELETE_FAILED),
			},
			Command::Clear => match self.store.clear_notes(user_id).await {
				Ok(()) => CLEAR_OK.to_string(),
				Err(err) => store_failure(user_id, &err, CLEAR_FAILED),
			},
			Command::Link { from_id, to_id } =>
				match self.store.add_link(user_id, from_id, to_id).await {
					Ok(link) => format!("Связь #{} добавлена.", link.id),
					Err(err) if err.is_validation() => LINK_INVALID.to_string(),
					Err(err) => store_failure(user_id, &err, LINK_FAILED),
				},
			Command::LinkEdit { link_id, to_id } =>
				match self.store.update_link(user_id, link_id, to_id).await {
					Ok(true) => LINK_EDIT_OK.to_string(),
					Ok(false) => LINK_NOT_FOUND.to_string(),
					Err(err) if err.is_validation() => LINK_EDIT_INVALID.to_string(),
					Err(err) => store_failure(user_id, &err, LINK_EDIT_FAILED),
				},
			Command::LinkDelete { link_id } =>
				match self.store.delete_link(user_id, link_id).await {
					Ok(true) => LINK_DELETE_OK.to_string(),
					Ok(false) => LINK_NOT_FOUND.to_string(),
					Err(err) => store_failure(user_id, &err, LINK_DELETE_FAILED),
				},
			Command::Start | Command::Help | Command::Login { .. } => UNKNOWN_COMMAND.to_string(),
		}
	}

	async fn list(&self, user_id: i64) -> String {
		let notes = match self.store.list_notes(user_id).await {
			Ok(notes) => notes,
			Err(err) => return store_failure(user_id, &err, LIST_FAILED),
		};

		if notes.is_empty() {
			return LIST_EMPTY.to_string();
		}

		match self.store.list_links(user_id).await {
			Ok(links) => format_notes_with_links(&notes, &links),
			Err(err) => store_failure(user_id, &err, LIST_LINKS_FAILED),
		}
	}
}

/// Renders the `/list` reply: one `<id>. <text>` line per note, with outgoing link targets
/// appended in ascending order.
pub fn format_notes_with_links(notes: &[Note], links: &[NoteLink]) -> String {
	let mut targets: BTreeMap<i64, Vec<i64>> = BTreeMap::new();

	for link in links {
		targets.entry(link.from_id).or_default().push(link.to_id);
	}
	for ids in targets.values_mut() {
		ids.sort_unstable();
	}

	let mut lines = Vec::with_capacity(notes.len() + 1);

	lines.push(LIST_HEADER.to_string());

	for note in notes {
		let mut line = format!("{}. {}", note.id, note.text);

		if let Some(ids) = targets.get(&note.id).filter(|ids| !ids.is_empty()) {
			let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");

			line.push_str(&format!(" (связи: {joined})"));
		}

		lines.push(line);
	}

	lines.join("\n")
}

fn parse_error_reply(err: ParseError) -> &'static str {
	match err {
		ParseError::Empty => EMPTY_INPUT,
		ParseError::Unknown => UNKNOWN_COMMAND,
		ParseError::Usage(name) => match name {
			CommandName::Login => LOGIN_USAGE,
			CommandName::Add => ADD_USAGE,
			CommandName::Delete => DELETE_USAGE,
			CommandName::Link => LINK_USAGE,
			CommandName::LinkEdit => LINK_EDIT_USAGE,
			CommandName::LinkDelete => LINK_DELETE_USAGE,
		},
		ParseError::BadArgument(arg) => match arg {
			ArgError::NoteId => DELETE_BAD_ID,
			ArgError::FromId => LINK_BAD_FROM,
			ArgError::ToId => LINK_BAD_TO,
			ArgError::EditLinkId => LINK_EDIT_BAD_LINK,
			ArgError::EditToId => LINK_EDIT_BAD_TO,
			ArgError::DeleteLinkId => LINK_DELETE_BAD_ID,
		},
	}
}

fn store_failure(user_id: i64, err: &notes_service::Error, reply: &str) -> String {
	tracing::error!(user_id, error = %err, "Store call failed.");

	reply.to_string()
}
