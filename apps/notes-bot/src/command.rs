/// A parsed chat command with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	Start,
	Help,
	Login { login: String, password: String },
	Add { text: String },
	List,
	Delete { note_id: i64 },
	Clear,
	Link { from_id: i64, to_id: i64 },
	LinkEdit { link_id: i64, to_id: i64 },
	LinkDelete { link_id: i64 },
}
impl Command {
	/// Splits the message on whitespace; the first token selects the command (case-sensitive).
	pub fn parse(input: &str) -> Result<Self, ParseError> {
		let trimmed = input.trim();
		let Some(name) = trimmed.split_whitespace().next() else {
			return Err(ParseError::Empty);
		};
		let rest = trimmed[name.len()..].trim();
		let args = rest.split_whitespace().collect::<Vec<_>>();

		match name {
			"/start" => Ok(Self::Start),
			"/help" => Ok(Self::Help),
			"/login" => match args.as_slice() {
				[login, password, ..] =>
					Ok(Self::Login { login: login.to_string(), password: password.to_string() }),
				_ => Err(ParseError::Usage(CommandName::Login)),
			},
			"/add" =>
				if rest.is_empty() {
					Err(ParseError::Usage(CommandName::Add))
				} else {
					Ok(Self::Add { text: rest.to_string() })
				},
			"/list" => Ok(Self::List),
			"/delete" => {
				let [raw, ..] = args.as_slice() else {
					return Err(ParseError::Usage(CommandName::Delete));
				};
				let note_id = parse_id(raw, ArgError::NoteId)?;

				Ok(Self::Delete { note_id })
			},
			"/clear" => Ok(Self::Clear),
			"/link" => {
				let [first, second, ..] = args.as_slice() else {
					return Err(ParseError::Usage(CommandName::Link));
				};
				let from_id = parse_id(first, ArgError::FromId)?;
				let to_id = parse_id(second, ArgError::ToId)?;

				Ok(Self::Link { from_id, to_id })
			},
			"/link_edit" => {
				let [first, second, ..] = args.as_slice() else {
					return Err(ParseError::Usage(CommandName::LinkEdit));
				};
				let link_id = parse_id(first, ArgError::EditLinkId)?;
				let to_id = parse_id(second, ArgError::EditToId)?;

				Ok(Self::LinkEdit { link_id, to_id })
			},
			"/link_delete" => {
				let [raw, ..] = args.as_slice() else {
					return Err(ParseError::Usage(CommandName::LinkDelete));
				};
				let link_id = parse_id(raw, ArgError::DeleteLinkId)?;

				Ok(Self::LinkDelete { link_id })
			},
			_ => Err(ParseError::Unknown),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
	Empty,
	Unknown,
	/// A known command without its required arguments.
	Usage(CommandName),
	/// A known command whose argument is not a positive integer.
	BadArgument(ArgError),
}
impl ParseError {
	/// Whether the reply needs a logged-in user. Unknown input is answered only after login.
	pub fn is_gated(self) -> bool {
		match self {
			Self::Empty => false,
			Self::Unknown => true,
			Self::Usage(name) => name != CommandName::Login,
			Self::BadArgument(_) => true,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandName {
	Login,
	Add,
	Delete,
	Link,
	LinkEdit,
	LinkDelete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgError {
	NoteId,
	FromId,
	ToId,
	EditLinkId,
	EditToId,
	DeleteLinkId,
}

fn parse_id(raw: &str, err: ArgError) -> Result<i64, ParseError> {
	match raw.parse::<i64>() {
		Ok(id) if id > 0 => Ok(id),
		_ => Err(ParseError::BadArgument(err)),
	}
}
