mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Api, Bot, Config, Postgres, Service, Storage};

use std::{env, fs, path::Path};

pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_HTTP_ADDR: &str = "HTTP_ADDR";
pub const ENV_API_USER: &str = "API_USER";
pub const ENV_API_PASSWORD: &str = "API_PASSWORD";
pub const ENV_BOT_LOGIN: &str = "BOT_LOGIN";
pub const ENV_BOT_PASSWORD: &str = "BOT_PASSWORD";

/// Loads the config file (if any), applies environment overrides, then validates.
pub fn load(path: Option<&Path>) -> Result<Config> {
	let mut cfg = match path {
		Some(path) => read(path)?,
		None => Config::default(),
	};

	apply_env_overrides(&mut cfg, |key| env::var(key).ok());
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn read(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	toml::from_str(&raw).map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })
}

/// Overrides config values with non-empty variables returned by `lookup`.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let targets: [(&str, &mut String); 7] = [
		(ENV_BOT_TOKEN, &mut cfg.bot.token),
		(ENV_DATABASE_URL, &mut cfg.storage.postgres.dsn),
		(ENV_HTTP_ADDR, &mut cfg.service.http_bind),
		(ENV_API_USER, &mut cfg.api.user),
		(ENV_API_PASSWORD, &mut cfg.api.password),
		(ENV_BOT_LOGIN, &mut cfg.bot.login),
		(ENV_BOT_PASSWORD, &mut cfg.bot.password),
	];

	for (key, target) in targets {
		if let Some(value) = lookup(key).filter(|value| !value.is_empty()) {
			*target = value;
		}
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty (or set DATABASE_URL).".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.service.http_bind.is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for value in [
		&mut cfg.service.http_bind,
		&mut cfg.service.log_level,
		&mut cfg.storage.postgres.dsn,
		&mut cfg.bot.token,
	] {
		let trimmed = value.trim();

		if trimmed.len() != value.len() {
			*value = trimmed.to_string();
		}
	}

	// `:port` binds every interface.
	if cfg.service.http_bind.starts_with(':') {
		cfg.service.http_bind.insert_str(0, "0.0.0.0");
	}
}
