use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub api: Api,
	pub bot: Bot,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { http_bind: "0.0.0.0:8080".to_string(), log_level: "info".to_string() }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}
impl Default for Postgres {
	fn default() -> Self {
		Self { dsn: String::new(), pool_max_conns: 8 }
	}
}

/// Basic-Auth pair guarding the HTTP API. Leaving either field empty rejects every request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Api {
	pub user: String,
	pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Bot {
	pub token: String,
	/// Credentials users must send with `/login`.
	pub login: String,
	pub password: String,
}
