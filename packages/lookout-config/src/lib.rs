mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, ListingsProviderConfig, Lookout, NotifierConfig, Providers, Service, Sqlite, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.command_prefix.is_empty() {
		return Err(Error::Validation {
			message: "service.command_prefix must be non-empty.".to_string(),
		});
	}
	if cfg.service.command_prefix.chars().any(char::is_whitespace) {
		return Err(Error::Validation {
			message: "service.command_prefix must not contain whitespace.".to_string(),
		});
	}
	if cfg.storage.sqlite.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.sqlite.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, api_base, timeout_ms) in [
		("listings", &cfg.providers.listings.api_base, cfg.providers.listings.timeout_ms),
		("notifier", &cfg.providers.notifier.api_base, cfg.providers.notifier.timeout_ms),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.providers.notifier.bot_token.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.notifier.bot_token must be non-empty.".to_string(),
		});
	}
	if cfg.providers.notifier.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "providers.notifier.default_headers values must be strings.".to_string(),
		});
	}
	if cfg.lookout.max_query_chars == 0 {
		return Err(Error::Validation {
			message: "lookout.max_query_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.lookout.search_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "lookout.search_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.lookout.purge_interval_seconds == 0 {
		return Err(Error::Validation {
			message: "lookout.purge_interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.command_prefix = cfg.service.command_prefix.trim().to_string();

	for api_base in
		[&mut cfg.providers.listings.api_base, &mut cfg.providers.notifier.api_base]
	{
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}
}
