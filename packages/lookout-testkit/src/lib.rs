mod error;

pub use error::{Error, Result};

use std::str::FromStr;

use serde_json::Map;
use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use time::{OffsetDateTime, macros::datetime};

use lookout_config::{
	Config, ListingsProviderConfig, Lookout, NotifierConfig, Providers, Service, Sqlite, Storage,
};
use lookout_domain::listing::{Listing, Location, Member, Quest, RawSnapshot, Server};

pub const MEMORY_DSN: &str = "sqlite::memory:";

/// A private in-memory database.
///
/// The pool holds exactly one connection that never idles out, since every new in-memory
/// connection would start from an empty database.
pub async fn memory_pool() -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(MEMORY_DSN)
		.map_err(|err| Error::Message(format!("Failed to parse {MEMORY_DSN}: {err}.")))?;
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await?;

	Ok(pool)
}

/// A fixed instant so expiry arithmetic in tests is reproducible.
pub fn fixed_now() -> OffsetDateTime {
	datetime!(2026-01-01 12:00 UTC)
}

pub fn sample_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			command_prefix: "lo!".to_string(),
		},
		storage: Storage { sqlite: Sqlite { dsn: MEMORY_DSN.to_string(), pool_max_conns: 1 } },
		providers: Providers {
			listings: ListingsProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				path: "/groups".to_string(),
				timeout_ms: 1_000,
			},
			notifier: NotifierConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				bot_token: "token".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		lookout: Lookout::default(),
	}
}

pub fn listing(
	id: u64,
	quest_name: &str,
	comment: &str,
	min_level: i32,
	max_level: i32,
) -> Listing {
	Listing {
		id,
		comment: comment.to_string(),
		quest: Some(Quest {
			name: quest_name.to_string(),
			patron: "The Coin Lords".to_string(),
			adventure_pack: "Free to Play".to_string(),
			group_size: "Party".to_string(),
			..Quest::default()
		}),
		difficulty: "Normal".to_string(),
		min_level,
		max_level,
		leader: Some(Member {
			location: Some(Location {
				name: "The Marketplace".to_string(),
				region: "Stormreach".to_string(),
			}),
		}),
		..Listing::default()
	}
}

pub fn server(name: &str, groups: Vec<Listing>) -> Server {
	Server { name: name.to_string(), groups }
}

/// Two servers, one raid listing on Cannith.
pub fn sample_snapshot() -> RawSnapshot {
	vec![
		server(
			"Cannith",
			vec![
				listing(101, "The Shroud", "Raid run, all welcome", 15, 20),
				listing(102, "Korthos Island", "Leveling", 1, 4),
			],
		),
		server("Khyber", vec![listing(201, "Delera's Tomb", "Slayers", 5, 9)]),
	]
}
