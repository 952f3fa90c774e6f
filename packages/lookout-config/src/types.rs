use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub lookout: Lookout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Prefix that marks a chat message as a command, e.g. "lo!".
	#[serde(default = "default_command_prefix")]
	pub command_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sqlite {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub listings: ListingsProviderConfig,
	pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingsProviderConfig {
	pub api_base: String,
	pub path: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
	pub api_base: String,
	pub bot_token: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lookout {
	#[serde(default = "default_max_query_chars")]
	pub max_query_chars: usize,
	/// Searches slower than this are treated as abusive and the query is removed.
	#[serde(default = "default_search_timeout_ms")]
	pub search_timeout_ms: u64,
	#[serde(default = "default_purge_interval_seconds")]
	pub purge_interval_seconds: u64,
}
impl Default for Lookout {
	fn default() -> Self {
		Self {
			max_query_chars: default_max_query_chars(),
			search_timeout_ms: default_search_timeout_ms(),
			purge_interval_seconds: default_purge_interval_seconds(),
		}
	}
}

fn default_command_prefix() -> String {
	"lo!".to_string()
}

fn default_max_query_chars() -> usize {
	281
}

fn default_search_timeout_ms() -> u64 {
	50
}

fn default_purge_interval_seconds() -> u64 {
	900
}
