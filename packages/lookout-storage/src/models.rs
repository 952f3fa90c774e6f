use time::Duration;

/// A live query as seen by its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredQuery {
	pub author_id: String,
	pub channel_id: String,
	pub id: u32,
	pub slot: u8,
	pub cycle: u32,
	/// Time left before both entries expire.
	pub ttl: Duration,
	pub query_text: String,
}

/// One live query entry from a full scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry {
	pub key: String,
	pub author_id: String,
	pub id: u32,
	pub slot: u8,
	pub cycle: u32,
	pub query_text: String,
	/// `None` when the paired return entry is missing.
	pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryScan {
	pub entries: Vec<QueryEntry>,
	/// Query keys that could not be decoded.
	pub malformed: Vec<String>,
}
