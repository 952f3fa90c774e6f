//! Key layout of the entry table.
//!
//! A stored query is two entries sharing one suffix: `query/{author}/{id}` holds the search text
//! and `return/{author}/{id}` holds the channel that receives notifications.

use lookout_domain::ids;

use crate::{Error, Result};

pub const QUERY_KIND: &str = "query";
pub const RETURN_KIND: &str = "return";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey<'a> {
	pub kind: &'a str,
	pub author_id: &'a str,
	pub id: u32,
}

pub fn validate_author(author_id: &str) -> Result<()> {
	if author_id.is_empty() || author_id.contains('/') {
		return Err(Error::InvalidArgument(format!(
			"Author id {author_id:?} must be non-empty and must not contain '/'."
		)));
	}

	Ok(())
}

pub fn query_key(author_id: &str, id: u32) -> String {
	format!("{QUERY_KIND}/{author_id}/{}", ids::to_key_suffix(id))
}

pub fn return_key(author_id: &str, id: u32) -> String {
	format!("{RETURN_KIND}/{author_id}/{}", ids::to_key_suffix(id))
}

pub fn author_prefix(kind: &str, author_id: &str) -> String {
	format!("{kind}/{author_id}/")
}

pub fn kind_prefix(kind: &str) -> String {
	format!("{kind}/")
}

/// Half-open key range `[prefix, upper)` covering every key that starts with `prefix`.
///
/// Prefixes end in `/`, and `0` is the next byte after it.
pub fn prefix_range(prefix: &str) -> (String, String) {
	let upper = match prefix.strip_suffix('/') {
		Some(stem) => format!("{stem}0"),
		None => format!("{prefix}\u{10FFFF}"),
	};

	(prefix.to_string(), upper)
}

/// Splits a key into its kind, author and id; only the canonical suffix form is accepted.
pub fn parse(key: &str) -> Result<ParsedKey<'_>> {
	let malformed = || Error::MalformedKey { key: key.to_string() };
	let mut parts = key.splitn(3, '/');
	let (Some(kind), Some(author_id), Some(suffix)) = (parts.next(), parts.next(), parts.next())
	else {
		return Err(malformed());
	};

	if kind != QUERY_KIND && kind != RETURN_KIND {
		return Err(malformed());
	}
	if validate_author(author_id).is_err() {
		return Err(malformed());
	}

	let id = ids::parse(suffix).map_err(|_| malformed())?;

	if ids::to_key_suffix(id) != suffix {
		return Err(malformed());
	}

	Ok(ParsedKey { kind, author_id, id })
}
