//! Chat-ready text for listings.

use std::fmt::Write;

use crate::{duration, snapshot::IndexedListing};

/// Multi-line, quote-prefixed summary of one listing.
pub fn listing_summary(entry: &IndexedListing) -> String {
	let listing = &entry.listing;
	let mut out = String::new();

	if let Some(quest) = listing.quest.as_ref().filter(|quest| !quest.name.is_empty()) {
		let _ = write!(out, "> {}", quest.name);

		if !quest.patron.is_empty() {
			let _ = write!(out, ", {}", quest.patron);
		}
		if listing.adventure_active != 0 {
			let _ = write!(out, " | *Active: {} minute(s)*", listing.adventure_active);
		}

		out.push('\n');
	}

	let _ = write!(
		out,
		"> **{}-{}** | {} Member(s) | {}",
		listing.min_level, listing.max_level, entry.member_count, listing.difficulty
	);

	if !listing.comment.is_empty() {
		let _ = write!(out, "\n> {}", listing.comment);
	}

	out
}

/// All listings of a server, highest minimum level first.
pub fn server_listings<'a>(listings: impl IntoIterator<Item = &'a IndexedListing>) -> String {
	let mut sorted: Vec<_> = listings.into_iter().collect();

	sorted.sort_by(|a, b| {
		b.listing.min_level.cmp(&a.listing.min_level).then(a.listing.id.cmp(&b.listing.id))
	});

	sorted.into_iter().map(listing_summary).collect::<Vec<_>>().join("\n\n")
}

/// Body of the single message sent for one query's matches in one tick.
pub fn notification<'a>(
	query_id: u32,
	matches: impl IntoIterator<Item = &'a IndexedListing>,
) -> String {
	let entries: Vec<_> = matches.into_iter().collect();
	let mut out = format!("**Lookout {query_id:X}** matched {} group(s).", entries.len());

	for entry in entries {
		let _ = write!(out, "\n\n__{}__\n{}", entry.server, listing_summary(entry));
	}

	out
}

/// Entry for the `active` command.
pub fn query_line(query_id: u32, text: &str, remaining: time::Duration) -> String {
	format!("**ID: {query_id:X}**\n{text}\n*Remaining:* {}", duration::format(remaining))
}
