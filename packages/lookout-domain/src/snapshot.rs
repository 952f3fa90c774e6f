use std::collections::BTreeMap;

use crate::listing::Listing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedListing {
	pub server: String,
	pub listing: Listing,
	pub member_count: u32,
	/// Set when the listing is new or materially changed since the previous snapshot.
	pub fresh: bool,
}

/// Server name to stringified listing id to listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedSnapshot {
	servers: BTreeMap<String, BTreeMap<String, IndexedListing>>,
}
impl IndexedSnapshot {
	pub fn new(servers: BTreeMap<String, BTreeMap<String, IndexedListing>>) -> Self {
		Self { servers }
	}

	pub fn server_names(&self) -> impl Iterator<Item = &str> {
		self.servers.keys().map(String::as_str)
	}

	pub fn has_server(&self, name: &str) -> bool {
		self.servers.contains_key(name)
	}

	pub fn server(&self, name: &str) -> Option<&BTreeMap<String, IndexedListing>> {
		self.servers.get(name)
	}

	pub fn get(&self, server: &str, listing_id: &str) -> Option<&IndexedListing> {
		self.servers.get(server).and_then(|listings| listings.get(listing_id))
	}

	pub fn listings(&self) -> impl Iterator<Item = &IndexedListing> {
		self.servers.values().flat_map(BTreeMap::values)
	}

	pub fn len(&self) -> usize {
		self.servers.values().map(BTreeMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn fresh_count(&self) -> usize {
		self.listings().filter(|listing| listing.fresh).count()
	}

	/// The same listings with nothing marked fresh.
	///
	/// Used when a fetch fails: the previous listings stay searchable, but nothing in them is new
	/// relative to the pass that already reported them.
	pub fn settled(&self) -> Self {
		let mut settled = self.clone();

		for listing in settled.servers.values_mut().flat_map(BTreeMap::values_mut) {
			listing.fresh = false;
		}

		settled
	}
}
