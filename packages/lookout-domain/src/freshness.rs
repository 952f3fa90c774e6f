use std::collections::BTreeMap;

use crate::{
	listing::{Listing, RawSnapshot},
	snapshot::{IndexedListing, IndexedSnapshot},
};

/// Whether a listing changed enough between two fetches to be searched again.
///
/// Only an active-to-inactive adventure transition counts; an adventure starting or its minute
/// counter growing does not.
pub fn changed(old: &Listing, new: &Listing) -> bool {
	old.comment != new.comment
		|| old.quest_name() != new.quest_name()
		|| old.difficulty != new.difficulty
		|| old.min_level != new.min_level
		|| old.max_level != new.max_level
		|| (old.adventure_active > 0 && new.adventure_active == 0)
}

pub fn rebuild(raw: &RawSnapshot, previous: &IndexedSnapshot) -> IndexedSnapshot {
	let mut servers: BTreeMap<String, BTreeMap<String, IndexedListing>> = BTreeMap::new();

	for server in raw {
		let listings = servers.entry(server.name.clone()).or_default();

		for listing in &server.groups {
			let id = listing.id.to_string();
			let fresh = match previous.get(&server.name, &id) {
				Some(old) => changed(&old.listing, listing),
				None => true,
			};

			listings.insert(
				id,
				IndexedListing {
					server: server.name.clone(),
					listing: listing.clone(),
					member_count: listing.member_count(),
					fresh,
				},
			);
		}
	}

	IndexedSnapshot::new(servers)
}
