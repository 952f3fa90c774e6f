use lookout_domain::format;

use crate::LookoutService;

impl LookoutService {
	/// Server names of the current snapshot, sorted.
	pub fn servers(&self) -> Vec<String> {
		self.snapshot.load().server_names().map(str::to_string).collect()
	}

	/// Formatted listings of one server, or `None` when the server is unknown.
	pub fn server_listings(&self, name: &str) -> Option<String> {
		let snapshot = self.snapshot.load();

		snapshot.server(name).map(|listings| format::server_listings(listings.values()))
	}
}
