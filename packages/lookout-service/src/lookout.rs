use time::{Duration, OffsetDateTime};

use lookout_domain::query;
use lookout_storage::queries;

use crate::{Error, LookoutService, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedQuery {
	pub id: u32,
	pub server: String,
	pub ttl: Duration,
	/// Search text as stored.
	pub text: String,
}

impl LookoutService {
	/// Validates a raw lookout request and stores it for the author.
	pub async fn save_query(
		&self,
		author_id: &str,
		channel_id: &str,
		raw: &str,
	) -> Result<SavedQuery> {
		let snapshot = self.snapshot.load();
		let prepared = query::prepare(raw, self.cfg.lookout.max_query_chars, |name| {
			snapshot.has_server(name)
		})?;

		drop(snapshot);

		self.search.validate(&prepared.text).map_err(|err| Error::InvalidRequest {
			message: format!("The query could not be parsed: {err}"),
		})?;

		let cycle = self.cycle.read().await;
		let id = queries::save_query(
			&self.db,
			author_id,
			channel_id,
			&prepared.text,
			prepared.ttl,
			*cycle,
			OffsetDateTime::now_utc(),
		)
		.await?;

		drop(cycle);

		tracing::info!(author_id, id, server = %prepared.server, "Saved lookout query.");

		Ok(SavedQuery { id, server: prepared.server, ttl: prepared.ttl, text: prepared.text })
	}
}
