use time::OffsetDateTime;

use lookout_storage::{models::StoredQuery, queries};

use crate::{LookoutService, Result};

impl LookoutService {
	pub async fn list_queries(&self, author_id: &str) -> Result<Vec<StoredQuery>> {
		let stored =
			queries::find_by_author(&self.db, author_id, OffsetDateTime::now_utc()).await?;

		Ok(stored)
	}
}
