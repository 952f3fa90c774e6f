use time::OffsetDateTime;

use lookout_storage::queries;

use crate::{Error, LookoutService, Result};

impl LookoutService {
	pub async fn cancel_query(&self, author_id: &str, id: u32) -> Result<()> {
		let removed =
			queries::delete_query(&self.db, author_id, id, OffsetDateTime::now_utc()).await?;

		if removed == 0 {
			return Err(Error::NotFound { message: format!("No query with ID {id:X}.") });
		}
		if removed == 1 {
			tracing::warn!(author_id, id, "Cancelled query was missing half of its entry pair.");
		}

		Ok(())
	}
}
