use std::sync::Arc;

use lookout_service::LookoutService;
use lookout_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LookoutService>,
}
impl AppState {
	/// Connects storage and loads the first listing snapshot; either failure aborts startup.
	pub async fn new(config: lookout_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.sqlite).await?;

		db.ensure_schema().await?;

		let service = LookoutService::new(config, db);

		service.initialize().await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: LookoutService) -> Self {
		Self { service: Arc::new(service) }
	}
}
