pub mod active;
pub mod cancel;
pub mod commands;
pub mod evaluator;
pub mod lookout;
pub mod search;
pub mod servers;
pub mod state;

mod error;

pub use error::{Error, Result};
pub use evaluator::TickReport;
pub use lookout::SavedQuery;

use std::{future::Future, pin::Pin, sync::Arc};

use lookout_config::{Config, ListingsProviderConfig, NotifierConfig};
use lookout_domain::listing::RawSnapshot;
use lookout_providers::{discord, listings};
use lookout_storage::db::Db;

use crate::{
	search::{SearchEngine, TantivyEngine},
	state::{CycleCounter, SnapshotState},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ListingProvider
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a ListingsProviderConfig,
	) -> BoxFuture<'a, color_eyre::Result<RawSnapshot>>;
}

pub trait Notifier
where
	Self: Send + Sync,
{
	fn send<'a>(
		&'a self,
		cfg: &'a NotifierConfig,
		channel_id: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub listings: Arc<dyn ListingProvider>,
	pub notifier: Arc<dyn Notifier>,
}
impl Providers {
	pub fn new(listings: Arc<dyn ListingProvider>, notifier: Arc<dyn Notifier>) -> Self {
		Self { listings, notifier }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { listings: provider.clone(), notifier: provider }
	}
}

pub struct LookoutService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
	pub search: Arc<dyn SearchEngine>,
	snapshot: SnapshotState,
	cycle: CycleCounter,
}
impl LookoutService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_providers(cfg, db, Providers::default())
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self {
			cfg,
			db,
			providers,
			search: Arc::new(TantivyEngine::new()),
			snapshot: SnapshotState::default(),
			cycle: CycleCounter::default(),
		}
	}

	pub fn with_search_engine(mut self, search: Arc<dyn SearchEngine>) -> Self {
		self.search = search;

		self
	}

	pub async fn current_cycle(&self) -> u32 {
		*self.cycle.read().await
	}
}

struct DefaultProviders;
impl ListingProvider for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a ListingsProviderConfig,
	) -> BoxFuture<'a, color_eyre::Result<RawSnapshot>> {
		Box::pin(listings::fetch_snapshot(cfg))
	}
}
impl Notifier for DefaultProviders {
	fn send<'a>(
		&'a self,
		cfg: &'a NotifierConfig,
		channel_id: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(discord::send_message(cfg, channel_id, text))
	}
}
